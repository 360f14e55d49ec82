use aa_harness::{retry, BundlerClient, Environment, HarnessArgs, Secrets};
use alloy::providers::ProviderBuilder;
use clap::Parser;
use eyre::WrapErr;
use reqwest::Url;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Resolve the target chain of an e2e run", long_about = None)]
struct Cli {
    #[command(flatten)]
    harness: HarnessArgs,

    /// Query the bundler gas price to check the endpoint is reachable.
    #[arg(long)]
    check: bool,

    /// Attempt budget for the bundler check.
    #[arg(long, default_value_t = aa_harness::DEFAULT_ATTEMPTS)]
    attempts: usize,
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    aa_harness::init_tracing();
    let cli = Cli::parse();

    let registry = cli.harness.registry()?;
    let env = Environment::resolve(&registry, cli.harness.selection())?;

    println!("chain id:     {}", env.chain_id());
    println!("chain name:   {}", env.chain_name());
    println!("counterpart:  {}", env.counterpart().name);
    println!("usdc:         {}", env.usdc().address);
    println!("usdt:         {}", env.usdt().address);
    println!("origin:       {:?}", env.origin());

    if cli.check {
        let secrets = Secrets::from_env();
        let url: Url = secrets
            .bundler_url()?
            .parse()
            .wrap_err("BUNDLER_URL is not a valid url")?;
        let bundler = BundlerClient::new(ProviderBuilder::new().on_http(url));
        let price = retry(cli.attempts, || async { Ok(bundler.gas_price().await?) }).await?;
        info!(%price, "bundler reachable");
        println!("gas price:    {price}");
    }

    Ok(())
}
