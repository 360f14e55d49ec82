//! Chain selection as seen from separate process runs.

use std::{collections::BTreeSet, process::Command};

const BIN: &str = env!("CARGO_BIN_EXE_aa-harness");

fn run(args: &[&str]) -> std::process::Output {
    Command::new(BIN)
        .args(args)
        .env_remove("AA_CHAIN_ID")
        .env_remove("AA_SEED")
        .env_remove("AA_FIXTURES")
        .output()
        .expect("failed to run harness binary")
}

fn field(stdout: &str, key: &str) -> String {
    stdout
        .lines()
        .find_map(|line| line.strip_prefix(key))
        .map(|value| value.trim().to_owned())
        .unwrap_or_else(|| panic!("no {key} in output:\n{stdout}"))
}

#[test]
fn chain_override_is_honoured_on_every_run() {
    for _ in 0..3 {
        let output = run(&["--chainId=137"]);
        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert_eq!(field(&stdout, "chain id:"), "137");
        assert_eq!(field(&stdout, "chain name:"), "polygon");
        assert_eq!(field(&stdout, "origin:"), "Override");
    }
}

#[test]
fn unknown_chain_fails_before_anything_runs() {
    let output = run(&["--chainId=9999"]);
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unsupported chain id 9999"), "{stderr}");
    assert!(stderr.contains("supported chain ids: 10, 137"), "{stderr}");
}

#[test]
fn random_runs_stay_within_configured_chains() {
    let seen: BTreeSet<String> = (0..40)
        .map(|_| {
            let output = run(&[]);
            assert!(output.status.success());
            field(&String::from_utf8_lossy(&output.stdout), "chain id:")
        })
        .collect();

    let configured: BTreeSet<String> = ["10", "137"].map(String::from).into();
    assert!(seen.is_subset(&configured), "{seen:?}");
    // 40 fair coin flips all landing the same way is a 2^-39 event
    assert_eq!(seen, configured);
}

#[test]
fn seed_replays_a_random_choice() {
    let first = run(&["--seed", "1234"]);
    let second = run(&["--seed", "1234"]);
    assert_eq!(first.stdout, second.stdout);
    let stdout = String::from_utf8_lossy(&first.stdout);
    assert_eq!(field(&stdout, "origin:"), "Random { seed: 1234 }");
}

#[test]
fn fixture_file_replaces_builtin_chains() {
    let path = std::env::temp_dir().join(format!("aa-harness-chains-{}.json", std::process::id()));
    let registry = r#"[
        {
            "chain_id": 8453, "name": "base",
            "invalid_chain_id": "8453x", "incorrect_chain_id": 84530, "to_chain_id": 10,
            "usdc": {
                "name": "USDC", "decimals": 6,
                "address": "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913",
                "invalid_address": "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA0291",
                "incorrect_address": "0xfde4C96c8593536E31F229EA8f37b2ADa2699bb2"
            },
            "usdt": {
                "name": "USDT", "decimals": 6,
                "address": "0xfde4C96c8593536E31F229EA8f37b2ADa2699bb2",
                "invalid_address": "fde4C96c8593536E31F229EA8f37b2ADa2699bb2zz",
                "incorrect_address": "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913"
            },
            "rpc_url": "https://mainnet.base.org", "invalid_rpc_url": "mainnet.base.org",
            "incorrect_rpc_url": "https://mainnet.optimism.io"
        },
        {
            "chain_id": 10, "name": "optimism",
            "invalid_chain_id": "10x", "incorrect_chain_id": 1010, "to_chain_id": 8453,
            "usdc": {
                "name": "USDC", "decimals": 6,
                "address": "0x0b2C639c533813f4Aa9D7837CAf62653d097Ff85",
                "invalid_address": "0x0b2C639c533813f4Aa9D7837CAf62653d097Ff8",
                "incorrect_address": "0x94b008aA00579c1307B0EF2c499aD98a8ce58e58"
            },
            "usdt": {
                "name": "USDT", "decimals": 6,
                "address": "0x94b008aA00579c1307B0EF2c499aD98a8ce58e58",
                "invalid_address": "0x94b008aA00579c1307B0EF2c499aD98a8ce58eZZ",
                "incorrect_address": "0x0b2C639c533813f4Aa9D7837CAf62653d097Ff85"
            },
            "rpc_url": "https://mainnet.optimism.io", "invalid_rpc_url": "mainnet.optimism.io",
            "incorrect_rpc_url": "https://mainnet.base.org"
        }
    ]"#;
    std::fs::write(&path, registry).unwrap();

    let output = run(&["--fixtures", path.to_str().unwrap(), "--chainId", "8453"]);
    std::fs::remove_file(&path).ok();

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(field(&stdout, "chain name:"), "base");
    assert_eq!(field(&stdout, "counterpart:"), "optimism");
}
