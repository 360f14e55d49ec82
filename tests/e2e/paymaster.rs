//! Paymaster cases, driven through the retry wrapper.

use aa_harness::{
    expect_failure, retry, validate_error, ClientError, ErrorResponse, PaymasterClient, Secrets,
};
use alloy::primitives::Address;
use mockito::Matcher;

use super::environment;

#[tokio::test]
async fn unavailable_service_is_retried_until_budget_runs_out() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/whitelist")
        .match_query(Matcher::Any)
        .with_status(503)
        .with_body(r#"{"error":"Service Unavailable"}"#)
        .expect(3)
        .create_async()
        .await;

    let client = PaymasterClient::new(server.url(), "key", 137);
    let err = retry(3, || async {
        client.whitelist(&[Address::repeat_byte(0x11)]).await?;
        Ok(())
    })
    .await
    .unwrap_err();

    mock.assert_async().await;
    assert_eq!(err.status(), Some(503));
    assert!(matches!(
        err.downcast_ref::<ClientError>(),
        Some(ClientError::Api { status: 503, .. })
    ));
}

#[tokio::test]
async fn invalid_api_key_fails_as_expected() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/deposit")
        .match_query(Matcher::UrlEncoded("apiKey".into(), "invalid".into()))
        .with_status(403)
        .with_body(r#"{"error":"Invalid Api Key"}"#)
        .expect(1)
        .create_async()
        .await;

    let client = PaymasterClient::new(server.url(), "key", 137).with_api_key("invalid");
    retry(3, || async {
        let result = client.deposit("0.0000001").await;
        expect_failure(result, "Invalid Api Key", "deposit with invalid api key", 403)
    })
    .await
    .unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn unexpected_failure_shape_is_retried_then_reported_with_label() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/addPolicy")
        .match_query(Matcher::Any)
        .with_status(502)
        .with_body("Bad Gateway")
        .expect(3)
        .create_async()
        .await;

    let client = PaymasterClient::new(server.url(), "key", 137);
    let err = retry(3, || async {
        let result = client.add_policy(&serde_json::json!({ "name": "" })).await;
        expect_failure(result, "name is required", "policy without name", 400)
    })
    .await
    .unwrap_err();

    mock.assert_async().await;
    let text = err.to_string();
    assert!(text.starts_with("policy without name:"), "{text}");
    assert!(text.contains("expected status 400, got 502"), "{text}");
}

#[tokio::test]
#[ignore = "Live paymaster - needs PAYMASTER_URL and PAYMASTER_API_KEY"]
async fn live_whitelist_and_bad_chain_id() {
    let env = environment();
    let secrets = Secrets::from_env();
    let client = PaymasterClient::new(
        secrets.paymaster_url().unwrap(),
        secrets.paymaster_api_key().unwrap(),
        env.chain_id(),
    );

    let response = retry(3, || async {
        let body = client.whitelist(&[Address::repeat_byte(0x11)]).await?;
        eyre::ensure!(body.get("message").is_some(), "no message in {body}");
        Ok(body)
    })
    .await
    .unwrap();
    println!("whitelist on {}: {response}", env.chain_name());

    retry(3, || async {
        let err = client
            .with_chain_id(env.invalid_chain_id())
            .whitelist(&[Address::repeat_byte(0x11)])
            .await
            .expect_err("malformed chain id was accepted");
        validate_error(&err, "", "whitelist with invalid chain id", 400)
    })
    .await
    .unwrap();
}
