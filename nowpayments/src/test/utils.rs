//! Test utilities for integration testing
use url::Url;
use wiremock::MockServer;

use crate::{Client, Config};

pub const TEST_API_KEY: &str = "test-api-key";
pub const TEST_IPN_SECRET: &str = "abc123";

/// Config pointing at the mock server's `/v1` root
pub fn create_test_config(server: &MockServer) -> Config {
    let base_url = Url::parse(&format!("{}/v1", server.uri())).expect("mock server URI should parse");
    Config::new(TEST_API_KEY).with_base_url(base_url)
}

pub fn create_test_client(server: &MockServer) -> Client {
    Client::new(create_test_config(server)).expect("Failed to create test client")
}

/// Client with an IPN secret and a default callback URL
pub fn create_test_client_with_ipn(server: &MockServer) -> Client {
    let config = create_test_config(server)
        .with_ipn_secret_key(TEST_IPN_SECRET)
        .with_ipn_callback_url(Url::parse("https://merchant.example.com/ipn").unwrap());
    Client::new(config).expect("Failed to create test client")
}

/// JSON body of the only request the mock server received
pub async fn single_request_body(server: &MockServer) -> serde_json::Value {
    let requests = server.received_requests().await.expect("request recording should be enabled");
    assert_eq!(requests.len(), 1, "expected exactly one request");
    serde_json::from_slice(&requests[0].body).expect("request body should be JSON")
}
