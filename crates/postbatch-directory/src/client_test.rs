use super::*;

fn test_client(base_url: &str) -> DirectoryClient {
    DirectoryClient::with_base_url("test-token", 30, "postbatch-test/0.1", base_url)
        .expect("client construction should not fail")
}

#[test]
fn endpoint_appends_to_base_path() {
    let client = test_client("https://api.example.com/v4");
    let url = client.endpoint("accounts/1/locations").unwrap();
    assert_eq!(url.as_str(), "https://api.example.com/v4/accounts/1/locations");
}

#[test]
fn endpoint_strips_duplicate_slashes() {
    let client = test_client("https://api.example.com/v4/");
    let url = client.endpoint("/accounts").unwrap();
    assert_eq!(url.as_str(), "https://api.example.com/v4/accounts");
}

#[test]
fn invalid_base_url_is_rejected() {
    let result = DirectoryClient::with_base_url("t", 30, "ua", "not a url");
    assert!(matches!(result, Err(DirectoryError::InvalidBaseUrl { .. })));
}

#[test]
fn error_message_prefers_provider_message() {
    let body = r#"{"error":{"code":400,"message":"Request contains an invalid argument.","status":"INVALID_ARGUMENT"}}"#;
    assert_eq!(error_message(body), "Request contains an invalid argument.");
}

#[test]
fn error_message_falls_back_to_raw_body() {
    assert_eq!(error_message("  upstream timeout \n"), "upstream timeout");
    assert_eq!(error_message(r#"{"error":{}}"#), r#"{"error":{}}"#);
}
