use super::*;
use serial_test::serial;

const TEST_VARIABLE: &str = "AUTH_HANDLER_TEST_TOKEN";

#[tokio::test]
async fn test_static_provider_returns_its_token() {
    let provider = StaticTokenProvider::new("abc".to_string());

    let token = provider
        .access_token("https://contoso.sharepoint.com")
        .await
        .unwrap();

    assert_eq!(token.expose_secret(), "abc");
}

#[tokio::test]
async fn test_static_provider_rejects_blank_token() {
    let provider = StaticTokenProvider::new("  ".to_string());

    let result = provider.access_token("https://contoso.sharepoint.com").await;

    assert!(matches!(result, Err(Error::AuthError(msg)) if msg == "Invalid credentials provided"));
}

#[test]
fn test_static_provider_debug_is_redacted() {
    let provider = StaticTokenProvider::new("super-secret".to_string());

    assert!(!format!("{:?}", provider).contains("super-secret"));
}

#[tokio::test]
#[serial]
async fn test_environment_provider_reads_variable_at_call_time() {
    let provider = EnvironmentTokenProvider::new(TEST_VARIABLE);
    std::env::set_var(TEST_VARIABLE, "first");
    let first = provider.access_token("https://contoso.sharepoint.com").await.unwrap();

    std::env::set_var(TEST_VARIABLE, "second");
    let second = provider.access_token("https://contoso.sharepoint.com").await.unwrap();
    std::env::remove_var(TEST_VARIABLE);

    assert_eq!(first.expose_secret(), "first");
    assert_eq!(second.expose_secret(), "second");
}

#[tokio::test]
#[serial]
async fn test_environment_provider_missing_variable_is_auth_error() {
    std::env::remove_var(TEST_VARIABLE);
    let provider = EnvironmentTokenProvider::new(TEST_VARIABLE);

    let result = provider.access_token("https://contoso.sharepoint.com").await;

    assert_eq!(
        result.map(|_| ()),
        Err(Error::AuthError(format!(
            "No access token found in {}. Log in and try again",
            TEST_VARIABLE
        )))
    );
}
