use super::*;
use crate::StaticTokenProvider;
use client_query::ReqwestTransport;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn provider() -> ContextInfoDigestProvider {
    ContextInfoDigestProvider::new(
        Arc::new(ReqwestTransport::new()),
        Arc::new(StaticTokenProvider::new("abc".to_string())),
    )
}

#[tokio::test]
async fn test_form_digest_posts_to_context_info() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/sites/ninja/_api/contextinfo"))
        .and(header("authorization", "Bearer abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "FormDigestTimeoutSeconds": 1800,
            "FormDigestValue": "0x1B2C,27 Nov 2018 09:00:00 -0000",
            "WebFullUrl": "https://contoso.sharepoint.com/sites/ninja"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let digest = provider()
        .form_digest(&format!("{}/sites/ninja/", server.uri()))
        .await
        .unwrap();

    assert_eq!(digest, "0x1B2C,27 Nov 2018 09:00:00 -0000");
}

#[test]
fn test_read_digest_accepts_verbose_payload() {
    let body = json!({
        "d": { "GetContextWebInformation": { "FormDigestValue": "ABC" } }
    })
    .to_string();

    assert_eq!(read_digest(&body).unwrap(), "ABC");
}

#[test]
fn test_read_digest_without_value_is_an_error() {
    let result = read_digest("{}");

    assert!(matches!(result, Err(AuthError::DigestError(msg)) if msg.contains("FormDigestValue")));
}

#[tokio::test]
async fn test_rejected_request_is_auth_error_with_verbatim_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(403).set_body_string("Access denied"))
        .mount(&server)
        .await;

    let result = provider().form_digest(&server.uri()).await;

    assert_eq!(
        result,
        Err(Error::AuthError("403 - Access denied".to_string()))
    );
}

#[tokio::test]
async fn test_invalid_site_url_is_auth_error() {
    let result = provider().form_digest("not a url").await;

    assert!(matches!(result, Err(Error::AuthError(_))));
}
