//! Proxy environment handling
//!
//! Kept in its own test binary: it sets process-wide proxy variables that
//! would reroute every other test's traffic.

use std::time::Duration;

use bookdesk_infra::http::HttpClient;
use reqwest::Method;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const UPSTREAM: &str = "http://api.bookdesk.invalid/health";

#[tokio::test]
async fn test_http_proxy_environment_is_honored() {
    let proxy = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("host", "api.bookdesk.invalid"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_string("via proxy"))
        .expect(1)
        .mount(&proxy)
        .await;

    for var in ["http_proxy", "ALL_PROXY", "all_proxy", "NO_PROXY", "no_proxy", "REQUEST_METHOD"]
    {
        std::env::remove_var(var);
    }
    std::env::set_var("HTTP_PROXY", proxy.uri());

    let client = HttpClient::new().unwrap();
    let response = client.send(client.request(Method::GET, UPSTREAM)).await.unwrap();
    assert_eq!(response.text().await.unwrap(), "via proxy");

    // Opting out connects directly, and the unresolvable host fails.
    let direct =
        HttpClient::builder().timeout(Duration::from_secs(2)).no_proxy().build().unwrap();
    assert!(direct.send(direct.request(Method::GET, UPSTREAM)).await.is_err());

    std::env::remove_var("HTTP_PROXY");
    proxy.verify().await;
}
