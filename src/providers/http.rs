use crate::core::FetchError;
use reqwest::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use tracing::debug;

pub const USER_AGENT: &str = "ratewatch/0.1";

fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("text/html, application/xhtml+xml, */*"),
    );
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    headers
}

/// Builds the HTTP client shared by both rate sources.
pub fn build_client() -> anyhow::Result<Client> {
    let client = Client::builder()
        .user_agent(USER_AGENT)
        .default_headers(default_headers())
        .build()?;
    Ok(client)
}

/// Fetches `url` and returns the body as text. Non-success statuses are
/// transport errors.
pub async fn fetch_text(client: &Client, url: &str) -> Result<String, FetchError> {
    debug!("Requesting rates from {}", url);
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| FetchError::Transport(format!("Request error: {e} URL: {url}")))?;

    if !response.status().is_success() {
        return Err(FetchError::Transport(format!(
            "HTTP error: {} URL: {}",
            response.status(),
            url
        )));
    }

    response
        .text()
        .await
        .map_err(|e| FetchError::Transport(format!("Failed to read response body: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_fetch_text_sends_expected_headers() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/daily_utf8.xml"))
            .and(header("accept", "text/html, application/xhtml+xml, */*"))
            .and(header("content-type", "text/plain; charset=utf-8"))
            .and(header("user-agent", USER_AGENT))
            .respond_with(ResponseTemplate::new(200).set_body_string("<ValCurs/>"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = build_client().unwrap();
        let url = format!("{}/daily_utf8.xml", mock_server.uri());
        let body = fetch_text(&client, &url).await.unwrap();
        assert_eq!(body, "<ValCurs/>");
    }

    #[tokio::test]
    async fn test_fetch_text_maps_status_to_transport_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let client = build_client().unwrap();
        let url = format!("{}/daily_utf8.xml", mock_server.uri());
        let err = fetch_text(&client, &url).await.unwrap_err();
        assert!(err.is_transient());
        assert!(err.to_string().contains("HTTP error: 503"));
    }

    #[tokio::test]
    async fn test_fetch_text_maps_network_failure_to_transport_error() {
        // Nothing listens on a port freed right after binding it.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/daily_json.js", listener.local_addr().unwrap());
        drop(listener);

        let client = build_client().unwrap();
        let err = fetch_text(&client, &url).await.unwrap_err();
        assert!(err.is_transient());
        assert!(err.to_string().contains("Request error"));
        assert!(err.to_string().contains(&url));
    }
}
