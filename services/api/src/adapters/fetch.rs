//! services/api/src/adapters/fetch.rs
//!
//! Page fetch strategies for article extraction: a direct GET and the relay
//! services tried after it. Each implements the `PageFetcher` port; the core
//! `ArticleExtractor` walks them in order.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use postcraft_core::extract::{is_public_host, is_public_ip};
use postcraft_core::ports::{FetchError, PageFetcher};
use reqwest::{redirect::Policy, Client, Response};
use serde::Deserialize;
use tracing::warn;
use url::{Host, Url};

pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Pages larger than this are dropped mid-download.
pub const MAX_PAGE_BYTES: usize = 2 * 1024 * 1024;

const MAX_REDIRECTS: usize = 8;

/// Follows up to eight redirects, never onto `localhost` or a non-public
/// address literal.
fn redirect_policy() -> Policy {
    Policy::custom(|attempt| {
        if attempt.previous().len() >= MAX_REDIRECTS {
            attempt.error("too many redirects")
        } else if !is_public_host(attempt.url()) {
            let target = attempt.url().to_string();
            attempt.error(format!("redirect to non-public host {}", target))
        } else {
            attempt.follow()
        }
    })
}

/// The outbound client shared by every non-OpenAI adapter.
pub fn http_client() -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(BROWSER_USER_AGENT)
        .redirect(redirect_policy())
        .timeout(Duration::from_secs(20))
        .build()
}

fn transport(e: reqwest::Error) -> FetchError {
    FetchError::Transport(e.to_string())
}

async fn success_text(response: Response) -> Result<String, FetchError> {
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status(status.as_u16()));
    }
    read_capped(response, MAX_PAGE_BYTES).await
}

/// Reads the body chunk by chunk and gives up once it passes `limit` bytes.
async fn read_capped(mut response: Response, limit: usize) -> Result<String, FetchError> {
    if response.content_length().is_some_and(|len| len > limit as u64) {
        return Err(FetchError::TooLarge(limit));
    }
    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await.map_err(transport)? {
        if body.len() + chunk.len() > limit {
            return Err(FetchError::TooLarge(limit));
        }
        body.extend_from_slice(&chunk);
    }
    Ok(String::from_utf8_lossy(&body).into_owned())
}

/// Resolves the URL's host and fails if any address it maps to is not public.
async fn ensure_public_target(url: &Url) -> Result<(), FetchError> {
    let port = url.port_or_known_default().unwrap_or(80);
    let addrs: Vec<std::net::IpAddr> = match url.host() {
        Some(Host::Ipv4(ip)) => vec![ip.into()],
        Some(Host::Ipv6(ip)) => vec![ip.into()],
        Some(Host::Domain(name)) => tokio::net::lookup_host((name, port))
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?
            .map(|addr| addr.ip())
            .collect(),
        None => return Err(FetchError::Blocked(url.to_string())),
    };

    match addrs.into_iter().find(|ip| !is_public_ip(*ip)) {
        Some(ip) => {
            warn!(url = %url, %ip, "Refusing fetch to a non-public address");
            Err(FetchError::Blocked(ip.to_string()))
        }
        None => Ok(()),
    }
}

//=========================================================================================
// Direct
//=========================================================================================

pub struct DirectFetch {
    client: Client,
    allow_private_hosts: bool,
}

impl DirectFetch {
    /// Refuses hosts that resolve to loopback, private or link-local addresses.
    pub fn new(client: Client) -> Self {
        Self {
            client,
            allow_private_hosts: false,
        }
    }

    pub fn allow_private_hosts(mut self) -> Self {
        self.allow_private_hosts = true;
        self
    }
}

#[async_trait]
impl PageFetcher for DirectFetch {
    fn name(&self) -> &str {
        "direct"
    }

    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let target = Url::parse(url).map_err(|e| FetchError::Decode(e.to_string()))?;
        if !self.allow_private_hosts {
            ensure_public_target(&target).await?;
        }
        let response = self.client.get(target).send().await.map_err(transport)?;
        success_text(response).await
    }
}

//=========================================================================================
// Relays
//=========================================================================================

/// A relay answering `{"contents": "<html>"}` for `<prefix><encoded url>`.
pub struct JsonRelayFetch {
    client: Client,
    prefix: String,
}

#[derive(Deserialize)]
struct RelayBody {
    contents: Option<String>,
}

impl JsonRelayFetch {
    pub fn new(client: Client, prefix: String) -> Self {
        Self { client, prefix }
    }
}

#[async_trait]
impl PageFetcher for JsonRelayFetch {
    fn name(&self) -> &str {
        &self.prefix
    }

    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let encoded: String = url::form_urlencoded::byte_serialize(url.as_bytes()).collect();
        let response = self
            .client
            .get(format!("{}{}", self.prefix, encoded))
            .send()
            .await
            .map_err(transport)?;
        let body = success_text(response).await?;
        let relay: RelayBody =
            serde_json::from_str(&body).map_err(|e| FetchError::Decode(e.to_string()))?;
        relay
            .contents
            .filter(|html| !html.trim().is_empty())
            .ok_or_else(|| FetchError::Decode("relay returned no contents".to_string()))
    }
}

/// A relay serving the page itself at `<prefix><url>`.
pub struct PrefixRelayFetch {
    client: Client,
    prefix: String,
    /// Some relays refuse requests without `X-Requested-With`.
    requested_with: bool,
}

impl PrefixRelayFetch {
    pub fn new(client: Client, prefix: String, requested_with: bool) -> Self {
        Self {
            client,
            prefix,
            requested_with,
        }
    }
}

#[async_trait]
impl PageFetcher for PrefixRelayFetch {
    fn name(&self) -> &str {
        &self.prefix
    }

    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let mut request = self.client.get(format!("{}{}", self.prefix, url));
        if self.requested_with {
            request = request.header("X-Requested-With", "XMLHttpRequest");
        }
        let response = request.send().await.map_err(transport)?;
        success_text(response).await
    }
}

/// Builds the ordered strategy list: direct first, then one strategy per
/// configured relay prefix.
pub fn fetch_strategies(client: &Client, proxies: &[String]) -> Vec<Arc<dyn PageFetcher>> {
    let mut strategies: Vec<Arc<dyn PageFetcher>> = vec![Arc::new(DirectFetch::new(client.clone()))];
    for prefix in proxies {
        let strategy: Arc<dyn PageFetcher> = if prefix.contains("allorigins") {
            Arc::new(JsonRelayFetch::new(client.clone(), prefix.clone()))
        } else {
            let requested_with = prefix.contains("cors-anywhere");
            Arc::new(PrefixRelayFetch::new(client.clone(), prefix.clone(), requested_with))
        };
        strategies.push(strategy);
    }
    strategies
}

#[cfg(test)]
mod tests {
    use super::*;
    use postcraft_core::ArticleExtractor;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn direct_fetch_reports_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/blocked"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let fetch = DirectFetch::new(Client::new()).allow_private_hosts();
        let err = fetch
            .fetch(&format!("{}/blocked", server.uri()))
            .await
            .unwrap_err();
        assert_eq!(err, FetchError::Status(403));
    }

    #[tokio::test]
    async fn json_relay_unwraps_contents() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/get"))
            .and(query_param("url", "https://blog.dev/post"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"contents": "<title>Relayed</title>"}"#),
            )
            .mount(&server)
            .await;

        let relay = JsonRelayFetch::new(Client::new(), format!("{}/get?url=", server.uri()));
        assert_eq!(
            relay.fetch("https://blog.dev/post").await.unwrap(),
            "<title>Relayed</title>"
        );
    }

    #[tokio::test]
    async fn prefix_relay_sends_requested_with() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header("X-Requested-With", "XMLHttpRequest"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<main>ok</main>"))
            .expect(1)
            .mount(&server)
            .await;

        let relay = PrefixRelayFetch::new(Client::new(), format!("{}/", server.uri()), true);
        assert_eq!(
            relay.fetch("https://blog.dev/post").await.unwrap(),
            "<main>ok</main>"
        );
    }

    #[tokio::test]
    async fn extractor_falls_through_to_working_relay() {
        let origin = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&origin)
            .await;

        let relay = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<title>Via relay</title><article>Body</article>"),
            )
            .mount(&relay)
            .await;

        let strategies = fetch_strategies(&Client::new(), &[format!("{}/fetch/", relay.uri())]);
        assert_eq!(strategies.len(), 2);
        let article = ArticleExtractor::new(strategies)
            .allow_private_hosts()
            .extract(&format!("{}/post", origin.uri()))
            .await
            .unwrap();
        assert_eq!(article.title, "Via relay");
        assert_eq!(article.content, "Body");
    }

    #[tokio::test]
    async fn direct_fetch_refuses_loopback_targets() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("secret"))
            .expect(0)
            .mount(&server)
            .await;

        let err = DirectFetch::new(Client::new())
            .fetch(&format!("{}/admin", server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Blocked(_)));

        let err = DirectFetch::new(Client::new())
            .fetch("http://localhost:1/admin")
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Blocked(_)));
    }

    #[tokio::test]
    async fn redirects_onto_internal_hosts_are_not_followed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/hop"))
            .respond_with(
                ResponseTemplate::new(302)
                    .insert_header("Location", "http://169.254.169.254/latest/meta-data/"),
            )
            .mount(&server)
            .await;

        let err = DirectFetch::new(http_client().unwrap())
            .allow_private_hosts()
            .fetch(&format!("{}/hop", server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Transport(_)));
    }

    #[tokio::test]
    async fn oversized_pages_are_dropped() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/huge"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![b'a'; MAX_PAGE_BYTES + 1]))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/fits"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<main>small</main>"))
            .mount(&server)
            .await;

        let fetch = DirectFetch::new(Client::new()).allow_private_hosts();
        let err = fetch
            .fetch(&format!("{}/huge", server.uri()))
            .await
            .unwrap_err();
        assert_eq!(err, FetchError::TooLarge(MAX_PAGE_BYTES));
        assert_eq!(
            fetch.fetch(&format!("{}/fits", server.uri())).await.unwrap(),
            "<main>small</main>"
        );
    }

    #[tokio::test]
    async fn capped_reader_stops_at_the_limit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("x".repeat(64)))
            .mount(&server)
            .await;

        let response = Client::new().get(server.uri()).send().await.unwrap();
        assert_eq!(read_capped(response, 16).await, Err(FetchError::TooLarge(16)));

        let response = Client::new().get(server.uri()).send().await.unwrap();
        assert_eq!(read_capped(response, 64).await.unwrap().len(), 64);
    }
}
