//! Issuing service client
//!
//! Mints short links (`/generate`) and reads the user's remaining token
//! balance (`/remainingamount`). Resolutions are memoized in a `LinkCache`.

use anyhow::{anyhow, Context, Result};
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::client::link_cache::{LinkCache, LinkCacheKey};
use crate::helpers::time::{get_instant, share_event_id};
use crate::observability::metrics::get_metrics;
use crate::utils::constants::{GENERATE_PATH, REMAINING_AMOUNT_PATH, TOKEN_BALANCE_FALLBACK};

static TRANSPORT_MSG: &str = "transport";
static STATUS_MSG: &str = "status";
static PARSE_MSG: &str = "parse";

/// Opaque discriminator telling the issuing service why a link is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ShareContext {
    Unspecified = 0,
    /// share code claimed for the page's own address
    PageLoad = 1,
    /// plain link shown in the copy box
    UrlBox = 2,
    /// link embedded in a social channel template
    Social = 3,
}

impl ShareContext {
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

/// The issuing service's answer for one (service, amount, context) tuple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedShareLink {
    pub short_url: String,
    pub share_code: String,
    pub success: bool,
}

impl ResolvedShareLink {
    pub fn unsuccessful() -> Self {
        Self { short_url: String::new(), share_code: String::new(), success: false }
    }
}

#[derive(Debug, Deserialize)]
struct IssuerResponse<T> {
    success: bool,
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeneratedLink {
    short_url: String,
    share_code: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemainingAmount {
    tokens_available: u64,
}

#[derive(Debug, Clone)]
pub struct ShortLinkClient {
    http: Client,
    cache: LinkCache,
    /// page address without query, used when a caller gives no target
    default_target: String,
}

impl ShortLinkClient {
    /// Client with a cookie store (ambient credentials) and the process-wide cache.
    pub fn new(default_target: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .cookie_store(true)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self::with_cache(http, LinkCache::global(), default_target))
    }

    pub fn with_cache(http: Client, cache: LinkCache, default_target: impl Into<String>) -> Self {
        Self { http, cache, default_target: default_target.into() }
    }

    pub fn cache(&self) -> &LinkCache {
        &self.cache
    }

    pub fn default_target(&self) -> &str {
        &self.default_target
    }

    /// Resolve a short link, memoized by (service_url, amount, context).
    ///
    /// `amount` 0 is sent as 1. Transport and parse failures are returned as
    /// errors and are not cached; a well-formed `success: false` answer is.
    pub async fn resolve(
        &self,
        service_url: &str,
        amount: u32,
        context: ShareContext,
        target: Option<&str>,
    ) -> Result<ResolvedShareLink> {
        let amount = amount.max(1);
        let key = LinkCacheKey::new(service_url, amount, context);
        let slot = self.cache.slot(&key).await;

        if let Some(link) = slot.get() {
            debug!("short link cache hit: amount {}, context {}", amount, context.code());
            get_metrics().short_link_cache_hits.inc();
            return Ok(link.clone());
        }

        let target = target.unwrap_or(&self.default_target);
        slot.get_or_try_init(|| self.generate(service_url, amount, context, target))
            .await
            .cloned()
    }

    /// Remaining issuances for the current user. Falls back to 10 when the
    /// service answers `success: false`; errors only on transport or parse failure.
    pub async fn remaining_tokens(&self, service_url: &str) -> Result<u64> {
        let request = self.http.get(endpoint(service_url, REMAINING_AMOUNT_PATH));
        let body = self.send(REMAINING_AMOUNT_PATH, request).await?;
        let response: IssuerResponse<RemainingAmount> = parse_body(REMAINING_AMOUNT_PATH, &body)?;

        if !response.success {
            warn!("remaining amount unsuccessful, using fallback {}", TOKEN_BALANCE_FALLBACK);
            return Ok(TOKEN_BALANCE_FALLBACK);
        }
        response
            .data
            .map(|data| data.tokens_available)
            .ok_or_else(|| anyhow!("malformed response: successful remaining amount without data"))
    }

    async fn generate(
        &self,
        service_url: &str,
        amount: u32,
        context: ShareContext,
        target: &str,
    ) -> Result<ResolvedShareLink> {
        info!("generating short link: amount {}, context {}, target '{}'", amount, context.code(), target);
        let request = self.http.get(endpoint(service_url, GENERATE_PATH)).query(&[
            ("target", target.to_owned()),
            ("shareEventId", share_event_id().to_string()),
            ("maxShares", amount.to_string()),
            ("context", context.code().to_string()),
        ]);
        let body = self.send(GENERATE_PATH, request).await?;
        let response: IssuerResponse<GeneratedLink> = parse_body(GENERATE_PATH, &body)?;

        match (response.success, response.data) {
            (true, Some(data)) => Ok(ResolvedShareLink {
                short_url: data.short_url,
                share_code: data.share_code,
                success: true,
            }),
            (true, None) => Err(anyhow!("malformed response: successful generate without data")),
            (false, _) => {
                warn!("generate unsuccessful: amount {}, context {}", amount, context.code());
                Ok(ResolvedShareLink::unsuccessful())
            }
        }
    }

    async fn send(&self, endpoint_label: &str, request: RequestBuilder) -> Result<String> {
        let metrics = get_metrics();
        let start = get_instant();
        metrics.issuer_requests.with_label_values(&[endpoint_label]).inc();

        let result = async {
            let response = request.send().await.map_err(|e| {
                metrics.issuer_failures.with_label_values(&[endpoint_label, TRANSPORT_MSG]).inc();
                anyhow!(e).context(format!("{} request failed", endpoint_label))
            })?;
            if !response.status().is_success() {
                metrics.issuer_failures.with_label_values(&[endpoint_label, STATUS_MSG]).inc();
                return Err(anyhow!("{} request failed: {}", endpoint_label, response.status()));
            }
            response.text().await.map_err(|e| {
                metrics.issuer_failures.with_label_values(&[endpoint_label, TRANSPORT_MSG]).inc();
                anyhow!(e).context(format!("{} body read failed", endpoint_label))
            })
        }
        .await;

        metrics
            .issuer_request_duration
            .with_label_values(&[endpoint_label])
            .observe(start.elapsed().as_secs_f64());
        result
    }
}

fn endpoint(service_url: &str, path: &str) -> String {
    format!("{}{}", service_url.trim_end_matches('/'), path)
}

fn parse_body<T: for<'de> Deserialize<'de>>(endpoint_label: &str, body: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|e| {
        get_metrics().issuer_failures.with_label_values(&[endpoint_label, PARSE_MSG]).inc();
        anyhow!(e).context(format!("malformed response from {}", endpoint_label))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::Method::GET;
    use httpmock::MockServer;
    use serde_json::json;

    fn client(cache: LinkCache) -> ShortLinkClient {
        ShortLinkClient::with_cache(Client::new(), cache, "https://site.test/a")
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn resolve_is_memoized_per_service_amount_and_context() {
        let server = MockServer::start_async().await;
        let generate = server.mock(|when, then| {
            when.method(GET)
                .path("/generate")
                .query_param("target", "https://site.test/a")
                .query_param("maxShares", "1")
                .query_param("context", "2")
                .query_param_exists("shareEventId");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(json!({"success": true, "data": {"shortUrl": "https://svc.test/s/abc", "shareCode": "XYZ"}}));
        });

        let client = client(LinkCache::new());
        let first = client.resolve(&server.base_url(), 1, ShareContext::UrlBox, None).await.unwrap();
        let second = client.resolve(&server.base_url(), 1, ShareContext::UrlBox, None).await.unwrap();

        assert_eq!(first.short_url, "https://svc.test/s/abc");
        assert_eq!(first.share_code, "XYZ");
        assert!(first.success);
        assert_eq!(first, second);
        generate.assert_hits(1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_identical_resolutions_share_one_request() {
        let server = MockServer::start_async().await;
        let generate = server.mock(|when, then| {
            when.method(GET).path("/generate");
            then.status(200)
                .delay(std::time::Duration::from_millis(100))
                .json_body(json!({"success": true, "data": {"shortUrl": "https://svc.test/s/c", "shareCode": "C"}}));
        });

        let client = client(LinkCache::new());
        let base = server.base_url();
        let (a, b) = tokio::join!(
            client.resolve(&base, 4, ShareContext::Social, None),
            client.resolve(&base, 4, ShareContext::Social, None),
        );

        assert_eq!(a.unwrap(), b.unwrap());
        generate.assert_hits(1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn target_is_not_part_of_the_cache_key() {
        let server = MockServer::start_async().await;
        let generate = server.mock(|when, then| {
            when.method(GET).path("/generate");
            then.status(200)
                .json_body(json!({"success": true, "data": {"shortUrl": "https://svc.test/s/t", "shareCode": "T"}}));
        });

        let client = client(LinkCache::new());
        let base = server.base_url();
        client.resolve(&base, 1, ShareContext::UrlBox, Some("https://site.test/one")).await.unwrap();
        client.resolve(&base, 1, ShareContext::UrlBox, Some("https://site.test/two")).await.unwrap();

        generate.assert_hits(1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn zero_amount_is_sent_as_one() {
        let server = MockServer::start_async().await;
        let generate = server.mock(|when, then| {
            when.method(GET).path("/generate").query_param("maxShares", "1").query_param("context", "0");
            then.status(200).json_body(json!({"success": false}));
        });

        let link = client(LinkCache::new())
            .resolve(&server.base_url(), 0, ShareContext::Unspecified, None)
            .await
            .unwrap();

        assert!(!link.success);
        generate.assert_hits(1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn malformed_body_and_bad_status_are_errors_and_not_cached() {
        let server = MockServer::start_async().await;
        let mut broken = server.mock(|when, then| {
            when.method(GET).path("/generate").query_param("maxShares", "2");
            then.status(200).body("<html>not json</html>");
        });
        let failing = server.mock(|when, then| {
            when.method(GET).path("/generate").query_param("maxShares", "3");
            then.status(503);
        });

        let cache = LinkCache::new();
        let client = client(cache.clone());
        let base = server.base_url();

        let err = client.resolve(&base, 2, ShareContext::UrlBox, None).await.unwrap_err();
        assert!(err.to_string().contains("malformed response"), "{}", err);
        let err = client.resolve(&base, 3, ShareContext::UrlBox, None).await.unwrap_err();
        assert!(err.to_string().contains("503"), "{}", err);
        assert!(cache.is_empty().await);

        broken.delete();
        server.mock(|when, then| {
            when.method(GET).path("/generate").query_param("maxShares", "2");
            then.status(200).json_body(json!({"success": true, "data": {"shortUrl": "https://svc.test/s/ok", "shareCode": "OK"}}));
        });
        let link = client.resolve(&base, 2, ShareContext::UrlBox, None).await.unwrap();
        assert_eq!(link.short_url, "https://svc.test/s/ok");
        failing.assert_hits(1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn remaining_tokens_reads_balance_or_falls_back() {
        let server = MockServer::start_async().await;
        let remaining = server.mock(|when, then| {
            when.method(GET).path("/remainingamount");
            then.status(200).json_body(json!({"success": true, "data": {"tokensAvailable": 7}}));
        });

        let client = client(LinkCache::new());
        assert_eq!(client.remaining_tokens(&server.base_url()).await.unwrap(), 7);
        assert_eq!(client.remaining_tokens(&server.base_url()).await.unwrap(), 7);
        // balances are never cached
        remaining.assert_hits(2);

        let unsuccessful = MockServer::start_async().await;
        unsuccessful.mock(|when, then| {
            when.method(GET).path("/remainingamount");
            then.status(200).json_body(json!({"success": false}));
        });
        assert_eq!(client.remaining_tokens(&unsuccessful.base_url()).await.unwrap(), 10);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn remaining_tokens_rejects_on_transport_failure() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/remainingamount");
            then.status(500);
        });

        let client = client(LinkCache::new());
        assert!(client.remaining_tokens(&server.base_url()).await.is_err());
    }
}
