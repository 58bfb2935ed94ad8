//! Probe logic.
//!
//! Sends a single HTTP GET to a target and classifies what came back.
//! Any response at all, whatever its status, counts as reachable.

use std::future::Future;
use std::time::{Duration, Instant};

use bytes::Bytes;
use http::header::USER_AGENT;
use http::{Method, Request, Uri};
use http_body_util::Empty;
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use tracing::debug;

use linkwatch_core::Target;
use linkwatch_state::{Outcome, epoch_millis};

use crate::error::{ProbeError, ProbeResult};

const USER_AGENT_VALUE: &str = concat!("linkwatch/", env!("CARGO_PKG_VERSION"));

/// Executes one health check against one target.
///
/// Implementations must not retry and must not surface transport failures
/// as errors: a refused connection or a timeout is an unreachable
/// [`Outcome`]. `Err` is reserved for targets that cannot be requested.
pub trait Prober: Send + Sync + 'static {
    fn probe(&self, target: &Target) -> impl Future<Output = ProbeResult<Outcome>> + Send;
}

/// HTTP/1.1 prober on a shared hyper connection pool.
///
/// `https://` targets go through rustls with the webpki root set; a failed
/// handshake is an unreachable outcome like any other transport failure.
#[derive(Clone)]
pub struct HttpProber {
    client: Client<HttpsConnector<HttpConnector>, Empty<Bytes>>,
    timeout: Duration,
}

impl HttpProber {
    /// Create a prober whose every request is bounded by `timeout`.
    pub fn new(timeout: Duration) -> ProbeResult<Self> {
        let mut http = HttpConnector::new();
        http.set_connect_timeout(Some(timeout));
        http.enforce_http(false);

        let connector = HttpsConnectorBuilder::new()
            .with_provider_and_webpki_roots(rustls::crypto::ring::default_provider())?
            .https_or_http()
            .enable_http1()
            .wrap_connector(http);
        let client = Client::builder(TokioExecutor::new()).build(connector);
        Ok(Self { client, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Prober for HttpProber {
    async fn probe(&self, target: &Target) -> ProbeResult<Outcome> {
        let uri = parse_address(&target.address)?;

        let req = Request::builder()
            .method(Method::GET)
            .uri(uri)
            .header(USER_AGENT, USER_AGENT_VALUE)
            .body(Empty::<Bytes>::new())
            .map_err(|e| ProbeError::InvalidAddress {
                address: target.address.clone(),
                reason: e.to_string(),
            })?;

        let start = Instant::now();
        let result = tokio::time::timeout(self.timeout, self.client.request(req)).await;
        let latency = start.elapsed();
        let checked_at = epoch_millis();

        let outcome = match result {
            Ok(Ok(resp)) => Outcome::reachable(resp.status().as_u16(), latency, checked_at),
            Ok(Err(e)) => {
                debug!(target_id = target.id, error = %e, address = %target.address, "probe request failed");
                Outcome::unreachable(latency, checked_at)
            }
            Err(_) => {
                debug!(target_id = target.id, address = %target.address, timeout = ?self.timeout, "probe timed out");
                Outcome::unreachable(latency, checked_at)
            }
        };
        Ok(outcome)
    }
}

fn parse_address(address: &str) -> ProbeResult<Uri> {
    let uri: Uri = address.parse().map_err(|e: http::uri::InvalidUri| ProbeError::InvalidAddress {
        address: address.to_string(),
        reason: e.to_string(),
    })?;
    match uri.scheme_str() {
        Some("http" | "https") => {}
        Some(_) => return Err(ProbeError::UnsupportedScheme(address.to_string())),
        None => {
            return Err(ProbeError::InvalidAddress {
                address: address.to_string(),
                reason: "missing scheme".to_string(),
            });
        }
    }
    if uri.host().is_none() {
        return Err(ProbeError::InvalidAddress {
            address: address.to_string(),
            reason: "missing host".to_string(),
        });
    }
    Ok(uri)
}
