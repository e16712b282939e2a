//! Egress proxy rotation.
//!
//! # Responsibilities
//! - Build one HTTP transport per configured proxy
//! - Hand out transports round-robin, one per outbound call
//! - Degrade to a direct connection when a proxy transport cannot be built

use std::time::Duration;

use crate::blockchain::error::{RpcError, RpcResult};
use crate::load_balancer::round_robin::RoundRobin;
use crate::observability::logging::mask_proxy_url;

/// An HTTP client bound to one egress route.
#[derive(Debug, Clone)]
pub struct Transport {
    /// Masked proxy URL, or `direct`.
    pub label: String,
    pub client: reqwest::Client,
}

/// Timeouts applied to every transport.
#[derive(Debug, Clone, Copy)]
pub struct TransportTimeouts {
    pub request: Duration,
    pub connect: Duration,
}

impl Default for TransportTimeouts {
    fn default() -> Self {
        Self {
            request: Duration::from_secs(30),
            connect: Duration::from_secs(10),
        }
    }
}

/// Round-robin selection of an egress transport per outbound call.
///
/// One rotator is shared by every endpoint client, so successive calls to
/// the same endpoint may leave through different proxies.
#[derive(Debug)]
pub struct ProxyRotator {
    transports: Vec<Transport>,
    cursor: RoundRobin,
}

impl ProxyRotator {
    /// Build transports for `proxies`. An empty list yields a single direct transport.
    pub fn new(proxies: &[String], timeouts: TransportTimeouts) -> RpcResult<Self> {
        let mut transports = Vec::with_capacity(proxies.len().max(1));

        for proxy_url in proxies {
            let label = mask_proxy_url(proxy_url);
            let built = reqwest::Proxy::all(proxy_url.as_str())
                .and_then(|proxy| base_builder(timeouts).proxy(proxy).build());
            match built {
                Ok(client) => {
                    tracing::info!(proxy = %label, "Configured egress proxy");
                    transports.push(Transport { label, client });
                }
                Err(e) => {
                    tracing::warn!(
                        proxy = %label,
                        error = %e,
                        "Failed to build proxy transport, falling back to direct connection"
                    );
                    transports.push(direct_transport(timeouts)?);
                }
            }
        }

        if transports.is_empty() {
            transports.push(direct_transport(timeouts)?);
        }

        Ok(Self {
            transports,
            cursor: RoundRobin::new(),
        })
    }

    /// Transport for the next outbound call.
    pub fn next(&self) -> &Transport {
        // `transports` is never empty after construction.
        let index = self.cursor.next_index(self.transports.len()).unwrap_or(0);
        &self.transports[index]
    }

    pub fn len(&self) -> usize {
        self.transports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transports.is_empty()
    }
}

fn base_builder(timeouts: TransportTimeouts) -> reqwest::ClientBuilder {
    reqwest::Client::builder()
        .connect_timeout(timeouts.connect)
        .timeout(timeouts.request)
        .no_proxy()
}

fn direct_transport(timeouts: TransportTimeouts) -> RpcResult<Transport> {
    let client = base_builder(timeouts)
        .build()
        .map_err(|e| RpcError::Config(format!("failed to build HTTP client: {e}")))?;
    Ok(Transport {
        label: "direct".to_string(),
        client,
    })
}
