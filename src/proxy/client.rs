//! Outbound HTTP client construction
//!
//! The client is built once at startup from the network policy in
//! [`ProxyConfig`]. Any error here is fatal to the process.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use reqwest::{Certificate, Client, Proxy};
use tracing::warn;

use crate::config::{expand_home, ProxyConfig};

/// Request-level timeout covering the whole upstream exchange
pub const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(300);

/// Log target for TLS policy warnings; enabled even in quiet mode
pub const TLS_LOG_TARGET: &str = "claude_proxy::tls";

/// Build the upstream client honoring proxy, trust-anchor and verification policy
pub fn build_http_client(config: &ProxyConfig) -> Result<Client> {
    let mut builder = Client::builder()
        .pool_max_idle_per_host(16)
        .timeout(UPSTREAM_TIMEOUT);

    if let Some(proxy_url) = config.proxy.as_deref() {
        let proxy = Proxy::all(proxy_url)
            .with_context(|| format!("Invalid proxy URL: {}", proxy_url))?;
        builder = builder.proxy(proxy);
    }

    if let Some(ca_path) = config.ca_cert.as_deref() {
        let path = expand_home(&ca_path.to_string_lossy());
        let pem = std::fs::read(&path)
            .with_context(|| format!("Failed to read CA cert {}", path.display()))?;
        let certs = Certificate::from_pem_bundle(&pem)
            .with_context(|| format!("Failed to parse CA cert {}", path.display()))?;
        if certs.is_empty() {
            bail!("No certificates found in {}", path.display());
        }

        // The bundle replaces the built-in roots, it does not extend them.
        builder = builder.tls_built_in_root_certs(false);
        for cert in certs {
            builder = builder.add_root_certificate(cert);
        }
    }

    if config.insecure_skip_verify {
        warn!(
            target: TLS_LOG_TARGET,
            upstream = %config.target,
            "TLS certificate verification is DISABLED for upstream connections"
        );
        builder = builder.danger_accept_invalid_certs(true);
    }

    builder.build().context("Failed to create HTTP client")
}
