//! Client identity resolution for rate limiting.
//!
//! # Responsibilities
//! - Walk the configured lookup order (socket address, then proxy headers)
//! - Return the first non-empty value as the rate-limit key
//!
//! # Design Decisions
//! - `X-Forwarded-For` contributes its first (client-most) entry only
//! - Values are trimmed; empty values count as absent
//! - The socket address is read from the request extensions so routers
//!   served without connect info still resolve through the headers

use axum::extract::ConnectInfo;
use axum::http::Request;
use std::net::SocketAddr;

use crate::config::IpLookup;

/// Header carrying the proxy chain, client first.
pub const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Header set by some reverse proxies to the original client address.
pub const X_REAL_IP: &str = "x-real-ip";

/// Key used when no lookup produced a value.
pub const UNKNOWN_CLIENT: &str = "unknown";

impl IpLookup {
    /// Value this lookup yields for the request, if any.
    pub fn resolve<B>(&self, req: &Request<B>) -> Option<String> {
        match self {
            IpLookup::RemoteAddr => req
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip().to_string()),
            IpLookup::XForwardedFor => header_value(req, X_FORWARDED_FOR)
                .and_then(|v| v.split(',').next().map(str::trim).map(str::to_string))
                .filter(|v| !v.is_empty()),
            IpLookup::XRealIp => header_value(req, X_REAL_IP),
        }
    }
}

fn header_value<B>(req: &Request<B>, name: &str) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Resolve the client identity key for a request.
pub fn client_key<B>(req: &Request<B>, lookups: &[IpLookup]) -> String {
    lookups
        .iter()
        .find_map(|lookup| lookup.resolve(req))
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}
