//! Client address extraction for ledger entries

use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};

use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::{request::Parts, HeaderMap},
};

/// Best-effort client IP: `X-Forwarded-For` first hop, then `X-Real-IP`,
/// then the peer socket address. `None` when nothing usable is present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIp(pub Option<IpAddr>);

impl ClientIp {
    pub fn into_string(self) -> Option<String> {
        self.0.map(|ip| ip.to_string())
    }
}

impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip());

        Ok(ClientIp(client_ip_from_headers(&parts.headers).or(peer)))
    }
}

fn client_ip_from_headers(headers: &HeaderMap) -> Option<IpAddr> {
    if let Some(forwarded) = headers.get("X-Forwarded-For").and_then(|h| h.to_str().ok()) {
        if let Some(Ok(ip)) = forwarded.split(',').next().map(|first| first.trim().parse()) {
            return Some(ip);
        }
    }

    headers
        .get("X-Real-IP")
        .and_then(|h| h.to_str().ok())
        .and_then(|ip| ip.trim().parse().ok())
}
