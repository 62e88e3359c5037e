//! Respondent metadata extractor.
//!
//! The IP comes from `X-Forwarded-For` (first entry), then `X-Real-IP`,
//! then the socket address when the server was started with connect info.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::HeaderMap;
use axum::http::request::Parts;

use formcraft_types::response::ClientInfo;

/// Client metadata recorded with a submission.
#[derive(Debug, Clone)]
pub struct Client(pub ClientInfo);

impl<S: Send + Sync> FromRequestParts<S> for Client {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let socket = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string());

        Ok(Client(ClientInfo {
            ip_address: client_ip(&parts.headers).or(socket),
            user_agent: header_str(&parts.headers, "user-agent").map(str::to_string),
        }))
    }
}

fn client_ip(headers: &HeaderMap) -> Option<String> {
    if let Some(forwarded) = header_str(headers, "x-forwarded-for") {
        let first = forwarded.split(',').next().map(str::trim).unwrap_or_default();
        if !first.is_empty() {
            return Some(first.to_string());
        }
    }
    header_str(headers, "x-real-ip").map(|ip| ip.trim().to_string())
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.trim().is_empty())
}
