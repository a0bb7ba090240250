//! Broker endpoint derivation.

use thiserror::Error;
use url::Url;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EndpointError {
    #[error("invalid backend URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("unsupported URL scheme: {0} (expected http, https, ws or wss)")]
    UnsupportedScheme(String),
}

/// Derive the WebSocket URL of the STOMP endpoint from the backend base URL.
///
/// `http` maps to `ws` and `https` to `wss`. The endpoint is `<base>/ws`;
/// with `sockjs` set it is the raw WebSocket entry `<base>/ws/websocket` that
/// SockJS endpoints expose next to their polling transports.
pub fn websocket_endpoint(backend_url: &str, sockjs: bool) -> Result<Url, EndpointError> {
    let mut url = Url::parse(backend_url)?;

    let scheme = match url.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => return Err(EndpointError::UnsupportedScheme(other.to_string())),
    };
    url.set_scheme(scheme)
        .map_err(|_| EndpointError::UnsupportedScheme(url.scheme().to_string()))?;

    let base = url.path().trim_end_matches('/').to_string();
    let path = if sockjs {
        format!("{base}/ws/websocket")
    } else {
        format!("{base}/ws")
    };
    url.set_path(&path);
    url.set_query(None);
    url.set_fragment(None);

    Ok(url)
}
