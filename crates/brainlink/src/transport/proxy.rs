// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Proxy resolution from the standard `http_proxy`/`https_proxy`/`all_proxy`
//! environment convention, and a hand-rolled HTTP CONNECT tunnel — the
//! teacher's stack has no dedicated proxy-tunnel crate, so this opens a
//! plain TCP stream and upgrades it itself before handing it to
//! `tokio_tungstenite::client_async_tls`.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use url::Url;

use crate::error::{Error, Result, TransportError};

/// Resolve the proxy to use for `target`, honoring the scheme-appropriate
/// variable first and falling back to `all_proxy`. Checks both the
/// lowercase and uppercase spellings, matching common shell convention.
pub fn resolve(target: &Url) -> Option<String> {
    resolve_from(target, |key| std::env::var(key).ok())
}

/// Testable core of [`resolve`]: takes an injectable environment lookup so
/// tests don't need to mutate real process environment variables.
fn resolve_from(target: &Url, lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
    let (primary, primary_upper) = match target.scheme() {
        "wss" => ("https_proxy", "HTTPS_PROXY"),
        _ => ("http_proxy", "HTTP_PROXY"),
    };
    [primary, primary_upper, "all_proxy", "ALL_PROXY"]
        .into_iter()
        .find_map(lookup)
        .filter(|v| !v.is_empty())
}

/// Opens a TCP connection to `proxy_url` and issues an HTTP/1.1 `CONNECT`
/// for `target`'s host:port, returning the tunneled stream once the proxy
/// replies `200`.
pub async fn tunnel(proxy_url: &str, target: &Url) -> Result<TcpStream> {
    let proxy = Url::parse(proxy_url)
        .map_err(|e| Error::Transport(TransportError::ProxyTunnel { proxy: proxy_url.to_string(), detail: e.to_string() }))?;
    let proxy_host = proxy
        .host_str()
        .ok_or_else(|| Error::Transport(TransportError::ProxyTunnel { proxy: proxy_url.to_string(), detail: "missing host".to_string() }))?;
    let proxy_port = proxy.port_or_known_default().unwrap_or(1080);

    let mut stream = TcpStream::connect((proxy_host, proxy_port))
        .await
        .map_err(|source| Error::Transport(TransportError::Connect { url: proxy_url.to_string(), source }))?;

    let target_host = target
        .host_str()
        .ok_or_else(|| Error::Transport(TransportError::ProxyTunnel { proxy: proxy_url.to_string(), detail: "target missing host".to_string() }))?;
    let default_port = if target.scheme() == "wss" { 443 } else { 80 };
    let target_port = target.port_or_known_default().unwrap_or(default_port);

    let request = format!("CONNECT {target_host}:{target_port} HTTP/1.1\r\nHost: {target_host}:{target_port}\r\n\r\n");
    stream
        .write_all(request.as_bytes())
        .await
        .map_err(|source| Error::Transport(TransportError::Connect { url: proxy_url.to_string(), source }))?;

    let status_line = read_status_line(&mut stream, proxy_url).await?;
    if !status_line.contains(" 200 ") && !status_line.ends_with(" 200") {
        return Err(Error::Transport(TransportError::ProxyTunnel {
            proxy: proxy_url.to_string(),
            detail: format!("unexpected CONNECT response: {status_line}"),
        }));
    }
    Ok(stream)
}

async fn read_status_line(stream: &mut TcpStream, proxy_url: &str) -> Result<String> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 512];
    loop {
        let n = stream
            .read(&mut chunk)
            .await
            .map_err(|source| Error::Transport(TransportError::Connect { url: proxy_url.to_string(), source }))?;
        if n == 0 {
            return Err(Error::Transport(TransportError::ProxyTunnel {
                proxy: proxy_url.to_string(),
                detail: "connection closed during CONNECT handshake".to_string(),
            }));
        }
        buf.extend_from_slice(&chunk[..n]);
        if buf.windows(4).any(|w| w == b"\r\n\r\n") {
            break;
        }
    }
    let header = String::from_utf8_lossy(&buf);
    Ok(header.lines().next().unwrap_or_default().trim().to_string())
}

#[cfg(test)]
#[path = "proxy_tests.rs"]
mod tests;
