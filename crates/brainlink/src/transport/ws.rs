// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Establishes the WebSocket connection: builds the `Authorization`
//! request, honors the proxy environment via [`super::proxy`], and wraps
//! the whole attempt in a 60s connect timeout.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use http::HeaderValue;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use url::Url;

use super::proxy;
use crate::error::{Error, Result, TransportError};

/// The concrete stream type returned whether or not a proxy was used —
/// `client_async_tls` (the proxied path) and `connect_async` (the direct
/// path) both produce this.
pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(60);

/// Connect to `url`, sending `Authorization: <access_key>` on the upgrade
/// request. Honors `http_proxy`/`https_proxy`/`all_proxy`.
pub async fn connect(url: &Url, access_key: &str) -> Result<WsStream> {
    tokio::time::timeout(CONNECT_TIMEOUT, connect_inner(url, access_key))
        .await
        .map_err(|_| Error::Transport(TransportError::ConnectTimeout { url: url.to_string() }))?
}

async fn connect_inner(url: &Url, access_key: &str) -> Result<WsStream> {
    let request = build_request(url, access_key)?;

    match proxy::resolve(url) {
        Some(proxy_url) => {
            let stream = proxy::tunnel(&proxy_url, url).await?;
            let (ws, _response) = tokio_tungstenite::client_async_tls(request, stream)
                .await
                .map_err(|e| Error::Transport(TransportError::Handshake { url: url.to_string(), source: Box::new(e) }))?;
            Ok(ws)
        }
        None => {
            let (ws, _response) = tokio_tungstenite::connect_async(request)
                .await
                .map_err(|e| Error::Transport(TransportError::Handshake { url: url.to_string(), source: Box::new(e) }))?;
            Ok(ws)
        }
    }
}

/// Send one binary frame.
pub async fn send(stream: &mut WsStream, bytes: Vec<u8>) -> Result<()> {
    stream
        .send(Message::Binary(bytes.into()))
        .await
        .map_err(|e| Error::Transport(TransportError::Websocket(Box::new(e))))
}

/// Receive the next binary frame, skipping ping/pong/text frames (the
/// protocol is binary-only per spec.md §6). Returns `Ok(None)` on a normal
/// close (code 1000 or no code) or stream end; any other close code
/// surfaces as [`TransportError::AbnormalClose`], per spec.md §7.
pub async fn recv(stream: &mut WsStream) -> Result<Option<Vec<u8>>> {
    loop {
        match stream.next().await {
            Some(Ok(Message::Binary(bytes))) => return Ok(Some(bytes.to_vec())),
            Some(Ok(Message::Close(frame))) => return close_outcome(frame),
            Some(Ok(_)) => continue,
            Some(Err(e)) => return Err(Error::Transport(TransportError::Websocket(Box::new(e)))),
            None => return Ok(None),
        }
    }
}

fn close_outcome(frame: Option<CloseFrame>) -> Result<Option<Vec<u8>>> {
    let code = frame.as_ref().map(|f| u16::from(f.code));
    match code {
        None | Some(1000) => Ok(None),
        Some(other) => Err(Error::Transport(TransportError::AbnormalClose {
            code: Some(other),
            reason: frame.map(|f| f.reason.to_string()).unwrap_or_default(),
        })),
    }
}

fn build_request(
    url: &Url,
    access_key: &str,
) -> Result<tokio_tungstenite::tungstenite::handshake::client::Request> {
    let mut request = url
        .as_str()
        .into_client_request()
        .map_err(|e| Error::Transport(TransportError::Handshake { url: url.to_string(), source: Box::new(e) }))?;
    let value = HeaderValue::from_str(access_key)
        .map_err(|_| Error::Config("access key contains characters invalid in an HTTP header".to_string()))?;
    request.headers_mut().insert(http::header::AUTHORIZATION, value);
    Ok(request)
}

#[cfg(test)]
#[path = "ws_tests.rs"]
mod tests;
