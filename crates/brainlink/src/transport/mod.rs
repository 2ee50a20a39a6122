// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Transport-agnostic event loop: connects, then pumps
//! `recv -> decode -> driver.next -> encode -> send` until the driver
//! reaches `FINISHED`, the socket closes, or a fatal error surfaces —
//! spec.md §4.6. Every tick, whether or not it carried a real frame in
//! either direction, is handed to the [`crate::recorder`] as a SEND/RECV
//! pair.

pub mod proxy;
pub mod ws;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

use crate::driver::{Driver, DriverState};
use crate::error::Result;
use crate::recorder::RecorderHandle;
use crate::wire::codec::{decode_server_to_simulator, encode_simulator_to_server};

/// Runs one session to completion: connect, then pump frames through
/// `driver` until it finishes or the connection ends.
///
/// `recorder` is `None` when `--recording-file` wasn't set — every
/// `record_*` call below is then just a dropped `Option`.
pub async fn run(
    mut driver: Driver,
    url: &Url,
    access_key: &str,
    recorder: Option<RecorderHandle>,
    cancel: CancellationToken,
) -> Result<()> {
    info!(url = %url, mode = ?driver.mode(), "connecting");
    let mut stream = ws::connect(url, access_key).await?;
    info!("connected");

    // Initial tick: the driver always produces the first REGISTER from a
    // null incoming (spec.md §4.6's "Initial tick").
    if !tick(&mut driver, None, &mut stream, recorder.as_ref()).await? {
        close_recorder(recorder.as_ref()).await;
        return Ok(());
    }

    loop {
        let frame = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("cancellation requested, closing connection");
                close_recorder(recorder.as_ref()).await;
                return Ok(());
            }
            frame = ws::recv(&mut stream) => frame?,
        };

        let Some(bytes) = frame else {
            info!("connection closed by peer");
            close_recorder(recorder.as_ref()).await;
            return Ok(());
        };

        let incoming = match decode_server_to_simulator(&bytes) {
            Ok(msg) => msg,
            Err(e) => {
                warn!(err = %e, "failed to decode frame");
                close_recorder(recorder.as_ref()).await;
                return Err(e);
            }
        };

        match tick(&mut driver, Some(&incoming), &mut stream, recorder.as_ref()).await {
            Ok(keep_going) => {
                if !keep_going {
                    close_recorder(recorder.as_ref()).await;
                    return Ok(());
                }
            }
            Err(e) => {
                close_recorder(recorder.as_ref()).await;
                return Err(e);
            }
        }
    }
}

/// Drives one `recv -> driver.next -> send` tick and records it. Returns
/// `Ok(false)` once the driver has reached `FINISHED` (the caller should
/// stop pumping), `Ok(true)` to keep going.
async fn tick(
    driver: &mut Driver,
    incoming: Option<&crate::wire::message::ServerToSimulator>,
    stream: &mut ws::WsStream,
    recorder: Option<&RecorderHandle>,
) -> Result<bool> {
    if let Some(rec) = recorder {
        rec.record_recv(incoming).await;
    }

    let outgoing = driver.next(incoming)?;

    if let Some(rec) = recorder {
        rec.record_send(outgoing.as_ref()).await;
    }

    if let Some(msg) = &outgoing {
        let bytes = encode_simulator_to_server(msg).to_vec();
        ws::send(stream, bytes).await?;
    }

    Ok(driver.state() != DriverState::Finished)
}

async fn close_recorder(recorder: Option<&RecorderHandle>) {
    if let Some(rec) = recorder {
        rec.close().await;
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
