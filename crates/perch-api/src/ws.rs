// SPDX-FileCopyrightText: 2026 Perch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Websocket push channel.
//!
//! A reader task decodes `{type, payload}` envelopes off the socket and
//! forwards `message` frames into an mpsc; [`PushChannel::recv`] drains it.
//! The stream is conversation-agnostic: filtering to the active thread is
//! the sync engine's job, and reconnection after a dropped socket belongs
//! to whoever owns the channel instance.

use async_trait::async_trait;
use futures::StreamExt;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tracing::{debug, warn};

use perch_core::{Message, PerchError, PushChannel};

use crate::dto::WsFrame;

const INBOUND_BUFFER: usize = 100;

/// Live insert-event stream over a websocket.
pub struct WsPushChannel {
    inbound: Mutex<mpsc::Receiver<Message>>,
    reader: JoinHandle<()>,
}

impl WsPushChannel {
    /// Connect to the push endpoint and start the reader task.
    pub async fn connect(ws_url: &str) -> Result<Self, PerchError> {
        let (stream, _) = connect_async(ws_url)
            .await
            .map_err(|e| PerchError::transport("push channel connect failed", e))?;
        debug!(url = ws_url, "push channel connected");

        let (_write, mut read) = stream.split();
        let (tx, rx) = mpsc::channel(INBOUND_BUFFER);

        let reader = tokio::spawn(async move {
            while let Some(frame) = read.next().await {
                match frame {
                    Ok(WsMessage::Text(text)) => {
                        match serde_json::from_str::<WsFrame>(text.as_str()) {
                            Ok(WsFrame::Message(row)) => {
                                if tx.send(Message::from(row)).await.is_err() {
                                    // Receiver dropped; nobody is listening.
                                    break;
                                }
                            }
                            Ok(_) => debug!("non-message frame skipped"),
                            Err(e) => warn!(error = %e, "unrecognized frame skipped"),
                        }
                    }
                    Ok(WsMessage::Close(_)) => {
                        debug!("push channel closed by server");
                        break;
                    }
                    Ok(_) => {} // ping/pong/binary frames carry no events
                    Err(e) => {
                        warn!(error = %e, "push channel read failed");
                        break;
                    }
                }
            }
        });

        Ok(Self {
            inbound: Mutex::new(rx),
            reader,
        })
    }
}

impl Drop for WsPushChannel {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

#[async_trait]
impl PushChannel for WsPushChannel {
    async fn recv(&self) -> Result<Message, PerchError> {
        self.inbound
            .lock()
            .await
            .recv()
            .await
            .ok_or_else(|| PerchError::Transport {
                message: "push channel disconnected".into(),
                source: None,
            })
    }
}
