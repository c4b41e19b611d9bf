//! WebSocket Client Transport
//!
//! Connects out to the match server and answers each text or binary frame
//! with one text frame. Pings are answered by tungstenite itself.

use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info, warn};

use crate::network::adapter::CommitRevealAdapter;
use crate::network::protocol::BotResponse;
use crate::network::transport::TransportError;

/// Serve the protocol over a WebSocket connection until the server closes it.
pub async fn run_websocket(adapter: &CommitRevealAdapter, url: &str) -> Result<(), TransportError> {
    let (ws_stream, _) = connect_async(url).await?;
    info!("Connected to match server at {}", url);

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();
    let mut handled: u64 = 0;

    while let Some(msg) = ws_receiver.next().await {
        match msg? {
            Message::Text(text) => {
                let response = adapter.handle_json(&text);
                ws_sender.send(Message::Text(response.to_json()?)).await?;
                handled += 1;
            }
            Message::Binary(data) => {
                // Binary frames are accepted when they carry UTF-8 JSON.
                let response = match String::from_utf8(data) {
                    Ok(text) => adapter.handle_json(&text),
                    Err(_) => {
                        warn!("Non-UTF-8 binary frame");
                        BotResponse::not_utf8()
                    }
                };
                ws_sender.send(Message::Text(response.to_json()?)).await?;
                handled += 1;
            }
            Message::Close(frame) => {
                debug!(?frame, "Server closed connection");
                break;
            }
            _ => {}
        }
    }

    info!(messages = handled, "Disconnected from match server");
    Ok(())
}
