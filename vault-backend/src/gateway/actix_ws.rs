//! Live file-event channel served on the HTTP port at `/ws`.
//!
//! Viewers only listen; any text they send is ignored. The connection
//! subscribes to the broadcaster on upgrade and unsubscribes on close.

use actix_web::{web, HttpRequest, HttpResponse};
use actix_ws::Message;
use futures_util::StreamExt;
use std::sync::Arc;

use super::events::EventBroadcaster;

pub async fn ws_handler(
    req: HttpRequest,
    body: web::Payload,
    broadcaster: web::Data<Arc<EventBroadcaster>>,
) -> Result<HttpResponse, actix_web::Error> {
    let (response, mut session, mut msg_stream) = actix_ws::handle(&req, body)?;

    let peer = req
        .peer_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    log::info!("[Gateway] Client connected via WebSocket: {}", peer);

    let broadcaster = broadcaster.get_ref().clone();
    let (client_id, mut event_rx) = broadcaster.subscribe();

    actix_web::rt::spawn(async move {
        loop {
            tokio::select! {
                Some(event) = event_rx.recv() => {
                    let json = match serde_json::to_string(&event) {
                        Ok(j) => j,
                        Err(e) => {
                            log::error!("[Gateway] Failed to serialize event: {}", e);
                            continue;
                        }
                    };
                    if session.text(json).await.is_err() {
                        break;
                    }
                }
                msg = msg_stream.next() => {
                    match msg {
                        Some(Ok(Message::Ping(data))) => {
                            if session.pong(&data).await.is_err() {
                                break;
                            }
                        }
                        Some(Ok(Message::Close(reason))) => {
                            log::debug!("[Gateway] Client {} closed: {:?}", client_id, reason);
                            break;
                        }
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            log::error!("[Gateway] WebSocket error: {}", e);
                            break;
                        }
                        None => break,
                    }
                }
                else => break,
            }
        }

        broadcaster.unsubscribe(&client_id);
        let _ = session.close(None).await;
        log::info!("[Gateway] Client disconnected: {}", peer);
    });

    Ok(response)
}
