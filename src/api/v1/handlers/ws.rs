/*
 * Responsibility
 * - GET /ws: token (query) 検証済みの WebSocket。挨拶を送り、text をそのまま返す
 */
use axum::{
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    response::Response,
};
use tracing::{debug, info};

use crate::api::v1::extractors::AuthCtxExtractor;

pub async fn ws(ws: WebSocketUpgrade, AuthCtxExtractor(auth): AuthCtxExtractor) -> Response {
    ws.on_upgrade(move |socket| echo(socket, auth.user_id))
}

async fn echo(mut socket: WebSocket, user_id: i64) {
    info!(user_id, "ws connected");

    if socket
        .send(Message::Text(format!("hello user {user_id}").into()))
        .await
        .is_err()
    {
        return;
    }

    while let Some(Ok(msg)) = socket.recv().await {
        match msg {
            Message::Text(text) => {
                if socket.send(Message::Text(text)).await.is_err() {
                    break;
                }
            }
            Message::Close(_) => break,
            _ => {}
        }
    }

    debug!(user_id, "ws closed");
}
