//! WebSocket connection handler
//!
//! Handles individual connections: WebSocket handshake, frame decoding,
//! and bidirectional communication with the ChatServer.

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, warn};

use crate::error::AppError;
use crate::message::{ClientMessage, ServerMessage};
use crate::server::ServerCommand;
use crate::types::ConnectionId;

/// Accept connections forever, spawning a handler task for each
pub async fn serve(
    listener: TcpListener,
    cmd_tx: mpsc::Sender<ServerCommand>,
    outbound_buffer: usize,
) {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                info!("New connection from {}", addr);
                let cmd_tx = cmd_tx.clone();

                tokio::spawn(async move {
                    if let Err(e) = handle_connection(stream, cmd_tx, outbound_buffer).await {
                        error!("Connection handler error: {}", e);
                    }
                });
            }
            Err(e) => {
                error!("Failed to accept connection: {}", e);
            }
        }
    }
}

/// Handle a new TCP connection
///
/// Performs the WebSocket handshake, registers the connection with the
/// server, pumps frames both ways, and raises a disconnect when either
/// direction ends.
pub async fn handle_connection(
    stream: TcpStream,
    cmd_tx: mpsc::Sender<ServerCommand>,
    outbound_buffer: usize,
) -> Result<(), AppError> {
    let peer_addr = stream
        .peer_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    debug!("New TCP connection from {}", peer_addr);

    // WebSocket handshake
    let ws_stream = tokio_tungstenite::accept_async(stream).await?;
    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    let connection_id = ConnectionId::new();
    info!("Connection {} established from {}", connection_id, peer_addr);

    // Channel for server -> client messages
    let (msg_tx, mut msg_rx) = mpsc::channel::<ServerMessage>(outbound_buffer);

    // Register with ChatServer; it sends the welcome message
    if cmd_tx
        .send(ServerCommand::Connect {
            connection_id,
            sender: msg_tx,
        })
        .await
        .is_err()
    {
        error!("Failed to register connection {} - server closed", connection_id);
        return Err(AppError::ChannelSend);
    }

    let cmd_tx_read = cmd_tx.clone();

    // Spawn read task (WebSocket -> ServerCommand)
    let read_task = tokio::spawn(async move {
        while let Some(msg_result) = ws_receiver.next().await {
            match msg_result {
                Ok(Message::Text(text)) => {
                    let Some(cmd) = decode_command(connection_id, &text) else {
                        continue;
                    };
                    if cmd_tx_read.send(cmd).await.is_err() {
                        debug!("Server closed, ending read task for {}", connection_id);
                        break;
                    }
                }
                Ok(Message::Close(_)) => {
                    debug!("Connection {} sent close frame", connection_id);
                    break;
                }
                Ok(Message::Ping(_)) => {
                    // Pong is handled automatically by tungstenite
                    debug!("Ping from {}", connection_id);
                }
                Ok(_) => {
                    // Binary, pong and raw frames carry no events
                }
                Err(e) => {
                    error!("WebSocket error for {}: {}", connection_id, e);
                    break;
                }
            }
        }
        debug!("Read task ended for {}", connection_id);
    });

    // Spawn write task (ServerMessage -> WebSocket)
    let write_task = tokio::spawn(async move {
        while let Some(msg) = msg_rx.recv().await {
            match encode_frame(&msg) {
                Ok(frame) => {
                    if ws_sender.send(frame).await.is_err() {
                        debug!("WebSocket send failed, ending write task");
                        break;
                    }
                }
                Err(e) => {
                    error!("Failed to serialize message: {}", e);
                }
            }
        }
        debug!("Write task ended for {}", connection_id);

        let _ = ws_sender.close().await;
    });

    // Wait for either task to complete
    tokio::select! {
        _ = read_task => {
            debug!("Read task completed for {}", connection_id);
        }
        _ = write_task => {
            debug!("Write task completed for {}", connection_id);
        }
    }

    let _ = cmd_tx
        .send(ServerCommand::Disconnect { connection_id })
        .await;

    info!("Connection {} closed", connection_id);

    Ok(())
}

/// Serialize an outbound event into a text frame
fn encode_frame(msg: &ServerMessage) -> Result<Message, AppError> {
    let json = serde_json::to_string(msg)?;
    Ok(Message::Text(json))
}

/// Parse a text frame into a command, logging and dropping malformed input
fn decode_command(connection_id: ConnectionId, text: &str) -> Option<ServerCommand> {
    match serde_json::from_str::<ClientMessage>(text) {
        Ok(msg) => Some(client_message_to_command(connection_id, msg)),
        Err(e) => {
            warn!("Invalid frame from {}: {}", connection_id, e);
            None
        }
    }
}

/// Convert a ClientMessage to a ServerCommand
fn client_message_to_command(connection_id: ConnectionId, msg: ClientMessage) -> ServerCommand {
    match msg {
        ClientMessage::SendMessage { username, message } => ServerCommand::SendMessage {
            connection_id,
            username,
            message,
        },
        ClientMessage::CreateGroup(room_name) => ServerCommand::CreateGroup {
            connection_id,
            room_name,
        },
        ClientMessage::JoinGroup(room_name) => ServerCommand::JoinGroup {
            connection_id,
            room_name,
        },
        ClientMessage::GroupMessage { room_id, message } => ServerCommand::GroupMessage {
            connection_id,
            room_id,
            message,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use serde_json::{json, Value};
    use tokio::time::timeout;
    use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

    use crate::server::ChatServer;

    type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

    /// Start a relay on an ephemeral port and return its address
    async fn start_relay() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (cmd_tx, cmd_rx) = mpsc::channel(64);

        tokio::spawn(ChatServer::new(cmd_rx).run());
        tokio::spawn(serve(listener, cmd_tx, 32));

        format!("ws://{}", addr)
    }

    async fn connect(url: &str) -> Client {
        let (ws, _) = connect_async(url).await.unwrap();
        ws
    }

    async fn send_text(ws: &mut Client, text: &str) {
        ws.send(Message::Text(text.to_string())).await.unwrap();
    }

    /// Next text frame as JSON, skipping control frames
    async fn next_event(ws: &mut Client) -> Value {
        loop {
            let msg = timeout(Duration::from_secs(5), ws.next())
                .await
                .expect("timed out waiting for event")
                .expect("stream ended")
                .expect("websocket error");
            if let Message::Text(text) = msg {
                return serde_json::from_str(&text).unwrap();
            }
        }
    }

    #[tokio::test]
    async fn test_socket_lifecycle_and_disconnect_cleanup() {
        let url = start_relay().await;
        let mut alice = connect(&url).await;
        let mut bob = connect(&url).await;

        let welcome = json!({"event": "message", "data": crate::server::WELCOME_MESSAGE});
        assert_eq!(next_event(&mut alice).await, welcome);
        assert_eq!(next_event(&mut bob).await, welcome);

        send_text(
            &mut alice,
            r#"{"event":"send_message","data":{"username":"Alice","message":"hi"}}"#,
        )
        .await;
        assert_eq!(
            next_event(&mut bob).await,
            json!({"event": "broadcast", "data": {"username": "Alice", "message": "hi"}})
        );

        // A malformed frame is dropped without closing the socket
        send_text(&mut alice, "definitely not json").await;
        send_text(&mut alice, r#"{"event":"create_group","data":"devs"}"#).await;
        assert_eq!(
            next_event(&mut alice).await,
            json!({"event": "update_groups_list", "data": ["devs"]})
        );
        assert_eq!(
            next_event(&mut alice).await,
            json!({"event": "update_members_list", "data": ["Alice"]})
        );
        assert_eq!(
            next_event(&mut bob).await,
            json!({"event": "update_groups_list", "data": ["devs"]})
        );

        send_text(
            &mut bob,
            r#"{"event":"send_message","data":{"username":"Bob","message":"hey"}}"#,
        )
        .await;
        assert_eq!(
            next_event(&mut alice).await,
            json!({"event": "broadcast", "data": {"username": "Bob", "message": "hey"}})
        );

        send_text(&mut bob, r#"{"event":"join_group","data":"devs"}"#).await;
        let both = json!({"event": "update_members_list", "data": ["Alice", "Bob"]});
        assert_eq!(next_event(&mut alice).await, both);
        assert_eq!(next_event(&mut bob).await, both);

        alice.close(None).await.unwrap();

        assert_eq!(
            next_event(&mut bob).await,
            json!({"event": "update_members_list", "data": ["Bob"]})
        );
    }

    #[test]
    fn test_encode_frame_is_text_json() {
        let frame = encode_frame(&ServerMessage::UpdateGroupsList(vec!["devs".to_string()])).unwrap();
        assert_eq!(
            frame,
            Message::Text(r#"{"event":"update_groups_list","data":["devs"]}"#.to_string())
        );
    }

    #[test]
    fn test_decode_group_message() {
        let id = ConnectionId::new();
        let cmd = decode_command(
            id,
            r#"{"event":"group_message","data":{"roomId":"devs","message":"hi"}}"#,
        );
        match cmd {
            Some(ServerCommand::GroupMessage {
                connection_id,
                room_id,
                message,
            }) => {
                assert_eq!(connection_id, id);
                assert_eq!(room_id, "devs");
                assert_eq!(message, "hi");
            }
            other => panic!("Wrong command: {:?}", other),
        }
    }

    #[test]
    fn test_decode_join_group() {
        let id = ConnectionId::new();
        let cmd = decode_command(id, r#"{"event":"join_group","data":"devs"}"#);
        assert!(matches!(
            cmd,
            Some(ServerCommand::JoinGroup { room_name, .. }) if room_name == "devs"
        ));
    }

    #[test]
    fn test_decode_drops_malformed_frames() {
        let id = ConnectionId::new();
        assert!(decode_command(id, "{").is_none());
        assert!(decode_command(id, r#"{"event":"shout","data":"hey"}"#).is_none());
        assert!(decode_command(id, r#"{"event":"send_message","data":{"message":"hi"}}"#).is_none());
    }
}
