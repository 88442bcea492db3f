//! Test helpers for integration tests
//!
//! Spawns a real gateway server on an ephemeral port and wraps a
//! tokio-tungstenite client that speaks the binary frame protocol.

use std::net::SocketAddr;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use relay_common::AppConfig;
use relay_gateway::liveness;
use relay_gateway::protocol::{ClientFrame, ServerFrame};
use relay_gateway::server::{create_app, create_gateway_state};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

/// How long a test waits for a frame before giving up
pub const RECV_TIMEOUT: Duration = Duration::from_secs(5);

/// Test server instance that manages lifecycle
pub struct TestServer {
    pub addr: SocketAddr,
    _handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a gateway with default configuration
    pub async fn start() -> Self {
        Self::start_with_config(AppConfig::default()).await
    }

    /// Start a gateway with custom config, liveness monitor included
    pub async fn start_with_config(config: AppConfig) -> Self {
        let heartbeat_period = Duration::from_secs(config.heartbeat.interval_secs);
        let state = create_gateway_state(config);
        liveness::spawn_monitor(state.registry().clone(), heartbeat_period);

        let app = create_app(state);
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("ephemeral port should bind");
        let addr = listener.local_addr().expect("listener has an address");

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Self {
            addr,
            _handle: handle,
        }
    }

    /// Connect a WebSocket client to this server
    pub async fn connect(&self) -> TestClient {
        let url = format!("ws://{}/chat", self.addr);
        let (socket, _response) = connect_async(&url).await.expect("WebSocket should connect");
        TestClient { socket }
    }
}

/// A WebSocket client speaking the binary frame protocol
pub struct TestClient {
    socket: WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>,
}

impl TestClient {
    /// Send one client frame
    pub async fn send(&mut self, frame: ClientFrame) {
        self.socket
            .send(Message::Binary(frame.encode()))
            .await
            .expect("frame should send");
    }

    /// Send raw bytes as a binary message, bypassing the frame encoder
    pub async fn send_raw(&mut self, bytes: Vec<u8>) {
        self.socket
            .send(Message::Binary(bytes))
            .await
            .expect("bytes should send");
    }

    /// Receive the next server frame, skipping transport ping/pong
    pub async fn recv(&mut self) -> ServerFrame {
        let deadline = tokio::time::Instant::now() + RECV_TIMEOUT;
        loop {
            let message = tokio::time::timeout_at(deadline, self.socket.next())
                .await
                .expect("a frame should arrive in time")
                .expect("socket should stay open")
                .expect("socket read should succeed");

            match message {
                Message::Binary(bytes) => {
                    return ServerFrame::decode(&bytes).expect("server frame should decode");
                }
                Message::Ping(_) | Message::Pong(_) => {}
                other => panic!("unexpected message: {other:?}"),
            }
        }
    }

    /// Assert that no server frame arrives within a short window
    pub async fn expect_silence(&mut self, window: Duration) {
        let deadline = tokio::time::Instant::now() + window;
        loop {
            match tokio::time::timeout_at(deadline, self.socket.next()).await {
                Err(_) => return,
                Ok(Some(Ok(Message::Ping(_) | Message::Pong(_)))) => {}
                Ok(other) => panic!("expected silence, got: {other:?}"),
            }
        }
    }

    /// Claim a name and wait for acceptance
    pub async fn login(&mut self, name: &str) {
        self.send(ClientFrame::RequestName {
            name: name.to_string(),
        })
        .await;
        assert_eq!(
            self.recv().await,
            ServerFrame::NameAccepted {
                name: name.to_string()
            }
        );
    }

    /// Join a room and consume the confirmation and own join notice
    pub async fn join(&mut self, room: &str) {
        self.send(ClientFrame::JoinRoom {
            room: room.to_string(),
        })
        .await;
        assert_eq!(
            self.recv().await,
            ServerFrame::RoomJoined {
                room: room.to_string()
            }
        );
        // the joiner receives its own join notice
        let notice = self.recv().await;
        assert!(matches!(notice, ServerFrame::Message { .. }));
    }

    /// Close the connection with a specific close code
    pub async fn close_with(mut self, code: CloseCode) {
        self.socket
            .close(Some(CloseFrame {
                code,
                reason: "".into(),
            }))
            .await
            .expect("close should send");
    }
}

/// Extract the concatenated text of a message frame's segments
pub fn message_text(frame: &ServerFrame) -> String {
    match frame {
        ServerFrame::Message { segments, .. } => segments
            .iter()
            .filter_map(|s| s.content())
            .collect::<Vec<_>>()
            .join(""),
        other => panic!("expected a message frame, got {other:?}"),
    }
}
