//! End-to-end gateway tests
//!
//! Each test spins up a real server on an ephemeral port and drives it
//! through real WebSocket connections.

use integration_tests::{message_text, TestClient, TestServer};
use relay_common::AppConfig;
use relay_core::{MessageStyle, Segment};
use relay_gateway::protocol::{ClientFrame, ServerFrame};
use std::time::Duration;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;

async fn named_member(server: &TestServer, name: &str, room: &str) -> TestClient {
    let mut client = server.connect().await;
    client.login(name).await;
    client.join(room).await;
    client
}

#[tokio::test]
async fn test_ping_pong_works_before_login() {
    let server = TestServer::start().await;
    let mut client = server.connect().await;

    client.send(ClientFrame::Ping).await;
    assert_eq!(client.recv().await, ServerFrame::Pong);
}

#[tokio::test]
async fn test_duplicate_name_is_rejected() {
    let server = TestServer::start().await;

    let mut first = server.connect().await;
    first.login("alice").await;

    let mut second = server.connect().await;
    second
        .send(ClientFrame::RequestName {
            name: "alice".to_string(),
        })
        .await;
    assert_eq!(second.recv().await, ServerFrame::NameFailure);

    // a different name still works
    second.login("bob").await;
}

#[tokio::test]
async fn test_quiet_until_logged_in() {
    let server = TestServer::start().await;
    let mut client = server.connect().await;

    // join before login is silently ignored
    client
        .send(ClientFrame::JoinRoom {
            room: "general".to_string(),
        })
        .await;
    client
        .send(ClientFrame::SendMessage {
            room: "general".to_string(),
            text: "hello?".to_string(),
        })
        .await;

    // ping still answers, and nothing else arrived ahead of the pong
    client.send(ClientFrame::Ping).await;
    assert_eq!(client.recv().await, ServerFrame::Pong);
}

#[tokio::test]
async fn test_malformed_frames_do_not_kill_the_connection() {
    let server = TestServer::start().await;
    let mut client = server.connect().await;

    // unknown opcode, empty-ish frames, missing sentinel
    client.send_raw(vec![99, 1, 2, 3]).await;
    client.send_raw(vec![5, b'g', b'e', b'n']).await;

    client.send(ClientFrame::Ping).await;
    assert_eq!(client.recv().await, ServerFrame::Pong);
}

#[tokio::test]
async fn test_join_broadcasts_to_members() {
    let server = TestServer::start().await;
    let mut alice = named_member(&server, "alice", "general").await;

    let mut bob = server.connect().await;
    bob.login("bob").await;
    bob.join("general").await;

    let notice = alice.recv().await;
    assert_eq!(message_text(&notice), "bob has joined the room");
}

#[tokio::test]
async fn test_chat_message_carries_header_and_styles() {
    let server = TestServer::start().await;
    let mut alice = named_member(&server, "alice", "general").await;
    let mut bob = named_member(&server, "bob", "general").await;

    // alice sees bob join before his message
    let join_notice = alice.recv().await;
    assert_eq!(message_text(&join_notice), "bob has joined the room");

    bob.send(ClientFrame::SendMessage {
        room: "general".to_string(),
        text: "hello **world**".to_string(),
    })
    .await;

    let frame = alice.recv().await;
    assert_eq!(
        frame,
        ServerFrame::Message {
            room: "general".to_string(),
            segments: vec![
                Segment::styled(MessageStyle::BOLD, "bob"),
                Segment::plain(": "),
                Segment::NewBlock,
                Segment::plain("hello "),
                Segment::styled(MessageStyle::BOLD, "world"),
            ],
        }
    );

    // the sender receives their own broadcast too
    let own = bob.recv().await;
    assert_eq!(message_text(&own), "bob: hello world");
}

#[tokio::test]
async fn test_leave_notice_reaches_remaining_members() {
    let server = TestServer::start().await;
    let mut alice = named_member(&server, "alice", "general").await;
    let mut bob = named_member(&server, "bob", "general").await;
    let _ = alice.recv().await; // bob's join notice

    bob.send(ClientFrame::LeaveRoom {
        room: "general".to_string(),
    })
    .await;
    assert_eq!(
        bob.recv().await,
        ServerFrame::RoomLeft {
            room: "general".to_string()
        }
    );

    let notice = alice.recv().await;
    assert_eq!(message_text(&notice), "bob has left the room");
}

#[tokio::test]
async fn test_clean_close_reads_as_leaving() {
    let server = TestServer::start().await;
    let mut alice = named_member(&server, "alice", "general").await;
    let bob = named_member(&server, "bob", "general").await;
    let _ = alice.recv().await; // bob's join notice

    bob.close_with(CloseCode::Away).await;

    let notice = alice.recv().await;
    assert_eq!(message_text(&notice), "bob has left the room");
}

#[tokio::test]
async fn test_normal_close_reads_as_lost_connection() {
    let server = TestServer::start().await;
    let mut alice = named_member(&server, "alice", "general").await;
    let bob = named_member(&server, "bob", "general").await;
    let _ = alice.recv().await; // bob's join notice

    // close code 1000 is not a deliberate room leave
    bob.close_with(CloseCode::Normal).await;

    let notice = alice.recv().await;
    assert_eq!(message_text(&notice), "bob has lost connection");
}

#[tokio::test]
async fn test_rename_is_announced() {
    let server = TestServer::start().await;
    let mut alice = named_member(&server, "alice", "general").await;
    let mut bob = named_member(&server, "bob", "general").await;
    let _ = alice.recv().await; // bob's join notice

    bob.send(ClientFrame::RequestName {
        name: "robert".to_string(),
    })
    .await;
    assert!(matches!(bob.recv().await, ServerFrame::Message { .. })); // own rename notice
    assert_eq!(
        bob.recv().await,
        ServerFrame::NameAccepted {
            name: "robert".to_string()
        }
    );

    let notice = alice.recv().await;
    assert_eq!(message_text(&notice), "bob has changed their name to robert");
}

#[tokio::test]
async fn test_msg_command_is_room_scoped() {
    let server = TestServer::start().await;
    let mut alice = named_member(&server, "alice", "general").await;
    // bob is online, but in a different room
    let _bob = named_member(&server, "bob", "elsewhere").await;

    alice
        .send(ClientFrame::SendMessage {
            room: "general".to_string(),
            text: "/msg bob psst".to_string(),
        })
        .await;

    let reply = alice.recv().await;
    assert_eq!(message_text(&reply), "User bob not found!");
}

#[tokio::test]
async fn test_msg_command_delivers_privately() {
    let server = TestServer::start().await;
    let mut alice = named_member(&server, "alice", "general").await;
    let mut bob = named_member(&server, "bob", "general").await;
    let mut carol = named_member(&server, "carol", "general").await;
    let _ = alice.recv().await; // bob joined
    let _ = alice.recv().await; // carol joined
    let _ = bob.recv().await; // carol joined

    alice
        .send(ClientFrame::SendMessage {
            room: "general".to_string(),
            text: "/msg bob the password is swordfish".to_string(),
        })
        .await;

    let sender_copy = alice.recv().await;
    assert_eq!(
        message_text(&sender_copy),
        "You to bob: the password is swordfish"
    );

    let target_copy = bob.recv().await;
    assert_eq!(
        message_text(&target_copy),
        "bob to you: the password is swordfish"
    );

    // carol sees nothing
    carol
        .expect_silence(Duration::from_millis(300))
        .await;
}

#[tokio::test]
async fn test_online_command_counts() {
    let server = TestServer::start().await;
    let mut alice = named_member(&server, "alice", "general").await;
    let _bob = named_member(&server, "bob", "general").await;
    let _ = alice.recv().await; // bob joined

    alice
        .send(ClientFrame::SendMessage {
            room: "general".to_string(),
            text: "/online".to_string(),
        })
        .await;

    let reply = alice.recv().await;
    let text = message_text(&reply);
    assert!(text.contains("Users in the current room:"));
    assert!(text.contains("Number of users in this room: 2"));
    assert!(text.contains("Number of users globally: 2"));
}

#[tokio::test]
async fn test_attachment_error_is_reported_to_uploader_only() {
    let server = TestServer::start().await;
    let mut alice = named_member(&server, "alice", "pics").await;
    let mut bob = named_member(&server, "bob", "pics").await;
    let _ = alice.recv().await; // bob joined

    alice
        .send(ClientFrame::SendAttachment {
            room: "pics".to_string(),
            mime: "image/png".to_string(),
            data: b"not actually a png".to_vec(),
        })
        .await;

    let reply = alice.recv().await;
    assert_eq!(
        message_text(&reply),
        "An error occurred while trying to process your file upload"
    );

    bob.expect_silence(Duration::from_millis(300)).await;
}

#[tokio::test]
async fn test_attachment_success_is_unicast_to_uploader() {
    let server = TestServer::start().await;
    let mut alice = named_member(&server, "alice", "pics").await;
    let mut bob = named_member(&server, "bob", "pics").await;
    let _ = alice.recv().await; // bob joined

    // a real 1x1 PNG, encoded in-process
    let mut png = std::io::Cursor::new(Vec::new());
    image::RgbaImage::from_pixel(1, 1, image::Rgba([0, 128, 255, 255]))
        .write_to(&mut png, image::ImageFormat::Png)
        .unwrap();

    alice
        .send(ClientFrame::SendAttachment {
            room: "pics".to_string(),
            mime: "image/png".to_string(),
            data: png.into_inner(),
        })
        .await;

    let reply = alice.recv().await;
    match reply {
        ServerFrame::Attachment { sender, room, data } => {
            assert_eq!(sender, "alice");
            assert_eq!(room, "pics");
            assert!(image::load_from_memory(&data).is_ok());
        }
        other => panic!("expected an attachment frame, got {other:?}"),
    }

    // delivery is unicast by design; the room does not receive it
    bob.expect_silence(Duration::from_millis(300)).await;
}

#[tokio::test]
async fn test_unresponsive_connection_is_reaped_by_heartbeat() {
    let mut config = AppConfig::default();
    config.heartbeat.interval_secs = 1;
    let server = TestServer::start_with_config(config).await;

    let mut alice = named_member(&server, "alice", "general").await;
    let zombie = named_member(&server, "zombie", "general").await;
    let _ = alice.recv().await; // zombie joined

    // the zombie never reads, so it never answers the liveness probe;
    // alice keeps reading (and so keeps ponging)
    let notice = alice.recv().await;
    assert_eq!(message_text(&notice), "zombie has lost connection");

    drop(zombie);
}
