//! End-to-end test over a real WebSocket: a fake game server scripted
//! with the exact frames the production server sends.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;

use deckside::prelude::*;
use deckside::Identity;
use deckside_protocol::encode_hand;

type ServerWs = tokio_tungstenite::WebSocketStream<tokio::net::TcpStream>;

async fn recv_json(ws: &mut ServerWs) -> Value {
    let msg = timeout(Duration::from_secs(2), ws.next())
        .await
        .expect("timed out waiting for client frame")
        .expect("stream ended")
        .expect("frame error");
    match msg {
        Message::Text(text) => serde_json::from_str(text.as_str()).expect("client sent JSON"),
        other => panic!("expected text frame, got {other:?}"),
    }
}

async fn send_json(ws: &mut ServerWs, value: Value) {
    ws.send(Message::text(value.to_string()))
        .await
        .expect("server send");
}

#[tokio::test]
async fn test_full_round_trip_against_fake_server() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store_path = dir.path().join("identity.json");

    let hand = vec![Card::new(20, Suit::Diamond, 9)];
    let encrypted = encode_hand(&hand, "sky_live");

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");

    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.expect("accept");
        let mut ws = tokio_tungstenite::accept_async(stream).await.expect("upgrade");

        // First frame must be the join request, secretless on a first run.
        let join = recv_json(&mut ws).await;
        assert_eq!(join["username"], json!("alice"));
        assert_eq!(join["channel"], json!("kitchen"));
        assert_eq!(join["secret"], json!(""));

        // Handshake ack, then a Bid snapshot with alice to act.
        send_json(&mut ws, json!({ "client_secret": "sky_live" })).await;
        send_json(
            &mut ws,
            json!({
                "lobby_code": "kitchen",
                "players": {
                    "alice": {
                        "id": "alice",
                        "encrypted_hand": encrypted,
                        "num_cards": 1,
                        "role": "Leader"
                    }
                },
                "player_order": ["alice"],
                "curr_round": 1,
                "curr_player_turn": "alice",
                "gameplay_state": "Bid"
            }),
        )
        .await;

        // The bid should arrive in the full command envelope.
        let bid = recv_json(&mut ws).await;
        assert_eq!(bid["username"], json!("alice"));
        assert_eq!(bid["message"]["action"], json!({"bid": 2}));
        assert_eq!(bid["message"]["origin"], json!({"player": "alice"}));

        ws.close(None).await.ok();
    });

    let config = SessionConfig::new(format!("ws://{addr}"), "alice", "kitchen")
        .with_store_path(&store_path);
    let (session, mut events) = Session::connect(config).await.expect("connect");

    let mut saw_secret = false;
    let mut saw_state = false;
    loop {
        let event = timeout(Duration::from_secs(2), events.recv())
            .await
            .expect("timed out waiting for event")
            .expect("event channel closed");
        match event {
            SessionEvent::Connected => {}
            SessionEvent::SecretEstablished => saw_secret = true,
            SessionEvent::StateChanged(state) => {
                saw_state = true;
                assert_eq!(state.phase(), GamePhase::Bid);
                assert!(session.can_act());
                assert_eq!(session.hand(), hand);
                session.bid(2).expect("bid");
            }
            SessionEvent::Disconnected { .. } => break,
        }
    }
    assert!(saw_secret, "handshake ack never arrived");
    assert!(saw_state, "snapshot never arrived");

    // The server's asserts ran too.
    server.await.expect("server panicked");

    // The whole identity survived to disk for the next run.
    let identity: Identity =
        serde_json::from_str(&std::fs::read_to_string(&store_path).expect("read"))
            .expect("parse identity");
    assert_eq!(identity.username, "alice");
    assert_eq!(identity.lobby_code, "kitchen");
    assert_eq!(identity.secret, "sky_live");
}

#[tokio::test]
async fn test_connect_to_dead_endpoint_fails() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);

    let config = SessionConfig::new(format!("ws://{addr}"), "alice", "kitchen");
    let result = Session::connect(config).await;
    assert!(matches!(result, Err(DecksideError::Transport(_))));
}
