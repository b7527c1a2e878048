mod common;

use std::{net::SocketAddr, time::Duration};

use axum::Router;
use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::{
    connect_async,
    tungstenite::{client::IntoClientRequest, http::HeaderValue, Message},
    MaybeTlsStream, WebSocketStream,
};
use uuid::Uuid;

use common::{couple, test_app, Browser};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn listen(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    addr
}

async fn open(addr: SocketAddr, room_id: Uuid, browser: &Browser) -> Socket {
    let mut request = format!("ws://{addr}/r/{room_id}/ws").into_client_request().unwrap();
    let cookie = browser.cookie.as_deref().unwrap();
    request.headers_mut().insert("cookie", HeaderValue::from_str(cookie).unwrap());
    let (socket, _) = connect_async(request).await.unwrap();
    socket
}

/// The next frame of `kind`. Frames of other kinds are skipped.
async fn next_frame(socket: &mut Socket, kind: &str) -> Value {
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(5), socket.next())
            .await
            .expect("no frame in time")
            .expect("socket closed")
            .unwrap();
        let Message::Text(text) = msg else { continue };
        let frame: Value = serde_json::from_str(&text).unwrap();
        if frame["type"] == kind {
            return frame;
        }
    }
}

async fn send(socket: &mut Socket, command: Value) {
    socket.send(Message::Text(command.to_string())).await.unwrap();
}

#[tokio::test]
async fn sockets_follow_every_change_in_the_room() {
    let app = test_app().await;
    let (alice, bob, room_id) = couple(&app).await;
    let addr = listen(app).await;

    let mut alice_socket = open(addr, room_id, &alice).await;
    let mut bob_socket = open(addr, room_id, &bob).await;
    assert_eq!(next_frame(&mut alice_socket, "snapshot").await["inbox_count"], 0);
    assert_eq!(next_frame(&mut bob_socket, "snapshot").await["inbox_count"], 0);

    send(&mut alice_socket, json!({ "type": "ask", "question_text": "Tea or coffee?" })).await;
    let seen_by_bob = next_frame(&mut bob_socket, "snapshot").await;
    assert_eq!(seen_by_bob["inbox_count"], 1);
    assert_eq!(seen_by_bob["inbox"][0]["question_text"], "Tea or coffee?");
    let round_id = seen_by_bob["inbox"][0]["id"].clone();

    let seen_by_alice = next_frame(&mut alice_socket, "snapshot").await;
    assert_eq!(seen_by_alice["inbox_count"], 0);
    assert_eq!(seen_by_alice["sent"][0]["id"], round_id);

    send(&mut bob_socket, json!({ "type": "reply", "round_id": round_id.clone(), "answer_text": "Tea" })).await;
    let seen_by_alice = next_frame(&mut alice_socket, "snapshot").await;
    assert_eq!(seen_by_alice["sent"], json!([]));
    assert_eq!(seen_by_alice["history"][0]["id"], round_id);
    assert_eq!(seen_by_alice["history"][0]["answer_text"], "Tea");
    assert_eq!(seen_by_alice["history"][0]["answer_sender"], "Bob");
}

#[tokio::test]
async fn failed_commands_come_back_as_errors() {
    let app = test_app().await;
    let (alice, bob, room_id) = couple(&app).await;
    let addr = listen(app).await;

    let mut alice_socket = open(addr, room_id, &alice).await;
    let mut bob_socket = open(addr, room_id, &bob).await;
    next_frame(&mut alice_socket, "snapshot").await;
    next_frame(&mut bob_socket, "snapshot").await;

    send(&mut alice_socket, json!({ "type": "ask", "question_text": "   " })).await;
    let error = next_frame(&mut alice_socket, "error").await;
    assert_eq!(error["message"], "question must not be empty");

    send(&mut alice_socket, json!({ "type": "ask", "question_text": "Tea or coffee?" })).await;
    let round_id = next_frame(&mut bob_socket, "snapshot").await["inbox"][0]["id"].clone();

    send(&mut alice_socket, json!({ "type": "reply", "round_id": round_id.clone(), "answer_text": "me" })).await;
    let error = next_frame(&mut alice_socket, "error").await;
    assert_eq!(error["message"], "you can't answer your own question");

    send(&mut bob_socket, json!({ "type": "reply", "round_id": round_id.clone(), "answer_text": "Tea" })).await;
    send(&mut bob_socket, json!({ "type": "reply", "round_id": round_id.clone(), "answer_text": "Coffee" })).await;
    let error = next_frame(&mut bob_socket, "error").await;
    assert!(error["message"].as_str().unwrap().contains("already been answered"));

    send(&mut bob_socket, json!({ "type": "delete", "round_id": round_id })).await;
    let error = next_frame(&mut bob_socket, "error").await;
    assert!(error["message"].as_str().unwrap().starts_with("bad command"));

    // the socket is still usable after errors
    send(&mut bob_socket, json!({ "type": "ask", "question_text": "Sleep?" })).await;
    let seen_by_alice = loop {
        let snapshot = next_frame(&mut alice_socket, "snapshot").await;
        if snapshot["inbox_count"] == 1 {
            break snapshot;
        }
    };
    assert_eq!(seen_by_alice["inbox"][0]["question_text"], "Sleep?");
    assert_eq!(seen_by_alice["history"][0]["answer_text"], "Tea");
}

#[tokio::test]
async fn sockets_need_the_room_in_the_session() {
    let app = test_app().await;
    let (alice, _bob, _room_id) = couple(&app).await;
    let (_carol, _dave, other_room) = couple(&app).await;
    let addr = listen(app).await;

    let mut request = format!("ws://{addr}/r/{other_room}/ws").into_client_request().unwrap();
    request
        .headers_mut()
        .insert("cookie", HeaderValue::from_str(alice.cookie.as_deref().unwrap()).unwrap());
    assert!(connect_async(request).await.is_err());

    let request = format!("ws://{addr}/r/{other_room}/ws").into_client_request().unwrap();
    assert!(connect_async(request).await.is_err());
}
