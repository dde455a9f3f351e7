//! Integration tests for WebSocket fan-out.

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio_tungstenite::tungstenite::Message;

use crate::helpers::{self, WsClient};

/// Next data frame, skipping control frames
async fn next_data(client: &mut WsClient) -> Message {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let msg = client
                .next()
                .await
                .expect("stream ended")
                .expect("read failed");
            if msg.is_text() || msg.is_binary() {
                return msg;
            }
        }
    })
    .await
    .expect("no message within timeout")
}

/// Assert that no data frame arrives for a short while
async fn assert_silent(client: &mut WsClient) {
    let result = tokio::time::timeout(Duration::from_millis(200), async {
        loop {
            match client.next().await {
                Some(Ok(msg)) if msg.is_text() || msg.is_binary() => return msg,
                Some(Ok(_)) => continue,
                _ => std::future::pending::<()>().await,
            }
        }
    })
    .await;
    assert!(result.is_err(), "unexpected message: {:?}", result);
}

#[tokio::test]
async fn test_text_reaches_all_other_clients() {
    let app = helpers::TestApp::new().await;
    let server = app.spawn_server().await;
    let mut clients = server.connect_many(3).await;

    clients[0].send(Message::text("hi")).await.unwrap();

    assert_eq!(next_data(&mut clients[1]).await, Message::text("hi"));
    assert_eq!(next_data(&mut clients[2]).await, Message::text("hi"));
    assert_silent(&mut clients[0]).await;
}

#[tokio::test]
async fn test_binary_payload_is_relayed_verbatim() {
    let app = helpers::TestApp::new().await;
    let server = app.spawn_server().await;
    let mut clients = server.connect_many(2).await;

    // transform/rotate frame: type byte, subtype byte, three f32s
    let mut payload = vec![2u8, 0];
    for v in [0.5f32, -1.0, 3.25] {
        payload.extend_from_slice(&v.to_le_bytes());
    }

    clients[1].send(Message::binary(payload.clone())).await.unwrap();

    assert_eq!(next_data(&mut clients[0]).await, Message::binary(payload));
}

#[tokio::test]
async fn test_messages_from_one_sender_keep_order() {
    let app = helpers::TestApp::new().await;
    let server = app.spawn_server().await;
    let mut clients = server.connect_many(2).await;

    for i in 0..20 {
        clients[0].send(Message::text(format!("msg-{i}"))).await.unwrap();
    }

    for i in 0..20 {
        assert_eq!(
            next_data(&mut clients[1]).await,
            Message::text(format!("msg-{i}"))
        );
    }
}

#[tokio::test]
async fn test_closed_client_leaves_pool() {
    let app = helpers::TestApp::new().await;
    let server = app.spawn_server().await;
    let mut clients = server.connect_many(3).await;

    let mut gone = clients.remove(0);
    gone.close(None).await.unwrap();
    server.wait_for(|m| m.connections_active == 2).await;

    clients[0].send(Message::text("after")).await.unwrap();
    assert_eq!(next_data(&mut clients[1]).await, Message::text("after"));

    server
        .wait_for(|m| m.broadcasts_processed == 1 && m.deliveries_sent == 1)
        .await;
    assert_eq!(server.relay.metrics().delivery_failures, 0);
}

#[tokio::test]
async fn test_dropped_socket_leaves_pool() {
    let app = helpers::TestApp::new().await;
    let server = app.spawn_server().await;
    let clients = server.connect_many(2).await;

    drop(clients);
    server.wait_for(|m| m.connections_active == 0).await;
    assert_eq!(server.relay.metrics().connections_total, 2);
}

#[tokio::test]
async fn test_lone_client_message_goes_nowhere() {
    let app = helpers::TestApp::new().await;
    let server = app.spawn_server().await;
    let mut clients = server.connect_many(1).await;

    clients[0].send(Message::text("echo?")).await.unwrap();
    server.wait_for(|m| m.broadcasts_processed == 1).await;

    assert_silent(&mut clients[0]).await;
    assert_eq!(server.relay.metrics().deliveries_sent, 0);
}

#[tokio::test]
async fn test_connect_and_close_at_once_leaves_no_member() {
    let app = helpers::TestApp::new().await;
    let server = app.spawn_server().await;

    for _ in 0..20 {
        let mut ws = server.connect().await;
        ws.close(None).await.unwrap();
    }
    for _ in 0..20 {
        drop(server.connect().await);
    }
    // let upgrade tasks for the closed sockets run
    tokio::time::sleep(Duration::from_millis(200)).await;
    server.wait_for(|m| m.connections_active == 0).await;

    let mut clients = server.connect_many(2).await;
    clients[0].send(Message::text("fresh")).await.unwrap();
    assert_eq!(next_data(&mut clients[1]).await, Message::text("fresh"));

    server
        .wait_for(|m| m.broadcasts_processed == 1 && m.deliveries_sent == 1)
        .await;
    let metrics = server.relay.metrics();
    assert_eq!(metrics.connections_active, 2);
    assert_eq!(metrics.delivery_failures, 0);
}
