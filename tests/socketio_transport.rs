use std::time::Duration;

use futures::{SinkExt, StreamExt};
use matru_live::common::{Priority, SubjectId};
use matru_live::network::{PushConnector, SocketIoConnector};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{WebSocketStream, accept_async};
use url::Url;

const TEST_TIMEOUT: Duration = Duration::from_secs(3);

async fn next_text(ws: &mut WebSocketStream<TcpStream>) -> String {
    loop {
        match ws.next().await {
            Some(Ok(Message::Text(text))) => return text.as_str().to_owned(),
            Some(Ok(_)) => continue,
            other => panic!("socket ended early: {other:?}"),
        }
    }
}

#[tokio::test]
async fn speaks_socketio_and_yields_notifications() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let address = listener.local_addr().expect("local addr");

    let server = tokio::spawn(async move {
        let (tcp, _) = listener.accept().await.expect("accept");
        let mut ws = accept_async(tcp).await.expect("handshake");

        ws.send(Message::text(
            r#"0{"sid":"s1","upgrades":[],"pingInterval":25000,"pingTimeout":20000,"maxPayload":1000000}"#,
        ))
        .await
        .expect("send open");
        let connect = next_text(&mut ws).await;

        ws.send(Message::text(r#"40{"sid":"n1"}"#)).await.expect("send ack");
        ws.send(Message::text("2")).await.expect("send ping");
        let pong = next_text(&mut ws).await;

        ws.send(Message::text(r#"42["typing",{"mother_id":"42"}]"#))
            .await
            .expect("send other event");
        ws.send(Message::text(
            r#"42["new_notification",{"id":"17","mother_id":"42","mother_name":"Sita Devi","content":"I feel dizzy","sender":"Patient","is_urgent":true,"priority":"RED","timestamp":"2024-05-01 10:05:00.123456"}]"#,
        ))
        .await
        .expect("send notification");
        ws.close(None).await.expect("close");

        (connect, pong)
    });

    let url = Url::parse(&format!(
        "ws://{address}/socket.io/?EIO=4&transport=websocket"
    ))
    .expect("url");
    let mut notifications = SocketIoConnector::new(url)
        .connect()
        .await
        .expect("connect");

    let notification = timeout(TEST_TIMEOUT, notifications.next())
        .await
        .expect("timed out")
        .expect("stream item")
        .expect("notification");
    assert_eq!(notification.subject_id, SubjectId::from("42"));
    assert_eq!(notification.subject_name, "Sita Devi");
    assert_eq!(notification.message.id, "17");
    assert_eq!(notification.message.priority, Priority::Red);
    assert!(notification.message.is_urgent());

    let end = timeout(TEST_TIMEOUT, notifications.next())
        .await
        .expect("timed out");
    assert!(end.is_none());

    let (connect, pong) = server.await.expect("server task");
    assert_eq!(connect, "40");
    assert_eq!(pong, "3");
}
