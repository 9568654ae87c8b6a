//! Integration tests for RpcServer
//!
//! These tests run the server on an ephemeral loopback port in front of a
//! bridge wired to the mock driver and talk to it like a controller would.

use futures::{SinkExt, StreamExt};
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::time::Duration;
use tagstream_reader::mock::MockReader;
use tagstream_rpc::{MAX_LINE_LENGTH, RpcServer, RpcServerConfig};
use tagstream_service::{Bridge, BridgeConfig, BridgeHandle};
use tokio::net::TcpStream;
use tokio::time::{sleep, timeout};
use tokio_util::codec::{Framed, LinesCodec};

const WAIT: Duration = Duration::from_secs(5);

type Client = Framed<TcpStream, LinesCodec>;

async fn start_server(max_connections: usize) -> (SocketAddr, MockReader, BridgeHandle) {
    let (reader, events) = MockReader::new();
    let bridge = Bridge::new(reader.clone(), BridgeConfig { auto_connect: false });
    let rpc = bridge.rpc();
    let handle = bridge.start(events);

    let server = RpcServer::bind(RpcServerConfig {
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        max_connections,
    })
    .await
    .unwrap();
    let addr = server.local_addr().unwrap();
    tokio::spawn(server.run(rpc));

    (addr, reader, handle)
}

async fn client(addr: SocketAddr) -> Client {
    let stream = TcpStream::connect(addr).await.unwrap();
    Framed::new(stream, LinesCodec::new_with_max_length(MAX_LINE_LENGTH * 2))
}

async fn call(client: &mut Client, id: u64, route: &str) -> Value {
    let request = json!({ "id": id, "route": route }).to_string();
    client.send(request).await.unwrap();
    let line = timeout(WAIT, client.next())
        .await
        .expect("reply timeout")
        .expect("connection closed")
        .unwrap();
    let reply: Value = serde_json::from_str(&line).unwrap();
    assert_eq!(reply["id"], id);
    reply
}

/// Call `route` until `pred` accepts its result.
async fn poll(client: &mut Client, route: &str, pred: impl Fn(&Value) -> bool) -> Value {
    let deadline = tokio::time::Instant::now() + WAIT;
    let mut id = 1000;
    loop {
        let reply = call(client, id, route).await;
        if pred(&reply["result"]) {
            return reply["result"].clone();
        }
        assert!(tokio::time::Instant::now() < deadline, "{route} never matched");
        id += 1;
        sleep(Duration::from_millis(5)).await;
    }
}

#[tokio::test]
async fn test_full_session_over_tcp() {
    let (addr, reader, handle) = start_server(4).await;
    let mut client = client(addr).await;

    let status = call(&mut client, 1, "rfid/connected").await;
    assert_eq!(status["result"], json!({ "connected": false }));

    let ack = call(&mut client, 2, "rfid/connect").await;
    assert_eq!(ack["result"], json!({}));
    poll(&mut client, "rfid/connected", |r| r["connected"] == true).await;

    call(&mut client, 3, "/tags/startStream").await;
    let control = reader.clone();
    timeout(WAIT, async move {
        while !control.is_streaming() {
            sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap();

    reader.sight(vec![0xAAu8, 0xBB], 1);
    reader.sight(vec![0xCCu8, 0xDD], 1);
    reader.emit_inventory(false).await;

    let inventory = poll(&mut client, "inventory/get", |r| r["nInventories"] == 1).await;
    assert_eq!(inventory["count"], 2);
    assert_eq!(inventory["updateEnabled"], true);
    assert_eq!(inventory["tags"][0]["epc"], "AABB");
    assert_eq!(inventory["tags"][0]["antennaId"], 1);
    assert!(inventory["tags"][0]["timeserie"].is_string());
    assert_eq!(inventory["tags"][1]["epc"], "CCDD");
    let timestamp = inventory["timestamp"].as_str().unwrap();
    assert_eq!(timestamp.len(), "YYYY-MM-DD HH:MM:SS".len());

    call(&mut client, 4, "tags/stopStream").await;
    let inventory = call(&mut client, 5, "inventory/get").await;
    assert_eq!(inventory["result"]["updateEnabled"], false);
    assert_eq!(inventory["result"]["count"], 2);

    call(&mut client, 6, "rfid/disconnect").await;
    poll(&mut client, "rfid/connected", |r| r["connected"] == false).await;
    let inventory = call(&mut client, 7, "inventory/get").await;
    assert_eq!(inventory["result"]["count"], 0);

    handle.shutdown().await;
}

#[tokio::test]
async fn test_transport_errors_keep_connection_open() {
    let (addr, _reader, handle) = start_server(4).await;
    let mut client = client(addr).await;

    client.send("{not json".to_string()).await.unwrap();
    let line = client.next().await.unwrap().unwrap();
    let reply: Value = serde_json::from_str(&line).unwrap();
    assert_eq!(reply["id"], Value::Null);
    assert!(reply["error"].is_string());

    let reply = call(&mut client, 9, "rfid/reboot").await;
    assert_eq!(reply["error"], "Unknown route: rfid/reboot");

    let reply = call(&mut client, 10, "rfid/connected").await;
    assert_eq!(reply["result"]["connected"], false);

    handle.shutdown().await;
}

#[tokio::test]
async fn test_oversized_line_is_rejected() {
    let (addr, _reader, handle) = start_server(4).await;
    let mut client = client(addr).await;

    let padding = "x".repeat(MAX_LINE_LENGTH + 1);
    let request = json!({ "id": 1, "route": "inventory/get", "params": padding }).to_string();
    client.send(request).await.unwrap();

    let line = timeout(WAIT, client.next()).await.unwrap().unwrap().unwrap();
    let reply: Value = serde_json::from_str(&line).unwrap();
    assert!(reply["error"].as_str().unwrap().contains("exceeds"));

    // The server hangs up after the error reply.
    let next = timeout(WAIT, client.next()).await.unwrap();
    assert!(matches!(next, None | Some(Err(_))));

    handle.shutdown().await;
}

#[tokio::test]
async fn test_replies_stay_in_request_order() {
    let (addr, _reader, handle) = start_server(4).await;
    let mut client = client(addr).await;

    for id in 0..20u64 {
        let route = if id % 2 == 0 { "inventory/get" } else { "rfid/connected" };
        client
            .send(json!({ "id": id, "route": route }).to_string())
            .await
            .unwrap();
    }

    for id in 0..20u64 {
        let line = timeout(WAIT, client.next()).await.unwrap().unwrap().unwrap();
        let reply: Value = serde_json::from_str(&line).unwrap();
        assert_eq!(reply["id"], id);
    }

    handle.shutdown().await;
}

#[tokio::test]
async fn test_concurrent_clients() {
    let (addr, _reader, handle) = start_server(8).await;

    let mut tasks = Vec::new();
    for n in 0..5u64 {
        tasks.push(tokio::spawn(async move {
            let mut client = client(addr).await;
            for i in 0..10 {
                let reply = call(&mut client, n * 100 + i, "inventory/get").await;
                assert_eq!(reply["result"]["count"], 0);
            }
        }));
    }

    for task in tasks {
        task.await.unwrap();
    }

    handle.shutdown().await;
}

#[tokio::test]
async fn test_connections_over_limit_are_closed() {
    let (addr, _reader, handle) = start_server(1).await;

    let mut first = client(addr).await;
    call(&mut first, 1, "rfid/connected").await;

    let mut second = client(addr).await;
    second
        .send(json!({ "id": 2, "route": "rfid/connected" }).to_string())
        .await
        .ok();
    let next = timeout(WAIT, second.next()).await.unwrap();
    assert!(matches!(next, None | Some(Err(_))));

    // Slot is released once the first controller leaves.
    drop(first);
    let deadline = tokio::time::Instant::now() + WAIT;
    loop {
        let mut third = client(addr).await;
        if third
            .send(json!({ "id": 3, "route": "rfid/connected" }).to_string())
            .await
            .is_ok()
            && let Ok(Some(Ok(line))) = timeout(Duration::from_millis(200), third.next()).await
        {
            let reply: Value = serde_json::from_str(&line).unwrap();
            assert_eq!(reply["id"], 3);
            break;
        }
        assert!(tokio::time::Instant::now() < deadline, "slot never released");
        sleep(Duration::from_millis(20)).await;
    }

    handle.shutdown().await;
}
