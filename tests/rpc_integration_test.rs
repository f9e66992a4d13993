use length_convert::rpc::client::ClientOptions;
use length_convert::rpc::server::ServerLimits;
use length_convert::utils::error::ErrorCategory;
use length_convert::{ConvertClient, ConvertError, ConvertHandler, LengthConverter, RpcServer};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

async fn start_server(
    converter: LengthConverter,
    limits: ServerLimits,
) -> (SocketAddr, oneshot::Sender<()>, JoinHandle<()>) {
    let handler = ConvertHandler::new(Arc::new(converter));
    let server = RpcServer::bind("127.0.0.1:0", handler, limits).await.unwrap();
    let addr = server.local_addr().unwrap();
    let (stop_tx, stop_rx) = oneshot::channel::<()>();

    let handle = tokio::spawn(async move {
        server
            .serve_with_shutdown(async {
                let _ = stop_rx.await;
            })
            .await
            .unwrap();
    });

    (addr, stop_tx, handle)
}

#[tokio::test]
async fn test_client_script_flow() {
    let (addr, stop, handle) = start_server(LengthConverter::basic(), ServerLimits::default()).await;

    let mut client = ConvertClient::connect(addr, ClientOptions::default()).await.unwrap();

    let units = client.available_units().await.unwrap();
    assert_eq!(units, vec!["m", "cm", "in", "ft", "yd"]);

    let answer = client.convert("10 cm in m").await.unwrap();
    assert_eq!(answer, "10 cm equals 0.1 m");

    let answer = client.convert("2 km in ft").await.unwrap();
    assert_eq!(
        answer,
        "'km' is not a valid unit. Available units are 'm', 'cm', 'in', 'ft', 'yd'"
    );

    client.close().await.unwrap();
    stop.send(()).unwrap();
    handle.await.unwrap();
}

#[tokio::test]
async fn test_extended_catalog_over_rpc() {
    let (addr, stop, handle) =
        start_server(LengthConverter::extended(), ServerLimits::default()).await;

    let mut client = ConvertClient::connect(addr, ClientOptions::default()).await.unwrap();
    assert_eq!(client.available_units().await.unwrap().len(), 10);
    assert_eq!(
        client.convert("1 mi in mm").await.unwrap(),
        "1 mi equals 1609344 mm"
    );

    drop(client);
    stop.send(()).unwrap();
    handle.await.unwrap();
}

#[tokio::test]
async fn test_raw_protocol_faults() {
    let (addr, stop, handle) = start_server(LengthConverter::basic(), ServerLimits::default()).await;

    let stream = TcpStream::connect(addr).await.unwrap();
    let (read_half, mut write_half) = stream.into_split();
    let mut lines = BufReader::new(read_half).lines();

    write_half.write_all(b"this is not json\n").await.unwrap();
    let reply: serde_json::Value =
        serde_json::from_str(&lines.next_line().await.unwrap().unwrap()).unwrap();
    assert_eq!(reply["id"], 0);
    assert_eq!(reply["error"]["kind"], "parse_error");

    write_half
        .write_all(b"{\"method\":\"reboot\",\"id\":3}\n")
        .await
        .unwrap();
    let reply: serde_json::Value =
        serde_json::from_str(&lines.next_line().await.unwrap().unwrap()).unwrap();
    assert_eq!(reply["id"], 3);
    assert_eq!(reply["error"]["kind"], "unknown_method");

    // 連線在錯誤之後仍可使用
    write_half
        .write_all(b"{\"method\":\"convert\",\"id\":4,\"input\":\"1 yd in in\"}\n")
        .await
        .unwrap();
    let reply: serde_json::Value =
        serde_json::from_str(&lines.next_line().await.unwrap().unwrap()).unwrap();
    assert_eq!(reply["id"], 4);
    assert_eq!(reply["result"], "1 yd equals 36 in");

    stop.send(()).unwrap();
    handle.await.unwrap();
}

#[tokio::test]
async fn test_oversized_line_closes_connection() {
    let limits = ServerLimits {
        max_line_length: 128,
        ..ServerLimits::default()
    };
    let (addr, stop, handle) = start_server(LengthConverter::basic(), limits).await;

    let mut stream = TcpStream::connect(addr).await.unwrap();
    let long_line = format!("{}\n", "x".repeat(4096));
    let _ = stream.write_all(long_line.as_bytes()).await;

    let mut lines = BufReader::new(stream).lines();
    let next = tokio::time::timeout(Duration::from_secs(5), lines.next_line())
        .await
        .expect("server should close the connection");
    assert!(matches!(next, Ok(None) | Err(_)));

    stop.send(()).unwrap();
    handle.await.unwrap();
}

#[tokio::test]
async fn test_concurrent_clients() {
    let (addr, stop, handle) = start_server(LengthConverter::basic(), ServerLimits::default()).await;

    let tasks: Vec<_> = (1..=8)
        .map(|i| {
            tokio::spawn(async move {
                let mut client = ConvertClient::connect(addr, ClientOptions::default())
                    .await
                    .unwrap();
                client.convert(&format!("{} m in cm", i)).await.unwrap()
            })
        })
        .collect();

    for (i, task) in tasks.into_iter().enumerate() {
        let answer = task.await.unwrap();
        assert_eq!(answer, format!("{} m equals {} cm", i + 1, (i + 1) * 100));
    }

    stop.send(()).unwrap();
    handle.await.unwrap();
}

#[tokio::test]
async fn test_request_timeout_against_silent_server() {
    // 接受連線但永遠不回應
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let silent = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(5)).await;
        drop(stream);
    });

    let options = ClientOptions {
        request_timeout: Duration::from_millis(100),
        ..ClientOptions::default()
    };
    let mut client = ConvertClient::connect(addr, options).await.unwrap();

    let err = client.available_units().await.unwrap_err();
    assert!(matches!(err, ConvertError::TimeoutError { .. }));
    assert_eq!(err.category(), ErrorCategory::Network);

    silent.abort();
}

#[tokio::test]
async fn test_connection_refused() {
    // 先綁定再釋放，取得一個沒人在聽的埠
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = ConvertClient::connect(addr, ClientOptions::default())
        .await
        .err()
        .expect("nothing is listening");
    assert_eq!(err.category(), ErrorCategory::Network);
    assert_eq!(err.exit_code(), 2);
}

#[tokio::test]
async fn test_connections_past_the_limit_wait_for_a_permit() {
    let limits = ServerLimits {
        max_connections: 1,
        ..ServerLimits::default()
    };
    let (addr, stop, handle) = start_server(LengthConverter::basic(), limits).await;

    let mut first = ConvertClient::connect(addr, ClientOptions::default()).await.unwrap();
    assert_eq!(first.convert("1 m in cm").await.unwrap(), "1 m equals 100 cm");

    // TCP 連線由 backlog 接受，但要等第一條連線釋放名額才會被服務
    let waiting = tokio::spawn(async move {
        let mut second = ConvertClient::connect(addr, ClientOptions::default())
            .await
            .unwrap();
        let answer = second.convert("2 m in cm").await.unwrap();
        second.close().await.unwrap();
        answer
    });

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(!waiting.is_finished());

    first.close().await.unwrap();
    let answer = tokio::time::timeout(Duration::from_secs(5), waiting)
        .await
        .expect("second client is served once the first disconnects")
        .unwrap();
    assert_eq!(answer, "2 m equals 200 cm");

    stop.send(()).unwrap();
    handle.await.unwrap();
}

#[tokio::test]
async fn test_shutdown_closes_idle_connections() {
    let (addr, stop, handle) = start_server(LengthConverter::basic(), ServerLimits::default()).await;

    let stream = TcpStream::connect(addr).await.unwrap();
    let (read_half, mut write_half) = stream.into_split();
    let mut lines = BufReader::new(read_half).lines();

    write_half
        .write_all(b"{\"method\":\"available_units\",\"id\":1}\n")
        .await
        .unwrap();
    assert!(lines.next_line().await.unwrap().is_some());

    stop.send(()).unwrap();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("server waits only for connections to wind down")
        .unwrap();

    let next = tokio::time::timeout(Duration::from_secs(5), lines.next_line())
        .await
        .expect("connection is closed by the server");
    assert!(matches!(next, Ok(None) | Err(_)));
}

#[tokio::test]
async fn test_late_reply_after_timeout_is_discarded() {
    // 第一個請求回覆得太慢，之後照順序回覆
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let slow = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let (read_half, mut write_half) = stream.into_split();
        let mut lines = BufReader::new(read_half).lines();

        lines.next_line().await.unwrap().unwrap();
        tokio::time::sleep(Duration::from_millis(500)).await;
        write_half
            .write_all(b"{\"id\":1,\"result\":[\"m\"]}\n")
            .await
            .unwrap();

        lines.next_line().await.unwrap().unwrap();
        write_half
            .write_all(b"{\"id\":2,\"result\":\"1 m equals 100 cm\"}\n")
            .await
            .unwrap();
    });

    let options = ClientOptions {
        request_timeout: Duration::from_millis(250),
        ..ClientOptions::default()
    };
    let mut client = ConvertClient::connect(addr, options).await.unwrap();

    let err = client.available_units().await.unwrap_err();
    assert!(matches!(err, ConvertError::TimeoutError { .. }));

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(client.convert("1 m in cm").await.unwrap(), "1 m equals 100 cm");

    slow.await.unwrap();
}
