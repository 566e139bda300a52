use cellview_communication::{ApiResponse, CommandSink, PanelClient, ScreenApi, TouchPoint};
use cellview_core::{ConnectionError, Error};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

// Serves exactly one canned HTTP response and hands back the raw request.
async fn one_shot_server(status: &'static str, body: &'static str) -> (String, oneshot::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
            if request_complete(&request) {
                break;
            }
        }
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
        let _ = tx.send(String::from_utf8_lossy(&request).to_string());
    });

    (format!("http://{}", addr), rx)
}

fn request_complete(raw: &[u8]) -> bool {
    let text = String::from_utf8_lossy(raw);
    let Some(header_end) = text.find("\r\n\r\n") else {
        return false;
    };
    let content_length = text[..header_end]
        .lines()
        .find_map(|line| {
            let lower = line.to_ascii_lowercase();
            lower
                .strip_prefix("content-length:")
                .map(|v| v.trim().parse::<usize>().unwrap_or(0))
        })
        .unwrap_or(0);
    raw.len() >= header_end + 4 + content_length
}

#[tokio::test]
async fn test_refresh_screen_decodes_envelope() {
    let (base, request) =
        one_shot_server("200 OK", r#"{"success":true,"data":"refresh_screen : cashe done"}"#).await;
    let client = PanelClient::new(&base, Duration::from_secs(8)).unwrap();

    let response = client.refresh_screen().await.unwrap();
    assert_eq!(response, ApiResponse::ok("refresh_screen : cashe done"));

    let raw = request.await.unwrap();
    assert!(raw.starts_with("POST /api/screen/refresh_screen "));
}

#[tokio::test]
async fn test_key_press_is_form_encoded() {
    let (base, request) =
        one_shot_server("200 OK", r#"{"success":true,"data":"keypad: 15 byte sent"}"#).await;
    let client = PanelClient::new(&base, Duration::from_secs(8)).unwrap();

    let response = client.key_press("DIAL:RIGH").await.unwrap();
    assert!(response.success);

    let raw = request.await.unwrap();
    assert!(raw.starts_with("POST /api/scpi/keyp "));
    assert!(raw
        .to_ascii_lowercase()
        .contains("content-type: application/x-www-form-urlencoded"));
    assert!(raw.ends_with("value=DIAL%3ARIGH"));
}

#[tokio::test]
async fn test_touch_sends_device_coordinates() {
    let (base, request) =
        one_shot_server("200 OK", r#"{"success":true,"data":"touch: 12 byte sent"}"#).await;
    let client = PanelClient::new(&base, Duration::from_secs(8)).unwrap();

    client.touch(TouchPoint::new(133, 266)).await.unwrap();

    let raw = request.await.unwrap();
    assert!(raw.starts_with("POST /api/scpi/touch "));
    assert!(raw.ends_with("x=133&y=266"));
}

#[tokio::test]
async fn test_error_envelope_is_business_failure() {
    let (base, _request) =
        one_shot_server("400 Bad Request", r#"{"success":false,"data":"x,y value missing"}"#).await;
    let client = PanelClient::new(&base, Duration::from_secs(8)).unwrap();

    let response = client.touch(TouchPoint::new(0, 0)).await.unwrap();
    assert_eq!(response, ApiResponse::failed("x,y value missing"));
}

#[tokio::test]
async fn test_plain_error_status_is_transport_failure() {
    let (base, _request) = one_shot_server("503 Service Unavailable", "Poller thread respond timeout").await;
    let client = PanelClient::new(&base, Duration::from_secs(8)).unwrap();

    let err = client.refresh_screen().await.unwrap_err();
    assert!(matches!(
        err,
        Error::Connection(ConnectionError::HttpStatus { status: 503, .. })
    ));
    assert!(!err.is_timeout());
}

#[tokio::test]
async fn test_silent_server_times_out() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (_socket, _) = listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(5)).await;
    });

    let client = PanelClient::new(&format!("http://{}", addr), Duration::from_millis(200)).unwrap();
    let err = client.refresh_screen().await.unwrap_err();
    assert!(err.is_timeout(), "expected timeout, got {err}");
}

#[tokio::test]
async fn test_refused_connection_is_transport_failure() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = PanelClient::new(&format!("http://{}", addr), Duration::from_secs(2)).unwrap();
    let err = client.refresh_screen().await.unwrap_err();
    assert!(matches!(
        err,
        Error::Connection(ConnectionError::Transport { .. })
    ));
}
