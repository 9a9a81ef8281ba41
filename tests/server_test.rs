//! End-to-end tests over TCP.

mod common;

use std::time::Duration;

use axum::http::Method;
use common::{labelled, route, start_server};

#[tokio::test]
async fn test_negotiated_response_over_tcp() {
    let (addr, shutdown) = start_server(vec![
        route(Method::GET, "/greeting", labelled("hello")).produces("text/plain; charset=utf-8"),
        route(Method::GET, "/greeting", labelled("{\"hello\":true}")).produces("application/json"),
    ])
    .await;

    let client = reqwest::Client::new();

    let res = client
        .get(format!("http://{}/greeting", addr))
        .header("accept", "application/json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.headers()["content-type"], "application/json");
    assert_eq!(res.headers()["vary"], "Accept");
    assert!(res.headers().contains_key("x-request-id"));
    assert_eq!(res.text().await.unwrap(), "{\"hello\":true}");

    let res = client
        .get(format!("http://{}/greeting", addr))
        .header("accept", "image/png")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 406);

    let res = client
        .request(reqwest::Method::OPTIONS, format!("http://{}/greeting", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.headers()["allow"], "GET, HEAD, OPTIONS");

    shutdown.trigger();
}

#[tokio::test]
async fn test_graceful_shutdown_stops_accepting() {
    let (addr, shutdown) =
        start_server(vec![route(Method::GET, "/", labelled("up"))]).await;

    let res = reqwest::get(format!("http://{}/", addr)).await.unwrap();
    assert_eq!(res.text().await.unwrap(), "up");

    shutdown.trigger();
    tokio::time::sleep(Duration::from_millis(200)).await;

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(1))
        .build()
        .unwrap();
    let result = client.get(format!("http://{}/", addr)).send().await;
    assert!(result.is_err());
}
