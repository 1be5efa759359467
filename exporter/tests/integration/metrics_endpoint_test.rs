//! Integration Test: メトリクスエンドポイント

use checkhost_exporter::api::{create_router, METRICS_CONTENT_TYPE};
use checkhost_exporter::AppState;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

use crate::support::checkhost::{
    complete_result_body, cycle, start_check_body, DOMAIN, REQUEST_ID,
};
use crate::support::http::spawn_server;

/// サイクル完了後、/metrics に request_time が出力される
#[tokio::test]
async fn test_metrics_endpoint_exposes_published_values() {
    let mock = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/check-http"))
        .respond_with(ResponseTemplate::new(200).set_body_json(start_check_body()))
        .mount(&mock)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/check-result/{}", REQUEST_ID)))
        .respond_with(ResponseTemplate::new(200).set_body_json(complete_result_body()))
        .mount(&mock)
        .await;

    let (cycle, gauge) = cycle(&mock, 10);
    let server = spawn_server(create_router(AppState { gauge })).await;

    cycle.run_once().await.unwrap();

    let response = reqwest::get(format!("http://{}/metrics", server.addr()))
        .await
        .expect("metrics request failed");

    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(
        response.headers()["content-type"].to_str().unwrap(),
        METRICS_CONTENT_TYPE
    );

    let body = response.text().await.unwrap();
    assert!(body.contains("# TYPE request_time gauge"));
    assert!(body.contains(&format!(r#"request_time{{from="US",to="{}"}} 0.123"#, DOMAIN)));
    assert!(body.contains(&format!(r#"request_time{{from="DE",to="{}"}} 0"#, DOMAIN)));

    server.stop().await;
}

/// 未知のパスは404
#[tokio::test]
async fn test_unknown_path_returns_not_found() {
    let mock = MockServer::start().await;
    let (_cycle, gauge) = cycle(&mock, 10);
    let server = spawn_server(create_router(AppState { gauge })).await;

    let response = reqwest::get(format!("http://{}/status", server.addr()))
        .await
        .expect("request failed");

    assert_eq!(response.status().as_u16(), 404);
    assert!(response.text().await.unwrap().contains("/metrics"));

    server.stop().await;
}
