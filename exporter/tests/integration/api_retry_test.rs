//! Integration Test: APIリクエストのリトライ

use checkhost_exporter::checkhost::JsonFetcher;
use checkhost_exporter_common::error::ExporterError;
use checkhost_exporter_common::types::CheckType;
use serde_json::json;
use wiremock::{
    matchers::{header, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

use crate::support::checkhost::{fetcher, requester, start_check_body, DOMAIN, REQUEST_ID};

/// 常に500を返すサーバーには設定回数ちょうど試行して致命的エラーになる
#[tokio::test]
async fn test_retries_exhausted_after_configured_attempts() {
    let mock = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/check-http"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&mock)
        .await;

    let err = requester(&mock.uri(), 3)
        .start_check(CheckType::Http, DOMAIN, 7)
        .await
        .unwrap_err();

    match &err {
        ExporterError::RetriesExhausted { url, attempts } => {
            assert_eq!(*attempts, 3);
            assert!(url.contains("/check-http"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.is_fatal());
}

/// 一時的な失敗の後に200が返れば成功する
#[tokio::test]
async fn test_transient_failure_recovers() {
    let mock = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("/check-result/{}", REQUEST_ID)))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&mock)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/check-result/{}", REQUEST_ID)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"us1.node.check-host.net": null})))
        .expect(1)
        .mount(&mock)
        .await;

    let raw = requester(&mock.uri(), 3)
        .fetch_raw_result(REQUEST_ID)
        .await
        .unwrap();

    assert_eq!(raw, json!({"us1.node.check-host.net": null}));
}

/// リクエストはAcceptヘッダーとクエリパラメータを含む
#[tokio::test]
async fn test_start_check_request_shape() {
    let mock = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/check-ping"))
        .and(query_param("host", "https://example.com"))
        .and(query_param("max_nodes", "4"))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(start_check_body()))
        .expect(1)
        .mount(&mock)
        .await;

    let request = requester(&mock.uri(), 1)
        .start_check(CheckType::Ping, DOMAIN, 4)
        .await
        .unwrap();

    assert_eq!(request.request_id, REQUEST_ID);
    assert_eq!(request.target_nodes.len(), 2);
}

/// 不正なJSONはリトライせず致命的エラーになる
#[tokio::test]
async fn test_malformed_json_is_fatal_decode_error() {
    let mock = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .expect(1)
        .mount(&mock)
        .await;

    let err = fetcher(3)
        .fetch_json(&format!("{}/check-result/{}", mock.uri(), REQUEST_ID))
        .await
        .unwrap_err();

    assert!(matches!(err, ExporterError::Decode(_)));
    assert!(err.is_fatal());
}

/// 接続エラーも失敗試行として数える
#[tokio::test]
async fn test_connection_error_counts_as_attempt() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = fetcher(2)
        .fetch_json(&format!("http://{}/check-result/{}", addr, REQUEST_ID))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ExporterError::RetriesExhausted { attempts: 2, .. }
    ));
}
