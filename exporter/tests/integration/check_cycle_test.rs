//! Integration Test: チェック開始 → 結果ポーリング → ゲージ更新

use checkhost_exporter_common::error::ExporterError;
use serde_json::json;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

use crate::support::checkhost::{
    complete_result_body, cycle, pending_result_body, start_check_body, DE_NODE, DOMAIN,
    REQUEST_ID, US_NODE,
};

async fn mount_start_check(mock: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/check-http"))
        .respond_with(ResponseTemplate::new(200).set_body_json(start_check_body()))
        .mount(mock)
        .await;
}

/// 部分結果の間はポーリングを続け、完了後にゲージを更新する
#[tokio::test]
async fn test_cycle_polls_partial_results_then_publishes() {
    let mock = MockServer::start().await;
    mount_start_check(&mock).await;

    Mock::given(method("GET"))
        .and(path(format!("/check-result/{}", REQUEST_ID)))
        .respond_with(ResponseTemplate::new(200).set_body_json(pending_result_body()))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/check-result/{}", REQUEST_ID)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            US_NODE: [[1, 0.1234, "OK", "200", "93.184.216.34"]],
            DE_NODE: null
        })))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/check-result/{}", REQUEST_ID)))
        .respond_with(ResponseTemplate::new(200).set_body_json(complete_result_body()))
        .expect(1)
        .mount(&mock)
        .await;

    let (cycle, gauge) = cycle(&mock, 10);
    let records = cycle.run_once().await.unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(gauge.value("US", DOMAIN), Some(0.123));
    assert_eq!(gauge.value("DE", DOMAIN), Some(0.0));
}

/// レート制限時はゲージを更新しない
#[tokio::test]
async fn test_cycle_rate_limited_leaves_gauge_untouched() {
    let mock = MockServer::start().await;
    mount_start_check(&mock).await;

    Mock::given(method("GET"))
        .and(path(format!("/check-result/{}", REQUEST_ID)))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"error": "limit_exceeded"})),
        )
        .expect(1)
        .mount(&mock)
        .await;

    let (cycle, gauge) = cycle(&mock, 10);
    let err = cycle.run_once().await.unwrap_err();

    assert!(matches!(err, ExporterError::RateLimited));
    assert!(err.requires_backoff());
    assert_eq!(gauge.value("US", DOMAIN), None);
    assert_eq!(gauge.value("DE", DOMAIN), None);
}

/// 結果が揃わないまま上限に達するとTimeoutになる
#[tokio::test]
async fn test_cycle_poll_ceiling_times_out() {
    let mock = MockServer::start().await;
    mount_start_check(&mock).await;

    Mock::given(method("GET"))
        .and(path(format!("/check-result/{}", REQUEST_ID)))
        .respond_with(ResponseTemplate::new(200).set_body_json(pending_result_body()))
        .expect(3)
        .mount(&mock)
        .await;

    let (cycle, gauge) = cycle(&mock, 3);
    let err = cycle.run_once().await.unwrap_err();

    assert!(matches!(err, ExporterError::Timeout { attempts: 3 }));
    assert!(!err.is_fatal());
    assert_eq!(gauge.value("US", DOMAIN), None);
}

/// 前サイクルの値は次のサイクルで上書きされる
#[tokio::test]
async fn test_consecutive_cycles_overwrite_gauge() {
    let mock = MockServer::start().await;
    mount_start_check(&mock).await;

    Mock::given(method("GET"))
        .and(path(format!("/check-result/{}", REQUEST_ID)))
        .respond_with(ResponseTemplate::new(200).set_body_json(complete_result_body()))
        .up_to_n_times(1)
        .mount(&mock)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/check-result/{}", REQUEST_ID)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            US_NODE: [[0, 10.0, "Connection timed out", null, null]],
            DE_NODE: [[1, 0.0456, "OK", "200", "93.184.216.34"]]
        })))
        .mount(&mock)
        .await;

    let (cycle, gauge) = cycle(&mock, 10);

    cycle.run_once().await.unwrap();
    assert_eq!(gauge.value("US", DOMAIN), Some(0.123));

    cycle.run_once().await.unwrap();
    assert_eq!(gauge.value("US", DOMAIN), Some(0.0));
    assert_eq!(gauge.value("DE", DOMAIN), Some(0.046));
}
