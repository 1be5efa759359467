//! メトリクスエンドポイント
//!
//! `/metrics`（Prometheusテキスト形式）と `/`（案内ページ）

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use tracing::{debug, error};

use crate::AppState;

/// Prometheusテキスト形式のContent-Type
pub const METRICS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

const INDEX_HTML: &str = r#"<html>
<head><title>Checkhost Exporter</title></head>
<body>
<h2>Checkhost Exporter</h2>
<p>Use <a href="/metrics">/metrics</a> url to get metrics</p>
</body>
</html>
"#;

/// APIルーターを作成
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/metrics", get(metrics))
        .fallback(not_found)
        .with_state(state)
}

/// GET /metrics - 現在のゲージ値を返す
async fn metrics(State(state): State<AppState>) -> Response {
    match state.gauge.render() {
        Ok(body) => {
            debug!("Send metrics");
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, METRICS_CONTENT_TYPE)],
                body,
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to encode metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to encode metrics").into_response()
        }
    }
}

/// GET / - 案内ページ
async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Not found. Use /metrics url")
}
