//! axumサーバー起動・シャットダウンハンドリング

use checkhost_exporter_common::error::{ExporterError, ExporterResult};
use tokio::net::TcpListener;
use tracing::info;

use crate::AppState;

/// バインド済みリスナーでメトリクスエンドポイントを提供する
///
/// Ctrl+C / SIGTERM を受け取ると `Ok(())` で戻る。
pub async fn serve(listener: TcpListener, state: AppState) -> ExporterResult<()> {
    let app = crate::api::create_router(state);

    if let Ok(addr) = listener.local_addr() {
        info!("Checkhost exporter listening on {}", addr);
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ExporterError::Server(e.to_string()))?;

    info!("Server shutdown complete");
    Ok(())
}

/// アドレスにバインドしてサーバーを起動する
pub async fn run(state: AppState, bind_addr: &str) -> ExporterResult<()> {
    let listener = TcpListener::bind(bind_addr)
        .await
        .map_err(|e| ExporterError::Server(format!("failed to bind {}: {}", bind_addr, e)))?;

    serve(listener, state).await
}

/// シャットダウンシグナルを待機
async fn shutdown_signal() {
    let ctrl_c = async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down...");
        }
        _ = terminate => {
            info!("Received SIGTERM, shutting down...");
        }
    }
}
