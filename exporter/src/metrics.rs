//! メトリクス公開
//!
//! ノードごとの応答時間を `request_time{from, to}` ゲージに書き込む。

use std::sync::Arc;

use checkhost_exporter_common::error::{ExporterError, ExporterResult};
use checkhost_exporter_common::types::NodeMetricRecord;
use prometheus::{GaugeVec, Opts, Registry, TextEncoder};
use tracing::debug;

/// ゲージ名
pub const REQUEST_TIME_METRIC: &str = "request_time";

/// ラベル名（チェック元の国、チェック対象ドメイン）
const LABELS: [&str; 2] = ["from", "to"];

/// ゲージの書き込み先
///
/// 実装は内部で同期されていること（ポーリングタスクが書き込み、
/// メトリクスエンドポイントが同時に読み出す）。
pub trait GaugeSink: Send + Sync {
    /// `(from, to)` ラベルのゲージ値を設定する
    fn set(&self, from: &str, to: &str, value: f64);
}

/// Prometheusレジストリに登録された `request_time` ゲージ
#[derive(Clone)]
pub struct PrometheusGauge {
    registry: Registry,
    gauge: GaugeVec,
}

impl PrometheusGauge {
    /// 専用レジストリにゲージを登録して作成
    pub fn new() -> ExporterResult<Self> {
        let registry = Registry::new();
        let gauge = GaugeVec::new(
            Opts::new(
                REQUEST_TIME_METRIC,
                "Response time of the target domain measured from check-host nodes (seconds)",
            ),
            &LABELS,
        )
        .map_err(|e| ExporterError::Metrics(e.to_string()))?;

        registry
            .register(Box::new(gauge.clone()))
            .map_err(|e| ExporterError::Metrics(e.to_string()))?;

        Ok(Self { registry, gauge })
    }

    /// Prometheusテキスト形式にエンコード
    pub fn render(&self) -> ExporterResult<String> {
        TextEncoder::new()
            .encode_to_string(&self.registry.gather())
            .map_err(|e| ExporterError::Metrics(e.to_string()))
    }

    /// 現在のゲージ値（未設定なら `None`）
    pub fn value(&self, from: &str, to: &str) -> Option<f64> {
        self.registry
            .gather()
            .iter()
            .filter(|family| family.get_name() == REQUEST_TIME_METRIC)
            .flat_map(|family| family.get_metric())
            .find(|metric| {
                let labels = metric.get_label();
                labels
                    .iter()
                    .any(|l| l.get_name() == "from" && l.get_value() == from)
                    && labels
                        .iter()
                        .any(|l| l.get_name() == "to" && l.get_value() == to)
            })
            .map(|metric| metric.get_gauge().get_value())
    }
}

impl GaugeSink for PrometheusGauge {
    fn set(&self, from: &str, to: &str, value: f64) {
        self.gauge.with_label_values(&[from, to]).set(value);
    }
}

/// メトリクスパブリッシャー
#[derive(Clone)]
pub struct MetricPublisher {
    /// ゲージの書き込み先
    sink: Arc<dyn GaugeSink>,
    /// チェック対象ドメイン（`to` ラベル）
    target_domain: String,
}

impl MetricPublisher {
    /// 新しいパブリッシャーを作成
    pub fn new(sink: Arc<dyn GaugeSink>, target_domain: impl Into<String>) -> Self {
        Self {
            sink,
            target_domain: target_domain.into(),
        }
    }

    /// チェック対象ドメイン
    pub fn target_domain(&self) -> &str {
        &self.target_domain
    }

    /// レコードをゲージに反映する
    ///
    /// 同じ国のノードが複数ある場合は後勝ち。
    pub fn publish(&self, records: &[NodeMetricRecord]) {
        for record in records {
            self.sink
                .set(&record.country, &self.target_domain, record.response_time_secs);
            debug!(
                from = %record.country,
                to = %self.target_domain,
                value = record.response_time_secs,
                "Gauge updated"
            );
        }
    }
}
