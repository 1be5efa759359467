//! Checkhost Exporter Common
//!
//! exporterで共有する型定義・プロトコル・設定・エラー

#![warn(missing_docs)]

/// 設定管理
pub mod config;

/// エラー型定義
pub mod error;

/// check-host API プロトコル
pub mod protocol;

/// 共通型定義
pub mod types;
