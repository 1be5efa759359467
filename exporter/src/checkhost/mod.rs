//! check-host API クライアント
//!
//! チェック開始・結果取得（requester）と、結果のポーリング・変換（mapper）

pub mod mapper;
pub mod requester;

pub use mapper::CheckResultMapper;
pub use requester::{CheckRequester, HttpJsonFetcher, JsonFetcher};
