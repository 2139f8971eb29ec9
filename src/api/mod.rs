//! バックエンドAPIクライアント
//!
//! - ChatApi: スレッド・メッセージ
//! - PredictApi: 稼働確認・画像判定
//! - AssetApi: 背景画像の取得

mod assets;
mod chat;
mod predict;

pub use assets::AssetApi;
pub use chat::ChatApi;
pub use predict::PredictApi;

use crate::error::{BaxathonError, Result};
use reqwest::{Response, Url};

/// 共有HTTPクライアント（タイムアウトはトランスポートのデフォルトに任せる）
pub fn build_client() -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .user_agent(concat!("baxathon/", env!("CARGO_PKG_VERSION")))
        .build()?)
}

/// ベースURLの解析
pub(crate) fn parse_base(base_url: &str) -> Result<Url> {
    let url = Url::parse(base_url)
        .map_err(|e| BaxathonError::Config(format!("不正なURL: {} ({})", base_url, e)))?;
    if url.cannot_be_a_base() {
        return Err(BaxathonError::Config(format!("不正なURL: {}", base_url)));
    }
    Ok(url)
}

/// ベースURLにパスセグメントを追加（各セグメントはエンコードされる）
pub(crate) fn join_segments(base: &Url, segments: &[&str]) -> Url {
    let mut url = base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url
}

/// 2xx以外はエラー
pub(crate) fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if !status.is_success() {
        return Err(BaxathonError::ApiStatus {
            status: status.as_u16(),
            url: response.url().to_string(),
        });
    }
    Ok(response)
}
