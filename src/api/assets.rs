use super::{build_client, ensure_success};
use crate::error::Result;

/// 背景画像の取得
#[derive(Debug, Clone)]
pub struct AssetApi {
    client: reqwest::Client,
}

impl AssetApi {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    pub fn with_default_client() -> Result<Self> {
        Ok(Self::new(build_client()?))
    }

    /// 画像を取得し、バイト数を返す
    pub async fn fetch(&self, uri: &str) -> Result<usize> {
        let response = ensure_success(self.client.get(uri).send().await?)?;
        let body = response.bytes().await?;
        tracing::debug!(uri, bytes = body.len(), "asset loaded");
        Ok(body.len())
    }
}
