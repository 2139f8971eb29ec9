use super::{build_client, ensure_success, join_segments, parse_base};
use crate::config::Config;
use crate::error::Result;
use crate::preview::mime_for;
use baxathon_common::Prediction;
use reqwest::multipart::{Form, Part};
use reqwest::Url;

/// 画像判定APIクライアント
#[derive(Debug, Clone)]
pub struct PredictApi {
    client: reqwest::Client,
    base: Url,
}

impl PredictApi {
    pub fn new(client: reqwest::Client, base_url: &str) -> Result<Self> {
        Ok(Self {
            client,
            base: parse_base(base_url)?,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(build_client()?, &config.predict_base_url()?)
    }

    /// 稼働確認（`GET /` が2xxなら稼働中）
    ///
    /// 通信失敗も停止中として扱う。
    pub async fn health(&self) -> bool {
        match self.client.get(self.base.clone()).send().await {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                tracing::warn!(
                    status = %response.status(),
                    "prediction service health check failed"
                );
                false
            }
            Err(e) => {
                tracing::warn!(error = %e, "prediction service unreachable");
                false
            }
        }
    }

    /// 画像を送信して判定結果を取得
    pub async fn predict(&self, file_name: &str, bytes: Vec<u8>) -> Result<Prediction> {
        let url = join_segments(&self.base, &["predict"]);
        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(mime_for(file_name))?;
        let form = Form::new().part("file", part);

        tracing::debug!(%url, file_name, "requesting prediction");
        let response = ensure_success(self.client.post(url).multipart(form).send().await?)?;
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}
