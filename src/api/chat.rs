use super::{build_client, ensure_success, join_segments, parse_base};
use crate::config::Config;
use crate::error::Result;
use baxathon_common::{
    CreateMessage, Message, MessageResponse, MessagesResponse, Thread, ThreadsResponse,
};
use reqwest::Url;

/// チャットAPIクライアント
#[derive(Debug, Clone)]
pub struct ChatApi {
    client: reqwest::Client,
    base: Url,
    version: String,
}

impl ChatApi {
    pub fn new(client: reqwest::Client, base_url: &str, version: &str) -> Result<Self> {
        Ok(Self {
            client,
            base: parse_base(base_url)?,
            version: version.trim_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(build_client()?, &config.api_base_url()?, &config.api_version)
    }

    /// `/{version}/...` のURL
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut all = vec![self.version.as_str()];
        all.extend_from_slice(segments);
        join_segments(&self.base, &all)
    }

    /// ユーザーのスレッド一覧
    pub async fn list_threads(&self, username: &str) -> Result<Vec<Thread>> {
        let url = self.endpoint(&["users", username, "threads"]);
        tracing::debug!(%url, "fetching threads");
        let response = ensure_success(self.client.get(url).send().await?)?;
        let body = response.bytes().await?;
        let parsed: ThreadsResponse = serde_json::from_slice(&body)?;
        Ok(parsed.threads)
    }

    /// スレッドのメッセージ一覧
    pub async fn list_messages(&self, thread_id: &str) -> Result<Vec<Message>> {
        let url = self.endpoint(&["threads", thread_id, "messages"]);
        tracing::debug!(%url, "fetching messages");
        let response = ensure_success(self.client.get(url).send().await?)?;
        let body = response.bytes().await?;
        let parsed: MessagesResponse = serde_json::from_slice(&body)?;
        Ok(parsed.messages)
    }

    /// メッセージ送信。ボットの返信を返す
    pub async fn create_message(&self, request: &CreateMessage) -> Result<Message> {
        let url = self.endpoint(&["messages", ""]);
        tracing::debug!(%url, thread = ?request.thread, "sending message");
        let response = ensure_success(self.client.post(url).json(request).send().await?)?;
        let body = response.bytes().await?;
        let parsed: MessageResponse = serde_json::from_slice(&body)?;
        Ok(parsed.message)
    }
}
