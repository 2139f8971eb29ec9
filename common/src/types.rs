//! バックエンドとの通信型定義
//!
//! - Thread / Message: チャットAPI（スレッド一覧・メッセージ一覧・送信）
//! - Prediction: 画像判定APIの結果

use serde::{Deserialize, Serialize};

/// 送信者種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SenderType {
    #[serde(rename = "user")]
    User,
    #[serde(rename = "BOB", alias = "bot", alias = "character")]
    Bot,
}

/// スレッド概要
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thread {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    pub created_at: String,
}

/// チャットメッセージ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    #[serde(rename = "_id")]
    pub id: String,
    pub thread_id: String,
    pub sender_type: SenderType,
    pub content: String,
    pub created_at: String,
}

impl Message {
    pub fn is_bot(&self) -> bool {
        self.sender_type == SenderType::Bot
    }
}

/// `GET /users/{username}/threads` のレスポンス
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThreadsResponse {
    #[serde(default)]
    pub threads: Vec<Thread>,
}

/// `GET /threads/{id}/messages` のレスポンス
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessagesResponse {
    #[serde(default)]
    pub messages: Vec<Message>,
}

/// `POST /messages/` のリクエスト
///
/// `thread` が `None` の場合、サーバ側で新規スレッドが作成される。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateMessage {
    pub username: String,
    pub thread: Option<String>,
    pub content: String,
}

/// `POST /messages/` のレスポンス（ボットの返信）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: Message,
}

/// 画像判定結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub id: String,
    pub name: String,
    /// 信頼度（0-100）
    pub final_score_percent: f64,
}

impl Prediction {
    /// 0-100の範囲に丸めた信頼度
    pub fn confidence(&self) -> f64 {
        self.final_score_percent.clamp(0.0, 100.0)
    }
}
