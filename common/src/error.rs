//! エラー型定義

use thiserror::Error;

/// 共通エラー型
///
/// 状態遷移として受け付けられない操作（拒否）と、ワイヤ形式の解析失敗を表す。
#[derive(Error, Debug)]
pub enum Error {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Upload rejected: {0}")]
    Upload(#[from] UploadRejected),

    #[error("Chat rejected: {0}")]
    Chat(#[from] ChatRejected),
}

/// アップロード操作の拒否理由
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadRejected {
    #[error("upload page is not active")]
    Inactive,

    #[error("service health is still being checked")]
    CheckingService,

    #[error("Cannot upload image: service is not running.")]
    ServiceDown,

    #[error("a prediction is already in progress")]
    AlreadyPredicting,
}

/// チャット操作の拒否理由
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRejected {
    #[error("username is required")]
    NoUsername,

    #[error("username is empty")]
    EmptyUsername,

    #[error("username has already been set")]
    UsernameAlreadySet,

    #[error("message is empty")]
    EmptyMessage,

    #[error("a message is already being sent")]
    AlreadySending,

    #[error("messages are still loading")]
    MessagesLoading,
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
