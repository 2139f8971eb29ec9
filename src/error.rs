use thiserror::Error;

#[derive(Error, Debug)]
pub enum BaxathonError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("HTTP通信エラー: {0}")]
    Http(#[from] reqwest::Error),

    #[error("APIエラー: {status} {url}")]
    ApiStatus { status: u16, url: String },

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("画像デコードエラー: {0}")]
    ImageDecode(#[from] image::ImageError),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("操作を受け付けられません: {0}")]
    Rejected(#[from] baxathon_common::Error),
}

impl From<baxathon_common::UploadRejected> for BaxathonError {
    fn from(err: baxathon_common::UploadRejected) -> Self {
        BaxathonError::Rejected(err.into())
    }
}

impl From<baxathon_common::ChatRejected> for BaxathonError {
    fn from(err: baxathon_common::ChatRejected) -> Self {
        BaxathonError::Rejected(err.into())
    }
}

pub type Result<T> = std::result::Result<T, BaxathonError>;
