//! BAXATHON Common Library
//!
//! 通信を伴わない状態機械と通信型。ネットワーク処理はすべて呼び出し側が行い、
//! 完了時に要求チケットと結果を渡して状態へ反映する。

pub mod chat;
pub mod error;
pub mod generation;
pub mod media;
pub mod route;
pub mod types;
pub mod upload;

pub use chat::{
    derive_status, ChatFlow, MessagesTicket, SendOutcome, SendTicket, StatusMessage, ThreadsTicket,
};
pub use error::{ChatRejected, Error, Result, UploadRejected};
pub use generation::{Generation, GenerationCounter};
pub use media::{LoadState, MediaOutcome, MediaSet, MediaTicket, ProgressiveLoader, Tier};
pub use route::{Route, BRAND};
pub use types::{
    CreateMessage, Message, MessageResponse, MessagesResponse, Prediction, SenderType, Thread,
    ThreadsResponse,
};
pub use upload::{
    HealthTicket, PredictTicket, PredictionSession, ServiceHealth, UploadFlow, UploadStatus,
};
