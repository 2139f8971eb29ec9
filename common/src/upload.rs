//! サービス稼働確認付きアップロードの状態機械
//!
//! `checking-service → {idle | service-down}`、稼働中は
//! `idle → predicting → {success | error}`。判定中と停止中はアップロード不可。
//! ページ離脱後は `inactive` となり、再度 `activate()` するまで何も受け付けない。

use crate::error::UploadRejected;
use crate::generation::{Generation, GenerationCounter};
use crate::types::Prediction;

pub const SERVICE_DOWN_MESSAGE: &str = "Cannot upload image: service is not running.";
pub const PREDICTION_FAILED_MESSAGE: &str = "Failed to identify the bottle. Please try again.";

/// アップロードフローの状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStatus {
    Inactive,
    CheckingService,
    ServiceDown,
    Idle,
    Predicting,
    Success,
    Error,
}

impl UploadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadStatus::Inactive => "inactive",
            UploadStatus::CheckingService => "checking-service",
            UploadStatus::ServiceDown => "service-down",
            UploadStatus::Idle => "idle",
            UploadStatus::Predicting => "predicting",
            UploadStatus::Success => "success",
            UploadStatus::Error => "error",
        }
    }
}

/// 判定サービスの稼働状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ServiceHealth {
    /// `None` は未確認
    pub live: Option<bool>,
    pub checking: bool,
}

/// 稼働確認の要求
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthTicket {
    pub generation: Generation,
}

/// 画像判定の要求（ファイル選択1回につき1つ）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictTicket {
    pub generation: Generation,
    pub file_name: String,
}

/// 1回分のアップロード・判定
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PredictionSession {
    pub file_name: String,
    /// ローカルでデコードしたプレビュー（data URL）
    pub preview: Option<String>,
    pub result: Option<Prediction>,
}

#[derive(Debug, Clone)]
pub struct UploadFlow {
    activations: GenerationCounter,
    selections: GenerationCounter,
    health: ServiceHealth,
    status: UploadStatus,
    session: Option<PredictionSession>,
    error: Option<String>,
}

impl Default for UploadFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl UploadFlow {
    pub fn new() -> Self {
        Self {
            activations: GenerationCounter::new(),
            selections: GenerationCounter::new(),
            health: ServiceHealth::default(),
            status: UploadStatus::CheckingService,
            session: None,
            error: None,
        }
    }

    /// ページ表示時に1回だけ呼ぶ。稼働確認の要求を返す
    pub fn activate(&mut self) -> HealthTicket {
        let generation = self.activations.advance();
        self.selections.advance();
        self.health = ServiceHealth { live: None, checking: true };
        self.status = UploadStatus::CheckingService;
        self.session = None;
        self.error = None;
        HealthTicket { generation }
    }

    /// ページ離脱。進行中の要求はすべて無効になる
    pub fn deactivate(&mut self) {
        self.activations.advance();
        self.selections.advance();
        self.health = ServiceHealth::default();
        self.status = UploadStatus::Inactive;
        self.session = None;
        self.error = None;
    }

    /// 稼働確認の結果を反映（通信失敗は `false` として渡す）
    pub fn on_health(&mut self, ticket: HealthTicket, live: bool) -> bool {
        if !self.activations.is_current(ticket.generation) {
            return false;
        }
        self.health = ServiceHealth { live: Some(live), checking: false };
        if live {
            self.status = UploadStatus::Idle;
            self.error = None;
        } else {
            self.status = UploadStatus::ServiceDown;
            self.error = Some(SERVICE_DOWN_MESSAGE.to_string());
        }
        true
    }

    /// アップロード操作が可能か
    pub fn can_upload(&self) -> bool {
        matches!(
            self.status,
            UploadStatus::Idle | UploadStatus::Success | UploadStatus::Error
        )
    }

    /// ファイル選択。受け付けた場合は判定要求を返す
    pub fn select_file(&mut self, file_name: &str) -> Result<PredictTicket, UploadRejected> {
        match self.status {
            UploadStatus::Inactive => return Err(UploadRejected::Inactive),
            UploadStatus::CheckingService => return Err(UploadRejected::CheckingService),
            UploadStatus::ServiceDown => return Err(UploadRejected::ServiceDown),
            UploadStatus::Predicting => return Err(UploadRejected::AlreadyPredicting),
            UploadStatus::Idle | UploadStatus::Success | UploadStatus::Error => {}
        }

        let generation = self.selections.advance();
        self.session = Some(PredictionSession {
            file_name: file_name.to_string(),
            ..Default::default()
        });
        self.status = UploadStatus::Predicting;
        self.error = None;

        Ok(PredictTicket {
            generation,
            file_name: file_name.to_string(),
        })
    }

    /// プレビュー生成結果を反映
    ///
    /// デコード失敗はプレビューなしとして扱い、判定は続行する。
    pub fn on_preview(&mut self, ticket: &PredictTicket, preview: Result<String, String>) -> bool {
        if !self.selections.is_current(ticket.generation) || self.status == UploadStatus::Error {
            return false;
        }
        match (self.session.as_mut(), preview) {
            (Some(session), Ok(data_url)) => {
                session.preview = Some(data_url);
                true
            }
            _ => false,
        }
    }

    /// 判定結果を反映
    pub fn on_prediction(
        &mut self,
        ticket: &PredictTicket,
        result: Result<Prediction, String>,
    ) -> bool {
        if !self.selections.is_current(ticket.generation)
            || self.status != UploadStatus::Predicting
        {
            return false;
        }
        match result {
            Ok(prediction) => {
                if let Some(session) = self.session.as_mut() {
                    session.result = Some(prediction);
                }
                self.status = UploadStatus::Success;
            }
            Err(_) => {
                self.session = None;
                self.status = UploadStatus::Error;
                self.error = Some(PREDICTION_FAILED_MESSAGE.to_string());
            }
        }
        true
    }

    pub fn status(&self) -> UploadStatus {
        self.status
    }

    pub fn health(&self) -> ServiceHealth {
        self.health
    }

    pub fn session(&self) -> Option<&PredictionSession> {
        self.session.as_ref()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref()
    }
}
