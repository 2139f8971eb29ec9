//! 稼働確認付き画像アップロード（ドライバ）

use crate::api::PredictApi;
use crate::error::{BaxathonError, Result};
use crate::preview::preview_data_url;
use baxathon_common::{HealthTicket, PredictTicket, Prediction, UploadFlow, UploadStatus};
use std::path::Path;
use tokio::sync::mpsc;

enum UploadEvent {
    Health(HealthTicket, bool),
    Preview(PredictTicket, std::result::Result<String, String>),
    Prediction(PredictTicket, std::result::Result<Prediction, String>),
}

pub struct UploadController {
    api: PredictApi,
    flow: UploadFlow,
    tx: mpsc::UnboundedSender<UploadEvent>,
    rx: mpsc::UnboundedReceiver<UploadEvent>,
    in_flight: usize,
}

impl UploadController {
    pub fn new(api: PredictApi) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            api,
            flow: UploadFlow::new(),
            tx,
            rx,
            in_flight: 0,
        }
    }

    pub fn flow(&self) -> &UploadFlow {
        &self.flow
    }

    /// ページ表示。稼働確認を1回だけ行う
    pub fn activate(&mut self) {
        let ticket = self.flow.activate();
        self.in_flight += 1;
        let api = self.api.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let live = api.health().await;
            let _ = tx.send(UploadEvent::Health(ticket, live));
        });
    }

    pub fn deactivate(&mut self) {
        self.flow.deactivate();
    }

    /// ファイル選択。プレビュー生成と判定リクエストを並行して行う
    pub fn select_file(&mut self, path: &Path) -> Result<()> {
        if !path.is_file() {
            return Err(BaxathonError::FileNotFound(path.display().to_string()));
        }
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        let ticket = self.flow.select_file(&file_name)?;
        tracing::info!(file_name = file_name.as_str(), "uploading image for prediction");

        self.in_flight += 2;
        let api = self.api.clone();
        let tx = self.tx.clone();
        let path = path.to_path_buf();
        tokio::spawn(async move {
            let bytes = match tokio::fs::read(&path).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    let _ = tx.send(UploadEvent::Preview(ticket.clone(), Err(e.to_string())));
                    let _ = tx.send(UploadEvent::Prediction(ticket, Err(e.to_string())));
                    return;
                }
            };

            let preview = {
                let bytes = bytes.clone();
                let ticket = ticket.clone();
                let tx = tx.clone();
                async move {
                    let result = tokio::task::spawn_blocking(move || preview_data_url(&bytes))
                        .await
                        .map_err(|e| e.to_string())
                        .and_then(|r| r.map_err(|e| e.to_string()));
                    let _ = tx.send(UploadEvent::Preview(ticket, result));
                }
            };
            let predict = async move {
                let result = api
                    .predict(&ticket.file_name, bytes)
                    .await
                    .map_err(|e| e.to_string());
                let _ = tx.send(UploadEvent::Prediction(ticket, result));
            };
            tokio::join!(preview, predict);
        });
        Ok(())
    }

    /// 次の完了イベントを反映し、反映後の状態を返す
    pub async fn next_event(&mut self) -> Option<UploadStatus> {
        let event = self.rx.recv().await?;
        self.in_flight = self.in_flight.saturating_sub(1);

        match event {
            UploadEvent::Health(ticket, live) => {
                if self.flow.on_health(ticket, live) {
                    if live {
                        tracing::info!("prediction service is live");
                    } else {
                        tracing::warn!("prediction service is not running; uploads disabled");
                    }
                }
            }
            UploadEvent::Preview(ticket, result) => {
                if let Err(e) = &result {
                    tracing::warn!(error = e.as_str(), "preview decode failed");
                }
                self.flow.on_preview(&ticket, result);
            }
            UploadEvent::Prediction(ticket, result) => {
                if let Err(e) = &result {
                    tracing::warn!(error = e.as_str(), "prediction failed");
                }
                if !self.flow.on_prediction(&ticket, result) {
                    tracing::debug!(
                        file_name = ticket.file_name.as_str(),
                        "ignoring stale prediction"
                    );
                }
            }
        }
        Some(self.flow.status())
    }

    pub fn is_idle(&self) -> bool {
        self.in_flight == 0
    }

    pub async fn settle(&mut self) -> UploadStatus {
        while !self.is_idle() {
            if self.next_event().await.is_none() {
                break;
            }
        }
        self.flow.status()
    }
}
