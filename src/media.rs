//! 背景画像の段階的読み込み（ドライバ）
//!
//! 状態遷移は `ProgressiveLoader` が持ち、ここでは取得処理の起動と
//! 完了イベントの反映だけを行う。表示中の段階は `watch` で購読できる。

use crate::api::AssetApi;
use baxathon_common::{MediaOutcome, MediaTicket, ProgressiveLoader, Tier};
use tokio::sync::{mpsc, watch};

/// 表示中の背景画像
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Displayed {
    pub key: String,
    pub tier: Tier,
    pub uri: String,
}

type LoadEvent = (MediaTicket, std::result::Result<(), String>);

pub struct MediaController {
    assets: AssetApi,
    loader: ProgressiveLoader,
    tx: mpsc::UnboundedSender<LoadEvent>,
    rx: mpsc::UnboundedReceiver<LoadEvent>,
    displayed: watch::Sender<Option<Displayed>>,
    in_flight: usize,
}

impl MediaController {
    pub fn new(assets: AssetApi, asset_base_url: &str) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let (displayed, _) = watch::channel(None);
        Self {
            assets,
            loader: ProgressiveLoader::new(asset_base_url),
            tx,
            rx,
            displayed,
            in_flight: 0,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Displayed>> {
        self.displayed.subscribe()
    }

    pub fn loader(&self) -> &ProgressiveLoader {
        &self.loader
    }

    /// ルート変更。低解像度を即時表示し、中解像度の取得を開始する
    pub fn set_route(&mut self, key: &str) {
        if let Some(ticket) = self.loader.set_route(key) {
            tracing::info!(key, "route changed, loading background");
            self.publish();
            self.spawn(ticket);
        }
    }

    fn spawn(&mut self, ticket: MediaTicket) {
        self.in_flight += 1;
        let assets = self.assets.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = assets
                .fetch(&ticket.uri)
                .await
                .map(|_| ())
                .map_err(|e| e.to_string());
            let _ = tx.send((ticket, result));
        });
    }

    fn publish(&self) {
        let current = self.loader.displayed().and_then(|(tier, uri)| {
            self.loader.media().map(|media| Displayed {
                key: media.key.clone(),
                tier,
                uri: uri.to_string(),
            })
        });
        self.displayed.send_replace(current);
    }

    /// 次の完了イベントを反映
    pub async fn next_event(&mut self) -> Option<MediaOutcome> {
        let (ticket, result) = self.rx.recv().await?;
        self.in_flight = self.in_flight.saturating_sub(1);

        let outcome = self.loader.on_loaded(&ticket, result);
        match &outcome {
            MediaOutcome::Upgraded { tier, uri, next } => {
                tracing::info!(%tier, uri = uri.as_str(), "background upgraded");
                self.publish();
                if let Some(next) = next.clone() {
                    self.spawn(next);
                }
            }
            MediaOutcome::Failed { tier, error } => {
                tracing::warn!(%tier, error = error.as_str(), "background load failed");
            }
            MediaOutcome::Stale => {
                tracing::debug!(uri = ticket.uri.as_str(), "ignoring stale background load");
            }
        }
        Some(outcome)
    }

    pub fn is_idle(&self) -> bool {
        self.in_flight == 0
    }

    /// 進行中の取得がなくなるまで処理する
    pub async fn settle(&mut self) -> Vec<MediaOutcome> {
        let mut outcomes = Vec::new();
        while !self.is_idle() {
            match self.next_event().await {
                Some(outcome) => outcomes.push(outcome),
                None => break,
            }
        }
        outcomes
    }
}
