//! BOBとのチャット（ドライバ）
//!
//! リクエストはtokioタスクで実行し、完了はチャネル経由で1か所に集めて
//! `ChatFlow` へ反映する。状態を書き換えるのは常に呼び出し側のタスクだけ。

use crate::api::ChatApi;
use crate::error::Result;
use baxathon_common::{
    ChatFlow, Message, MessagesTicket, SendOutcome, SendTicket, Thread, ThreadsTicket,
};
use tokio::sync::mpsc;

enum ChatEvent {
    Threads(ThreadsTicket, std::result::Result<Vec<Thread>, String>),
    Messages(MessagesTicket, std::result::Result<Vec<Message>, String>),
    Sent(SendTicket, std::result::Result<Message, String>),
}

/// 完了イベントの反映結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatUpdate {
    ThreadsLoaded,
    MessagesLoaded,
    Sent(SendOutcome),
    /// 古い要求の完了（何も変更していない）
    Ignored,
}

pub struct ChatController {
    api: ChatApi,
    flow: ChatFlow,
    tx: mpsc::UnboundedSender<ChatEvent>,
    rx: mpsc::UnboundedReceiver<ChatEvent>,
    in_flight: usize,
}

impl ChatController {
    pub fn new(api: ChatApi) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            api,
            flow: ChatFlow::new(),
            tx,
            rx,
            in_flight: 0,
        }
    }

    pub fn flow(&self) -> &ChatFlow {
        &self.flow
    }

    /// ユーザー名を設定し、スレッド一覧の取得を開始
    pub fn set_username(&mut self, name: &str) -> Result<()> {
        let ticket = self.flow.set_username(name)?;
        self.load_threads(ticket);
        Ok(())
    }

    /// スレッド一覧を取得し直す
    pub fn reload_threads(&mut self) -> Result<()> {
        let ticket = self.flow.reload_threads()?;
        self.load_threads(ticket);
        Ok(())
    }

    fn load_threads(&mut self, ticket: ThreadsTicket) {
        tracing::info!(username = ticket.username.as_str(), "loading threads");
        self.in_flight += 1;
        let api = self.api.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = api
                .list_threads(&ticket.username)
                .await
                .map_err(|e| e.to_string());
            let _ = tx.send(ChatEvent::Threads(ticket, result));
        });
    }

    /// スレッド選択（`None` は新規スレッド）
    ///
    /// 読み込みに失敗したスレッドを選び直すと再取得する。
    pub fn select_thread(&mut self, thread_id: Option<String>) {
        if let Some(ticket) = self.flow.set_current_thread(thread_id) {
            self.load_messages(ticket);
        }
    }

    fn load_messages(&mut self, ticket: MessagesTicket) {
        tracing::debug!(thread_id = ticket.thread_id.as_str(), "loading messages");
        self.in_flight += 1;
        let api = self.api.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = api
                .list_messages(&ticket.thread_id)
                .await
                .map_err(|e| e.to_string());
            let _ = tx.send(ChatEvent::Messages(ticket, result));
        });
    }

    /// メッセージ送信（楽観的に表示へ追加してからリクエストする）
    pub fn send(&mut self, content: &str) -> Result<()> {
        let local_id = uuid::Uuid::new_v4().to_string();
        let now = chrono::Utc::now().to_rfc3339();
        let ticket = self.flow.send_message(content, &local_id, &now)?;

        self.in_flight += 1;
        let api = self.api.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = api
                .create_message(&ticket.request)
                .await
                .map_err(|e| e.to_string());
            let _ = tx.send(ChatEvent::Sent(ticket, result));
        });
        Ok(())
    }

    /// 次の完了イベントを反映
    pub async fn next_event(&mut self) -> Option<ChatUpdate> {
        let event = self.rx.recv().await?;
        self.in_flight = self.in_flight.saturating_sub(1);

        let update = match event {
            ChatEvent::Threads(ticket, result) => {
                if let Err(e) = &result {
                    tracing::warn!(error = e.as_str(), "failed to load threads");
                }
                let was_loading = self.flow.is_threads_loading();
                if let Some(next) = self.flow.on_threads_loaded(&ticket, result) {
                    self.load_messages(next);
                }
                if was_loading && !self.flow.is_threads_loading() {
                    ChatUpdate::ThreadsLoaded
                } else {
                    ChatUpdate::Ignored
                }
            }
            ChatEvent::Messages(ticket, result) => {
                if let Err(e) = &result {
                    tracing::warn!(
                        error = e.as_str(),
                        thread_id = ticket.thread_id.as_str(),
                        "failed to load messages"
                    );
                }
                if self.flow.on_messages_loaded(&ticket, result) {
                    ChatUpdate::MessagesLoaded
                } else {
                    tracing::debug!(
                        thread_id = ticket.thread_id.as_str(),
                        "ignoring stale messages"
                    );
                    ChatUpdate::Ignored
                }
            }
            ChatEvent::Sent(ticket, result) => {
                if let Err(e) = &result {
                    tracing::warn!(error = e.as_str(), "failed to send message");
                }
                match self.flow.on_send_complete(&ticket, result) {
                    SendOutcome::Stale => ChatUpdate::Ignored,
                    outcome => ChatUpdate::Sent(outcome),
                }
            }
        };
        Some(update)
    }

    pub fn is_idle(&self) -> bool {
        self.in_flight == 0
    }

    /// 進行中のリクエストがなくなるまで処理する
    pub async fn settle(&mut self) -> Vec<ChatUpdate> {
        let mut updates = Vec::new();
        while !self.is_idle() {
            match self.next_event().await {
                Some(update) => updates.push(update),
                None => break,
            }
        }
        updates
    }
}
