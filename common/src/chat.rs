//! スレッド付きチャットの状態機械
//!
//! `no-username → idle(no-threads) → idle(has-threads) ⇄ loading-messages ⇄ idle(messages-loaded)`
//! に加えて、送信中フラグ（`sending`）を直交して持つ。
//!
//! 表示中のメッセージは常に選択中スレッドのもの。スレッド切り替え時は
//! 取得完了を待たずにメッセージを空にし、古いスレッドの取得結果は世代トークンで破棄する。

use crate::error::ChatRejected;
use crate::generation::{Generation, GenerationCounter};
use crate::types::{CreateMessage, Message, SenderType, Thread};

pub const THREADS_FAILED_MESSAGE: &str = "Failed to load threads. Please try again.";
pub const MESSAGES_FAILED_MESSAGE: &str = "Failed to load messages. Please try again.";
pub const SEND_FAILED_MESSAGE: &str = "Failed to send message. Please try again.";

/// メッセージ欄に表示するステータス
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusMessage {
    Loading,
    NoMessages,
}

impl StatusMessage {
    pub fn text(&self) -> &'static str {
        match self {
            StatusMessage::Loading => "Loading messages...",
            StatusMessage::NoMessages => "No messages yet...",
        }
    }
}

impl std::fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.text())
    }
}

/// ステータス表示の導出（純粋関数）
pub fn derive_status(
    has_username: bool,
    messages_loading: bool,
    message_count: usize,
) -> Option<StatusMessage> {
    if !has_username {
        None
    } else if messages_loading {
        Some(StatusMessage::Loading)
    } else if message_count == 0 {
        Some(StatusMessage::NoMessages)
    } else {
        None
    }
}

/// スレッド一覧取得の要求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadsTicket {
    pub generation: Generation,
    pub username: String,
}

/// メッセージ一覧取得の要求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessagesTicket {
    pub generation: Generation,
    pub thread_id: String,
}

/// メッセージ送信の要求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendTicket {
    /// 送信時点のスレッド世代
    pub generation: Generation,
    /// 楽観的に追加したメッセージのID
    pub local_id: String,
    pub request: CreateMessage,
}

/// 送信完了の反映結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// 現在の送信要求ではない
    Stale,
    Delivered {
        /// サーバが新規作成したスレッド
        created_thread: Option<String>,
        /// 返信を表示中のメッセージに追加したか（送信後にスレッドを切り替えた場合は `false`）
        displayed: bool,
    },
    /// 楽観的メッセージを取り消した。`draft` を入力欄に戻す
    Failed { draft: String },
}

#[derive(Debug, Clone, Default)]
pub struct ChatFlow {
    username: Option<String>,
    threads: Vec<Thread>,
    current_thread: Option<String>,
    messages: Vec<Message>,
    threads_loading: bool,
    messages_loading: bool,
    sending: Option<String>,
    error: Option<String>,
    thread_list_generations: GenerationCounter,
    thread_generations: GenerationCounter,
}

impl ChatFlow {
    pub fn new() -> Self {
        Self::default()
    }

    /// ユーザー名の設定（1回のみ）。スレッド一覧の取得要求を返す
    pub fn set_username(&mut self, name: &str) -> Result<ThreadsTicket, ChatRejected> {
        if self.username.is_some() {
            return Err(ChatRejected::UsernameAlreadySet);
        }
        let name = name.trim();
        if name.is_empty() {
            return Err(ChatRejected::EmptyUsername);
        }

        self.username = Some(name.to_string());
        self.threads_loading = true;
        Ok(ThreadsTicket {
            generation: self.thread_list_generations.advance(),
            username: name.to_string(),
        })
    }

    /// スレッド一覧の再取得（取得失敗後の再試行）
    pub fn reload_threads(&mut self) -> Result<ThreadsTicket, ChatRejected> {
        let username = self.username.clone().ok_or(ChatRejected::NoUsername)?;
        self.threads_loading = true;
        if self.error.as_deref() == Some(THREADS_FAILED_MESSAGE) {
            self.error = None;
        }
        Ok(ThreadsTicket {
            generation: self.thread_list_generations.advance(),
            username,
        })
    }

    /// スレッド一覧の取得結果を反映
    ///
    /// 一覧が空でなく、まだスレッドが選ばれていなければ先頭を選択し、
    /// そのメッセージ取得要求を返す。
    pub fn on_threads_loaded(
        &mut self,
        ticket: &ThreadsTicket,
        result: Result<Vec<Thread>, String>,
    ) -> Option<MessagesTicket> {
        if !self.thread_list_generations.is_current(ticket.generation) {
            return None;
        }
        self.threads_loading = false;

        let threads = match result {
            Ok(threads) => threads,
            Err(_) => {
                self.error = Some(THREADS_FAILED_MESSAGE.to_string());
                return None;
            }
        };

        // 一覧取得前の送信で作られたスレッドは残す
        let created: Vec<Thread> = self
            .threads
            .drain(..)
            .filter(|local| !threads.iter().any(|t| t.id == local.id))
            .collect();
        self.threads = created.into_iter().chain(threads).collect();

        if self.current_thread.is_some() || self.sending.is_some() {
            return None;
        }
        let first = self.threads.first().map(|t| t.id.clone())?;
        self.set_current_thread(Some(first))
    }

    /// 選択スレッドの変更（`None` は新規スレッド）
    ///
    /// メッセージはこの時点で空にする。スレッドを選んだ場合は取得要求を返す。
    /// 同じスレッドの再選択は、エラー表示中（再試行）の場合だけ取得し直す。
    pub fn set_current_thread(&mut self, thread_id: Option<String>) -> Option<MessagesTicket> {
        if self.current_thread == thread_id && self.error.is_none() {
            return None;
        }

        let generation = self.thread_generations.advance();
        self.current_thread = thread_id.clone();
        self.messages.clear();
        self.error = None;

        match thread_id {
            Some(thread_id) => {
                self.messages_loading = true;
                Some(MessagesTicket { generation, thread_id })
            }
            None => {
                self.messages_loading = false;
                None
            }
        }
    }

    /// メッセージ一覧の取得結果を反映（古いスレッドの結果は破棄）
    pub fn on_messages_loaded(
        &mut self,
        ticket: &MessagesTicket,
        result: Result<Vec<Message>, String>,
    ) -> bool {
        if !self.thread_generations.is_current(ticket.generation) {
            return false;
        }
        self.messages_loading = false;
        match result {
            Ok(messages) => self.messages = messages,
            Err(_) => {
                self.messages.clear();
                self.error = Some(MESSAGES_FAILED_MESSAGE.to_string());
            }
        }
        true
    }

    /// メッセージ送信
    ///
    /// ユーザーのメッセージを即座に表示へ追加し（楽観的更新）、送信要求を返す。
    /// 送信中の再送信は拒否する。
    pub fn send_message(
        &mut self,
        content: &str,
        local_id: &str,
        now: &str,
    ) -> Result<SendTicket, ChatRejected> {
        let username = self.username.clone().ok_or(ChatRejected::NoUsername)?;
        if self.sending.is_some() {
            return Err(ChatRejected::AlreadySending);
        }
        if self.messages_loading {
            return Err(ChatRejected::MessagesLoading);
        }
        let content = content.trim();
        if content.is_empty() {
            return Err(ChatRejected::EmptyMessage);
        }

        self.messages.push(Message {
            id: local_id.to_string(),
            thread_id: self.current_thread.clone().unwrap_or_default(),
            sender_type: SenderType::User,
            content: content.to_string(),
            created_at: now.to_string(),
        });
        self.sending = Some(local_id.to_string());
        self.error = None;

        Ok(SendTicket {
            generation: self.thread_generations.current(),
            local_id: local_id.to_string(),
            request: CreateMessage {
                username,
                thread: self.current_thread.clone(),
                content: content.to_string(),
            },
        })
    }

    /// 送信結果を反映
    pub fn on_send_complete(
        &mut self,
        ticket: &SendTicket,
        result: Result<Message, String>,
    ) -> SendOutcome {
        if self.sending.as_deref() != Some(ticket.local_id.as_str()) {
            return SendOutcome::Stale;
        }
        self.sending = None;
        let same_thread = self.thread_generations.is_current(ticket.generation);

        let reply = match result {
            Ok(reply) => reply,
            Err(_) => {
                self.messages.retain(|m| m.id != ticket.local_id);
                if same_thread {
                    self.error = Some(SEND_FAILED_MESSAGE.to_string());
                }
                return SendOutcome::Failed {
                    draft: ticket.request.content.clone(),
                };
            }
        };

        let created_thread = if ticket.request.thread.is_none() {
            let thread_id = reply.thread_id.clone();
            if !self.threads.iter().any(|t| t.id == thread_id) {
                self.threads.insert(0, Thread {
                    id: thread_id.clone(),
                    username: ticket.request.username.clone(),
                    created_at: reply.created_at.clone(),
                });
            }
            Some(thread_id)
        } else {
            None
        };

        if !same_thread {
            return SendOutcome::Delivered { created_thread, displayed: false };
        }

        if let Some(thread_id) = &created_thread {
            self.current_thread = Some(thread_id.clone());
            for message in self.messages.iter_mut().filter(|m| m.id == ticket.local_id) {
                message.thread_id = thread_id.clone();
            }
        }
        self.messages.push(reply);

        SendOutcome::Delivered { created_thread, displayed: true }
    }

    pub fn status_message(&self) -> Option<StatusMessage> {
        derive_status(self.username.is_some(), self.messages_loading, self.messages.len())
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn threads(&self) -> &[Thread] {
        &self.threads
    }

    pub fn current_thread(&self) -> Option<&str> {
        self.current_thread.as_deref()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_threads_loading(&self) -> bool {
        self.threads_loading
    }

    pub fn is_messages_loading(&self) -> bool {
        self.messages_loading
    }

    pub fn is_sending(&self) -> bool {
        self.sending.is_some()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref()
    }
}
