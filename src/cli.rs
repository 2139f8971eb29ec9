use crate::config::Environment;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "baxathon")]
#[command(about = "BAXATHON: Whiskey Goggles, BOB chat and Honey Barrel", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// 接続先環境 (local/production)
    #[arg(long, global = true)]
    pub env: Option<Environment>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// ヘッダーとナビゲーションを表示
    Routes,

    /// ルートの背景画像を段階的に読み込む
    Media {
        /// ルート (whiskeygoggles/bob/honeybarrel)
        #[arg(default_value = "/")]
        route: String,
    },

    /// ボトル画像を判定 (Whiskey Goggles)
    Predict {
        /// 画像ファイル
        #[arg(required = true)]
        file: PathBuf,
    },

    /// BOBとチャット
    Chat {
        /// ユーザー名（省略時は入力を求める）
        #[arg(short, long)]
        username: Option<String>,
    },

    /// Honey Barrel 拡張機能の案内を表示
    Honeybarrel,

    /// 設定を表示/編集
    Config {
        /// 接続先環境を保存
        #[arg(long)]
        set_env: Option<Environment>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}

/// チャットREPLの入力
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    Send(String),
    Threads,
    Reload,
    Switch(String),
    New,
    Help,
    Quit,
    Empty,
    Unknown(String),
}

impl ChatCommand {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return ChatCommand::Empty;
        }
        let Some(command) = line.strip_prefix('/') else {
            return ChatCommand::Send(line.to_string());
        };

        let mut parts = command.splitn(2, char::is_whitespace);
        let name = parts.next().unwrap_or_default();
        let arg = parts.next().map(str::trim).unwrap_or_default();
        match (name, arg) {
            ("threads" | "t", _) => ChatCommand::Threads,
            ("reload" | "r", _) => ChatCommand::Reload,
            ("switch" | "s", id) if !id.is_empty() => ChatCommand::Switch(id.to_string()),
            ("new" | "n", _) => ChatCommand::New,
            ("help" | "h" | "?", _) => ChatCommand::Help,
            ("quit" | "q" | "exit", _) => ChatCommand::Quit,
            _ => ChatCommand::Unknown(line.to_string()),
        }
    }
}

pub const CHAT_HELP: &str = "\
  <text>        send a message to BOB
  /threads      list your threads
  /reload       fetch the thread list again
  /switch <id>  open a thread (id, or #n from /threads); again to retry
  /new          start a new thread
  /quit         leave";
