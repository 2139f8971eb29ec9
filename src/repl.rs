//! チャットREPL
//!
//! 入力行と完了イベントを1つのループで処理する。入力が終わっても
//! 進行中のリクエストは最後まで反映してから戻る。

use crate::chat::{ChatController, ChatUpdate};
use crate::cli::{ChatCommand, CHAT_HELP};
use crate::display::{render_message, render_threads};
use crate::error::Result;
use baxathon_common::{SendOutcome, Thread};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// REPLを実行（ユーザー名は設定済みであること）
pub async fn run<R>(controller: &mut ChatController, input: R) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if !handle_command(controller, ChatCommand::parse(&line)) {
                    break;
                }
            }
            Some(update) = controller.next_event() => render_update(controller, update),
        }
    }

    if !controller.is_idle() {
        tracing::debug!("waiting for outstanding chat requests");
        for update in controller.settle().await {
            render_update(controller, update);
        }
    }
    Ok(())
}

/// `/switch` の引数をスレッドIDに解決する
///
/// IDの完全一致を優先し、なければ `/threads` の番号（`#2` または `2`）として扱う。
pub fn resolve_thread(threads: &[Thread], target: &str) -> String {
    if threads.iter().any(|t| t.id == target) {
        return target.to_string();
    }
    target
        .strip_prefix('#')
        .unwrap_or(target)
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| threads.get(i))
        .map(|t| t.id.clone())
        .unwrap_or_else(|| target.to_string())
}

/// `false` で終了
fn handle_command(controller: &mut ChatController, command: ChatCommand) -> bool {
    let now = chrono::Local::now();
    match command {
        ChatCommand::Send(text) => match controller.send(&text) {
            Ok(()) => {
                if let Some(message) = controller.flow().messages().last() {
                    println!("{}", render_message(message, now));
                }
            }
            Err(e) => println!("✖ {}", e),
        },
        ChatCommand::Threads => {
            let flow = controller.flow();
            println!("{}", render_threads(flow.threads(), flow.current_thread(), now));
        }
        ChatCommand::Reload => {
            if let Err(e) = controller.reload_threads() {
                println!("✖ {}", e);
            }
        }
        ChatCommand::Switch(target) => {
            let thread_id = resolve_thread(controller.flow().threads(), &target);
            controller.select_thread(Some(thread_id));
            print_status(controller);
        }
        ChatCommand::New => {
            controller.select_thread(None);
            print_status(controller);
        }
        ChatCommand::Help => println!("{}", CHAT_HELP),
        ChatCommand::Quit => return false,
        ChatCommand::Empty => {}
        ChatCommand::Unknown(input) => println!("unknown command: {} (try /help)", input),
    }
    true
}

fn render_update(controller: &ChatController, update: ChatUpdate) {
    let flow = controller.flow();
    let now = chrono::Local::now();
    match update {
        ChatUpdate::ThreadsLoaded => {
            if let Some(error) = flow.error_message() {
                println!("✖ {} (/reload)", error);
            } else {
                println!("{}", render_threads(flow.threads(), flow.current_thread(), now));
            }
            print_status(controller);
        }
        ChatUpdate::MessagesLoaded => {
            if let Some(error) = flow.error_message() {
                println!("✖ {}", error);
                return;
            }
            for message in flow.messages() {
                println!("{}", render_message(message, now));
            }
            print_status(controller);
        }
        ChatUpdate::Sent(SendOutcome::Delivered { created_thread, displayed }) => {
            if let Some(thread_id) = created_thread {
                println!("-- new thread {} --", thread_id);
            }
            if displayed {
                if let Some(reply) = flow.messages().last() {
                    println!("{}", render_message(reply, now));
                }
            }
        }
        ChatUpdate::Sent(SendOutcome::Failed { draft }) => {
            if let Some(error) = flow.error_message() {
                println!("✖ {}", error);
            }
            println!("  (not sent: {})", draft);
        }
        ChatUpdate::Sent(SendOutcome::Stale) | ChatUpdate::Ignored => {}
    }
}

fn print_status(controller: &ChatController) {
    if let Some(status) = controller.flow().status_message() {
        println!("  {}", status);
    }
}
