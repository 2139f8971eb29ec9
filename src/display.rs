//! 端末表示用の整形

use baxathon_common::{Message, Route, Thread, BRAND};
use chrono::{DateTime, Local};

/// ヘッダーとナビゲーション（選択中のルートは `[...]` で囲む）
pub fn render_header(active: Option<Route>) -> String {
    let nav = Route::ALL
        .iter()
        .map(|route| {
            if Some(*route) == active {
                format!("[{}]", route.nav_label())
            } else {
                format!(" {} ", route.nav_label())
            }
        })
        .collect::<Vec<_>>()
        .join("  ");
    format!("===== {} =====\n{}", BRAND, nav)
}

/// 「Today at 14:05」形式の日時表示
///
/// 解析できない文字列はそのまま返す。
pub fn format_friendly_date(timestamp: &str, now: DateTime<Local>) -> String {
    let Ok(parsed) = DateTime::parse_from_rfc3339(timestamp) else {
        return timestamp.to_string();
    };
    let local = parsed.with_timezone(&Local);
    let time = local.format("%H:%M");

    let days = now.date_naive().signed_duration_since(local.date_naive()).num_days();
    match days {
        0 => format!("Today at {}", time),
        1 => format!("Yesterday at {}", time),
        _ => format!("{} at {}", local.format("%b %-d, %Y"), time),
    }
}

/// チャットメッセージ1件
pub fn render_message(message: &Message, now: DateTime<Local>) -> String {
    let who = if message.is_bot() { "BOB" } else { "you" };
    format!(
        "{:>4} | {}\n     | {}",
        who,
        message.content.replace('\n', "\n     | "),
        format_friendly_date(&message.created_at, now)
    )
}

/// スレッド一覧（番号は `/switch` で使う）
pub fn render_threads(threads: &[Thread], current: Option<&str>, now: DateTime<Local>) -> String {
    if threads.is_empty() {
        return "  (no threads yet; your next message starts one)".to_string();
    }
    threads
        .iter()
        .enumerate()
        .map(|(i, thread)| {
            let marker = if Some(thread.id.as_str()) == current { "*" } else { " " };
            format!(
                "{} {:>2}. {}  {}",
                marker,
                i + 1,
                thread.id,
                format_friendly_date(&thread.created_at, now)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub const HONEY_BARREL_REPO: &str = "https://github.com/LoreviQ/Baxus-Honey-Barrel";
pub const HONEY_BARREL_DOWNLOAD: &str =
    "https://github.com/LoreviQ/Baxus-Honey-Barrel/releases/download/v1.0.0/honeybarrel.zip";

/// Honey Barrel の案内ページ
pub fn honey_barrel_page() -> String {
    format!(
        "\
Baxus Honey Barrel (BOB)
{repo}

How it Works
  - BOB automatically scans supported retailer sites (like The Whisky Exchange & Flask Fine Wines) for bottle details.
  - It checks the BAXUS marketplace for better prices on the same bottle.
  - If a saving is found, BOB alerts you with a link to the BAXUS listing.
  - Includes \"Whiskey Goggles\" feature: Select an image on any page to identify the bottle using a local service.

Installation (Unpacked Extension)
  1. Download the extension .zip file and unzip it.
  2. Open Google Chrome and navigate to chrome://extensions/.
  3. Enable \"Developer mode\" using the toggle switch in the top-right corner.
  4. Click the \"Load unpacked\" button.
  5. Select the folder you unzipped in Step 1.
  6. BOB is ready! Look for the BAXUS Honey Barrel icon in your Chrome extensions toolbar.

Download: {download}",
        repo = HONEY_BARREL_REPO,
        download = HONEY_BARREL_DOWNLOAD,
    )
}
