//! 背景画像の段階的読み込み
//!
//! 低解像度 → 中解像度 → 高解像度の順に表示を引き上げる。
//! - 低解像度は即座に表示可能とみなす
//! - 高解像度の読み込みは中解像度の読み込み成功後にのみ開始する
//! - ルートが変わった時点で、以前のルートの読み込み完了はすべて無視する

use crate::generation::{Generation, GenerationCounter};
use crate::route::Route;

/// 未知のルートで使う背景画像キー
pub const DEFAULT_MEDIA_KEY: &str = "default";

/// 解像度の段階
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tier {
    Low,
    Medium,
    High,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Low => "low",
            Tier::Medium => "medium",
            Tier::High => "high",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// ルートキーから決定的に導出される3段階の画像URI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaSet {
    pub key: String,
    pub low: String,
    pub medium: String,
    pub high: String,
}

impl MediaSet {
    /// `{base}/{key}-{tier}.jpg` 形式のURIを生成（未知のキーは `default`）
    pub fn for_key(base: &str, key: &str) -> Self {
        let key = Route::from_path(key)
            .map(|route| route.key())
            .unwrap_or(DEFAULT_MEDIA_KEY);
        let base = base.trim_end_matches('/');
        let uri = |tier: Tier| format!("{}/{}-{}.jpg", base, key, tier);

        Self {
            key: key.to_string(),
            low: uri(Tier::Low),
            medium: uri(Tier::Medium),
            high: uri(Tier::High),
        }
    }

    pub fn uri(&self, tier: Tier) -> &str {
        match tier {
            Tier::Low => &self.low,
            Tier::Medium => &self.medium,
            Tier::High => &self.high,
        }
    }
}

/// 読み込み完了済みの段階
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LoadState {
    None,
    LowOnly,
    LowMedium,
    All,
}

impl LoadState {
    /// 現在表示できる最高の段階
    pub fn displayed_tier(&self) -> Option<Tier> {
        match self {
            LoadState::None => None,
            LoadState::LowOnly => Some(Tier::Low),
            LoadState::LowMedium => Some(Tier::Medium),
            LoadState::All => Some(Tier::High),
        }
    }

    /// 次に読み込むべき段階
    fn awaiting(&self) -> Option<Tier> {
        match self {
            LoadState::LowOnly => Some(Tier::Medium),
            LoadState::LowMedium => Some(Tier::High),
            LoadState::None | LoadState::All => None,
        }
    }
}

/// 1段階分の読み込み要求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaTicket {
    pub generation: Generation,
    pub tier: Tier,
    pub uri: String,
}

/// 読み込み完了を反映した結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaOutcome {
    /// 以前のルートの読み込み（何も変更しない）
    Stale,
    /// 表示段階が上がった。`next` があれば続けて読み込む
    Upgraded {
        tier: Tier,
        uri: String,
        next: Option<MediaTicket>,
    },
    /// 読み込み失敗。表示は最後に成功した段階のまま（再試行しない）
    Failed { tier: Tier, error: String },
}

/// 段階的読み込みの状態機械
#[derive(Debug, Clone)]
pub struct ProgressiveLoader {
    base: String,
    generations: GenerationCounter,
    media: Option<MediaSet>,
    state: LoadState,
}

impl ProgressiveLoader {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            generations: GenerationCounter::new(),
            media: None,
            state: LoadState::None,
        }
    }

    /// ルートを切り替える
    ///
    /// 低解像度を即時表示にし、中解像度の読み込み要求を返す。
    /// 同じキーへの切り替えは何もしない（`None`）。
    pub fn set_route(&mut self, key: &str) -> Option<MediaTicket> {
        let media = MediaSet::for_key(&self.base, key);
        if self.media.as_ref().map(|m| m.key.as_str()) == Some(media.key.as_str()) {
            return None;
        }

        let generation = self.generations.advance();
        let ticket = MediaTicket {
            generation,
            tier: Tier::Medium,
            uri: media.medium.clone(),
        };
        self.media = Some(media);
        self.state = LoadState::LowOnly;
        Some(ticket)
    }

    /// 読み込み完了を反映
    pub fn on_loaded(
        &mut self,
        ticket: &MediaTicket,
        result: std::result::Result<(), String>,
    ) -> MediaOutcome {
        if !self.generations.is_current(ticket.generation)
            || self.state.awaiting() != Some(ticket.tier)
        {
            return MediaOutcome::Stale;
        }
        let Some(media) = self.media.as_ref() else {
            return MediaOutcome::Stale;
        };

        if let Err(error) = result {
            return MediaOutcome::Failed { tier: ticket.tier, error };
        }

        let next = match ticket.tier {
            Tier::Medium => {
                self.state = LoadState::LowMedium;
                Some(MediaTicket {
                    generation: ticket.generation,
                    tier: Tier::High,
                    uri: media.high.clone(),
                })
            }
            Tier::High => {
                self.state = LoadState::All;
                None
            }
            Tier::Low => None,
        };

        MediaOutcome::Upgraded {
            tier: ticket.tier,
            uri: media.uri(ticket.tier).to_string(),
            next,
        }
    }

    pub fn load_state(&self) -> LoadState {
        self.state
    }

    pub fn media(&self) -> Option<&MediaSet> {
        self.media.as_ref()
    }

    /// 現在表示すべき段階とURI
    pub fn displayed(&self) -> Option<(Tier, &str)> {
        let media = self.media.as_ref()?;
        let tier = self.state.displayed_tier()?;
        Some((tier, media.uri(tier)))
    }
}
