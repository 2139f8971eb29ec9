//! ページルートとナビゲーション

/// ヘッダーに表示するブランド名
pub const BRAND: &str = "BAXATHON";

/// ページルート
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    WhiskeyGoggles,
    Bob,
    HoneyBarrel,
}

impl Route {
    /// ナビゲーションの表示順
    pub const ALL: [Route; 3] = [Route::WhiskeyGoggles, Route::Bob, Route::HoneyBarrel];

    /// `/` はWhiskey Gogglesへリダイレクト
    pub const DEFAULT: Route = Route::WhiskeyGoggles;

    /// パス（先頭スラッシュ有無・大文字小文字を問わない）からルートを解決
    ///
    /// 未知のパスは `None`
    pub fn from_path(path: &str) -> Option<Route> {
        let key = path.trim().trim_start_matches('/').trim_end_matches('/');
        if key.is_empty() {
            return Some(Self::DEFAULT);
        }
        Self::ALL
            .into_iter()
            .find(|route| route.key().eq_ignore_ascii_case(key))
    }

    /// ルートキー（背景画像のファイル名にも使う）
    pub fn key(&self) -> &'static str {
        match self {
            Route::WhiskeyGoggles => "whiskeygoggles",
            Route::Bob => "bob",
            Route::HoneyBarrel => "honeybarrel",
        }
    }

    pub fn path(&self) -> String {
        format!("/{}", self.key())
    }

    /// ページタイトル
    pub fn title(&self) -> &'static str {
        match self {
            Route::WhiskeyGoggles => "Whiskey Goggles",
            Route::Bob => "BOB",
            Route::HoneyBarrel => "Honey Barrel",
        }
    }

    pub fn nav_label(&self) -> &'static str {
        match self {
            Route::WhiskeyGoggles => "Whiskey Goggles",
            Route::Bob => "Bob",
            Route::HoneyBarrel => "Honey Barrel",
        }
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}
