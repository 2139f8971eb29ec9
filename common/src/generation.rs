//! 世代トークン
//!
//! 非同期処理の開始時に現在の世代を取得し、完了時に一致する場合のみ結果を反映する。
//! パラメータ（ルート、スレッド等）が変わるたびに世代を進めることで、
//! 古いリクエストの完了を安全に無視できる。

use serde::{Deserialize, Serialize};

/// 世代トークン
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Generation(u64);

impl Generation {
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// 単調増加する世代カウンタ
#[derive(Debug, Clone, Default)]
pub struct GenerationCounter {
    current: Generation,
}

impl GenerationCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// 世代を進め、新しい世代を返す（以前の世代はすべて無効になる）
    pub fn advance(&mut self) -> Generation {
        self.current = Generation(self.current.0 + 1);
        self.current
    }

    pub fn current(&self) -> Generation {
        self.current
    }

    pub fn is_current(&self, generation: Generation) -> bool {
        self.current == generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_is_monotonic() {
        let mut counter = GenerationCounter::new();
        let a = counter.advance();
        let b = counter.advance();
        assert!(b > a);
        assert_eq!(counter.current(), b);
    }

    #[test]
    fn test_old_generation_is_stale() {
        let mut counter = GenerationCounter::new();
        let a = counter.advance();
        assert!(counter.is_current(a));
        counter.advance();
        assert!(!counter.is_current(a));
    }
}
