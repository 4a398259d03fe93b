//! Ternary per-bar indicator signal.

use serde::{Deserialize, Serialize};

/// Directional opinion of one indicator on one bar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Signal {
    Buy,
    Sell,
    #[default]
    Neutral,
}

impl Signal {
    /// +1 / -1 / 0.
    pub fn as_i8(self) -> i8 {
        match self {
            Signal::Buy => 1,
            Signal::Sell => -1,
            Signal::Neutral => 0,
        }
    }
}

