//! AI 配置
//!
//! 难度决定搜索深度、是否使用开局库和走法排序，以及评估权重。

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::evaluate::EvalWeights;

/// AI 难度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    /// 入门：随机走合法棋，不搜索
    Beginner,
    /// 简单：depth=2
    Easy,
    /// 中等：depth=3
    Medium,
    /// 困难：depth=4
    Hard,
    /// 大师：按子数自适应 depth=3..5，开局库 + 走法排序 + 完整评估
    Master,
}

impl Difficulty {
    /// 搜索深度表
    ///
    /// `piece_count` 为棋盘上的棋子总数（含双王）。`None` 表示该难度不搜索。
    pub fn search_depth(self, piece_count: u32) -> Option<u8> {
        match self {
            Difficulty::Beginner => None,
            Difficulty::Easy => Some(2),
            Difficulty::Medium => Some(3),
            Difficulty::Hard => Some(4),
            Difficulty::Master => Some(match piece_count {
                0..=10 => 5,
                11..=20 => 4,
                _ => 3,
            }),
        }
    }

    /// 所有难度，从低到高
    pub fn all() -> &'static [Difficulty] {
        &[
            Difficulty::Beginner,
            Difficulty::Easy,
            Difficulty::Medium,
            Difficulty::Hard,
            Difficulty::Master,
        ]
    }
}

/// AI 配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiConfig {
    pub difficulty: Difficulty,
    pub use_opening_book: bool,
    /// 根节点是否先做启发式排序
    pub order_moves: bool,
    pub weights: EvalWeights,
}

impl AiConfig {
    pub fn from_difficulty(difficulty: Difficulty) -> Self {
        match difficulty {
            Difficulty::Beginner | Difficulty::Easy | Difficulty::Medium | Difficulty::Hard => {
                Self {
                    difficulty,
                    use_opening_book: false,
                    order_moves: false,
                    weights: EvalWeights::basic(),
                }
            }
            Difficulty::Master => Self {
                difficulty,
                use_opening_book: true,
                order_moves: true,
                weights: EvalWeights::advanced(),
            },
        }
    }

    /// 从 JSON 读取配置
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self::from_difficulty(Difficulty::Medium)
    }
}
