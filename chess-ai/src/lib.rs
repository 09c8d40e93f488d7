//! 国际象棋 AI 引擎
//!
//! 包含:
//! - 棋局评估函数（子力、位置、中心、机动性、兵型、开放线、王安全）
//! - 可选的威胁分析
//! - 启发式走法排序
//! - 开局库
//! - Minimax + Alpha-Beta 搜索

mod config;
mod engine;
mod error;
mod evaluate;
mod opening;
mod ordering;
mod search;
mod threats;

pub use config::{AiConfig, Difficulty};
pub use engine::AiEngine;
pub use error::{AiError, Result};
pub use evaluate::{piece_value, EvalWeights, Evaluator, ENDGAME_MATERIAL, MATE_SCORE};
pub use opening::{OpeningBook, OpeningLine, STANDARD_REPERTOIRE};
pub use ordering::MoveOrderer;
pub use search::{Searcher, INFINITY};
pub use threats::evaluate_threats;
