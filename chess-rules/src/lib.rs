//! 国际象棋规则适配层
//!
//! 包含:
//! - 可 push/pop 的棋盘句柄 (基于 `chess` crate)
//! - 终局判定（将死、逼和、子力不足、75 步、五次重复）
//! - 攻击者查询
//! - 坐标记谱法解析
//! - FEN 解析和生成

mod board;
mod constants;
mod error;
mod fen;
mod notation;

pub use board::{GameBoard, Outcome};
pub use constants::*;
pub use error::{ChessError, Result};
pub use fen::{Fen, INITIAL_FEN};
pub use notation::Notation;
