//! 错误类型定义

use thiserror::Error;

/// 国际象棋规则错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChessError {
    /// 无效的 FEN 字符串
    #[error("Invalid FEN string: {reason}")]
    InvalidFen { reason: String },

    /// 无效的格子名称
    #[error("Invalid square: {name}")]
    InvalidSquare { name: String },

    /// 无法解析的走法记号
    #[error("Invalid move notation: {notation}")]
    InvalidMoveNotation { notation: String },

    /// 当前局面下不合法的走法
    #[error("Illegal move: {mv}")]
    IllegalMove { mv: String },
}

/// 规则操作结果类型
pub type Result<T> = std::result::Result<T, ChessError>;
