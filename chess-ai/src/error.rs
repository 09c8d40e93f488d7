//! 错误类型定义

use chess_rules::{ChessError, Outcome};
use thiserror::Error;

/// AI 引擎错误
#[derive(Error, Debug)]
pub enum AiError {
    /// 对局已经结束，不应再请求走法
    #[error("Game is already over: {0:?}")]
    GameOver(Outcome),

    /// 当前局面没有合法走法
    #[error("No legal moves available")]
    NoLegalMoves,

    /// 开局库中的走法无法解析或在该开局中不合法
    #[error("Invalid move in opening '{opening}': {source}")]
    InvalidOpeningMove {
        opening: String,
        #[source]
        source: ChessError,
    },

    /// 开局库中的某条开局没有任何走法
    #[error("Opening '{opening}' has no moves")]
    EmptyOpeningLine { opening: String },

    /// 配置解析失败
    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

/// AI 操作结果类型
pub type Result<T> = std::result::Result<T, AiError>;
