//! FEN 格式解析和生成
//!
//! 国际象棋 FEN 格式：
//! `<棋盘> <走子方> <易位权> <吃过路兵格> <无吃子步数> <回合数>`
//!
//! 前四个字段交给 `chess` crate 解析，最后两个字段由 [`GameBoard`] 自己维护。

use std::str::FromStr;

use chess::Board;

use crate::board::GameBoard;
use crate::error::ChessError;

/// 初始局面 FEN
pub const INITIAL_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// FEN 格式处理
pub struct Fen;

impl Fen {
    /// 解析 FEN 字符串为棋盘句柄
    pub fn parse(fen: &str) -> Result<GameBoard, ChessError> {
        let parts: Vec<&str> = fen.split_whitespace().collect();
        if parts.len() < 4 {
            return Err(ChessError::InvalidFen {
                reason: format!("Expected at least 4 fields, got {}", parts.len()),
            });
        }

        // chess crate 按单个空格切分，这里先规范化
        let board = Board::from_str(&parts.join(" ")).map_err(|e| ChessError::InvalidFen {
            reason: format!("{:?}", e),
        })?;

        let halfmove_clock = Self::parse_counter(parts.get(4), "halfmove clock")?.unwrap_or(0);
        let fullmove_number = Self::parse_counter(parts.get(5), "fullmove number")?
            .unwrap_or(1)
            .max(1);

        Ok(GameBoard::with_clocks(board, halfmove_clock, fullmove_number))
    }

    fn parse_counter(field: Option<&&str>, name: &str) -> Result<Option<u32>, ChessError> {
        field
            .map(|s| {
                s.parse::<u32>().map_err(|_| ChessError::InvalidFen {
                    reason: format!("Invalid {}: {}", name, s),
                })
            })
            .transpose()
    }

    /// 生成 FEN 字符串
    pub fn to_string(board: &GameBoard) -> String {
        let base = board.board().to_string();
        let fields: Vec<&str> = base.split_whitespace().take(4).collect();
        format!(
            "{} {} {}",
            fields.join(" "),
            board.halfmove_clock(),
            board.fullmove_number()
        )
    }

    /// 初始局面
    pub fn initial() -> GameBoard {
        GameBoard::initial()
    }
}
