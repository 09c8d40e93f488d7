//! 坐标记谱法
//!
//! 开局库使用 `e2e4` / `e7e8q` 形式的坐标记号（起点格 + 终点格 + 可选升变棋子）。

use std::str::FromStr;

use chess::{ChessMove, Piece, Square};

use crate::error::ChessError;

/// 记谱法转换
pub struct Notation;

impl Notation {
    /// 解析坐标记号，只检查格式，不检查合法性
    pub fn parse_coordinate(text: &str) -> Result<ChessMove, ChessError> {
        let invalid = || ChessError::InvalidMoveNotation {
            notation: text.to_string(),
        };

        if !text.is_ascii() || !(4..=5).contains(&text.len()) {
            return Err(invalid());
        }

        let from = Self::parse_square(&text[0..2]).map_err(|_| invalid())?;
        let to = Self::parse_square(&text[2..4]).map_err(|_| invalid())?;
        let promotion = match text[4..].chars().next() {
            None => None,
            Some(c) => Some(Self::promotion_piece(c).ok_or_else(invalid)?),
        };

        Ok(ChessMove::new(from, to, promotion))
    }

    /// 解析格子名称（`a1`..`h8`）
    pub fn parse_square(name: &str) -> Result<Square, ChessError> {
        let bytes = name.as_bytes();
        let well_formed = bytes.len() == 2
            && (b'a'..=b'h').contains(&bytes[0])
            && (b'1'..=b'8').contains(&bytes[1]);
        if !well_formed {
            return Err(ChessError::InvalidSquare {
                name: name.to_string(),
            });
        }

        Square::from_str(name).map_err(|_| ChessError::InvalidSquare {
            name: name.to_string(),
        })
    }

    /// 生成坐标记号
    pub fn to_coordinate(mv: &ChessMove) -> String {
        let mut text = format!("{}{}", mv.get_source(), mv.get_dest());
        if let Some(piece) = mv.get_promotion() {
            text.push(Self::promotion_char(piece));
        }
        text
    }

    fn promotion_piece(c: char) -> Option<Piece> {
        match c {
            'q' => Some(Piece::Queen),
            'r' => Some(Piece::Rook),
            'b' => Some(Piece::Bishop),
            'n' => Some(Piece::Knight),
            _ => None,
        }
    }

    fn promotion_char(piece: Piece) -> char {
        match piece {
            Piece::Queen => 'q',
            Piece::Rook => 'r',
            Piece::Bishop => 'b',
            Piece::Knight => 'n',
            Piece::Pawn => 'p',
            Piece::King => 'k',
        }
    }
}
