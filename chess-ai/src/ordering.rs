//! 走法排序
//!
//! 只影响剪枝效率，不影响搜索结果。

use std::cmp::Reverse;

use chess::ChessMove;
use chess_rules::{GameBoard, CENTER_SQUARES};

/// 吃子
pub const CAPTURE_KEY: i32 = 10000;
/// 将军
pub const CHECK_KEY: i32 = 5000;
/// 走到中心四格
pub const CENTER_KEY: i32 = 1000;

/// 启发式走法排序器
pub struct MoveOrderer;

impl MoveOrderer {
    /// 计算排序分
    ///
    /// 判断将军需要试走一步，返回前局面已恢复。
    pub fn score_move(board: &mut GameBoard, mv: ChessMove) -> i32 {
        let dest = mv.get_dest();
        let mut key = 0;

        if board.piece_on(dest).is_some() {
            key += CAPTURE_KEY;
        }
        if CENTER_SQUARES.contains(&dest) {
            key += CENTER_KEY;
        }

        board.push_unchecked(mv);
        if board.is_check() {
            key += CHECK_KEY;
        }
        board.pop();

        key
    }

    /// 按排序分从高到低稳定排序
    pub fn order(board: &mut GameBoard, moves: &mut [ChessMove]) {
        moves.sort_by_cached_key(|&mv| Reverse(Self::score_move(board, mv)));
    }
}
