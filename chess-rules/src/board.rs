//! 棋盘状态
//!
//! `GameBoard` 在 `chess::Board` 之上维护快照栈，支持原地 push/pop。
//! 搜索时整盘棋只有这一个可变句柄，每次 push 都必须有对应的 pop。

use std::fmt;

use chess::{
    get_bishop_moves, get_king_moves, get_knight_moves, get_pawn_attacks, get_rook_moves,
    BitBoard, Board, BoardStatus, ChessMove, Color, MoveGen, Piece, Square, EMPTY,
};

use crate::constants::{DARK_SQUARES, FIVEFOLD_REPETITION, SEVENTY_FIVE_MOVE_PLIES};
use crate::error::{ChessError, Result};
use crate::fen::Fen;

/// 对局结束原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// 走子方被将死
    Checkmate,
    /// 逼和
    Stalemate,
    /// 双方子力都不足以将死
    InsufficientMaterial,
    /// 75 步无吃子、无兵移动
    SeventyFiveMoves,
    /// 同一局面出现五次
    FivefoldRepetition,
}

impl Outcome {
    /// 是否为和棋
    pub fn is_draw(&self) -> bool {
        !matches!(self, Outcome::Checkmate)
    }
}

/// push 前保存的局面，pop 时原样恢复
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Snapshot {
    board: Board,
    halfmove_clock: u32,
    fullmove_number: u32,
}

/// 可 push/pop 的棋盘句柄
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameBoard {
    board: Board,
    /// 距上次吃子或兵移动的半回合数
    halfmove_clock: u32,
    /// 完整回合数（黑方走完后 +1）
    fullmove_number: u32,
    /// 已走的棋
    moves: Vec<ChessMove>,
    snapshots: Vec<Snapshot>,
}

impl GameBoard {
    /// 标准初始局面
    pub fn initial() -> Self {
        Self::from_board(Board::default())
    }

    /// 从底层棋盘创建（无历史）
    pub fn from_board(board: Board) -> Self {
        Self::with_clocks(board, 0, 1)
    }

    pub(crate) fn with_clocks(board: Board, halfmove_clock: u32, fullmove_number: u32) -> Self {
        Self {
            board,
            halfmove_clock,
            fullmove_number,
            moves: Vec::new(),
            snapshots: Vec::new(),
        }
    }

    /// 底层棋盘
    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn side_to_move(&self) -> Color {
        self.board.side_to_move()
    }

    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    /// 本句柄上已走的所有棋（从创建时算起）
    pub fn history(&self) -> &[ChessMove] {
        &self.moves
    }

    /// 生成所有合法走法（顺序由 `chess` crate 决定）
    pub fn legal_moves(&self) -> Vec<ChessMove> {
        MoveGen::new_legal(&self.board).collect()
    }

    pub fn legal_move_count(&self) -> usize {
        MoveGen::new_legal(&self.board).count()
    }

    pub fn is_legal(&self, mv: ChessMove) -> bool {
        MoveGen::new_legal(&self.board).any(|m| m == mv)
    }

    /// 走一步棋（检查合法性）
    pub fn push(&mut self, mv: ChessMove) -> Result<()> {
        if !self.is_legal(mv) {
            return Err(ChessError::IllegalMove { mv: mv.to_string() });
        }
        self.push_unchecked(mv);
        Ok(())
    }

    /// 走一步棋（不检查合法性）
    ///
    /// 调用方必须保证 `mv` 来自当前局面的 [`legal_moves`](Self::legal_moves)。
    pub fn push_unchecked(&mut self, mv: ChessMove) {
        let resets_clock = self.board.piece_on(mv.get_source()) == Some(Piece::Pawn)
            || self.board.piece_on(mv.get_dest()).is_some();
        let mover = self.board.side_to_move();

        self.snapshots.push(Snapshot {
            board: self.board,
            halfmove_clock: self.halfmove_clock,
            fullmove_number: self.fullmove_number,
        });
        self.moves.push(mv);

        self.board = self.board.make_move_new(mv);
        self.halfmove_clock = if resets_clock { 0 } else { self.halfmove_clock + 1 };
        if mover == Color::Black {
            self.fullmove_number += 1;
        }
    }

    /// 撤销最后一步棋，没有历史时返回 `None`
    pub fn pop(&mut self) -> Option<ChessMove> {
        let snapshot = self.snapshots.pop()?;
        let mv = self.moves.pop()?;

        self.board = snapshot.board;
        self.halfmove_clock = snapshot.halfmove_clock;
        self.fullmove_number = snapshot.fullmove_number;
        Some(mv)
    }

    /// 获取指定格子上的棋子及其颜色
    pub fn piece_on(&self, square: Square) -> Option<(Piece, Color)> {
        let piece = self.board.piece_on(square)?;
        let color = self.board.color_on(square)?;
        Some((piece, color))
    }

    /// 指定颜色、指定种类的棋子集合
    pub fn pieces(&self, piece: Piece, color: Color) -> BitBoard {
        *self.board.pieces(piece) & *self.board.color_combined(color)
    }

    pub fn king_square(&self, color: Color) -> Square {
        self.board.king_square(color)
    }

    /// 棋盘上的棋子总数（含双王）
    pub fn piece_count(&self) -> u32 {
        self.board.combined().popcnt()
    }

    /// `color` 一方所有攻击 `square` 的棋子
    pub fn attackers(&self, color: Color, square: Square) -> BitBoard {
        let board = &self.board;
        let occupied = *board.combined();
        let own = *board.color_combined(color);

        let pawns = *board.pieces(Piece::Pawn) & own;
        let knights = *board.pieces(Piece::Knight) & own;
        let kings = *board.pieces(Piece::King) & own;
        let queens = *board.pieces(Piece::Queen);
        let diagonal = (*board.pieces(Piece::Bishop) | queens) & own;
        let straight = (*board.pieces(Piece::Rook) | queens) & own;

        // 反向兵攻击：站在 square 上的对方兵能吃到的格子，就是能攻击 square 的本方兵
        get_pawn_attacks(square, !color, pawns)
            | (get_knight_moves(square) & knights)
            | (get_king_moves(square) & kings)
            | (get_bishop_moves(square, occupied) & diagonal)
            | (get_rook_moves(square, occupied) & straight)
    }

    pub fn is_attacked_by(&self, color: Color, square: Square) -> bool {
        self.attackers(color, square) != EMPTY
    }

    /// 走子方是否被将军
    pub fn is_check(&self) -> bool {
        *self.board.checkers() != EMPTY
    }

    pub fn is_checkmate(&self) -> bool {
        self.board.status() == BoardStatus::Checkmate
    }

    pub fn is_stalemate(&self) -> bool {
        self.board.status() == BoardStatus::Stalemate
    }

    /// 双方都无法将死对方：只剩王，王 + 单个轻子，或者只剩同色格象
    pub fn is_insufficient_material(&self) -> bool {
        let board = &self.board;
        let heavy =
            *board.pieces(Piece::Pawn) | *board.pieces(Piece::Rook) | *board.pieces(Piece::Queen);
        if heavy != EMPTY {
            return false;
        }

        let knights = *board.pieces(Piece::Knight);
        let bishops = *board.pieces(Piece::Bishop);
        if (knights | bishops).popcnt() <= 1 {
            return true;
        }

        knights == EMPTY
            && ((bishops & DARK_SQUARES) == EMPTY || (bishops & !DARK_SQUARES) == EMPTY)
    }

    pub fn is_seventy_five_moves(&self) -> bool {
        self.halfmove_clock >= SEVENTY_FIVE_MOVE_PLIES
    }

    /// 当前局面是否已出现五次
    ///
    /// 只需回看 halfmove_clock 范围内的快照，更早的局面不可能与当前相同。
    pub fn is_fivefold_repetition(&self) -> bool {
        let window = (self.halfmove_clock as usize).min(self.snapshots.len());
        let earlier = self
            .snapshots
            .iter()
            .rev()
            .take(window)
            .filter(|snapshot| snapshot.board == self.board)
            .count();
        earlier + 1 >= FIVEFOLD_REPETITION
    }

    /// 对局结果，`None` 表示对局仍在进行
    pub fn outcome(&self) -> Option<Outcome> {
        match self.board.status() {
            BoardStatus::Checkmate => return Some(Outcome::Checkmate),
            BoardStatus::Stalemate => return Some(Outcome::Stalemate),
            BoardStatus::Ongoing => {}
        }

        if self.is_insufficient_material() {
            Some(Outcome::InsufficientMaterial)
        } else if self.is_seventy_five_moves() {
            Some(Outcome::SeventyFiveMoves)
        } else if self.is_fivefold_repetition() {
            Some(Outcome::FivefoldRepetition)
        } else {
            None
        }
    }

    pub fn is_game_over(&self) -> bool {
        self.outcome().is_some()
    }
}

impl Default for GameBoard {
    fn default() -> Self {
        Self::initial()
    }
}

impl fmt::Display for GameBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&Fen::to_string(self))
    }
}
