//! 局面评估函数
//!
//! 评估值始终以走子方视角给出，正值对走子方有利。内部各项先按白方视角累加，
//! 最后根据走子方翻转符号。

use chess::{get_adjacent_files, get_file, get_king_moves, Color, File, Piece, Rank, Square, EMPTY};
use chess_rules::{GameBoard, Outcome, CENTER_SQUARES};
use serde::{Deserialize, Serialize};

use crate::threats;

/// 将死分值，等于王的子力值
pub const MATE_SCORE: i32 = 20000;

/// 单方非王子力低于此值即视为残局
pub const ENDGAME_MATERIAL: i32 = 1500;

/// 棋子基础分值
pub fn piece_value(piece: Piece) -> i32 {
    match piece {
        Piece::Pawn => 100,
        Piece::Knight => 320,
        Piece::Bishop => 330,
        Piece::Rook => 500,
        Piece::Queen => 900,
        Piece::King => MATE_SCORE,
    }
}

/// 评估权重
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvalWeights {
    /// 位置分比例（百分数，10 表示 0.1 倍）
    pub positional_percent: i32,
    /// 占据中心四格的奖励
    pub center_bonus: i32,
    /// 每个合法走法的机动性分（百分数）
    pub mobility_percent: i32,
    /// 每个孤兵的罚分
    pub isolated_pawn_penalty: i32,
    /// 车在开放线上的奖励
    pub open_file_bonus: i32,
    /// 中局王已易位的奖励
    pub castle_bonus: i32,
    /// 中局王周围每个己方棋子的奖励
    pub shelter_bonus: i32,
    /// 残局王距中心每一格的罚分
    pub centralization_weight: i32,
    /// 是否启用威胁分析（开销大）
    pub threat_analysis: bool,
}

impl EvalWeights {
    /// 基础评估：子力 + 位置 + 中心 + 机动性
    pub fn basic() -> Self {
        Self {
            positional_percent: 10,
            center_bonus: 10,
            mobility_percent: 10,
            isolated_pawn_penalty: 0,
            open_file_bonus: 0,
            castle_bonus: 0,
            shelter_bonus: 0,
            centralization_weight: 0,
            threat_analysis: false,
        }
    }

    /// 完整评估：加入兵型、开放线和王安全
    pub fn advanced() -> Self {
        Self {
            positional_percent: 10,
            center_bonus: 30,
            mobility_percent: 10,
            isolated_pawn_penalty: 20,
            open_file_bonus: 30,
            castle_bonus: 100,
            shelter_bonus: 10,
            centralization_weight: 10,
            threat_analysis: false,
        }
    }

    /// 完整评估 + 威胁分析
    pub fn enhanced() -> Self {
        Self {
            threat_analysis: true,
            ..Self::advanced()
        }
    }
}

impl Default for EvalWeights {
    fn default() -> Self {
        Self::advanced()
    }
}

/// 棋子位置分值表（白方视角，索引 0 = a1，黑方使用 63 - square）
mod position_tables {
    #[rustfmt::skip]
    pub const PAWN: [i32; 64] = [
         0,  0,  0,  0,  0,  0,  0,  0,
         5, 10, 10,-20,-20, 10, 10,  5,
         5, -5,-10,  0,  0,-10, -5,  5,
         0,  0,  0, 20, 20,  0,  0,  0,
         5,  5, 10, 25, 25, 10,  5,  5,
        10, 10, 20, 30, 30, 20, 10, 10,
        50, 50, 50, 50, 50, 50, 50, 50,
         0,  0,  0,  0,  0,  0,  0,  0,
    ];

    #[rustfmt::skip]
    pub const KNIGHT: [i32; 64] = [
       -50,-40,-30,-30,-30,-30,-40,-50,
       -40,-20,  0,  5,  5,  0,-20,-40,
       -30,  5, 10, 15, 15, 10,  5,-30,
       -30,  0, 15, 20, 20, 15,  0,-30,
       -30,  5, 15, 20, 20, 15,  5,-30,
       -30,  0, 10, 15, 15, 10,  0,-30,
       -40,-20,  0,  0,  0,  0,-20,-40,
       -50,-40,-30,-30,-30,-30,-40,-50,
    ];

    #[rustfmt::skip]
    pub const BISHOP: [i32; 64] = [
       -20,-10,-10,-10,-10,-10,-10,-20,
       -10,  5,  0,  0,  0,  0,  5,-10,
       -10, 10, 10, 10, 10, 10, 10,-10,
       -10,  0, 10, 10, 10, 10,  0,-10,
       -10,  5,  5, 10, 10,  5,  5,-10,
       -10,  0,  5, 10, 10,  5,  0,-10,
       -10,  0,  0,  0,  0,  0,  0,-10,
       -20,-10,-10,-10,-10,-10,-10,-20,
    ];

    #[rustfmt::skip]
    pub const ROOK: [i32; 64] = [
         0,  0,  0,  5,  5,  0,  0,  0,
        -5,  0,  0,  0,  0,  0,  0, -5,
        -5,  0,  0,  0,  0,  0,  0, -5,
        -5,  0,  0,  0,  0,  0,  0, -5,
        -5,  0,  0,  0,  0,  0,  0, -5,
        -5,  0,  0,  0,  0,  0,  0, -5,
         5, 10, 10, 10, 10, 10, 10,  5,
         0,  0,  0,  0,  0,  0,  0,  0,
    ];

    #[rustfmt::skip]
    pub const QUEEN: [i32; 64] = [
       -20,-10,-10, -5, -5,-10,-10,-20,
       -10,  0,  5,  0,  0,  0,  0,-10,
       -10,  5,  5,  5,  5,  5,  0,-10,
         0,  0,  5,  5,  5,  5,  0, -5,
        -5,  0,  5,  5,  5,  5,  0, -5,
       -10,  0,  5,  5,  5,  5,  0,-10,
       -10,  0,  0,  0,  0,  0,  0,-10,
       -20,-10,-10, -5, -5,-10,-10,-20,
    ];
}

const NON_KING_PIECES: [Piece; 5] = [
    Piece::Pawn,
    Piece::Knight,
    Piece::Bishop,
    Piece::Rook,
    Piece::Queen,
];

/// 白方为正，黑方为负
#[inline]
fn color_sign(color: Color) -> i32 {
    match color {
        Color::White => 1,
        Color::Black => -1,
    }
}

/// 评估器
#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    weights: EvalWeights,
}

impl Evaluator {
    pub fn new(weights: EvalWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &EvalWeights {
        &self.weights
    }

    /// 评估局面（走子方视角）
    ///
    /// 走子方被将死返回 `-MATE_SCORE`，任何和棋局面返回 0。
    pub fn evaluate(&self, board: &GameBoard) -> i32 {
        match board.outcome() {
            Some(Outcome::Checkmate) => -MATE_SCORE,
            Some(_) => 0,
            None => self.evaluate_ongoing(board),
        }
    }

    /// 评估未结束的局面（调用方已完成终局判定）
    pub fn evaluate_ongoing(&self, board: &GameBoard) -> i32 {
        let white_view = self.evaluate_material(board)
            + self.evaluate_positional(board)
            + self.evaluate_center(board)
            + self.evaluate_pawn_structure(board)
            + self.evaluate_rook_files(board)
            + self.evaluate_king_safety(board);

        let mut score = color_sign(board.side_to_move()) * white_view;

        // 机动性只统计走子方的合法走法
        score += board.legal_move_count() as i32 * self.weights.mobility_percent / 100;

        if self.weights.threat_analysis {
            score += threats::evaluate_threats(board);
        }

        score
    }

    /// 子力差（白方视角，不计王）
    pub fn evaluate_material(&self, board: &GameBoard) -> i32 {
        Self::material(board, Color::White) - Self::material(board, Color::Black)
    }

    /// 单方非王子力总和
    pub fn material(board: &GameBoard, color: Color) -> i32 {
        NON_KING_PIECES
            .iter()
            .map(|&piece| board.pieces(piece, color).popcnt() as i32 * piece_value(piece))
            .sum()
    }

    /// 任一方非王子力低于阈值即为残局
    pub fn is_endgame(board: &GameBoard) -> bool {
        Self::material(board, Color::White) < ENDGAME_MATERIAL
            || Self::material(board, Color::Black) < ENDGAME_MATERIAL
    }

    /// 位置分（白方视角，按比例缩放）
    pub fn evaluate_positional(&self, board: &GameBoard) -> i32 {
        let mut raw = 0;
        for color in [Color::White, Color::Black] {
            for &piece in &NON_KING_PIECES {
                for square in board.pieces(piece, color) {
                    raw += color_sign(color) * Self::position_bonus(piece, color, square);
                }
            }
        }
        raw * self.weights.positional_percent / 100
    }

    /// 查位置分值表
    fn position_bonus(piece: Piece, color: Color, square: Square) -> i32 {
        let index = match color {
            Color::White => square.to_index(),
            // 黑方镜像
            Color::Black => 63 - square.to_index(),
        };

        match piece {
            Piece::Pawn => position_tables::PAWN[index],
            Piece::Knight => position_tables::KNIGHT[index],
            Piece::Bishop => position_tables::BISHOP[index],
            Piece::Rook => position_tables::ROOK[index],
            Piece::Queen => position_tables::QUEEN[index],
            Piece::King => 0,
        }
    }

    /// 中心控制（白方视角）
    pub fn evaluate_center(&self, board: &GameBoard) -> i32 {
        CENTER_SQUARES
            .iter()
            .filter_map(|&square| board.piece_on(square))
            .map(|(_, color)| color_sign(color) * self.weights.center_bonus)
            .sum()
    }

    /// 兵型：孤兵罚分（白方视角）
    pub fn evaluate_pawn_structure(&self, board: &GameBoard) -> i32 {
        if self.weights.isolated_pawn_penalty == 0 {
            return 0;
        }

        [Color::White, Color::Black]
            .iter()
            .map(|&color| {
                -color_sign(color)
                    * Self::isolated_pawns(board, color) as i32
                    * self.weights.isolated_pawn_penalty
            })
            .sum()
    }

    /// 相邻线上没有己方兵的兵数
    pub fn isolated_pawns(board: &GameBoard, color: Color) -> u32 {
        let pawns = board.pieces(Piece::Pawn, color);
        pawns
            .into_iter()
            .filter(|square| get_adjacent_files(square.get_file()) & pawns == EMPTY)
            .count() as u32
    }

    /// 车在开放线（白方视角）
    pub fn evaluate_rook_files(&self, board: &GameBoard) -> i32 {
        if self.weights.open_file_bonus == 0 {
            return 0;
        }

        let pawns =
            board.pieces(Piece::Pawn, Color::White) | board.pieces(Piece::Pawn, Color::Black);
        let mut score = 0;
        for color in [Color::White, Color::Black] {
            for square in board.pieces(Piece::Rook, color) {
                if get_file(square.get_file()) & pawns == EMPTY {
                    score += color_sign(color) * self.weights.open_file_bonus;
                }
            }
        }
        score
    }

    /// 王安全（白方视角）
    ///
    /// 中局看易位和王周围的保护子，残局改为奖励王靠近中心。
    pub fn evaluate_king_safety(&self, board: &GameBoard) -> i32 {
        let w = &self.weights;
        if w.castle_bonus == 0 && w.shelter_bonus == 0 && w.centralization_weight == 0 {
            return 0;
        }

        let endgame = Self::is_endgame(board);
        [Color::White, Color::Black]
            .iter()
            .map(|&color| {
                let king = board.king_square(color);
                let value = if endgame {
                    self.king_centralization(king)
                } else {
                    self.king_shelter(board, king, color)
                };
                color_sign(color) * value
            })
            .sum()
    }

    fn king_shelter(&self, board: &GameBoard, king: Square, color: Color) -> i32 {
        let home_rank = match color {
            Color::White => Rank::First,
            Color::Black => Rank::Eighth,
        };

        let mut value = 0;
        if king.get_rank() == home_rank && matches!(king.get_file(), File::G | File::C) {
            value += self.weights.castle_bonus;
        }

        let guards = get_king_moves(king) & *board.board().color_combined(color);
        value + guards.popcnt() as i32 * self.weights.shelter_bonus
    }

    /// 到中心 (3.5, 3.5) 的曼哈顿距离乘以权重，取负
    fn king_centralization(&self, king: Square) -> i32 {
        let file = king.get_file().to_index() as i32;
        let rank = king.get_rank().to_index() as i32;
        // 坐标放大两倍避免小数，两个奇数之和必为偶数
        let doubled = (7 - 2 * file).abs() + (7 - 2 * rank).abs();
        -doubled * self.weights.centralization_weight / 2
    }
}
