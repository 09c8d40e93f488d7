//! 威胁分析
//!
//! 逐个检查走子方的棋子：被攻击时能否反击或有保护，能吃子时交换是否划算，
//! 不吃子的走法是否走向中心或开放线。王不参与计算。
//! 结果以走子方视角给出，由评估器在启用 `threat_analysis` 时叠加。

use chess::{get_file, BitBoard, ChessMove, Piece, Square, EMPTY};
use chess_rules::GameBoard;

use crate::evaluate::piece_value;

/// 走向中心附近（曼哈顿距离不超过 2）时每缩短一格的奖励
const CENTER_STEP_BONUS: i32 = 5;

/// 车走到没有兵的线上的奖励
const ROOK_OPEN_FILE_BONUS: i32 = 20;

/// 吃子后落点的攻防情况
struct Landing {
    attackers: u32,
    defenders: u32,
}

impl Landing {
    /// 模拟走一步后统计落点的攻防子数
    fn after(board: &GameBoard, mv: ChessMove) -> Self {
        let mover = board.side_to_move();
        let next = GameBoard::from_board(board.board().make_move_new(mv));
        let dest = mv.get_dest();
        Self {
            attackers: next.attackers(!mover, dest).popcnt(),
            defenders: next.attackers(mover, dest).popcnt(),
        }
    }

    /// 反击后不会被白吃：无人攻击，或者保护子不少于攻击子
    fn holds(&self) -> bool {
        self.attackers == 0 || (self.defenders > 0 && self.defenders >= self.attackers)
    }

    /// 吃子后没有攻击，或者至少有一个保护
    fn covered(&self) -> bool {
        self.attackers == 0 || self.defenders > 0
    }
}

fn value_on(board: &GameBoard, square: Square) -> Option<i32> {
    board.piece_on(square).map(|(piece, _)| piece_value(piece))
}

/// 威胁分（走子方视角）
pub fn evaluate_threats(board: &GameBoard) -> i32 {
    let mover = board.side_to_move();
    let moves = board.legal_moves();
    let mut score = 0;

    for square in *board.board().color_combined(mover) {
        let piece = match board.piece_on(square) {
            Some((Piece::King, _)) | None => continue,
            Some((piece, _)) => piece,
        };
        let value = piece_value(piece);
        let own_moves: Vec<ChessMove> = moves
            .iter()
            .copied()
            .filter(|mv| mv.get_source() == square)
            .collect();

        let attackers = board.attackers(!mover, square);
        if attackers != EMPTY {
            score += under_attack(board, square, value, attackers, &own_moves);
        }

        for &mv in &own_moves {
            score += match value_on(board, mv.get_dest()) {
                Some(target) => capture_gain(board, mv, value, target),
                None => quiet_gain(board, mv, piece),
            };
        }
    }

    score
}

/// 棋子被攻击时的应对：反击、依靠保护，或者承担损失
fn under_attack(
    board: &GameBoard,
    square: Square,
    value: i32,
    attackers: BitBoard,
    own_moves: &[ChessMove],
) -> i32 {
    let mover = board.side_to_move();
    let min_attacker = attackers
        .into_iter()
        .filter_map(|sq| value_on(board, sq))
        .min()
        .unwrap_or(0);
    let defenders = board.attackers(mover, square);
    let max_defender = defenders
        .into_iter()
        .filter_map(|sq| value_on(board, sq))
        .max()
        .unwrap_or(0);

    let mut best_target = 0;
    let mut any_safe = false;
    let mut has_counter = false;
    for &mv in own_moves {
        if let Some(target) = value_on(board, mv.get_dest()) {
            has_counter = true;
            best_target = best_target.max(target);
            any_safe |= Landing::after(board, mv).holds();
        }
    }

    if has_counter && best_target >= min_attacker {
        if any_safe {
            best_target * 2
        } else {
            best_target
        }
    } else if value > min_attacker {
        if defenders == EMPTY {
            -value
        } else if max_defender >= min_attacker {
            value
        } else {
            -value / 2
        }
    } else if best_target > value {
        best_target - value
    } else {
        0
    }
}

/// 吃子交换
fn capture_gain(board: &GameBoard, mv: ChessMove, value: i32, target: i32) -> i32 {
    let covered = Landing::after(board, mv).covered();
    match (covered, target > value) {
        (true, true) => (target - value) * 2,
        (true, false) => target,
        (false, true) => target - value,
        (false, false) => 0,
    }
}

/// 不吃子的走法：靠近中心，车占开放线
fn quiet_gain(board: &GameBoard, mv: ChessMove, piece: Piece) -> i32 {
    let dest = mv.get_dest();
    let file = dest.get_file().to_index() as i32;
    let rank = dest.get_rank().to_index() as i32;
    // 坐标放大两倍，中心为 (7, 7)
    let distance = ((7 - 2 * file).abs() + (7 - 2 * rank).abs()) / 2;

    let mut gain = 0;
    if distance <= 2 {
        gain += (4 - distance) * CENTER_STEP_BONUS;
    }

    if piece == Piece::Rook {
        let pawns = *board.board().pieces(Piece::Pawn);
        if get_file(dest.get_file()) & pawns == EMPTY {
            gain += ROOK_OPEN_FILE_BONUS;
        }
    }
    gain
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluate::{EvalWeights, Evaluator};
    use chess_rules::Fen;

    #[test]
    fn test_initial_position_symmetric() {
        // 只有兵走到 c4/d3/d4/e3/e4/f4 一类的格子得分
        let white = GameBoard::initial();
        let black =
            Fen::parse("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR b KQkq - 0 1").unwrap();

        assert_eq!(evaluate_threats(&white), 70);
        assert_eq!(evaluate_threats(&black), 70);
    }

    #[test]
    fn test_undefended_piece_penalty() {
        // d2 马被 c3 兵攻击且无保护
        let board = Fen::parse("4k3/8/8/8/8/2p5/3N4/7K w - - 0 1").unwrap();
        // -320 + 马走 c4(10) / e4(15)
        assert_eq!(evaluate_threats(&board), -295);
    }

    #[test]
    fn test_defended_piece_bonus() {
        // 同上，但 d1 车保护马
        let board = Fen::parse("4k3/8/8/8/8/2p5/3N4/3R3K w - - 0 1").unwrap();
        // +320 + 马 25 + 车横走 5 条开放线
        assert_eq!(evaluate_threats(&board), 445);
    }

    #[test]
    fn test_profitable_capture() {
        // 车被后攻击，但可以吃掉无保护的后
        let board = Fen::parse("4k3/8/8/3q4/8/8/7K/3R4 w - - 0 1").unwrap();
        assert!(evaluate_threats(&board) >= 2600);
    }

    #[test]
    fn test_disabled_by_default() {
        let board = Fen::parse("4k3/8/8/8/8/2p5/3N4/7K w - - 0 1").unwrap();
        let advanced = Evaluator::new(EvalWeights::advanced());
        let enhanced = Evaluator::new(EvalWeights::enhanced());

        assert!(!EvalWeights::default().threat_analysis);
        assert_eq!(
            enhanced.evaluate(&board),
            advanced.evaluate(&board) + evaluate_threats(&board)
        );
    }
}
