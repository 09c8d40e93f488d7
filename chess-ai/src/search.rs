//! 搜索引擎
//!
//! 实现 Negamax 形式的 Minimax + Alpha-Beta 剪枝。
//! 整个搜索只使用调用方传入的一个棋盘句柄，每次 push 都在同一层 pop。

use chess::ChessMove;
use chess_rules::{GameBoard, Outcome};
use tracing::debug;

use crate::evaluate::{Evaluator, MATE_SCORE};
use crate::ordering::MoveOrderer;

/// 搜索窗口的初始边界，大于任何评估值
pub const INFINITY: i32 = 1_000_000;

/// Alpha-Beta 搜索器
#[derive(Debug, Clone)]
pub struct Searcher {
    evaluator: Evaluator,
    /// 根节点是否先做启发式排序
    order_moves: bool,
    nodes_searched: u64,
}

impl Searcher {
    pub fn new(evaluator: Evaluator, order_moves: bool) -> Self {
        Self {
            evaluator,
            order_moves,
            nodes_searched: 0,
        }
    }

    pub fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }

    /// 上一次搜索访问的节点数
    pub fn nodes_searched(&self) -> u64 {
        self.nodes_searched
    }

    /// 搜索最佳走法，只有在没有合法走法时返回 `None`
    pub fn best_move(&mut self, board: &mut GameBoard, depth: u8) -> Option<ChessMove> {
        self.search_root(board, depth).map(|(mv, _)| mv)
    }

    /// 根节点搜索，返回最佳走法及其分值（走子方视角）
    ///
    /// 分值相同时保留先搜到的走法。
    pub fn search_root(&mut self, board: &mut GameBoard, depth: u8) -> Option<(ChessMove, i32)> {
        self.nodes_searched = 0;

        let mut moves = board.legal_moves();
        if moves.is_empty() {
            return None;
        }
        if self.order_moves {
            MoveOrderer::order(board, &mut moves);
        }

        let child_depth = depth.saturating_sub(1);
        let mut alpha = -INFINITY;
        let mut best: Option<(ChessMove, i32)> = None;

        for mv in moves {
            board.push_unchecked(mv);
            let score = -self.alpha_beta(board, child_depth, 1, -INFINITY, -alpha);
            board.pop();

            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((mv, score));
            }
            alpha = alpha.max(score);
        }

        if let Some((mv, score)) = best {
            debug!(
                "Search depth {} done: best {} score {} nodes {}",
                depth, mv, score, self.nodes_searched
            );
        }
        best
    }

    /// Alpha-Beta 搜索
    ///
    /// `ply` 为距根节点的层数，用于让更快的将死得分更高。
    fn alpha_beta(
        &mut self,
        board: &mut GameBoard,
        depth: u8,
        ply: u32,
        mut alpha: i32,
        beta: i32,
    ) -> i32 {
        self.nodes_searched += 1;

        if let Some(outcome) = board.outcome() {
            return Self::terminal_score(outcome, ply);
        }

        // 到达深度限制，返回评估值
        if depth == 0 {
            return self.evaluator.evaluate_ongoing(board);
        }

        for mv in board.legal_moves() {
            board.push_unchecked(mv);
            let score = -self.alpha_beta(board, depth - 1, ply + 1, -beta, -alpha);
            board.pop();

            if score > alpha {
                alpha = score;
            }
            if alpha >= beta {
                break; // Beta 剪枝
            }
        }

        alpha
    }

    /// 不剪枝的完整 Minimax，返回根局面的分值
    ///
    /// 与 [`search_root`](Self::search_root) 在相同深度下结果一致，用于对照验证剪枝。
    pub fn full_width_search(&mut self, board: &mut GameBoard, depth: u8) -> i32 {
        self.minimax(board, depth, 0)
    }

    fn minimax(&mut self, board: &mut GameBoard, depth: u8, ply: u32) -> i32 {
        self.nodes_searched += 1;

        if let Some(outcome) = board.outcome() {
            return Self::terminal_score(outcome, ply);
        }
        if depth == 0 {
            return self.evaluator.evaluate_ongoing(board);
        }

        let mut best = -INFINITY;
        for mv in board.legal_moves() {
            board.push_unchecked(mv);
            let score = -self.minimax(board, depth - 1, ply + 1);
            board.pop();
            best = best.max(score);
        }
        best
    }

    fn terminal_score(outcome: Outcome, ply: u32) -> i32 {
        match outcome {
            Outcome::Checkmate => -(MATE_SCORE - ply as i32),
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluate::EvalWeights;
    use chess_rules::{Fen, Notation};

    fn searcher(order_moves: bool) -> Searcher {
        Searcher::new(Evaluator::new(EvalWeights::advanced()), order_moves)
    }

    const SMALL_POSITIONS: &[&str] = &[
        "4k3/8/8/3p4/4P3/8/8/4K3 w - - 0 1",
        "4k3/8/8/3q4/8/8/7K/3R4 w - - 0 1",
        "7k/8/6K1/8/8/8/8/1Q6 w - - 0 1",
        "r3k3/8/8/8/8/8/8/4K2R b - - 0 1",
    ];

    #[test]
    fn test_search_initial_position() {
        let mut board = GameBoard::initial();
        let legal = board.legal_moves();
        let mut engine = searcher(false);

        let mv = engine.best_move(&mut board, 2).unwrap();
        assert!(legal.contains(&mv));
        assert_eq!(legal.len(), 20);
        assert!(engine.nodes_searched() > 20);
    }

    #[test]
    fn test_mate_in_one() {
        let mate = Notation::parse_coordinate("b1b8").unwrap();
        for depth in [2, 3] {
            for order_moves in [false, true] {
                let mut board = Fen::parse("7k/8/6K1/8/8/8/8/1Q6 w - - 0 1").unwrap();
                let (mv, score) = searcher(order_moves).search_root(&mut board, depth).unwrap();
                assert_eq!(mv, mate, "depth {} 应该找到 Qb8#", depth);
                assert_eq!(score, MATE_SCORE - 1);
            }
        }
    }

    #[test]
    fn test_alpha_beta_matches_minimax() {
        for fen in SMALL_POSITIONS {
            for depth in 1..=3 {
                let mut board = Fen::parse(fen).unwrap();
                let reference = searcher(false).full_width_search(&mut board, depth);

                for order_moves in [false, true] {
                    let (_, score) = searcher(order_moves).search_root(&mut board, depth).unwrap();
                    assert_eq!(score, reference, "{} depth {}", fen, depth);
                }
            }
        }
    }

    /// 不剪枝的根节点循环，分值严格更大才替换
    fn reference_root(board: &mut GameBoard, depth: u8) -> (ChessMove, i32) {
        let mut reference = searcher(false);
        let mut best: Option<(ChessMove, i32)> = None;
        for mv in board.legal_moves() {
            board.push_unchecked(mv);
            let score = -reference.minimax(board, depth - 1, 1);
            board.pop();
            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((mv, score));
            }
        }
        best.unwrap()
    }

    #[test]
    fn test_best_move_matches_reference() {
        let mut positions: Vec<&str> = SMALL_POSITIONS.to_vec();
        positions.push(chess_rules::INITIAL_FEN);

        for fen in positions {
            for depth in 1..=2 {
                let mut board = Fen::parse(fen).unwrap();
                let expected = reference_root(&mut board, depth);
                let found = searcher(false).search_root(&mut board, depth).unwrap();
                assert_eq!(found, expected, "{} depth {}", fen, depth);
            }
        }
    }

    #[test]
    fn test_ties_keep_first_move() {
        let mut board = GameBoard::initial();
        let mut engine = searcher(false);

        // a3 和 h3 左右对称，一层搜索分值相同
        let mut score_of = |text: &str| {
            let mv = Notation::parse_coordinate(text).unwrap();
            board.push_unchecked(mv);
            let score = -engine.minimax(&mut board, 0, 1);
            board.pop();
            score
        };
        assert_eq!(score_of("a2a3"), score_of("h2h3"));

        // 最高分并列时返回走法生成顺序中的第一个
        let (best, score) = searcher(false).search_root(&mut board, 1).unwrap();
        let first_best = board
            .legal_moves()
            .into_iter()
            .find(|&mv| {
                board.push_unchecked(mv);
                let child = -searcher(false).minimax(&mut board, 0, 1);
                board.pop();
                child == score
            })
            .unwrap();
        assert_eq!(best, first_best);
    }

    #[test]
    fn test_pruning_visits_fewer_nodes() {
        let mut board = GameBoard::initial();
        let mut pruned = searcher(false);
        let mut full = searcher(false);

        pruned.search_root(&mut board, 3);
        full.full_width_search(&mut board, 3);
        assert!(pruned.nodes_searched() < full.nodes_searched());
    }

    #[test]
    fn test_board_restored() {
        for fen in SMALL_POSITIONS {
            let mut board = Fen::parse(fen).unwrap();
            let before = board.clone();
            searcher(true).best_move(&mut board, 3);
            assert_eq!(board, before);
        }
    }

    #[test]
    fn test_no_legal_moves() {
        // 黑方已被将死
        let mut board = Fen::parse("1Q5k/8/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        assert_eq!(searcher(false).best_move(&mut board, 3), None);
    }

    #[test]
    fn test_captures_hanging_queen() {
        let mut board = Fen::parse("4k3/8/8/3q4/8/8/7K/3R4 w - - 0 1").unwrap();
        let mv = searcher(true).best_move(&mut board, 2).unwrap();
        assert_eq!(mv, Notation::parse_coordinate("d1d5").unwrap());
    }
}
