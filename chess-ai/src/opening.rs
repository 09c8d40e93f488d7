//! 开局库
//!
//! 开局前几步直接照谱走棋。每局最多选定一条开局，对手偏离谱着或谱着走完后
//! 本局不再使用开局库。

use chess::ChessMove;
use chess_rules::{GameBoard, Notation};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, info};

use crate::error::{AiError, Result};

/// 内置开局（坐标记谱）
pub const STANDARD_REPERTOIRE: &[(&str, &[&str])] = &[
    ("Sicilian Defense", &["e2e4", "c7c5"]),
    ("Ruy Lopez", &["e2e4", "e7e5", "g1f3", "b8c6", "f1b5"]),
    ("Italian Game", &["e2e4", "e7e5", "g1f3", "b8c6", "f1c4"]),
    ("King's Pawn", &["e2e4", "e7e5"]),
    ("Queen's Gambit", &["d2d4", "d7d5", "c2c4"]),
    ("English Opening", &["c2c4"]),
    ("Reti Opening", &["g1f3", "d7d5", "c2c4"]),
];

/// 一条开局
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpeningLine {
    pub name: String,
    /// 双方交替的谱着，从初始局面开始
    pub moves: Vec<ChessMove>,
}

impl OpeningLine {
    /// 核对已走的棋，`cursor` 为上次返回谱着后的位置
    fn follow(&self, history: &[ChessMove], cursor: usize) -> Progress {
        // 只比较重叠部分，历史比谱长且前缀吻合时属于谱着走完
        let on_script = history
            .iter()
            .zip(&self.moves)
            .all(|(played, scripted)| played == scripted);
        if history.len() < cursor || !on_script {
            return Progress::Deviated;
        }

        match self.moves.get(history.len()) {
            Some(&next) => Progress::Next(next),
            None => Progress::Exhausted,
        }
    }
}

/// 对局历史与谱着的核对结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Progress {
    Next(ChessMove),
    Exhausted,
    Deviated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BookState {
    /// 还没有选定开局
    Unselected,
    /// 正在照谱走棋，`cursor` 为下一步谱着的下标
    Active { line: usize, cursor: usize },
    /// 本局不再查询开局库
    Finished,
}

/// 开局库
#[derive(Debug, Clone)]
pub struct OpeningBook {
    lines: Vec<OpeningLine>,
    state: BookState,
}

impl OpeningBook {
    pub fn new(lines: Vec<OpeningLine>) -> Self {
        Self {
            lines,
            state: BookState::Unselected,
        }
    }

    /// 从坐标记谱构建，每条开局都会在初始局面上重放一遍
    pub fn from_notation(repertoire: &[(&str, &[&str])]) -> Result<Self> {
        let mut lines = Vec::with_capacity(repertoire.len());

        for &(name, notations) in repertoire {
            if notations.is_empty() {
                return Err(AiError::EmptyOpeningLine {
                    opening: name.to_string(),
                });
            }

            let mut board = GameBoard::initial();
            let mut moves = Vec::with_capacity(notations.len());
            for text in notations {
                let mv = Notation::parse_coordinate(text)
                    .and_then(|mv| board.push(mv).map(|_| mv))
                    .map_err(|source| AiError::InvalidOpeningMove {
                        opening: name.to_string(),
                        source,
                    })?;
                moves.push(mv);
            }

            lines.push(OpeningLine {
                name: name.to_string(),
                moves,
            });
        }

        Ok(Self::new(lines))
    }

    /// 内置开局库
    pub fn standard() -> Result<Self> {
        Self::from_notation(STANDARD_REPERTOIRE)
    }

    pub fn lines(&self) -> &[OpeningLine] {
        &self.lines
    }

    /// 当前正在使用的开局
    pub fn active_line(&self) -> Option<&OpeningLine> {
        match self.state {
            BookState::Active { line, .. } => self.lines.get(line),
            _ => None,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.state == BookState::Finished
    }

    /// 新开一局
    pub fn reset(&mut self) {
        self.state = BookState::Unselected;
    }

    /// 查询下一步谱着
    ///
    /// 对局历史取自 `board`。还没选定开局时，只在前两个半回合内从与历史吻合的
    /// 开局中等概率选一条；已选定时先核对对手走的棋，再返回下一步谱着。
    /// 任何不吻合都会放弃开局库，之后始终返回 `None`。
    pub fn next_book_move<R: Rng + ?Sized>(
        &mut self,
        board: &GameBoard,
        rng: &mut R,
    ) -> Option<ChessMove> {
        let history = board.history();

        if self.state == BookState::Unselected {
            self.state = self.select(history, rng);
        }

        let BookState::Active { line, cursor } = self.state else {
            return None;
        };
        let script = &self.lines[line];

        let next = match script.follow(history, cursor) {
            Progress::Next(next) => next,
            Progress::Exhausted => {
                debug!("Opening '{}' exhausted", script.name);
                self.state = BookState::Finished;
                return None;
            }
            Progress::Deviated => {
                debug!("Opponent left opening '{}', abandoning book", script.name);
                self.state = BookState::Finished;
                return None;
            }
        };

        if !board.is_legal(next) {
            debug!(
                "Book move {} illegal in current position, abandoning '{}'",
                next, script.name
            );
            self.state = BookState::Finished;
            return None;
        }

        self.state = BookState::Active {
            line,
            cursor: history.len() + 1,
        };
        Some(next)
    }

    fn select<R: Rng + ?Sized>(&self, history: &[ChessMove], rng: &mut R) -> BookState {
        if history.len() >= 2 {
            return BookState::Finished;
        }

        let candidates: Vec<usize> = self
            .lines
            .iter()
            .enumerate()
            .filter(|(_, line)| {
                line.moves.len() > history.len() && line.moves.starts_with(history)
            })
            .map(|(index, _)| index)
            .collect();

        match candidates.choose(rng) {
            Some(&line) => {
                info!("Selected opening: {}", self.lines[line].name);
                BookState::Active { line, cursor: 0 }
            }
            None => BookState::Finished,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_rules::Fen;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn mv(text: &str) -> ChessMove {
        Notation::parse_coordinate(text).unwrap()
    }

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(7)
    }

    #[test]
    fn test_standard_repertoire() {
        let book = OpeningBook::standard().unwrap();
        assert_eq!(book.lines().len(), 7);
        assert_eq!(book.lines()[0].name, "Sicilian Defense");
        assert_eq!(book.lines()[1].moves.len(), 5);
        assert!(book.active_line().is_none());
        assert!(!book.is_finished());
    }

    #[test]
    fn test_malformed_line() {
        let result = OpeningBook::from_notation(&[("Broken", &["e2e4", "e7e9"])]);
        assert!(matches!(
            result,
            Err(AiError::InvalidOpeningMove { ref opening, .. }) if opening == "Broken"
        ));

        // 格式正确但不合法
        let result = OpeningBook::from_notation(&[("Illegal", &["e2e5"])]);
        assert!(matches!(result, Err(AiError::InvalidOpeningMove { .. })));

        let result = OpeningBook::from_notation(&[("Empty", &[])]);
        assert!(matches!(result, Err(AiError::EmptyOpeningLine { .. })));
    }

    #[test]
    fn test_white_follows_line() {
        let mut book = OpeningBook::standard().unwrap();
        let mut rng = rng();
        let mut board = GameBoard::initial();

        let first = book.next_book_move(&board, &mut rng).unwrap();
        let line = book.active_line().unwrap().clone();
        assert_eq!(first, line.moves[0]);
        assert!(book.lines().iter().any(|l| l.moves[0] == first));

        if line.moves.len() >= 3 {
            board.push(first).unwrap();
            board.push(line.moves[1]).unwrap();
            assert_eq!(book.next_book_move(&board, &mut rng), Some(line.moves[2]));
        }
    }

    #[test]
    fn test_black_picks_matching_line() {
        let mut book = OpeningBook::standard().unwrap();
        let mut rng = rng();
        let mut board = GameBoard::initial();
        board.push(mv("d2d4")).unwrap();

        // 只有后翼弃兵以 d2d4 开始
        assert_eq!(book.next_book_move(&board, &mut rng), Some(mv("d7d5")));
        assert_eq!(book.active_line().unwrap().name, "Queen's Gambit");
    }

    #[test]
    fn test_black_after_e4() {
        for seed in 0..8 {
            let mut book = OpeningBook::standard().unwrap();
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut board = GameBoard::initial();
            board.push(mv("e2e4")).unwrap();

            let reply = book.next_book_move(&board, &mut rng).unwrap();
            assert!(reply == mv("c7c5") || reply == mv("e7e5"));
        }
    }

    #[test]
    fn test_deviation_abandons_book() {
        let mut book = OpeningBook::from_notation(&[("Test", &["e2e4", "e7e5", "g1f3"])]).unwrap();
        let mut rng = rng();
        let mut board = GameBoard::initial();

        assert_eq!(book.next_book_move(&board, &mut rng), Some(mv("e2e4")));
        board.push(mv("e2e4")).unwrap();
        board.push(mv("c7c5")).unwrap();

        assert_eq!(book.next_book_move(&board, &mut rng), None);
        assert!(book.is_finished());

        // 就算局面又回到谱上也不再使用
        board.pop();
        board.push(mv("e7e5")).unwrap();
        assert_eq!(book.next_book_move(&board, &mut rng), None);
    }

    #[test]
    fn test_line_exhausted() {
        let mut book = OpeningBook::from_notation(&[("Short", &["e2e4", "e7e5"])]).unwrap();
        let mut rng = rng();
        let mut board = GameBoard::initial();

        assert_eq!(book.next_book_move(&board, &mut rng), Some(mv("e2e4")));
        board.push(mv("e2e4")).unwrap();
        board.push(mv("e7e5")).unwrap();

        assert_eq!(book.next_book_move(&board, &mut rng), None);
        assert!(book.is_finished());
    }

    #[test]
    fn test_exhausted_line_with_longer_history() {
        let book = OpeningBook::from_notation(&[("Sicilian", &["e2e4", "c7c5"])]).unwrap();
        let line = &book.lines()[0];
        let history = [mv("e2e4"), mv("c7c5"), mv("g1f3")];

        assert_eq!(line.follow(&history[..1], 1), Progress::Next(mv("c7c5")));
        assert_eq!(line.follow(&history[..2], 2), Progress::Exhausted);
        // 黑方照谱走完后白方又走了一步，仍然是谱着走完而不是偏离
        assert_eq!(line.follow(&history, 2), Progress::Exhausted);

        let deviated = [mv("e2e4"), mv("e7e5"), mv("g1f3")];
        assert_eq!(line.follow(&deviated, 2), Progress::Deviated);
        // 历史被悔棋缩短
        assert_eq!(line.follow(&history[..1], 2), Progress::Deviated);
    }

    #[test]
    fn test_black_book_ends_after_line() {
        let mut book = OpeningBook::from_notation(&[("Sicilian", &["e2e4", "c7c5"])]).unwrap();
        let mut rng = rng();
        let mut board = GameBoard::initial();

        board.push(mv("e2e4")).unwrap();
        assert_eq!(book.next_book_move(&board, &mut rng), Some(mv("c7c5")));
        board.push(mv("c7c5")).unwrap();
        board.push(mv("g1f3")).unwrap();

        assert_eq!(book.next_book_move(&board, &mut rng), None);
        assert!(book.is_finished());
    }

    #[test]
    fn test_late_first_query() {
        let mut book = OpeningBook::standard().unwrap();
        let mut rng = rng();
        let mut board = GameBoard::initial();
        board.push(mv("e2e4")).unwrap();
        board.push(mv("e7e5")).unwrap();

        assert_eq!(book.next_book_move(&board, &mut rng), None);
        assert!(book.is_finished());
    }

    #[test]
    fn test_illegal_book_move() {
        // 非初始局面，谱着 e2e4 不合法
        let board = Fen::parse("4k3/8/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        let mut book = OpeningBook::from_notation(&[("Test", &["e2e4", "e7e5"])]).unwrap();

        assert_eq!(book.next_book_move(&board, &mut rng()), None);
        assert!(book.is_finished());
    }

    #[test]
    fn test_reset() {
        let mut book = OpeningBook::from_notation(&[("Test", &["e2e4"])]).unwrap();
        let mut rng = rng();
        let board = GameBoard::initial();

        assert_eq!(book.next_book_move(&board, &mut rng), Some(mv("e2e4")));
        book.reset();
        assert!(book.active_line().is_none());
        assert_eq!(book.next_book_move(&board, &mut rng), Some(mv("e2e4")));
    }
}
