//! AI 引擎
//!
//! 对外的唯一入口：先查开局库，查不到再搜索。

use chess::ChessMove;
use chess_rules::GameBoard;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{info, warn};

use crate::config::{AiConfig, Difficulty};
use crate::error::{AiError, Result};
use crate::evaluate::Evaluator;
use crate::opening::OpeningBook;
use crate::search::Searcher;

/// AI 引擎，每局棋一个实例
#[derive(Debug, Clone)]
pub struct AiEngine {
    config: AiConfig,
    searcher: Searcher,
    book: Option<OpeningBook>,
    rng: ChaCha8Rng,
}

impl AiEngine {
    /// 创建新的 AI 引擎
    pub fn new(config: AiConfig) -> Self {
        Self::build(config, ChaCha8Rng::from_entropy())
    }

    /// 使用固定种子，走法可复现
    pub fn with_seed(config: AiConfig, seed: u64) -> Self {
        Self::build(config, ChaCha8Rng::seed_from_u64(seed))
    }

    /// 从难度创建
    pub fn from_difficulty(difficulty: Difficulty) -> Self {
        Self::new(AiConfig::from_difficulty(difficulty))
    }

    /// 替换开局库
    pub fn with_book(mut self, book: OpeningBook) -> Self {
        self.book = Some(book);
        self
    }

    fn build(config: AiConfig, rng: ChaCha8Rng) -> Self {
        let book = if config.use_opening_book {
            match OpeningBook::standard() {
                Ok(book) => Some(book),
                Err(e) => {
                    warn!("Failed to load opening book: {}", e);
                    None
                }
            }
        } else {
            None
        };

        Self {
            searcher: Searcher::new(Evaluator::new(config.weights), config.order_moves),
            config,
            book,
            rng,
        }
    }

    /// 为当前走子方选择一步棋
    ///
    /// 返回时 `board` 与调用前完全一致。
    pub fn select_move(&mut self, board: &mut GameBoard) -> Result<ChessMove> {
        if let Some(outcome) = board.outcome() {
            warn!("Move requested in finished game: {:?}", outcome);
            return Err(AiError::GameOver(outcome));
        }

        let moves = board.legal_moves();
        if moves.is_empty() {
            return Err(AiError::NoLegalMoves);
        }

        let Some(depth) = self.config.difficulty.search_depth(board.piece_count()) else {
            let mv = moves.choose(&mut self.rng).copied().ok_or(AiError::NoLegalMoves)?;
            info!("Random move: {}", mv);
            return Ok(mv);
        };

        if let Some(book) = self.book.as_mut() {
            if let Some(mv) = book.next_book_move(board, &mut self.rng) {
                info!("Book move: {}", mv);
                return Ok(mv);
            }
        }

        let mv = self
            .searcher
            .best_move(board, depth)
            .ok_or(AiError::NoLegalMoves)?;
        info!(
            "Search move: {} (depth {}, {} nodes)",
            mv,
            depth,
            self.searcher.nodes_searched()
        );
        Ok(mv)
    }

    /// 新开一局
    pub fn reset(&mut self) {
        if let Some(book) = self.book.as_mut() {
            book.reset();
        }
    }

    pub fn config(&self) -> &AiConfig {
        &self.config
    }

    /// 上一次搜索访问的节点数
    pub fn nodes_searched(&self) -> u64 {
        self.searcher.nodes_searched()
    }

    /// 评估局面（走子方视角）
    pub fn evaluate(&self, board: &GameBoard) -> i32 {
        self.searcher.evaluator().evaluate(board)
    }
}
