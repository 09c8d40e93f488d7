//! AI 自对弈
//!
//! 运行方式:
//! ```bash
//! RUST_LOG=chess_ai=debug cargo run -p chess-ai --example self_play
//! ```
//!
//! 每一步都放到阻塞线程池里计算，主任务只负责等待结果并落子。

use chess_ai::{AiConfig, AiEngine, Difficulty};
use chess_rules::{Fen, GameBoard, Notation};
use tracing_subscriber::EnvFilter;

const MAX_PLIES: usize = 40;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("chess_ai=info")),
        )
        .init();

    println!("=== 自对弈: Master (白) vs Medium (黑) ===\n");

    // 下标 0 为白方，1 为黑方
    let mut engines = [
        AiEngine::new(AiConfig::from_difficulty(Difficulty::Master)),
        AiEngine::new(AiConfig::from_difficulty(Difficulty::Medium)),
    ];
    let mut board = GameBoard::initial();

    for ply in 0..MAX_PLIES {
        if let Some(outcome) = board.outcome() {
            println!("\n对局结束: {:?}", outcome);
            break;
        }

        let side = ply % 2;
        let start = std::time::Instant::now();
        let (returned, mut next, result) = tokio::task::spawn_blocking(move || {
            let mut engines = engines;
            let mut board = board;
            let result = engines[side].select_move(&mut board);
            (engines, board, result)
        })
        .await?;
        engines = returned;
        let mv = result?;

        let text = Notation::to_coordinate(&mv);
        if side == 0 {
            print!("{:>3}. {}", ply / 2 + 1, text);
        } else {
            println!(" {}", text);
        }
        tracing::debug!("move {} took {:?}", text, start.elapsed());

        next.push(mv)?;
        board = next;
    }

    println!("\n最终局面: {}", Fen::to_string(&board));
    Ok(())
}
