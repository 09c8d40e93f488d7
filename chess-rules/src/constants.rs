//! 规则常量定义

use chess::{BitBoard, Square};

/// 中心四格：d4, e4, d5, e5
pub const CENTER_SQUARES: [Square; 4] = [Square::D4, Square::E4, Square::D5, Square::E5];

/// 所有深色格（a1 为深色）
pub const DARK_SQUARES: BitBoard = BitBoard(0xAA55_AA55_AA55_AA55);

/// 75 步规则（以半回合计）
pub const SEVENTY_FIVE_MOVE_PLIES: u32 = 150;

/// 五次重复局面判和
pub const FIVEFOLD_REPETITION: usize = 5;
