//! モーター制御のエラー型

use core::fmt;

/// モーター制御のエラー型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotorError {
    /// Hallモード中に全Low/全High（0b000/0b111）を読み取った
    InvalidSensorReading { code: u8 },

    /// セクター番号が0-5の範囲外
    InvalidSector(u8),

    /// Hallテーブル番号が0-11の範囲外
    InvalidHallTable(u8),

    /// `init_motor` 前にコマンドが発行された
    NotInitialized,
}

impl fmt::Display for MotorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSensorReading { code } => {
                write!(f, "invalid hall sensor reading 0b{:03b}", code)
            }
            Self::InvalidSector(sector) => write!(f, "sector {} out of range 0..=5", sector),
            Self::InvalidHallTable(index) => {
                write!(f, "hall table {} out of range 0..=11", index)
            }
            Self::NotInitialized => f.write_str("motor not initialized"),
        }
    }
}
