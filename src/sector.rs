//! 6ステップ駆動のセクターと回転方向

use crate::error::MotorError;

/// 回転方向（セクターの進む順序のみを決める）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    #[default]
    Positive,
    Negative,
}

/// ロータ位置セクター（電気角60°ごと、0-5）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Sector(u8);

impl Sector {
    /// 1電気回転あたりのセクター数
    pub const COUNT: u8 = 6;

    pub const ZERO: Sector = Sector(0);

    /// 範囲チェック付きでセクターを作成
    pub const fn new(index: u8) -> Result<Self, MotorError> {
        if index < Self::COUNT {
            Ok(Self(index))
        } else {
            Err(MotorError::InvalidSector(index))
        }
    }

    pub const fn index(self) -> u8 {
        self.0
    }

    /// 回転方向に従って次のセクターへ進める
    ///
    /// Positive: 0→1→…→5→0、Negative: 0→5→…→1→0
    pub const fn next(self, direction: Direction) -> Self {
        match direction {
            Direction::Positive => Self((self.0 + 1) % Self::COUNT),
            Direction::Negative => Self((self.0 + Self::COUNT - 1) % Self::COUNT),
        }
    }

    /// 奇数セクターでは休止相電圧が下降、偶数セクターでは上昇してゼロクロスする
    pub const fn is_odd(self) -> bool {
        self.0 & 1 == 1
    }
}

impl TryFrom<u8> for Sector {
    type Error = MotorError;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        Self::new(index)
    }
}
