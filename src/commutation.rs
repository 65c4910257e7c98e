//! 6ステップ転流
//!
//! セクターから高電位相・低電位相・休止相を決定し、各相のデューティを計算します。

use crate::hal::PhasePwm;
use crate::phase::{DriveMode, Phase};
use crate::sector::{Direction, Sector};

/// 1セクターにおける各相の役割
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PhaseRoles {
    pub high: Phase,
    pub low: Phase,
    pub dormant: Phase,
}

impl PhaseRoles {
    const fn new(high: Phase, low: Phase, dormant: Phase) -> Self {
        Self { high, low, dormant }
    }

    /// セクターに対応する相の役割（回転方向によらず共通）
    pub const fn for_sector(sector: Sector) -> Self {
        SECTOR_ROLES[sector.index() as usize]
    }
}

/// sector  high  low  dormant
///   0      A     B     C
///   1      A     C     B
///   2      B     C     A
///   3      B     A     C
///   4      C     A     B
///   5      C     B     A
const SECTOR_ROLES: [PhaseRoles; Sector::COUNT as usize] = [
    PhaseRoles::new(Phase::A, Phase::B, Phase::C),
    PhaseRoles::new(Phase::A, Phase::C, Phase::B),
    PhaseRoles::new(Phase::B, Phase::C, Phase::A),
    PhaseRoles::new(Phase::B, Phase::A, Phase::C),
    PhaseRoles::new(Phase::C, Phase::A, Phase::B),
    PhaseRoles::new(Phase::C, Phase::B, Phase::A),
];

/// 各役割のデューティ（0-65535）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DriveDuties {
    pub high: u16,
    pub low: u16,
    pub dormant: u16,
}

impl DriveDuties {
    /// 50%デューティ
    pub const MID_SCALE: u16 = 32767;

    /// デューティ比から高電位側・低電位側のデューティを計算
    ///
    /// 両者は同じ半値から求めるため、`high + low` は常にちょうど65534になる
    pub const fn from_duty_cycle(duty_cycle: u16) -> Self {
        let half = duty_cycle >> 1;
        Self {
            high: Self::MID_SCALE + half,
            low: Self::MID_SCALE - half,
            dormant: duty_cycle,
        }
    }
}

/// 1回分の転流結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Commutation {
    /// 転流後のセクター
    pub sector: Sector,
    pub roles: PhaseRoles,
    pub duties: DriveDuties,
}

impl Commutation {
    /// セクターを1つ進め、新しいセクターの相割り当てとデューティを計算
    pub const fn step(sector: Sector, direction: Direction, duty_cycle: u16) -> Self {
        let sector = sector.next(direction);
        Self {
            sector,
            roles: PhaseRoles::for_sector(sector),
            duties: DriveDuties::from_duty_cycle(duty_cycle),
        }
    }

    /// PWMへ出力（休止相 → 高電位相 → 低電位相の順）
    pub fn apply<P: PhasePwm + ?Sized>(&self, pwm: &mut P) {
        pwm.set_phase_duty(self.roles.dormant, DriveMode::Dormant, self.duties.dormant);
        pwm.set_phase_duty(self.roles.high, DriveMode::Drive, self.duties.high);
        pwm.set_phase_duty(self.roles.low, DriveMode::Drive, self.duties.low);
    }
}
