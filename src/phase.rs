//! 相の識別子とサンプリング電圧

/// モーターの相
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    A,
    B,
    C,
}

impl Phase {
    pub const ALL: [Phase; 3] = [Phase::A, Phase::B, Phase::C];
}

/// 相ごとのPWM駆動モード
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DriveMode {
    /// 休止相（ハイインピーダンス、逆起電力の観測に使用）
    Dormant,
    /// 駆動相
    Drive,
}

/// 直近にサンプリングした各相電圧（ADC固定小数点値）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PhaseVoltages {
    pub a: u16,
    pub b: u16,
    pub c: u16,
}

impl PhaseVoltages {
    pub const fn new() -> Self {
        Self { a: 0, b: 0, c: 0 }
    }

    /// 指定相の電圧を取得
    pub const fn get(&self, phase: Phase) -> u16 {
        match phase {
            Phase::A => self.a,
            Phase::B => self.b,
            Phase::C => self.c,
        }
    }
}
