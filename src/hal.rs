//! ハードウェア抽象化トレイト
//!
//! コアが呼び出すペリフェラル（Hall入力、ADC、PWM、ミリ秒クロック）を
//! トレイトとして定義します。実装はファームウェア側のボードが提供します。

use embassy_time::Instant;

use crate::hall::HallLine;
use crate::phase::{DriveMode, Phase};

/// Hallセンサー用デジタル入力
pub trait HallInputs {
    /// 3本のHall入力ピンを入力に設定
    fn configure_inputs(&mut self);

    /// 指定ラインの論理レベルを読み取り（High = true）
    fn read_line(&mut self, line: HallLine) -> bool;
}

/// ADCチャネル
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum VoltageChannel {
    PhaseA,
    PhaseB,
    PhaseC,
    Bus,
}

impl VoltageChannel {
    pub const fn for_phase(phase: Phase) -> Self {
        match phase {
            Phase::A => Self::PhaseA,
            Phase::B => Self::PhaseB,
            Phase::C => Self::PhaseC,
        }
    }
}

/// 相電圧・バス電圧のサンプリング
pub trait PhaseAdc {
    /// 最新の変換結果を固定小数点電圧で取得
    fn read_voltage(&mut self, channel: VoltageChannel) -> u16;

    /// 変換完了イベントごとに `on_sample` を呼び出すよう登録
    fn enable_sample_interrupt(&mut self);
}

/// 3相PWM出力
pub trait PhasePwm {
    /// PWMペリフェラルを初期化して周波数を設定
    fn init_pwm(&mut self, frequency_hz: u32);

    /// 1相のモードとデューティ（0-65535）を設定
    fn set_phase_duty(&mut self, phase: Phase, mode: DriveMode, duty: u16);
}

/// 単調増加クロック
pub trait Clock {
    fn now(&self) -> Instant;
}

/// モーター制御に必要なペリフェラル一式
pub trait MotorBoard: HallInputs + PhaseAdc + PhasePwm + Clock {}

impl<T: HallInputs + PhaseAdc + PhasePwm + Clock> MotorBoard for T {}
