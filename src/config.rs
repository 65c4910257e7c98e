//! モーター制御パラメータ

use embassy_time::Duration;

use crate::hall::HallTableIndex;

/// PWM周波数 [Hz]（デフォルト値）
pub const DEFAULT_PWM_FREQUENCY_HZ: u32 = 16_000;

/// 始動時デューティ（約10%）
/// 始動時は指令デューティではなくこの値を使用する
pub const DEFAULT_STARTUP_DUTY: u16 = 6_554;

/// 始動中にこの時間転流がなければ強制転流（ロータ静止時の停滞防止）
pub const DEFAULT_STALL_TIMEOUT: Duration = Duration::from_millis(25);

/// 不正なセンサー値を検出したときのロック時間
pub const DEFAULT_FAULT_LOCK: Duration = Duration::from_millis(1_000);

/// Hallセンサー配置に対応するテーブル行（デフォルト値）
pub const DEFAULT_HALL_TABLE: HallTableIndex = HallTableIndex::DEFAULT;

/// モーター制御設定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MotorConfig {
    /// PWM周波数 [Hz]
    pub pwm_frequency_hz: u32,
    /// 始動時デューティ（0-65535）
    pub startup_duty: u16,
    /// 始動中の強制転流までの時間
    pub stall_timeout: Duration,
    /// センサー異常時のロック時間
    pub fault_lock: Duration,
    /// 使用するHallテーブル行
    pub hall_table: HallTableIndex,
}

impl MotorConfig {
    pub const fn new() -> Self {
        Self {
            pwm_frequency_hz: DEFAULT_PWM_FREQUENCY_HZ,
            startup_duty: DEFAULT_STARTUP_DUTY,
            stall_timeout: DEFAULT_STALL_TIMEOUT,
            fault_lock: DEFAULT_FAULT_LOCK,
            hall_table: DEFAULT_HALL_TABLE,
        }
    }
}

impl Default for MotorConfig {
    fn default() -> Self {
        Self::new()
    }
}
