//! ボード設定パラメータ

use bldc_six_step::{Direction, HallTableIndex, MotorConfig};
use embassy_time::Duration;

/// モーター制御設定（このボードのHall配線はテーブル0）
pub const MOTOR_CONFIG: MotorConfig = MotorConfig {
    hall_table: HallTableIndex::DEFAULT,
    ..MotorConfig::new()
};

/// PWM設定
pub mod pwm {
    /// デッドタイム（デフォルト値）
    pub const DEFAULT_DEAD_TIME: u16 = 1;
}

/// サンプリング設定
pub mod sampling {
    /// サンプリング周期 [μs]（10kHz）
    pub const PERIOD_US: u64 = 100;
}

/// 起動時の指令
pub mod command {
    use super::*;

    /// 初期デューティ比（25%）
    pub const INITIAL_DUTY_CYCLE: u16 = 16_384;

    /// 初期回転方向
    pub const INITIAL_DIRECTION: Direction = Direction::Positive;

    /// ロック解除から再始動までの待ち時間
    pub const RESTART_DELAY: Duration = Duration::from_millis(500);

    /// 状態監視周期
    pub const SUPERVISOR_PERIOD: Duration = Duration::from_millis(100);
}
