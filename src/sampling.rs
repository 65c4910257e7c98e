//! ADC変換完了ごとのサンプリング処理
//!
//! 相電圧とバス電圧を読み取り、モーター状態に応じて転流・状態遷移を行います。
//! ハードウェアの変換完了イベント（割り込み）ごとに1回呼び出されます。

use embassy_time::Instant;

use crate::hal::{MotorBoard, VoltageChannel};
use crate::motor::{Motor, MotorController, MotorState};
use crate::phase::PhaseVoltages;

/// 転流の要因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommutationCause {
    /// 休止相電圧が中性点電圧を横切った
    ZeroCrossing,
    /// 始動中、一定時間転流がなかったため強制転流
    StallTimeout,
    /// Running中に `RunControl` が要求した
    RunControl,
}

/// 1回のサンプリング処理の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SampleOutcome {
    /// 何もしなかった
    Idle,
    /// 1回転流した
    Commutated(CommutationCause),
    /// ロック期限が切れてStoppedに戻った
    Unlocked,
}

/// Starting→Running移行とRunning中の制御の拡張ポイント
///
/// 移行条件とRunning中のセンサーレス制御則はアプリケーション側で定義します。
/// デフォルト実装は移行せず、Running中も何もしません。
pub trait RunControl {
    /// 始動中のサンプリングごとに呼ばれ、trueを返すとRunningに移行する
    fn ready_to_run(&mut self, _motor: &Motor) -> bool {
        false
    }

    /// Running中のサンプリングごとに呼ばれ、trueを返すと1回転流する
    ///
    /// # 引数
    /// * `motor` - 最新の相電圧を反映済みのモーター状態
    /// * `neutral_voltage` - 推定中性点電圧（バス電圧 / 2）
    fn on_running_sample(&mut self, _motor: &Motor, _neutral_voltage: u16) -> bool {
        false
    }
}

/// 始動状態を維持し続ける（Runningへ移行しない）
#[derive(Debug, Clone, Copy, Default)]
pub struct HoldStartup;

impl RunControl for HoldStartup {}

impl<B: MotorBoard, X: RunControl> MotorController<B, X> {
    /// ADC変換完了時の処理
    pub fn on_sample(&mut self) -> SampleOutcome {
        let voltages = PhaseVoltages {
            a: self.board.read_voltage(VoltageChannel::PhaseA),
            b: self.board.read_voltage(VoltageChannel::PhaseB),
            c: self.board.read_voltage(VoltageChannel::PhaseC),
        };
        let neutral_voltage = self.board.read_voltage(VoltageChannel::Bus) >> 1;
        self.motor.voltages = voltages;

        let now = self.board.now();

        match self.motor.state {
            MotorState::Locked => {
                if now > self.motor.locked_until {
                    self.motor.state = MotorState::Stopped;
                    info!("Lock expired, motor stopped");
                    SampleOutcome::Unlocked
                } else {
                    SampleOutcome::Idle
                }
            }
            MotorState::Stopped => SampleOutcome::Idle,
            MotorState::Starting => self.sample_starting(neutral_voltage, now),
            MotorState::Running => {
                if self.run_control.on_running_sample(&self.motor, neutral_voltage) {
                    self.commutate(now);
                    SampleOutcome::Commutated(CommutationCause::RunControl)
                } else {
                    SampleOutcome::Idle
                }
            }
        }
    }

    fn sample_starting(&mut self, neutral_voltage: u16, now: Instant) -> SampleOutcome {
        let dormant_voltage = self.motor.dormant_voltage();

        // 奇数セクターは下降、偶数セクターは上昇でゼロクロス
        let crossed = if self.motor.sector.is_odd() {
            dormant_voltage < neutral_voltage
        } else {
            dormant_voltage > neutral_voltage
        };

        let stall_deadline = self
            .motor
            .last_commutation_at
            .checked_add(self.config.stall_timeout)
            .unwrap_or(Instant::MAX);

        let outcome = if crossed {
            self.commutate(now);
            SampleOutcome::Commutated(CommutationCause::ZeroCrossing)
        } else if now > stall_deadline {
            debug!(
                "Stall timeout at sector {}, forcing commutation",
                self.motor.sector.index()
            );
            self.commutate(now);
            SampleOutcome::Commutated(CommutationCause::StallTimeout)
        } else {
            SampleOutcome::Idle
        };

        if self.run_control.ready_to_run(&self.motor) {
            self.motor.state = MotorState::Running;
            info!(
                "Switching to Running after {} commutations",
                self.motor.commutations
            );
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MotorConfig;
    use crate::mock::MockBoard;
    use crate::phase::Phase;
    use crate::sector::{Direction, Sector};
    use embassy_time::Duration;

    /// Sensorless controller already in Starting with the given sector.
    /// The stall timer starts at t = 1000 ms.
    fn starting_at<X: RunControl>(sector: u8, run_control: X) -> MotorController<MockBoard, X> {
        let mut board = MockBoard::new();
        board.set_time_ms(1_000);
        let mut ctrl = MotorController::with_run_control(board, MotorConfig::default(), run_control);
        ctrl.init();
        ctrl.start().unwrap();
        ctrl.motor.sector = Sector::new(sector).unwrap();
        ctrl.motor.dormant = crate::commutation::PhaseRoles::for_sector(ctrl.motor.sector).dormant;
        ctrl
    }

    #[test]
    fn test_stopped_is_noop() {
        let mut ctrl = MotorController::new(MockBoard::new(), MotorConfig::default());
        ctrl.init();
        ctrl.board_mut().pwm_log.clear();
        ctrl.board_mut().set_voltages(4000, 0, 0, 2000);
        ctrl.board_mut().advance_ms(100);

        assert_eq!(ctrl.on_sample(), SampleOutcome::Idle);
        assert_eq!(ctrl.state(), MotorState::Stopped);
        assert!(ctrl.board().pwm_log.is_empty());
        assert_eq!(ctrl.motor().voltages().a, 4000);
    }

    #[test]
    fn test_even_sector_rising_crossing() {
        let mut ctrl = starting_at(2, HoldStartup);
        // sector 2 dormant phase is A; neutral = 1000
        assert_eq!(ctrl.motor().dormant_phase(), Phase::A);
        ctrl.board_mut().set_voltages(1500, 0, 0, 2000);
        ctrl.board_mut().advance_ms(1);

        assert_eq!(
            ctrl.on_sample(),
            SampleOutcome::Commutated(CommutationCause::ZeroCrossing)
        );
        assert_eq!(ctrl.motor().sector(), Sector::new(3).unwrap());
        assert_eq!(ctrl.motor().commutation_count(), 2);
        assert_eq!(ctrl.motor().last_commutation_at(), Instant::from_millis(1_001));
    }

    #[test]
    fn test_even_sector_below_neutral_waits() {
        let mut ctrl = starting_at(2, HoldStartup);
        ctrl.board_mut().set_voltages(900, 0, 0, 2000);
        ctrl.board_mut().advance_ms(1);

        assert_eq!(ctrl.on_sample(), SampleOutcome::Idle);
        assert_eq!(ctrl.motor().sector(), Sector::new(2).unwrap());
    }

    #[test]
    fn test_odd_sector_falling_crossing() {
        let mut ctrl = starting_at(1, HoldStartup);
        // sector 1 dormant phase is B
        ctrl.board_mut().set_voltages(0, 1500, 0, 2000);
        assert_eq!(ctrl.on_sample(), SampleOutcome::Idle);

        ctrl.board_mut().set_voltages(0, 500, 0, 2000);
        assert_eq!(
            ctrl.on_sample(),
            SampleOutcome::Commutated(CommutationCause::ZeroCrossing)
        );
        assert_eq!(ctrl.motor().sector(), Sector::new(2).unwrap());
    }

    #[test]
    fn test_equal_to_neutral_is_not_a_crossing() {
        for sector in [1, 2] {
            let mut ctrl = starting_at(sector, HoldStartup);
            ctrl.board_mut().set_voltages(1000, 1000, 1000, 2000);
            assert_eq!(ctrl.on_sample(), SampleOutcome::Idle);
        }
    }

    #[test]
    fn test_stall_forces_one_commutation() {
        let mut ctrl = starting_at(2, HoldStartup);
        // dormant voltage sitting exactly on neutral never crosses
        ctrl.board_mut().set_voltages(1000, 1000, 1000, 2000);

        ctrl.board_mut().set_time_ms(1_030);
        assert_eq!(
            ctrl.on_sample(),
            SampleOutcome::Commutated(CommutationCause::StallTimeout)
        );
        assert_eq!(ctrl.motor().sector(), Sector::new(3).unwrap());

        // the stall timer restarted at 1030
        assert_eq!(ctrl.on_sample(), SampleOutcome::Idle);
        assert_eq!(ctrl.motor().commutation_count(), 2);
    }

    #[test]
    fn test_stall_boundary_is_strict() {
        let mut ctrl = starting_at(2, HoldStartup);
        ctrl.board_mut().set_voltages(1000, 1000, 1000, 2000);

        ctrl.board_mut().set_time_ms(1_025);
        assert_eq!(ctrl.on_sample(), SampleOutcome::Idle);

        ctrl.board_mut().set_time_ms(1_026);
        assert_eq!(
            ctrl.on_sample(),
            SampleOutcome::Commutated(CommutationCause::StallTimeout)
        );
    }

    #[test]
    fn test_stall_forcing_once_per_window() {
        let mut ctrl = starting_at(0, HoldStartup);
        ctrl.board_mut().set_voltages(1000, 1000, 1000, 2000);

        let mut forced = 0;
        for _ in 0..100 {
            ctrl.board_mut().advance_ms(1);
            match ctrl.on_sample() {
                SampleOutcome::Commutated(CommutationCause::StallTimeout) => forced += 1,
                SampleOutcome::Idle => {}
                other => panic!("unexpected {:?}", other),
            }
        }
        // forced at 1026, 1052, 1078
        assert_eq!(forced, 3);
    }

    #[test]
    fn test_crossing_and_stall_commutate_once() {
        let mut ctrl = starting_at(2, HoldStartup);
        ctrl.board_mut().set_voltages(1500, 0, 0, 2000);
        ctrl.board_mut().set_time_ms(1_100);

        assert_eq!(
            ctrl.on_sample(),
            SampleOutcome::Commutated(CommutationCause::ZeroCrossing)
        );
        assert_eq!(ctrl.motor().commutation_count(), 2);
    }

    #[test]
    fn test_negative_direction_steps_backwards() {
        let mut board = MockBoard::new();
        board.set_time_ms(1_000);
        let mut ctrl = MotorController::new(board, MotorConfig::default());
        ctrl.init();
        ctrl.command_direction(Direction::Negative);
        ctrl.start().unwrap();
        assert_eq!(ctrl.motor().sector(), Sector::new(5).unwrap());

        ctrl.board_mut().set_voltages(0, 0, 0, 2000);
        ctrl.board_mut().set_time_ms(1_030);
        ctrl.on_sample();
        assert_eq!(ctrl.motor().sector(), Sector::new(4).unwrap());
    }

    #[test]
    fn test_lock_expires_strictly_after_duration() {
        let mut ctrl = MotorController::new(MockBoard::new(), MotorConfig::default());
        ctrl.init();
        ctrl.board_mut().set_time_ms(200);
        ctrl.lock(Duration::from_millis(50));

        for t in [200, 230, 250] {
            ctrl.board_mut().set_time_ms(t);
            assert_eq!(ctrl.on_sample(), SampleOutcome::Idle);
            assert_eq!(ctrl.state(), MotorState::Locked);
        }

        ctrl.board_mut().set_time_ms(251);
        assert_eq!(ctrl.on_sample(), SampleOutcome::Unlocked);
        assert_eq!(ctrl.state(), MotorState::Stopped);
    }

    struct PromoteAfter {
        commutations: u32,
        running_calls: u32,
    }

    impl RunControl for PromoteAfter {
        fn ready_to_run(&mut self, motor: &Motor) -> bool {
            motor.commutation_count() >= self.commutations
        }

        fn on_running_sample(&mut self, motor: &Motor, neutral_voltage: u16) -> bool {
            self.running_calls += 1;
            motor.dormant_voltage() > neutral_voltage
        }
    }

    #[test]
    fn test_run_control_promotes_and_drives() {
        let mut ctrl = starting_at(
            2,
            PromoteAfter {
                commutations: 2,
                running_calls: 0,
            },
        );
        ctrl.board_mut().set_voltages(1500, 0, 0, 2000);
        ctrl.on_sample();
        assert_eq!(ctrl.state(), MotorState::Running);

        // sector 3 dormant is C
        ctrl.board_mut().set_voltages(0, 0, 1500, 2000);
        assert_eq!(
            ctrl.on_sample(),
            SampleOutcome::Commutated(CommutationCause::RunControl)
        );
        assert_eq!(ctrl.motor().sector(), Sector::new(4).unwrap());
        assert_eq!(ctrl.run_control().running_calls, 1);
    }

    #[test]
    fn test_default_never_promotes() {
        let mut ctrl = starting_at(0, HoldStartup);
        ctrl.board_mut().set_voltages(0, 0, 0, 2000);
        for _ in 0..20 {
            ctrl.board_mut().advance_ms(30);
            ctrl.on_sample();
        }
        assert_eq!(ctrl.state(), MotorState::Starting);
    }

    #[test]
    fn test_long_stall_timeout_never_forces() {
        let mut board = MockBoard::new();
        board.set_time_ms(1_000);
        let config = MotorConfig {
            stall_timeout: Duration::MAX,
            ..MotorConfig::default()
        };
        let mut ctrl = MotorController::new(board, config);
        ctrl.init();
        ctrl.start().unwrap();
        ctrl.board_mut().set_voltages(1000, 1000, 1000, 2000);

        ctrl.board_mut().set_time_ms(10_000_000);
        assert_eq!(ctrl.on_sample(), SampleOutcome::Idle);
        assert_eq!(ctrl.motor().commutation_count(), 1);
    }
}
