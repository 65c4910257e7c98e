//! 割り込みとフォアグラウンドで共有するモーター
//!
//! サンプリング処理は割り込みコンテキストから、コマンドはタスクから呼ばれます。
//! 状態遷移・セクター・デューティ・タイムスタンプの更新がまとめて見えるよう、
//! すべての操作をクリティカルセクション内で実行します。

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_time::Duration;

use crate::error::MotorError;
use crate::hal::MotorBoard;
use crate::hall::SensorKind;
use crate::motor::{MotorController, MotorState, StartOutcome};
use crate::sampling::{HoldStartup, RunControl, SampleOutcome};
use crate::sector::Direction;

/// クリティカルセクションで保護されたモーターコントローラ
///
/// `static` に置けるよう空の状態で作成し、`init_motor` でコントローラを登録します。
pub struct SharedMotor<B, X = HoldStartup> {
    inner: Mutex<CriticalSectionRawMutex, RefCell<Option<MotorController<B, X>>>>,
}

impl<B, X> SharedMotor<B, X> {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(None)),
        }
    }
}

impl<B, X> Default for SharedMotor<B, X> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: MotorBoard, X: RunControl> SharedMotor<B, X> {
    /// コントローラを登録して初期化
    pub fn init_motor(&self, controller: MotorController<B, X>) -> SensorKind {
        self.inner.lock(|cell| {
            let mut slot = cell.borrow_mut();
            slot.insert(controller).init()
        })
    }

    /// クリティカルセクション内でコントローラを操作
    ///
    /// 未登録の場合は `None`。
    /// クロージャ内から同じ `SharedMotor` のメソッドを呼ぶと、二重借用でpanicします。
    /// 操作は引数のコントローラに対して直接行ってください。
    pub fn with<R>(&self, f: impl FnOnce(&mut MotorController<B, X>) -> R) -> Option<R> {
        self.inner.lock(|cell| cell.borrow_mut().as_mut().map(f))
    }

    pub fn start_motor(&self) -> Result<StartOutcome, MotorError> {
        self.with(|ctrl| ctrl.start())
            .unwrap_or(Err(MotorError::NotInitialized))
    }

    pub fn stop_motor(&self) {
        self.with(|ctrl| ctrl.stop());
    }

    /// 異常トリガー：`duration` の間モーターをロック
    pub fn lock_motor(&self, duration: Duration) {
        self.with(|ctrl| ctrl.lock(duration));
    }

    /// 未登録時の指令は破棄される
    pub fn command_duty_cycle(&self, duty_cycle: u16) {
        self.with(|ctrl| ctrl.command_duty_cycle(duty_cycle));
    }

    pub fn command_direction(&self, direction: Direction) {
        self.with(|ctrl| ctrl.command_direction(direction));
    }

    /// 未登録時はStopped
    pub fn get_motor_state(&self) -> MotorState {
        self.with(|ctrl| ctrl.state()).unwrap_or(MotorState::Stopped)
    }

    /// ADC変換完了イベントから呼び出す
    pub fn on_sample(&self) -> Option<SampleOutcome> {
        self.with(|ctrl| ctrl.on_sample())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MotorConfig;
    use crate::mock::MockBoard;
    use crate::sampling::CommutationCause;

    #[test]
    fn test_commands_before_init() {
        let motor: SharedMotor<MockBoard> = SharedMotor::new();
        assert_eq!(motor.start_motor(), Err(MotorError::NotInitialized));
        assert_eq!(motor.get_motor_state(), MotorState::Stopped);
        assert_eq!(motor.on_sample(), None);
        motor.stop_motor();
        motor.command_duty_cycle(100);
    }

    #[test]
    fn test_command_surface() {
        static MOTOR: SharedMotor<MockBoard> = SharedMotor::new();

        let mut board = MockBoard::new();
        board.set_hall(false, true, false);
        assert_eq!(
            MOTOR.init_motor(MotorController::new(board, MotorConfig::default())),
            SensorKind::Hall
        );
        assert_eq!(MOTOR.get_motor_state(), MotorState::Stopped);

        MOTOR.command_direction(Direction::Negative);
        MOTOR.command_duty_cycle(5000);
        assert_eq!(MOTOR.start_motor(), Ok(StartOutcome::Started));
        assert_eq!(MOTOR.get_motor_state(), MotorState::Starting);
        assert_eq!(
            MOTOR.start_motor(),
            Ok(StartOutcome::Ignored(MotorState::Starting))
        );

        // sensed sector 3, Negative → 2, dormant A
        MOTOR.with(|ctrl| {
            assert_eq!(ctrl.motor().sector().index(), 2);
            ctrl.board_mut().set_voltages(1500, 0, 0, 2000);
        });
        assert_eq!(
            MOTOR.on_sample(),
            Some(SampleOutcome::Commutated(CommutationCause::ZeroCrossing))
        );

        MOTOR.stop_motor();
        assert_eq!(MOTOR.get_motor_state(), MotorState::Stopped);

        MOTOR.lock_motor(Duration::from_millis(10));
        assert_eq!(MOTOR.get_motor_state(), MotorState::Locked);
        MOTOR.with(|ctrl| ctrl.board_mut().advance_ms(11));
        assert_eq!(MOTOR.on_sample(), Some(SampleOutcome::Unlocked));
        assert_eq!(MOTOR.get_motor_state(), MotorState::Stopped);
    }
}
