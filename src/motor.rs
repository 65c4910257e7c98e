//! モーター状態管理とコマンドインターフェース
//!
//! `MotorController` がモーター状態（`Motor`）と外部指令（`PendingCommand`）を
//! 排他的に所有し、始動・停止・ロックの状態遷移を実行します。

use embassy_time::{Duration, Instant};

use crate::commutation::Commutation;
use crate::config::MotorConfig;
use crate::error::MotorError;
use crate::hal::MotorBoard;
use crate::hall::{PositionSensor, SensorKind};
use crate::phase::{DriveMode, Phase, PhaseVoltages};
use crate::sampling::{HoldStartup, RunControl};
use crate::sector::{Direction, Sector};

/// モーター状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotorState {
    /// 停止（全相休止）
    Stopped,
    /// 強制転流による始動中
    Starting,
    /// 運転中
    Running,
    /// 異常によるロック中（期限後に自動でStoppedへ）
    Locked,
}

/// アプリケーションからの指令（始動時にのみ反映）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PendingCommand {
    /// デューティ比（0-65535）
    pub duty_cycle: u16,
    /// 回転方向
    pub direction: Direction,
}

/// `start` の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StartOutcome {
    /// Stopped → Starting に遷移した
    Started,
    /// Stopped以外のため何もしなかった（エラーではない）
    Ignored(MotorState),
}

/// モーター状態の集約
#[derive(Debug, Clone, Copy)]
pub struct Motor {
    pub(crate) state: MotorState,
    pub(crate) sector: Sector,
    pub(crate) duty_cycle: u16,
    pub(crate) direction: Direction,
    pub(crate) sensor: PositionSensor,
    pub(crate) voltages: PhaseVoltages,
    pub(crate) dormant: Phase,
    pub(crate) sensed_sector: Option<Sector>,
    pub(crate) commutations: u32,
    pub(crate) started_at: Instant,
    pub(crate) last_commutation_at: Instant,
    pub(crate) locked_until: Instant,
}

impl Motor {
    const fn new() -> Self {
        Self {
            state: MotorState::Stopped,
            sector: Sector::ZERO,
            duty_cycle: 0,
            direction: Direction::Positive,
            sensor: PositionSensor::Sensorless,
            voltages: PhaseVoltages::new(),
            dormant: Phase::C,
            sensed_sector: None,
            commutations: 0,
            started_at: Instant::from_ticks(0),
            last_commutation_at: Instant::from_ticks(0),
            locked_until: Instant::from_ticks(0),
        }
    }

    pub fn state(&self) -> MotorState {
        self.state
    }

    pub fn sector(&self) -> Sector {
        self.sector
    }

    /// 現在適用中のデューティ比（指令値ではない）
    pub fn duty_cycle(&self) -> u16 {
        self.duty_cycle
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn sensor(&self) -> &PositionSensor {
        &self.sensor
    }

    pub fn sensor_kind(&self) -> SensorKind {
        self.sensor.kind()
    }

    /// 直近のサンプリング電圧
    pub fn voltages(&self) -> PhaseVoltages {
        self.voltages
    }

    /// 現在の休止相
    pub fn dormant_phase(&self) -> Phase {
        self.dormant
    }

    /// 休止相の直近サンプリング電圧（ゼロクロス判定用）
    pub fn dormant_voltage(&self) -> u16 {
        self.voltages.get(self.dormant)
    }

    /// 直前の始動時にセンサーから得たセクター（センサーレスではNone）
    pub fn sensed_sector(&self) -> Option<Sector> {
        self.sensed_sector
    }

    /// 転流回数（ラップアラウンド）
    pub fn commutation_count(&self) -> u32 {
        self.commutations
    }

    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    pub fn last_commutation_at(&self) -> Instant {
        self.last_commutation_at
    }

    pub fn locked_until(&self) -> Instant {
        self.locked_until
    }
}

/// モーターコントローラ
///
/// ボード（ペリフェラル）、設定、モーター状態、指令を所有します。
/// 割り込みとの共有は [`crate::shared::SharedMotor`] を経由します。
pub struct MotorController<B, X = HoldStartup> {
    pub(crate) board: B,
    pub(crate) config: MotorConfig,
    pub(crate) motor: Motor,
    pub(crate) command: PendingCommand,
    pub(crate) run_control: X,
}

impl<B: MotorBoard> MotorController<B, HoldStartup> {
    /// 新しいモーターコントローラを作成（Running移行なし）
    pub fn new(board: B, config: MotorConfig) -> Self {
        Self::with_run_control(board, config, HoldStartup)
    }
}

impl<B: MotorBoard, X: RunControl> MotorController<B, X> {
    /// 運転移行ロジックを指定してコントローラを作成
    ///
    /// # 引数
    /// * `board` - ペリフェラル
    /// * `config` - 制御パラメータ
    /// * `run_control` - Starting→Running移行とRunning中の制御
    pub fn with_run_control(board: B, config: MotorConfig, run_control: X) -> Self {
        Self {
            board,
            config,
            motor: Motor::new(),
            command: PendingCommand::default(),
            run_control,
        }
    }

    /// 初期化（PWM設定、停止、方向初期化、位置センサー検出、サンプリング登録）
    pub fn init(&mut self) -> SensorKind {
        self.board.init_pwm(self.config.pwm_frequency_hz);

        self.stop();
        self.command_direction(Direction::Positive);

        self.motor.sensor = PositionSensor::init(&mut self.board, self.config.hall_table);

        self.board.enable_sample_interrupt();

        let kind = self.motor.sensor.kind();
        info!(
            "Motor initialized: PWM={}Hz, sensor={}, startup duty={}",
            self.config.pwm_frequency_hz,
            kind,
            self.config.startup_duty
        );
        kind
    }

    /// 始動（Stopped時のみ）
    ///
    /// 指令デューティは使わず、設定の始動デューティで強制転流を開始します。
    ///
    /// # 戻り値
    /// * `Ok(Started)` - Startingに遷移し、1回転流した
    /// * `Ok(Ignored(state))` - Stopped以外のため副作用なし
    /// * `Err(InvalidSensorReading)` - Hall値が不正。モーターはLockedになる
    pub fn start(&mut self) -> Result<StartOutcome, MotorError> {
        if self.motor.state != MotorState::Stopped {
            debug!("Start ignored in state {}", self.motor.state);
            return Ok(StartOutcome::Ignored(self.motor.state));
        }

        let sensed = match self.motor.sensor.determine_sector(&mut self.board) {
            Ok(sensed) => sensed,
            Err(e) => {
                self.fault(e);
                return Err(e);
            }
        };

        let now = self.board.now();
        self.motor.sector = sensed.unwrap_or(Sector::ZERO);
        self.motor.sensed_sector = sensed;
        self.motor.state = MotorState::Starting;
        self.motor.started_at = now;
        self.motor.duty_cycle = self.config.startup_duty;
        self.motor.direction = self.command.direction;

        self.commutate(now);

        info!(
            "Motor starting: direction={}, sector={}, duty={}",
            self.motor.direction,
            self.motor.sector.index(),
            self.motor.duty_cycle
        );
        Ok(StartOutcome::Started)
    }

    /// 停止（どの状態からでも、何度呼んでもよい）
    pub fn stop(&mut self) {
        self.release_phases();
        if self.motor.state != MotorState::Stopped {
            info!("Motor stopped from {}", self.motor.state);
        }
        self.motor.state = MotorState::Stopped;
    }

    /// 異常によりモーターをロック
    ///
    /// 全相を休止させ、`duration` 経過後のサンプリングでStoppedに戻ります。
    /// 期限が `Instant::MAX` を超える場合は `Instant::MAX` で飽和します。
    pub fn lock(&mut self, duration: Duration) {
        self.release_phases();
        let now = self.board.now();
        self.motor.locked_until = now.checked_add(duration).unwrap_or(Instant::MAX);
        self.motor.state = MotorState::Locked;
        warn!("Motor locked for {}ms", duration.as_millis());
    }

    /// デューティ比の指令（次回始動まで反映されない）
    pub fn command_duty_cycle(&mut self, duty_cycle: u16) {
        self.command.duty_cycle = duty_cycle;
    }

    /// 回転方向の指令（次回始動時に反映）
    pub fn command_direction(&mut self, direction: Direction) {
        self.command.direction = direction;
    }

    pub fn state(&self) -> MotorState {
        self.motor.state
    }

    pub fn motor(&self) -> &Motor {
        &self.motor
    }

    pub fn pending_command(&self) -> PendingCommand {
        self.command
    }

    pub fn config(&self) -> &MotorConfig {
        &self.config
    }

    pub fn board(&self) -> &B {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut B {
        &mut self.board
    }

    pub fn run_control(&self) -> &X {
        &self.run_control
    }

    pub(crate) fn fault(&mut self, error: MotorError) {
        error!("Motor fault: {}", error);
        self.lock(self.config.fault_lock);
    }

    /// 次のセクターへ転流
    pub(crate) fn commutate(&mut self, now: Instant) {
        let step = Commutation::step(self.motor.sector, self.motor.direction, self.motor.duty_cycle);
        step.apply(&mut self.board);

        self.motor.sector = step.sector;
        self.motor.dormant = step.roles.dormant;
        self.motor.commutations = self.motor.commutations.wrapping_add(1);

        if self.motor.state == MotorState::Starting {
            self.motor.last_commutation_at = now;
        }

        trace!(
            "Commutate: sector={}, high={}, low={}, dormant={}",
            step.sector.index(),
            step.roles.high,
            step.roles.low,
            step.roles.dormant
        );
    }

    fn release_phases(&mut self) {
        for phase in Phase::ALL {
            self.board.set_phase_duty(phase, DriveMode::Dormant, 0);
        }
    }
}
