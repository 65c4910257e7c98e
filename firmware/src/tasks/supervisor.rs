//! モーター監視タスク
//!
//! 初期指令を与えてモーターを始動し、状態変化をログに出します。
//! ロックが解除されてStoppedに戻ったら、待ち時間の後に再始動します。

use bldc_six_step::{MotorState, StartOutcome};
use embassy_time::{Instant, Ticker};

use crate::config::command::*;
use crate::state::MOTOR;

fn start() {
    match MOTOR.start_motor() {
        Ok(StartOutcome::Started) => info!("Motor start requested"),
        Ok(StartOutcome::Ignored(state)) => debug!("Start ignored: {}", state),
        Err(e) => error!("Motor start failed: {}", e),
    }
}

/// モーター監視タスク
#[embassy_executor::task]
pub async fn supervisor_task() {
    info!(
        "Supervisor task started: duty={}, direction={}",
        INITIAL_DUTY_CYCLE, INITIAL_DIRECTION
    );

    MOTOR.command_duty_cycle(INITIAL_DUTY_CYCLE);
    MOTOR.command_direction(INITIAL_DIRECTION);
    start();

    let mut last_state = MOTOR.get_motor_state();
    let mut stopped_since: Option<Instant> = None;
    let mut ticker = Ticker::every(SUPERVISOR_PERIOD);

    loop {
        ticker.next().await;

        let state = MOTOR.get_motor_state();
        if state != last_state {
            info!("Motor state: {} -> {}", last_state, state);

            if last_state == MotorState::Locked && state == MotorState::Stopped {
                stopped_since = Some(Instant::now());
            }
            last_state = state;
        }

        if let Some(since) = stopped_since {
            if state != MotorState::Stopped {
                stopped_since = None;
            } else if since.elapsed() >= RESTART_DELAY {
                stopped_since = None;
                info!("Restarting motor after lock");
                start();
            }
        }
    }
}
