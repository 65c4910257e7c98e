//! LED制御タスク
//!
//! モーター状態をLEDで表示します。
//! LED1: Stopped、LED2: Starting（点滅）/ Running（点灯）、LED3: Locked（点滅）

use bldc_six_step::MotorState;
use embassy_stm32::gpio::Output;
use embassy_time::{Duration, Timer};

use crate::state::MOTOR;

/// LED制御タスク
#[embassy_executor::task]
pub async fn led_task(
    mut led1: Output<'static>,
    mut led2: Output<'static>,
    mut led3: Output<'static>,
) {
    info!("LED task started");

    let mut blink = false;

    loop {
        blink = !blink;

        let (on1, on2, on3) = match MOTOR.get_motor_state() {
            MotorState::Stopped => (true, false, false),
            MotorState::Starting => (false, blink, false),
            MotorState::Running => (false, true, false),
            MotorState::Locked => (false, false, blink),
        };

        led1.set_level(on1.into());
        led2.set_level(on2.into());
        led3.set_level(on3.into());

        Timer::after(Duration::from_millis(250)).await;
    }
}
