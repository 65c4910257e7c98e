//! サンプリングタスク
//!
//! 一定周期でADCを読み取り、モーターのサンプリング処理を呼び出します。

use core::sync::atomic::Ordering;

use bldc_six_step::SampleOutcome;
use embassy_time::{Duration, Ticker, Timer};

use crate::config::sampling::PERIOD_US;
use crate::state::{MOTOR, SAMPLING_ENABLED};

/// サンプリングタスク（10kHz）
#[embassy_executor::task]
pub async fn sampling_task() {
    // init_motorでサンプリングが登録されるまで待機
    while !SAMPLING_ENABLED.load(Ordering::Acquire) {
        Timer::after(Duration::from_millis(1)).await;
    }

    info!("Sampling task started: period={}us", PERIOD_US);

    let mut ticker = Ticker::every(Duration::from_micros(PERIOD_US));

    loop {
        ticker.next().await;

        match MOTOR.on_sample() {
            Some(SampleOutcome::Commutated(cause)) => trace!("Commutated: {}", cause),
            Some(SampleOutcome::Unlocked) => info!("Motor unlocked"),
            Some(SampleOutcome::Idle) | None => {}
        }
    }
}
