#![no_std]
#![no_main]

#[macro_use]
mod fmt;

mod config;
mod hardware;
mod state;
mod tasks;

#[cfg(not(feature = "defmt"))]
use panic_halt as _;
#[cfg(feature = "defmt")]
use {defmt_rtt as _, panic_probe as _};

use bldc_six_step::MotorController;
use embassy_executor::Spawner;
use embassy_stm32::{
    adc::{Adc, AdcChannel, SampleTime},
    gpio::{Flex, Level, Output, Speed},
    time::Hertz,
    timer::{
        complementary_pwm::{ComplementaryPwm, ComplementaryPwmPin},
        low_level::CountingMode,
        simple_pwm::PwmPin,
    },
};
use embassy_time::{Duration, Timer};

use hardware::{Board, HallPins, VoltagePins};
use tasks::{led_task, sampling_task, supervisor_task};

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    // ハードウェア初期化
    let clock_config = hardware::create_clock_config();
    let p = embassy_stm32::init(clock_config);

    info!("═══════════════════════════════════════════════════════════════════");
    info!("        Six-Step BLDC Controller • STM32G431VB @ 170MHz");
    info!("═══════════════════════════════════════════════════════════════════");

    // LED初期化＆タスク起動
    let led1 = Output::new(p.PC13, Level::Low, Speed::Low);
    let led2 = Output::new(p.PC14, Level::Low, Speed::Low);
    let led3 = Output::new(p.PC15, Level::Low, Speed::Low);
    spawner.spawn(led_task(led1, led2, led3)).unwrap();

    // Hall入力（PB6=H1、PB7=H2、PB8=H3）
    let hall = HallPins {
        h1: Flex::new(p.PB6),
        h2: Flex::new(p.PB7),
        h3: Flex::new(p.PB8),
    };

    // ADC初期化（相電圧: PC0/PC2/PC3、バス電圧: PC1）
    let mut adc1 = Adc::new(p.ADC1);
    adc1.set_sample_time(SampleTime::CYCLES47_5);
    let voltages = VoltagePins {
        phase_a: p.PC0.degrade_adc(),
        phase_b: p.PC2.degrade_adc(),
        phase_c: p.PC3.degrade_adc(),
        bus: p.PC1.degrade_adc(),
    };

    // PWM初期化（TIM1、3相相補PWM）
    // 周波数はinit_motorで設定される
    let uvw_pwm = ComplementaryPwm::new(
        p.TIM1,
        Some(PwmPin::new(
            p.PE9,
            embassy_stm32::gpio::OutputType::PushPull,
        )),
        Some(ComplementaryPwmPin::new(
            p.PE8,
            embassy_stm32::gpio::OutputType::PushPull,
        )),
        Some(PwmPin::new(
            p.PE11,
            embassy_stm32::gpio::OutputType::PushPull,
        )),
        Some(ComplementaryPwmPin::new(
            p.PE10,
            embassy_stm32::gpio::OutputType::PushPull,
        )),
        Some(PwmPin::new(
            p.PE13,
            embassy_stm32::gpio::OutputType::PushPull,
        )),
        Some(ComplementaryPwmPin::new(
            p.PE12,
            embassy_stm32::gpio::OutputType::PushPull,
        )),
        None,
        None,
        Hertz(config::MOTOR_CONFIG.pwm_frequency_hz),
        CountingMode::CenterAlignedBothInterrupts,
    );

    let board = Board::new(hall, adc1, voltages, uvw_pwm);
    let sensor = state::MOTOR.init_motor(MotorController::new(board, config::MOTOR_CONFIG));
    info!("Position sensor: {}", sensor);

    spawner.spawn(sampling_task()).unwrap();
    spawner.spawn(supervisor_task()).unwrap();

    // メインループ（将来の拡張用）
    loop {
        Timer::after(Duration::from_millis(100)).await;
    }
}
