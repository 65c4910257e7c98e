//! ハードウェア初期化モジュール
//!
//! クロック設定と、モーター制御コアが使うペリフェラル（Hall入力、ADC1、
//! TIM1相補PWM）をまとめた `Board` を提供します。

use embassy_stm32::{
    adc::{Adc, AnyAdcChannel},
    gpio::{Flex, Pull},
    peripherals,
    time::Hertz,
    timer::{complementary_pwm::ComplementaryPwm, Channel},
    Config,
};
use embassy_time::Instant;

use bldc_six_step::{
    Clock, DriveMode, HallInputs, HallLine, Phase, PhaseAdc, PhasePwm, VoltageChannel,
};

use crate::config;
use crate::state::SAMPLING_ENABLED;

/// RCCクロック設定を初期化
///
/// HSI → PLL（÷4 × 85 ÷ 2）で170MHz生成
pub fn create_clock_config() -> Config {
    let mut config = Config::default();
    {
        use embassy_stm32::rcc::mux::{Adcsel, ClockMux};
        use embassy_stm32::rcc::{Pll, PllMul, PllPreDiv, PllRDiv, PllSource, Sysclk};

        config.rcc.hsi = true;
        config.rcc.pll = Some(Pll {
            source: PllSource::HSI,
            prediv: PllPreDiv::DIV4,
            mul: PllMul::MUL85,
            divp: None,
            divq: None,
            divr: Some(PllRDiv::DIV2),
        });
        config.rcc.sys = Sysclk::PLL1_R;

        let mut clock_mux = ClockMux::default();
        clock_mux.adc12sel = Adcsel::SYS;
        config.rcc.mux = clock_mux;
    }
    config
}

/// Hallセンサー入力（PB6=H1、PB7=H2、PB8=H3）
pub struct HallPins {
    pub h1: Flex<'static>,
    pub h2: Flex<'static>,
    pub h3: Flex<'static>,
}

/// 相電圧・バス電圧のADCチャネル
///
/// PC0=A相、PC2=B相、PC3=C相、PC1=バス電圧（すべてADC1）
pub struct VoltagePins {
    pub phase_a: AnyAdcChannel<peripherals::ADC1>,
    pub phase_b: AnyAdcChannel<peripherals::ADC1>,
    pub phase_c: AnyAdcChannel<peripherals::ADC1>,
    pub bus: AnyAdcChannel<peripherals::ADC1>,
}

/// モーター制御用ペリフェラル一式
pub struct Board {
    hall: HallPins,
    adc: Adc<'static, peripherals::ADC1>,
    voltages: VoltagePins,
    pwm: ComplementaryPwm<'static, peripherals::TIM1>,
    max_duty: u16,
}

impl Board {
    pub fn new(
        hall: HallPins,
        adc: Adc<'static, peripherals::ADC1>,
        voltages: VoltagePins,
        pwm: ComplementaryPwm<'static, peripherals::TIM1>,
    ) -> Self {
        let max_duty = pwm.get_max_duty();
        Self {
            hall,
            adc,
            voltages,
            pwm,
            max_duty,
        }
    }

    /// 0-65535のデューティをタイマーのカウント値に変換
    fn scale_duty(&self, duty: u16) -> u16 {
        ((duty as u32 * self.max_duty as u32) / u16::MAX as u32) as u16
    }
}

fn channel_for(phase: Phase) -> Channel {
    match phase {
        Phase::A => Channel::Ch1,
        Phase::B => Channel::Ch2,
        Phase::C => Channel::Ch3,
    }
}

impl HallInputs for Board {
    fn configure_inputs(&mut self) {
        self.hall.h1.set_as_input(Pull::Up);
        self.hall.h2.set_as_input(Pull::Up);
        self.hall.h3.set_as_input(Pull::Up);
        debug!("Hall inputs configured (PB6/PB7/PB8, pull-up)");
    }

    fn read_line(&mut self, line: HallLine) -> bool {
        match line {
            HallLine::H1 => self.hall.h1.is_high(),
            HallLine::H2 => self.hall.h2.is_high(),
            HallLine::H3 => self.hall.h3.is_high(),
        }
    }
}

impl PhaseAdc for Board {
    fn read_voltage(&mut self, channel: VoltageChannel) -> u16 {
        let pin = match channel {
            VoltageChannel::PhaseA => &mut self.voltages.phase_a,
            VoltageChannel::PhaseB => &mut self.voltages.phase_b,
            VoltageChannel::PhaseC => &mut self.voltages.phase_c,
            VoltageChannel::Bus => &mut self.voltages.bus,
        };
        // 12bit → 16bit固定小数点
        self.adc.blocking_read(pin) << 4
    }

    fn enable_sample_interrupt(&mut self) {
        SAMPLING_ENABLED.store(true, core::sync::atomic::Ordering::Release);
    }
}

impl PhasePwm for Board {
    fn init_pwm(&mut self, frequency_hz: u32) {
        for phase in Phase::ALL {
            self.pwm.disable(channel_for(phase));
        }
        self.pwm.set_frequency(Hertz(frequency_hz));
        self.pwm.set_dead_time(config::pwm::DEFAULT_DEAD_TIME);
        self.max_duty = self.pwm.get_max_duty();
        info!(
            "TIM1 PWM: {}Hz, max duty={}, dead time={}",
            frequency_hz,
            self.max_duty,
            config::pwm::DEFAULT_DEAD_TIME
        );
    }

    fn set_phase_duty(&mut self, phase: Phase, mode: DriveMode, duty: u16) {
        let channel = channel_for(phase);
        match mode {
            DriveMode::Dormant => {
                // 出力は止め、比較値だけ残す（休止相の電圧サンプリングのタイミング用）
                self.pwm.disable(channel);
                self.pwm.set_duty(channel, self.scale_duty(duty));
            }
            DriveMode::Drive => {
                self.pwm.set_duty(channel, self.scale_duty(duty));
                self.pwm.enable(channel);
            }
        }
    }
}

impl Clock for Board {
    fn now(&self) -> Instant {
        Instant::now()
    }
}
