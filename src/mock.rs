// Test board recording PWM writes, with scripted Hall levels, voltages and time

use embassy_time::{Duration, Instant};

use crate::hal::{Clock, HallInputs, PhaseAdc, PhasePwm, VoltageChannel};
use crate::hall::HallLine;
use crate::phase::{DriveMode, Phase};

pub struct MockBoard {
    pub hall: [bool; 3],
    pub hall_configured: bool,
    /// PhaseA, PhaseB, PhaseC, Bus
    pub voltages: [u16; 4],
    pub sample_interrupt_enabled: bool,
    pub pwm_frequency_hz: Option<u32>,
    /// Latest (mode, duty) per phase A, B, C
    pub outputs: [(DriveMode, u16); 3],
    pub pwm_log: Vec<(Phase, DriveMode, u16)>,
    pub now: Instant,
}

impl MockBoard {
    pub fn new() -> Self {
        Self {
            hall: [false; 3],
            hall_configured: false,
            voltages: [0; 4],
            sample_interrupt_enabled: false,
            pwm_frequency_hz: None,
            outputs: [(DriveMode::Drive, u16::MAX); 3],
            pwm_log: Vec::new(),
            now: Instant::from_millis(0),
        }
    }

    pub fn set_hall(&mut self, h1: bool, h2: bool, h3: bool) {
        self.hall = [h1, h2, h3];
    }

    pub fn set_voltages(&mut self, a: u16, b: u16, c: u16, bus: u16) {
        self.voltages = [a, b, c, bus];
    }

    pub fn set_time_ms(&mut self, ms: u64) {
        self.now = Instant::from_millis(ms);
    }

    pub fn advance_ms(&mut self, ms: u64) {
        self.now += Duration::from_millis(ms);
    }
}

impl HallInputs for MockBoard {
    fn configure_inputs(&mut self) {
        self.hall_configured = true;
    }

    fn read_line(&mut self, line: HallLine) -> bool {
        match line {
            HallLine::H1 => self.hall[0],
            HallLine::H2 => self.hall[1],
            HallLine::H3 => self.hall[2],
        }
    }
}

impl PhaseAdc for MockBoard {
    fn read_voltage(&mut self, channel: VoltageChannel) -> u16 {
        match channel {
            VoltageChannel::PhaseA => self.voltages[0],
            VoltageChannel::PhaseB => self.voltages[1],
            VoltageChannel::PhaseC => self.voltages[2],
            VoltageChannel::Bus => self.voltages[3],
        }
    }

    fn enable_sample_interrupt(&mut self) {
        self.sample_interrupt_enabled = true;
    }
}

impl PhasePwm for MockBoard {
    fn init_pwm(&mut self, frequency_hz: u32) {
        self.pwm_frequency_hz = Some(frequency_hz);
    }

    fn set_phase_duty(&mut self, phase: Phase, mode: DriveMode, duty: u16) {
        self.outputs[phase as usize] = (mode, duty);
        self.pwm_log.push((phase, mode, duty));
    }
}

impl Clock for MockBoard {
    fn now(&self) -> Instant {
        self.now
    }
}
