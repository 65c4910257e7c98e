//! Six-step (trapezoidal) commutation for three-phase BLDC motors.
//!
//! Rotor position comes from three Hall sensors, or during sensorless
//! startup from back-EMF zero-crossings on the dormant phase. Peripherals are
//! reached through the traits in [`hal`]; the firmware supplies the board.
#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod commutation;
pub mod config;
pub mod error;
pub mod hal;
pub mod hall;
pub mod motor;
pub mod phase;
pub mod sampling;
pub mod sector;
pub mod shared;

#[cfg(test)]
mod mock;

pub use commutation::{Commutation, DriveDuties, PhaseRoles};
pub use config::MotorConfig;
pub use error::MotorError;
pub use hal::{Clock, HallInputs, MotorBoard, PhaseAdc, PhasePwm, VoltageChannel};
pub use hall::{HallCode, HallLine, HallTable, HallTableIndex, PositionSensor, SensorKind};
pub use motor::{Motor, MotorController, MotorState, PendingCommand, StartOutcome};
pub use phase::{DriveMode, Phase, PhaseVoltages};
pub use sampling::{CommutationCause, HoldStartup, RunControl, SampleOutcome};
pub use sector::{Direction, Sector};
pub use shared::SharedMotor;
