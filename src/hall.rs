// Hall sensor decoding and rotor position sensing

use crate::error::MotorError;
use crate::hal::HallInputs;
use crate::sector::Sector;

/// Number of predefined Hall-code to sector rows
pub const HALL_TABLE_COUNT: usize = 12;

/// Table entry used for the physically impossible codes 0b000 and 0b111
pub const INVALID_SECTOR: u8 = 6;

/// Every Hall-code to sector translation for the possible sensor
/// placements/wiring offsets.
/// Hall code format: (H3 << 2) | (H2 << 1) | H1
pub const HALL_TO_SECTOR: [[u8; 8]; HALL_TABLE_COUNT] = [
    [6, 1, 3, 2, 5, 0, 4, 6],
    [6, 0, 2, 1, 4, 5, 3, 6],
    [6, 5, 1, 0, 3, 4, 2, 6],
    [6, 4, 0, 5, 2, 3, 1, 6],
    [6, 3, 5, 4, 1, 2, 0, 6],
    [6, 2, 4, 3, 0, 1, 5, 6],
    [6, 4, 2, 3, 0, 5, 1, 6],
    [6, 3, 1, 2, 5, 4, 0, 6],
    [6, 2, 0, 1, 4, 3, 5, 6],
    [6, 1, 5, 0, 3, 2, 4, 6],
    [6, 0, 4, 5, 2, 1, 3, 6],
    [6, 5, 3, 4, 1, 0, 2, 6],
];

/// One of the three Hall sensor lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HallLine {
    H1,
    H2,
    H3,
}

/// 3-bit Hall state sampled from H1..H3
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HallCode(u8);

impl HallCode {
    pub const fn from_levels(h1: bool, h2: bool, h3: bool) -> Self {
        Self(((h3 as u8) << 2) | ((h2 as u8) << 1) | h1 as u8)
    }

    /// Sample all three lines
    pub fn read<H: HallInputs + ?Sized>(inputs: &mut H) -> Self {
        let h1 = inputs.read_line(HallLine::H1);
        let h2 = inputs.read_line(HallLine::H2);
        let h3 = inputs.read_line(HallLine::H3);
        Self::from_levels(h1, h2, h3)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Properly phased sensors never report all-low or all-high
    pub const fn is_valid(self) -> bool {
        self.0 != 0b000 && self.0 != 0b111
    }
}

/// Range-checked row index into [`HALL_TO_SECTOR`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HallTableIndex(u8);

impl HallTableIndex {
    pub const DEFAULT: HallTableIndex = HallTableIndex(0);

    pub const fn new(index: u8) -> Result<Self, MotorError> {
        if (index as usize) < HALL_TABLE_COUNT {
            Ok(Self(index))
        } else {
            Err(MotorError::InvalidHallTable(index))
        }
    }

    pub const fn get(self) -> u8 {
        self.0
    }
}

impl Default for HallTableIndex {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Hall-code to sector map owned by the motor.
///
/// The row is copied out of [`HALL_TO_SECTOR`] so later lookups never touch
/// the shared table set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HallTable {
    map: [u8; 8],
}

impl HallTable {
    pub const fn from_index(index: HallTableIndex) -> Self {
        Self {
            map: HALL_TO_SECTOR[index.0 as usize],
        }
    }

    pub const fn entries(&self) -> &[u8; 8] {
        &self.map
    }

    /// Look up the sector for a Hall code.
    ///
    /// The sentinel entry is never returned as a sector.
    pub fn sector(&self, code: HallCode) -> Result<Sector, MotorError> {
        Sector::new(self.map[code.bits() as usize])
            .map_err(|_| MotorError::InvalidSensorReading { code: code.bits() })
    }
}

/// Rotor position sensing modality
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorKind {
    Hall,
    Sensorless,
}

/// Rotor position source, chosen once at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PositionSensor {
    /// Sector advanced only through back-EMF zero-crossing
    Sensorless,
    /// Hall sensors with the selected table row
    Hall(HallTable),
}

impl PositionSensor {
    /// Configure the Hall inputs and detect whether sensors are connected
    ///
    /// # Arguments
    /// * `inputs` - Hall input lines
    /// * `table` - Table row matching the sensor placement
    pub fn init<H: HallInputs + ?Sized>(inputs: &mut H, table: HallTableIndex) -> Self {
        inputs.configure_inputs();

        let code = HallCode::read(inputs);
        if !code.is_valid() {
            info!(
                "Hall code {} at init, falling back to sensorless",
                code.bits()
            );
            return Self::Sensorless;
        }

        info!(
            "Hall sensors detected (code {}), using table {}",
            code.bits(),
            table.get()
        );
        Self::Hall(HallTable::from_index(table))
    }

    pub const fn kind(&self) -> SensorKind {
        match self {
            Self::Sensorless => SensorKind::Sensorless,
            Self::Hall(_) => SensorKind::Hall,
        }
    }

    /// Determine the current sector
    ///
    /// # Returns
    /// * `Ok(Some(sector))` - Hall lookup
    /// * `Ok(None)` - sensorless; the sector is driven by zero-crossing instead
    /// * `Err(InvalidSensorReading)` - Hall code 0b000/0b111 at runtime
    pub fn determine_sector<H: HallInputs + ?Sized>(
        &self,
        inputs: &mut H,
    ) -> Result<Option<Sector>, MotorError> {
        match self {
            Self::Sensorless => Ok(None),
            Self::Hall(table) => {
                let code = HallCode::read(inputs);
                let sector = table.sector(code)?;
                trace!("Hall code {} -> sector {}", code.bits(), sector.index());
                Ok(Some(sector))
            }
        }
    }
}
