//! Actuator and sensor identifiers and the requirement set built from them.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// One physical output of the platform.
///
/// Each handle doubles as an exclusivity token: at most one running
/// command may hold it at any tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum ActuatorId {
    DriveLeft = 0,
    DriveRight = 1,
    Feeder = 2,
    Intake = 3,
}

impl ActuatorId {
    /// Number of actuator handles.
    pub const COUNT: usize = 4;

    /// All handles in index order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::DriveLeft,
        Self::DriveRight,
        Self::Feeder,
        Self::Intake,
    ];

    /// Dense index, usable for fixed-size per-actuator arrays.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// The requirement bit owned by this handle.
    #[inline]
    pub const fn requirement(self) -> Requirements {
        match self {
            Self::DriveLeft => Requirements::DRIVE_LEFT,
            Self::DriveRight => Requirements::DRIVE_RIGHT,
            Self::Feeder => Requirements::FEEDER,
            Self::Intake => Requirements::INTAKE,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::DriveLeft => "drive_left",
            Self::DriveRight => "drive_right",
            Self::Feeder => "feeder",
            Self::Intake => "intake",
        }
    }
}

impl std::fmt::Display for ActuatorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Range sensor identifiers (front pair).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum SensorId {
    RangeLeft = 0,
    RangeRight = 1,
}

impl SensorId {
    pub const COUNT: usize = 2;

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

bitflags! {
    /// Set of actuator handles a command needs exclusive access to.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Requirements: u8 {
        const DRIVE_LEFT  = 0x01;
        const DRIVE_RIGHT = 0x02;
        const FEEDER      = 0x04;
        const INTAKE      = 0x08;
        /// Both drive sides.
        const DRIVETRAIN  = Self::DRIVE_LEFT.bits() | Self::DRIVE_RIGHT.bits();
    }
}

impl Requirements {
    /// Iterate the actuator handles contained in this set.
    pub fn actuators(self) -> impl Iterator<Item = ActuatorId> {
        ActuatorId::ALL
            .into_iter()
            .filter(move |id| self.contains(id.requirement()))
    }
}

impl From<ActuatorId> for Requirements {
    fn from(id: ActuatorId) -> Self {
        id.requirement()
    }
}
