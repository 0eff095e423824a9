//! Front range-sensor pair.

use rover_common::hal::driver::SensorSource;
use rover_common::hal::types::SensorId;

use crate::safety::sensor::{DistanceReading, RangePair};

/// Reads both range sensors as one snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RangeSensors;

impl RangeSensors {
    pub fn read<H: SensorSource + ?Sized>(&self, hw: &H) -> RangePair {
        RangePair {
            left: DistanceReading::from_raw(hw.distance(SensorId::RangeLeft)),
            right: DistanceReading::from_raw(hw.distance(SensorId::RangeRight)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimRobot;

    #[test]
    fn reads_both_sensors() {
        let mut sim = SimRobot::default();
        sim.set_wall_distance(0.8);
        sim.set_sensor_fault(SensorId::RangeRight, true);

        let pair = RangeSensors.read(&sim);
        assert_eq!(pair.left.meters(), Some(0.8));
        assert!(!pair.right.is_valid());
        assert_eq!(pair.average(), None);
    }
}
