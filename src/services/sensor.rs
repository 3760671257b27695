//! Simulated people-counting sensors
//!
//! Every sensor owns its random generator, so tests can seed it (or swap in
//! a `ScriptedSensor`) instead of depending on process-wide entropy.

use crate::domain::SensorType;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

/// Source of occupancy readings for one sensor
pub trait SensorSource {
    fn sensor_type(&self) -> SensorType;

    /// Take one reading (people counted). Never negative.
    fn reading(&mut self) -> u32;
}

/// Sensor producing a uniform draw in `[0, max_count]` plus noise in `[-noise, +noise]`,
/// clamped at zero
pub struct SimulatedSensor<R: RngCore = StdRng> {
    sensor_type: SensorType,
    max_count: u32,
    noise: u32,
    rng: R,
}

impl SimulatedSensor<StdRng> {
    /// Sensor seeded from OS entropy
    pub fn from_entropy(sensor_type: SensorType, max_count: u32, noise: u32) -> Self {
        Self::new(sensor_type, max_count, noise, StdRng::from_entropy())
    }

    /// Sensor with a reproducible reading sequence
    pub fn seeded(sensor_type: SensorType, max_count: u32, noise: u32, seed: u64) -> Self {
        Self::new(sensor_type, max_count, noise, StdRng::seed_from_u64(seed))
    }
}

impl<R: RngCore> SimulatedSensor<R> {
    pub fn new(sensor_type: SensorType, max_count: u32, noise: u32, rng: R) -> Self {
        Self { sensor_type, max_count, noise, rng }
    }
}

impl<R: RngCore> SensorSource for SimulatedSensor<R> {
    fn sensor_type(&self) -> SensorType {
        self.sensor_type
    }

    fn reading(&mut self) -> u32 {
        let noise = i64::from(self.noise);
        let jitter = self.rng.gen_range(-noise..=noise);
        let raw = i64::from(self.rng.gen_range(0..=self.max_count));
        (raw + jitter).clamp(0, i64::from(u32::MAX)) as u32
    }
}

/// Sensor replaying a fixed list of readings, cycling when exhausted
///
/// An empty script always reads 0.
pub struct ScriptedSensor {
    sensor_type: SensorType,
    script: Vec<u32>,
    next: usize,
}

impl ScriptedSensor {
    pub fn new(sensor_type: SensorType, script: Vec<u32>) -> Self {
        Self { sensor_type, script, next: 0 }
    }
}

impl SensorSource for ScriptedSensor {
    fn sensor_type(&self) -> SensorType {
        self.sensor_type
    }

    fn reading(&mut self) -> u32 {
        if self.script.is_empty() {
            return 0;
        }
        let value = self.script[self.next % self.script.len()];
        self.next += 1;
        value
    }
}

/// One entropy-seeded sensor of each kind, in `SensorType::ALL` order
pub fn default_sensors(max_count: u32, noise: u32) -> Vec<Box<dyn SensorSource>> {
    SensorType::ALL
        .iter()
        .map(|&kind| {
            Box::new(SimulatedSensor::from_entropy(kind, max_count, noise)) as Box<dyn SensorSource>
        })
        .collect()
}

/// Scripted sensors fed column-wise from per-update reading rows
///
/// `rows[i][j]` is what sensor `j` reports on update `i`. Rows must have equal length.
#[cfg(test)]
pub(crate) fn scripted_sensors(rows: &[Vec<u32>]) -> Vec<Box<dyn SensorSource>> {
    let width = rows.first().map_or(0, Vec::len);
    (0..width)
        .map(|j| {
            let kind = SensorType::ALL[j % SensorType::ALL.len()];
            let script = rows.iter().map(|row| row[j]).collect();
            Box::new(ScriptedSensor::new(kind, script)) as Box<dyn SensorSource>
        })
        .collect()
}
