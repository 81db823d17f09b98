//! Simulated caliper for bench work without hardware
//!
//! Produces readings from a configurable pattern, optionally with noise, and
//! can inject "no data" answers and communication failures at a fixed
//! cadence so the failure paths of the controller can be exercised by hand.
//!
//! Only available with the `mock-device` feature:
//!
//! ```bash
//! cargo run --features mock-device
//! ```
//!
//! and `transport = "simulated"` in the `[device]` section of the config.
//! The pattern and the injection cadence come from `[device.simulated]`.

use std::time::{Duration, Instant};

pub use crate::config::SimulatedPattern;
use crate::config::SimulatedConfig;
use crate::error::{LoggerError, Result};
use crate::types::ReadOutcome;

use super::DeviceTransport;

/// A fake gauge
#[derive(Debug, Clone)]
pub struct SimulatedCaliper {
    pattern: SimulatedPattern,
    noise_amplitude: f64,
    no_data_every: Option<u64>,
    fail_every: Option<u64>,
    /// Rounds values like the instrument display (3 decimals)
    resolution: f64,
    reads: u64,
    current: f64,
    started: Option<Instant>,
    seed: u64,
}

impl Default for SimulatedCaliper {
    fn default() -> Self {
        Self::new(SimulatedPattern::default())
    }
}

impl SimulatedCaliper {
    /// Create a caliper producing `pattern`
    pub fn new(pattern: SimulatedPattern) -> Self {
        let current = match pattern {
            SimulatedPattern::Constant { value } => value,
            SimulatedPattern::Ramp { start, .. } => start,
            SimulatedPattern::Sine { offset, .. } => offset,
            SimulatedPattern::RandomWalk { min, max, .. } => (min + max) / 2.0,
        };
        Self {
            pattern,
            noise_amplitude: 0.0,
            no_data_every: None,
            fail_every: None,
            resolution: 0.001,
            reads: 0,
            current,
            started: None,
            seed: 12345,
        }
    }

    /// Create a caliper as described by `[device.simulated]`
    pub fn from_config(config: &SimulatedConfig) -> Self {
        Self::new(config.pattern)
            .with_noise(config.noise)
            .with_no_data_every(config.no_data_every)
            .with_failure_every(config.failure_every)
    }

    /// Add uniform noise of the given amplitude
    pub fn with_noise(mut self, amplitude: f64) -> Self {
        self.noise_amplitude = amplitude;
        self
    }

    /// Answer "no data" on every `n`th read
    pub fn with_no_data_every(mut self, n: u64) -> Self {
        self.no_data_every = (n > 0).then_some(n);
        self
    }

    /// Fail with a communication error on every `n`th read
    pub fn with_failure_every(mut self, n: u64) -> Self {
        self.fail_every = (n > 0).then_some(n);
        self
    }

    /// Number of reads served so far
    pub fn reads(&self) -> u64 {
        self.reads
    }

    fn next_random(&mut self) -> f64 {
        // xorshift64
        let mut s = self.seed;
        s ^= s << 13;
        s ^= s >> 7;
        s ^= s << 17;
        self.seed = s;
        (s as f64) / (u64::MAX as f64)
    }

    fn next_value(&mut self) -> f64 {
        let base = match self.pattern {
            SimulatedPattern::Constant { value } => value,
            SimulatedPattern::Ramp { step, .. } => {
                let value = self.current;
                self.current += step;
                value
            }
            SimulatedPattern::Sine {
                period_secs,
                amplitude,
                offset,
            } => {
                let t = self
                    .started
                    .map(|s| s.elapsed().as_secs_f64())
                    .unwrap_or(0.0);
                let period = if period_secs > 0.0 { period_secs } else { 1.0 };
                offset + amplitude * (2.0 * std::f64::consts::PI * t / period).sin()
            }
            SimulatedPattern::RandomWalk { step, min, max } => {
                let delta = (self.next_random() - 0.5) * 2.0 * step;
                self.current = (self.current + delta).clamp(min, max);
                self.current
            }
        };

        let value = if self.noise_amplitude > 0.0 {
            base + (self.next_random() - 0.5) * 2.0 * self.noise_amplitude
        } else {
            base
        };

        (value / self.resolution).round() * self.resolution
    }
}

fn hits(every: Option<u64>, count: u64) -> bool {
    every.is_some_and(|n| count % n == 0)
}

impl DeviceTransport for SimulatedCaliper {
    fn setup(&mut self) -> Result<()> {
        self.started = Some(Instant::now());
        tracing::info!("Simulated caliper ready ({:?})", self.pattern);
        Ok(())
    }

    fn read(&mut self, _timeout: Duration) -> Result<ReadOutcome> {
        if self.started.is_none() {
            return Err(LoggerError::Communication(
                "transport not set up".to_string(),
            ));
        }

        self.reads += 1;

        if hits(self.fail_every, self.reads) {
            return Err(LoggerError::Communication(format!(
                "simulated failure on read {}",
                self.reads
            )));
        }
        if hits(self.no_data_every, self.reads) {
            return Ok(ReadOutcome::NoData);
        }

        Ok(ReadOutcome::Value(self.next_value()))
    }

    fn describe(&self) -> String {
        "Simulated caliper".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T: Duration = Duration::from_millis(10);

    #[test]
    fn test_requires_setup() {
        let mut caliper = SimulatedCaliper::new(SimulatedPattern::Constant { value: 1.0 });
        assert!(caliper.read(T).is_err());
    }

    #[test]
    fn test_ramp() {
        let mut caliper = SimulatedCaliper::new(SimulatedPattern::Ramp {
            start: 10.0,
            step: 0.01,
        });
        caliper.setup().unwrap();
        assert_eq!(caliper.read(T).unwrap(), ReadOutcome::Value(10.0));
        assert_eq!(caliper.read(T).unwrap(), ReadOutcome::Value(10.01));
    }

    #[test]
    fn test_injection_cadence() {
        let mut caliper = SimulatedCaliper::new(SimulatedPattern::Constant { value: 2.0 })
            .with_no_data_every(2)
            .with_failure_every(3);
        caliper.setup().unwrap();

        assert_eq!(caliper.read(T).unwrap(), ReadOutcome::Value(2.0));
        assert_eq!(caliper.read(T).unwrap(), ReadOutcome::NoData);
        assert!(caliper.read(T).unwrap_err().is_transient());
        assert_eq!(caliper.read(T).unwrap(), ReadOutcome::NoData);
        assert_eq!(caliper.reads(), 4);
    }

    #[test]
    fn test_random_walk_stays_in_range() {
        let mut caliper = SimulatedCaliper::new(SimulatedPattern::RandomWalk {
            step: 0.5,
            min: 0.0,
            max: 1.0,
        })
        .with_noise(0.0);
        caliper.setup().unwrap();
        for _ in 0..200 {
            match caliper.read(T).unwrap() {
                ReadOutcome::Value(v) => assert!((0.0..=1.0).contains(&v)),
                ReadOutcome::NoData => unreachable!(),
            }
        }
    }

    #[test]
    fn test_from_config_applies_injection() {
        let config = SimulatedConfig {
            pattern: SimulatedPattern::Constant { value: 4.2 },
            no_data_every: 2,
            failure_every: 0,
            noise: 0.0,
        };
        let mut caliper = SimulatedCaliper::from_config(&config);
        caliper.setup().unwrap();

        assert_eq!(caliper.read(T).unwrap(), ReadOutcome::Value(4.2));
        assert_eq!(caliper.read(T).unwrap(), ReadOutcome::NoData);
        assert_eq!(caliper.read(T).unwrap(), ReadOutcome::Value(4.2));
    }
}
