use crate::error::{SimulationError, SimulationResult};

/// Converts variable frame deltas into whole fixed simulation steps.
///
/// Leftover time is carried to the next frame, so the integrators only ever
/// see the fixed timestep.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedStepAccumulator {
    timestep: f32,
    accumulated: f32,
    /// Optional clamp on a single frame delta
    max_frame_time: Option<f32>,
}

impl FixedStepAccumulator {
    pub fn new(timestep: f32) -> SimulationResult<Self> {
        if !(timestep.is_finite() && timestep > 0.0) {
            return Err(SimulationError::InvalidTimestep { timestep });
        }
        Ok(Self {
            timestep,
            accumulated: 0.0,
            max_frame_time: None,
        })
    }

    /// Drop frame time beyond `max_frame_time` instead of catching up on it
    pub fn with_max_frame_time(mut self, max_frame_time: Option<f32>) -> Self {
        self.max_frame_time = max_frame_time;
        self
    }

    pub fn timestep(&self) -> f32 {
        self.timestep
    }

    pub fn accumulated(&self) -> f32 {
        self.accumulated
    }

    /// Fraction of a step left over, for render interpolation
    pub fn alpha(&self) -> f32 {
        self.accumulated / self.timestep
    }

    pub fn reset(&mut self) {
        self.accumulated = 0.0;
    }

    /// Add `frame_time` and call `step_fn(timestep)` once per whole step.
    /// Returns the number of steps run.
    pub fn advance<F>(&mut self, frame_time: f32, mut step_fn: F) -> usize
    where
        F: FnMut(f32),
    {
        let frame_time = match self.max_frame_time {
            Some(max) if frame_time > max => {
                log::warn!(
                    "[FixedStepAccumulator] frame time {:.4}s clamped to {:.4}s",
                    frame_time,
                    max
                );
                max
            }
            _ if !frame_time.is_finite() => {
                log::warn!("[FixedStepAccumulator] non-finite frame time {} ignored", frame_time);
                0.0
            }
            _ => frame_time.max(0.0),
        };

        self.accumulated += frame_time;

        let mut steps = 0;
        while self.accumulated >= self.timestep {
            let remaining = self.accumulated - self.timestep;
            if remaining == self.accumulated {
                log::warn!(
                    "[FixedStepAccumulator] backlog of {:.1}s cannot be stepped at {:.5}s, dropped",
                    self.accumulated,
                    self.timestep
                );
                self.accumulated = 0.0;
                break;
            }
            self.accumulated = remaining;
            step_fn(self.timestep);
            steps += 1;
        }
        steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_bad_timestep() {
        assert!(FixedStepAccumulator::new(0.0).is_err());
        assert!(FixedStepAccumulator::new(-0.1).is_err());
        assert!(FixedStepAccumulator::new(f32::NAN).is_err());
    }

    #[test]
    fn test_carries_remainder() {
        let mut accumulator = FixedStepAccumulator::new(0.1).unwrap();
        let mut seen = Vec::new();

        assert_eq!(accumulator.advance(0.25, |dt| seen.push(dt)), 2);
        assert!((accumulator.accumulated() - 0.05).abs() < 1e-6);
        assert!((accumulator.alpha() - 0.5).abs() < 1e-4);

        assert_eq!(accumulator.advance(0.06, |dt| seen.push(dt)), 1);
        assert!(seen.iter().all(|&dt| dt == 0.1));
    }

    #[test]
    fn test_short_frames_accumulate() {
        let mut accumulator = FixedStepAccumulator::new(1.0 / 60.0).unwrap();
        let mut steps = 0;
        for _ in 0..3 {
            steps += accumulator.advance(1.0 / 240.0, |_| {});
        }
        assert_eq!(steps, 0);
        for _ in 0..2 {
            steps += accumulator.advance(1.0 / 240.0, |_| {});
        }
        assert_eq!(steps, 1);
    }

    #[test]
    fn test_frame_clamp() {
        let mut accumulator = FixedStepAccumulator::new(0.1)
            .unwrap()
            .with_max_frame_time(Some(0.25));
        assert_eq!(accumulator.advance(10.0, |_| {}), 2);

        let mut unclamped = FixedStepAccumulator::new(0.1).unwrap();
        assert_eq!(unclamped.advance(1.05, |_| {}), 10);
    }

    #[test]
    fn test_non_finite_frame_time_ignored() {
        let mut accumulator = FixedStepAccumulator::new(1.0 / 60.0).unwrap();
        assert_eq!(accumulator.advance(f32::INFINITY, |_| {}), 0);
        assert_eq!(accumulator.advance(f32::NAN, |_| {}), 0);
        assert_eq!(accumulator.advance(f32::NEG_INFINITY, |_| {}), 0);
        assert_eq!(accumulator.accumulated(), 0.0);

        assert_eq!(accumulator.advance(1.0 / 30.0 + 1e-4, |_| {}), 2);
    }

    #[test]
    fn test_unsteppable_backlog_dropped() {
        let mut accumulator = FixedStepAccumulator::new(1.0 / 60.0).unwrap();
        // Far beyond the point where subtracting one step changes an f32
        assert_eq!(accumulator.advance(1.0e9, |_| {}), 0);
        assert_eq!(accumulator.accumulated(), 0.0);
    }
}
