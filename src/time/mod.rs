pub mod fixed_step;

pub use fixed_step::FixedStepAccumulator;
