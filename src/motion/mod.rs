//! Enter/exit class transitions and frame-driven movement.

pub mod handle;
pub mod runner;

pub use handle::{MotionHandle, MotionOutcome};
pub use runner::{Direction, FrameFn, MotionRunner};
