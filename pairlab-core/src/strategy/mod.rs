//! Signal classification and the dual-indicator strategy.

pub mod dual;
pub mod rule;

pub use dual::DualIndicatorStrategy;
pub use rule::{SignalLeg, SignalRule};
