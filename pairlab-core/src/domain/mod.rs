//! Domain types for PairLab

pub mod bar;
pub mod order;
pub mod params;
pub mod signal;
pub mod task;

pub use bar::Bar;
pub use order::{Order, OrderId, OrderSide, OrderStatus, PositionView};
pub use params::{ParamValue, ParameterSet};
pub use signal::Signal;
pub use task::Task;

/// Instrument identifier type alias
pub type Symbol = String;
