//! Market orders and their lifecycle.

use serde::{Deserialize, Serialize};

/// Monotonic order id, unique within one simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OrderId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderSide {
    Buy,
    Sell,
}

/// Order status as reported to the strategy.
///
/// `Submitted` and `Accepted` are transient; the other four are terminal and
/// are the only ones that release the strategy's pending-order lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Submitted,
    Accepted,
    Completed,
    Canceled,
    /// Not enough cash to cover cost plus commission.
    Margin,
    Rejected,
}

impl OrderStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            OrderStatus::Completed
                | OrderStatus::Canceled
                | OrderStatus::Margin
                | OrderStatus::Rejected
        )
    }
}

/// A market order, executed at the open of the bar after submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub side: OrderSide,
    pub size: f64,
    /// Index of the bar on which the order was submitted.
    pub created_bar: usize,
    pub status: OrderStatus,
    pub executed_price: Option<f64>,
    pub commission: f64,
}

impl Order {
    pub fn new(id: OrderId, side: OrderSide, size: f64, created_bar: usize) -> Self {
        Self {
            id,
            side,
            size,
            created_bar,
            status: OrderStatus::Submitted,
            executed_price: None,
            commission: 0.0,
        }
    }
}

/// What the strategy sees of the broker's holding.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PositionView {
    pub size: f64,
    pub price: f64,
}

impl PositionView {
    pub fn is_flat(&self) -> bool {
        self.size == 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_statuses() {
        assert!(!OrderStatus::Submitted.is_terminal());
        assert!(!OrderStatus::Accepted.is_terminal());
        assert!(OrderStatus::Completed.is_terminal());
        assert!(OrderStatus::Canceled.is_terminal());
        assert!(OrderStatus::Margin.is_terminal());
        assert!(OrderStatus::Rejected.is_terminal());
    }

    #[test]
    fn new_order_starts_submitted() {
        let order = Order::new(OrderId(1), OrderSide::Buy, 1.0, 3);
        assert_eq!(order.status, OrderStatus::Submitted);
        assert_eq!(order.executed_price, None);
    }
}
