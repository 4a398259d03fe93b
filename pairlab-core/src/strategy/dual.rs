//! Two-indicator confirmation strategy.
//!
//! Enters long only when both indicators say Buy; exits when either says Sell.
//! At most one order is outstanding: after issuing an order the strategy stays
//! silent until the broker reports a terminal status for it.

use tracing::trace;

use super::rule::SignalLeg;
use crate::domain::{Bar, Order, OrderSide, PositionView, Signal};
use crate::engine::Strategy;

#[derive(Debug)]
pub struct DualIndicatorStrategy {
    a: SignalLeg,
    b: SignalLeg,
    pending: bool,
}

impl DualIndicatorStrategy {
    pub fn new(a: SignalLeg, b: SignalLeg) -> Self {
        Self {
            a,
            b,
            pending: false,
        }
    }

    pub fn has_pending_order(&self) -> bool {
        self.pending
    }

    /// Latest signals of both legs.
    pub fn signals(&self) -> (Signal, Signal) {
        (self.a.last(), self.b.last())
    }
}

impl Strategy for DualIndicatorStrategy {
    fn next(&mut self, bar: &Bar, position: PositionView) -> Option<OrderSide> {
        // Both indicators advance on every bar, pending or not.
        let sig_a = self.a.update(bar);
        let sig_b = self.b.update(bar);

        if self.pending {
            return None;
        }

        let decision = if position.is_flat() {
            (sig_a == Signal::Buy && sig_b == Signal::Buy).then_some(OrderSide::Buy)
        } else {
            (sig_a == Signal::Sell || sig_b == Signal::Sell).then_some(OrderSide::Sell)
        };

        if let Some(side) = decision {
            trace!(timestamp = %bar.timestamp, ?side, ?sig_a, ?sig_b, "order decision");
            self.pending = true;
        }
        decision
    }

    fn notify_order(&mut self, order: &Order) {
        if order.status.is_terminal() {
            self.pending = false;
        }
    }
}
