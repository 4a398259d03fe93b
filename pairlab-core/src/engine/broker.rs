//! Minimal single-instrument cash broker.
//!
//! Long-only, market orders only, fixed stake. An accepted order executes at
//! the open of the next bar. Commission is a fraction of traded value and is
//! charged on both entry and exit.

use tracing::debug;

use super::analyzers::TradeStats;
use crate::domain::{Bar, Order, OrderId, OrderSide, OrderStatus, PositionView};

/// Entry side of the trade currently held.
#[derive(Debug, Clone, Copy)]
struct OpenTrade {
    entry_price: f64,
    size: f64,
    entry_commission: f64,
}

#[derive(Debug, Clone)]
pub struct Broker {
    cash: f64,
    commission: f64,
    stake: f64,
    position: PositionView,
    pending: Option<Order>,
    open_trade: Option<OpenTrade>,
    trades: TradeStats,
    next_id: u64,
}

impl Broker {
    pub fn new(cash: f64, commission: f64, stake: f64) -> Self {
        Self {
            cash,
            commission,
            stake,
            position: PositionView::default(),
            pending: None,
            open_trade: None,
            trades: TradeStats::default(),
            next_id: 1,
        }
    }

    pub fn cash(&self) -> f64 {
        self.cash
    }

    pub fn position(&self) -> PositionView {
        self.position
    }

    pub fn trades(&self) -> TradeStats {
        self.trades
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Cash plus the position marked at `price`.
    pub fn value(&self, price: f64) -> f64 {
        self.cash + self.position.size * price
    }

    /// Accept or reject a new market order.
    ///
    /// Returns the order in its post-submission state: `Accepted`, or
    /// `Rejected` for a sell while flat or a second order while one is queued.
    pub fn submit(&mut self, side: OrderSide, bar_index: usize) -> Order {
        let id = OrderId(self.next_id);
        self.next_id += 1;
        let size = match side {
            OrderSide::Buy => self.stake,
            OrderSide::Sell => self.position.size,
        };
        let mut order = Order::new(id, side, size, bar_index);

        let reject = self.pending.is_some() || (side == OrderSide::Sell && self.position.is_flat());
        if reject {
            order.status = OrderStatus::Rejected;
            debug!(id = id.0, ?side, bar_index, "order rejected");
            return order;
        }
        order.status = OrderStatus::Accepted;
        self.pending = Some(order.clone());
        order
    }

    /// Execute the queued order, if any, at `bar.open`.
    ///
    /// Returns the order with its final status (`Completed` or `Margin`).
    pub fn execute_pending(&mut self, bar: &Bar) -> Option<Order> {
        let mut order = self.pending.take()?;
        let price = bar.open;
        let traded_value = order.size * price;
        let commission = traded_value * self.commission;

        match order.side {
            OrderSide::Buy => {
                if traded_value + commission > self.cash {
                    order.status = OrderStatus::Margin;
                    return Some(order);
                }
                self.cash -= traded_value + commission;
                let new_size = self.position.size + order.size;
                self.position.price = if self.position.is_flat() {
                    price
                } else {
                    (self.position.price * self.position.size + traded_value) / new_size
                };
                self.position.size = new_size;
                match self.open_trade.as_mut() {
                    Some(trade) => {
                        trade.size = new_size;
                        trade.entry_price = self.position.price;
                        trade.entry_commission += commission;
                    }
                    None => {
                        self.open_trade = Some(OpenTrade {
                            entry_price: price,
                            size: order.size,
                            entry_commission: commission,
                        });
                        self.trades.record_open();
                    }
                }
            }
            OrderSide::Sell => {
                self.cash += traded_value - commission;
                if let Some(trade) = self.open_trade.take() {
                    let gross = (price - trade.entry_price) * trade.size;
                    self.trades
                        .record_close(gross - trade.entry_commission - commission);
                }
                self.position = PositionView::default();
            }
        }

        order.status = OrderStatus::Completed;
        order.executed_price = Some(price);
        order.commission = commission;
        Some(order)
    }
}
