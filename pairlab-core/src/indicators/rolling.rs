//! Streaming building blocks shared by the indicators.
//!
//! Every type here consumes one value per call and keeps only a bounded
//! amount of state: a fixed-capacity ring or a running average.
//! Undefined results are reported as `f64::NAN`.

/// Fixed-capacity ring of the most recent values, oldest first.
#[derive(Debug, Clone)]
pub struct Window {
    buf: Vec<f64>,
    head: usize,
    len: usize,
}

impl Window {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity >= 1, "Window capacity must be >= 1");
        Self {
            buf: vec![f64::NAN; capacity],
            head: 0,
            len: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == self.buf.len()
    }

    /// Append a value, returning the one evicted when full.
    pub fn push(&mut self, value: f64) -> Option<f64> {
        let cap = self.buf.len();
        if self.len < cap {
            let idx = (self.head + self.len) % cap;
            self.buf[idx] = value;
            self.len += 1;
            None
        } else {
            let evicted = self.buf[self.head];
            self.buf[self.head] = value;
            self.head = (self.head + 1) % cap;
            Some(evicted)
        }
    }

    /// Oldest retained value.
    pub fn oldest(&self) -> Option<f64> {
        (self.len > 0).then(|| self.buf[self.head])
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        let cap = self.buf.len();
        (0..self.len).map(move |i| self.buf[(self.head + i) % cap])
    }

    pub fn max(&self) -> f64 {
        self.iter().fold(f64::NEG_INFINITY, f64::max)
    }

    pub fn min(&self) -> f64 {
        self.iter().fold(f64::INFINITY, f64::min)
    }

    pub fn mean(&self) -> f64 {
        if self.len == 0 {
            return f64::NAN;
        }
        self.iter().sum::<f64>() / self.len as f64
    }

    /// Population standard deviation of the retained values.
    pub fn std_dev(&self) -> f64 {
        if self.len == 0 {
            return f64::NAN;
        }
        let mean = self.mean();
        let var = self.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / self.len as f64;
        var.sqrt()
    }
}

/// Simple moving average over a fixed window.
#[derive(Debug, Clone)]
pub struct Sma {
    window: Window,
    sum: f64,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        Self {
            window: Window::new(period),
            sum: 0.0,
        }
    }

    pub fn update(&mut self, value: f64) -> f64 {
        if let Some(evicted) = self.window.push(value) {
            self.sum -= evicted;
        }
        self.sum += value;
        if self.window.is_full() {
            self.sum / self.window.capacity() as f64
        } else {
            f64::NAN
        }
    }
}

/// Exponential smoother seeded with the SMA of the first `period` inputs.
///
/// `ema` uses alpha = 2/(period+1); `wilder` uses alpha = 1/period
/// (the smoothed moving average behind ATR, RSI and ADX).
#[derive(Debug, Clone)]
pub struct Smoother {
    period: usize,
    alpha: f64,
    seen: usize,
    seed_sum: f64,
    value: f64,
}

impl Smoother {
    pub fn ema(period: usize) -> Self {
        Self::with_alpha(period, 2.0 / (period as f64 + 1.0))
    }

    pub fn wilder(period: usize) -> Self {
        Self::with_alpha(period, 1.0 / period as f64)
    }

    fn with_alpha(period: usize, alpha: f64) -> Self {
        assert!(period >= 1, "Smoother period must be >= 1");
        Self {
            period,
            alpha,
            seen: 0,
            seed_sum: 0.0,
            value: f64::NAN,
        }
    }

    pub fn update(&mut self, value: f64) -> f64 {
        if self.seen < self.period {
            self.seen += 1;
            self.seed_sum += value;
            if self.seen == self.period {
                self.value = self.seed_sum / self.period as f64;
            }
            return self.value;
        }
        self.value = self.alpha * value + (1.0 - self.alpha) * self.value;
        self.value
    }

    pub fn value(&self) -> f64 {
        self.value
    }
}

/// True range: max(high, prev_close) - min(low, prev_close).
///
/// Undefined on the first bar, which has no previous close.
#[derive(Debug, Clone, Default)]
pub struct TrueRange {
    prev_close: Option<f64>,
}

impl TrueRange {
    pub fn update(&mut self, high: f64, low: f64, close: f64) -> Option<f64> {
        let tr = self
            .prev_close
            .map(|pc| high.max(pc) - low.min(pc));
        self.prev_close = Some(close);
        tr
    }
}
