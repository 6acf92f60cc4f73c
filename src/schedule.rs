//! Periodic tick driver for redraw and rotation callbacks

use std::ops::ControlFlow;
use std::time::Duration;

use log::debug;
use tokio::time::{self, MissedTickBehavior};

use crate::{Error, Result};

/// Fires a callback immediately and then once per period.
///
/// Each callback runs to completion before the next tick is awaited, so a
/// slow callback delays later ticks instead of overlapping with them.
#[derive(Debug, Clone, Copy)]
pub struct Ticker {
    period: Duration,
}

impl Ticker {
    pub fn every(period: Duration) -> Result<Self> {
        if period.is_zero() {
            return Err(Error::InvalidArgument("tick period must be non-zero".into()));
        }
        Ok(Self { period })
    }

    pub fn from_millis(ms: u64) -> Result<Self> {
        Self::every(Duration::from_millis(ms))
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Run until the callback breaks or `limit` ticks have fired (forever
    /// with `None`). The callback gets the zero-based tick number.
    ///
    /// Returns how many ticks fired.
    pub async fn run<F>(&self, limit: Option<u64>, mut on_tick: F) -> u64
    where
        F: FnMut(u64) -> ControlFlow<()>,
    {
        let mut interval = time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut fired = 0u64;
        while limit.map_or(true, |l| fired < l) {
            interval.tick().await;
            debug!("tick {} (period {:?})", fired, self.period);
            let flow = on_tick(fired);
            fired += 1;
            if flow.is_break() {
                break;
            }
        }
        fired
    }
}
