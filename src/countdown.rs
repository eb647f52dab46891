//! Weekly limit countdown.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use mockable::Clock;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};

use crate::page::Page;

pub const COUNTDOWN_ELEMENT: &str = "countdown";

const TICK: Duration = Duration::from_secs(1);
const MS_PER_DAY: i64 = 86_400_000;
const MS_PER_HOUR: i64 = 3_600_000;
const MS_PER_MINUTE: i64 = 60_000;
const MS_PER_SECOND: i64 = 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Remaining {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl Remaining {
    /// Time left until `target`, or `None` once it has been reached.
    pub fn until(target: DateTime<Utc>, now: DateTime<Utc>) -> Option<Self> {
        let diff = (target - now).num_milliseconds();
        if diff <= 0 {
            return None;
        }
        Some(Self {
            days: diff / MS_PER_DAY,
            hours: (diff % MS_PER_DAY) / MS_PER_HOUR,
            minutes: (diff % MS_PER_HOUR) / MS_PER_MINUTE,
            seconds: (diff % MS_PER_MINUTE) / MS_PER_SECOND,
        })
    }
}

impl fmt::Display for Remaining {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}d {}h {}m {}s",
            self.days, self.hours, self.minutes, self.seconds
        )
    }
}

/// Owns the single repeating tick that keeps the countdown element current.
pub struct Countdown {
    page: Page,
    clock: Arc<dyn Clock + Send + Sync>,
    ticker: Mutex<Option<JoinHandle<()>>>,
    live: Arc<AtomicUsize>,
}

impl Countdown {
    pub fn new(page: Page, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        Self {
            page,
            clock,
            ticker: Mutex::new(None),
            live: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Starts ticking toward `target`, cancelling any countdown already
    /// running. When the target is reached the tick stops and the page is
    /// reloaded.
    pub async fn start(&self, target: DateTime<Utc>) {
        let mut ticker = self.ticker.lock().await;
        cancel(ticker.take()).await;

        let page = self.page.clone();
        let clock = Arc::clone(&self.clock);
        let guard = LiveGuard::enter(Arc::clone(&self.live));
        log::debug!("Starting countdown to {}", target);

        *ticker = Some(tokio::spawn(async move {
            let _guard = guard;
            let mut interval = interval_at(Instant::now() + TICK, TICK);
            loop {
                interval.tick().await;
                match Remaining::until(target, clock.utc()) {
                    Some(remaining) => {
                        page.update(|doc| doc.set_text(COUNTDOWN_ELEMENT, remaining.to_string()));
                    }
                    None => {
                        log::info!("Weekly limit countdown reached {}", target);
                        page.reload();
                        break;
                    }
                }
            }
        }));
    }

    pub async fn stop(&self) {
        let mut ticker = self.ticker.lock().await;
        cancel(ticker.take()).await;
    }

    pub async fn is_running(&self) -> bool {
        self.ticker
            .lock()
            .await
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    /// Tick tasks alive right now. Never more than one.
    pub fn live_tickers(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        if let Some(handle) = self.ticker.get_mut().take() {
            handle.abort();
        }
    }
}

async fn cancel(handle: Option<JoinHandle<()>>) {
    if let Some(handle) = handle {
        handle.abort();
        // Cancelled or finished, either way the task is gone afterwards.
        let _ = handle.await;
    }
}

struct LiveGuard(Arc<AtomicUsize>);

impl LiveGuard {
    fn enter(live: Arc<AtomicUsize>) -> Self {
        live.fetch_add(1, Ordering::SeqCst);
        Self(live)
    }
}

impl Drop for LiveGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}
