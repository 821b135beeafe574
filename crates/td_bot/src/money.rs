//! Background money sampling into a shared ledger.
//!
//! One thread reads the money display at a fixed interval and records each
//! value under the ledger's lock. A failed read is logged and the loop keeps
//! going. The thread stops when its flag is raised and it is joined.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, info, warn};

use td_core::error::{BotError, Result};
use td_core::ledger::MoneyLedger;
use td_core::math::NormRect;

use crate::collaborators::{NumberReader, ScreenCapture};

/// Where and how often money is read.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoneyConfig {
    /// Money display, normalized to the window.
    pub region: NormRect,
    /// Pause between samples.
    pub interval: Duration,
}

impl Default for MoneyConfig {
    fn default() -> Self {
        Self {
            region: NormRect::new(0.192, 0.015, 0.156, 0.049),
            interval: Duration::from_millis(300),
        }
    }
}

/// A [`MoneyLedger`] behind a single lock, shared between threads.
#[derive(Debug, Clone, Default)]
pub struct SharedLedger(Arc<Mutex<MoneyLedger>>);

impl SharedLedger {
    /// Wrap a ledger.
    #[must_use]
    pub fn new(ledger: MoneyLedger) -> Self {
        Self(Arc::new(Mutex::new(ledger)))
    }

    // A panicked writer cannot leave the scalars half-written.
    fn lock(&self) -> MutexGuard<'_, MoneyLedger> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store an optical reading taken now.
    pub fn record_optical(&self, value: u32) {
        self.lock().record_optical(value);
    }

    /// Subtract a spend from the prediction.
    pub fn apply_spend(&self, amount: u32) {
        self.lock().apply_spend(amount);
    }

    /// Start a new prediction from a known balance.
    pub fn reset_prediction(&self, initial: u32) {
        self.lock().reset_prediction(initial);
    }

    /// The newer of the optical and predicted values.
    #[must_use]
    pub fn reported_balance(&self) -> u32 {
        self.lock().reported_balance()
    }

    /// Copy of the ledger.
    #[must_use]
    pub fn snapshot(&self) -> MoneyLedger {
        *self.lock()
    }
}

/// Capture the money region and read it.
///
/// # Errors
///
/// Propagates capture failures.
pub fn read_money<C, R>(capture: &C, reader: &R, region: NormRect) -> Result<Option<u32>>
where
    C: ScreenCapture + ?Sized,
    R: NumberReader + ?Sized,
{
    let image = capture.capture_region(region)?;
    Ok(reader.read_number(&image))
}

/// Read money once, blocking, and store it if readable.
///
/// # Errors
///
/// Propagates capture failures.
pub fn refresh_now<C, R>(
    capture: &C,
    reader: &R,
    ledger: &SharedLedger,
    region: NormRect,
) -> Result<Option<u32>>
where
    C: ScreenCapture + ?Sized,
    R: NumberReader + ?Sized,
{
    let value = read_money(capture, reader, region)?;
    if let Some(v) = value {
        ledger.record_optical(v);
    }
    Ok(value)
}

/// Handle to the background sampling thread.
#[derive(Debug)]
pub struct MoneySampler {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl MoneySampler {
    /// Spawn the sampling thread.
    ///
    /// # Errors
    ///
    /// Returns [`BotError::Collaborator`] if the thread cannot be spawned.
    pub fn start<C, R>(
        capture: Arc<C>,
        reader: Arc<R>,
        ledger: SharedLedger,
        config: MoneyConfig,
    ) -> Result<Self>
    where
        C: ScreenCapture + Send + Sync + 'static,
        R: NumberReader + Send + Sync + 'static,
    {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);
        let handle = thread::Builder::new()
            .name("money-sampler".into())
            .spawn(move || {
                while !flag.load(Ordering::Relaxed) {
                    match read_money(capture.as_ref(), reader.as_ref(), config.region) {
                        Ok(Some(value)) => {
                            ledger.record_optical(value);
                            debug!(value, "Money sampled");
                        }
                        Ok(None) => warn!("Money display unreadable"),
                        Err(e) => warn!(error = %e, "Money capture failed"),
                    }
                    thread::sleep(config.interval);
                }
            })
            .map_err(|e| BotError::Collaborator(format!("cannot start money sampler: {e}")))?;

        info!(interval_ms = config.interval.as_millis() as u64, "Money sampler started");
        Ok(Self {
            stop,
            handle: Some(handle),
        })
    }

    /// Whether the thread is still running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Raise the stop flag and join the thread.
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("Money sampler panicked");
            }
            info!("Money sampler stopped");
        }
    }
}

impl Drop for MoneySampler {
    fn drop(&mut self) {
        self.stop();
    }
}
