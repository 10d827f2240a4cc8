//! Background thread standing in for the real-time-clock countdown timer.

use std::{
    io,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use moonbound_core::TimerSignal;

/// Periodic timer that raises a flag the frame loop polls and clears.
#[derive(Debug)]
pub(crate) struct IntervalTimer {
    fired: Arc<AtomicBool>,
    stop: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl IntervalTimer {
    /// Starts raising the flag every `period`; a zero period never fires.
    pub(crate) fn start(period: Duration) -> io::Result<Self> {
        let fired = Arc::new(AtomicBool::new(false));
        let stop = Arc::new(AtomicBool::new(false));
        if period.is_zero() {
            return Ok(Self {
                fired,
                stop,
                worker: None,
            });
        }

        let worker = {
            let fired = Arc::clone(&fired);
            let stop = Arc::clone(&stop);
            thread::Builder::new()
                .name("rtc-timer".into())
                .spawn(move || run(period, &fired, &stop))?
        };

        Ok(Self {
            fired,
            stop,
            worker: Some(worker),
        })
    }
}

fn run(period: Duration, fired: &AtomicBool, stop: &AtomicBool) {
    let mut deadline = Instant::now() + period;
    while !stop.load(Ordering::Acquire) {
        let now = Instant::now();
        if now >= deadline {
            fired.store(true, Ordering::Release);
            deadline += period;
            continue;
        }
        thread::park_timeout(deadline - now);
    }
}

impl TimerSignal for IntervalTimer {
    fn fired(&self) -> bool {
        self.fired.load(Ordering::Acquire)
    }

    fn clear(&mut self) {
        self.fired.store(false, Ordering::Release);
    }

    fn take(&mut self) -> bool {
        self.fired.swap(false, Ordering::AcqRel)
    }
}

impl Drop for IntervalTimer {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(worker) = self.worker.take() {
            worker.thread().unpark();
            if worker.join().is_err() {
                log::warn!("timer thread panicked");
            }
        }
    }
}
