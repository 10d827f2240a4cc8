#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Counter advanced by the real-time-clock timer and shown as a text label.

use moonbound_core::TimerSignal;

/// Counts timer firings, starting from one.
#[derive(Clone, Debug)]
pub struct CycleCounter {
    cycles: u64,
}

impl Default for CycleCounter {
    fn default() -> Self {
        Self { cycles: 1 }
    }
}

impl CycleCounter {
    /// Number of cycles counted so far.
    #[must_use]
    pub const fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Checks the timer once and counts the event if it fired.
    ///
    /// The flag is read and cleared in one step through
    /// [`TimerSignal::take`], so a single firing is never observed twice and a
    /// firing that lands mid-poll is kept for the next one. Returns whether
    /// the count changed.
    pub fn poll<T>(&mut self, timer: &mut T) -> bool
    where
        T: TimerSignal + ?Sized,
    {
        if !timer.take() {
            return false;
        }

        self.cycles = self.cycles.saturating_add(1);
        log::debug!("timer fired, cycle {}", self.cycles);
        true
    }

    /// Text shown on the counter label.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} times!", self.cycles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Flag {
        fired: bool,
        clears: usize,
    }

    impl TimerSignal for Flag {
        fn fired(&self) -> bool {
            self.fired
        }

        fn clear(&mut self) {
            self.fired = false;
            self.clears += 1;
        }
    }

    #[test]
    fn counts_each_firing_once() {
        let mut counter = CycleCounter::default();
        let mut flag = Flag::default();

        assert!(!counter.poll(&mut flag));
        assert_eq!(counter.label(), "1 times!");

        flag.fired = true;
        assert!(counter.poll(&mut flag));
        assert!(!counter.poll(&mut flag));

        assert_eq!(counter.cycles(), 2);
        assert_eq!(flag.clears, 1);
        assert_eq!(counter.label(), "2 times!");
    }

    /// Takes the flag atomically, ignoring the separate read and clear.
    struct Swapping {
        fired: bool,
    }

    impl TimerSignal for Swapping {
        fn fired(&self) -> bool {
            panic!("poll must not read the flag separately");
        }

        fn clear(&mut self) {
            panic!("poll must not clear the flag separately");
        }

        fn take(&mut self) -> bool {
            std::mem::replace(&mut self.fired, false)
        }
    }

    #[test]
    fn poll_consumes_the_flag_through_take() {
        let mut counter = CycleCounter::default();
        let mut timer = Swapping { fired: true };

        assert!(counter.poll(&mut timer));
        assert!(!counter.poll(&mut timer));
        assert_eq!(counter.cycles(), 2);
    }

    #[test]
    fn saturates_instead_of_wrapping() {
        let mut counter = CycleCounter { cycles: u64::MAX };
        let mut flag = Flag {
            fired: true,
            clears: 0,
        };

        assert!(counter.poll(&mut flag));
        assert_eq!(counter.cycles(), u64::MAX);
    }
}
