use parking_lot::{Condvar, Mutex, MutexGuard};
use std::time::Duration;

/// Mutual exclusion over shared state, paired with [`Condition`] for
/// condition-based waiting.
///
/// A thin layer over `parking_lot` so the rest of the crate never touches
/// platform primitives directly. Entering returns a guard; the section is
/// exited when the guard drops, on every path.
#[derive(Debug)]
pub struct Monitor<T> {
    state: Mutex<T>,
}

impl<T> Monitor<T> {
    /// Create a monitor protecting `state`
    pub fn new(state: T) -> Self {
        Self {
            state: Mutex::new(state),
        }
    }

    /// Enter the critical section, blocking until it is free
    pub fn enter(&self) -> MutexGuard<'_, T> {
        self.state.lock()
    }
}

/// A wake condition associated with a [`Monitor`] section.
///
/// Waits are subject to spurious wakeups: callers must re-check their
/// predicate in a loop around every wait.
#[derive(Debug, Default)]
pub struct Condition {
    cv: Condvar,
}

impl Condition {
    pub fn new() -> Self {
        Self { cv: Condvar::new() }
    }

    /// Atomically release the section, suspend until signaled, and
    /// reacquire before returning
    pub fn wait<T>(&self, section: &mut MutexGuard<'_, T>) {
        self.cv.wait(section);
    }

    /// Timed variant of [`wait`](Self::wait); returns `true` if the wait
    /// timed out without a signal. Used by tests to bound blocking checks.
    pub fn wait_timeout<T>(&self, section: &mut MutexGuard<'_, T>, timeout: Duration) -> bool {
        self.cv.wait_for(section, timeout).timed_out()
    }

    /// Wake at most one waiter; a no-op if none are waiting
    pub fn signal(&self) {
        self.cv.notify_one();
    }

    /// Wake all waiters
    pub fn broadcast(&self) {
        self.cv.notify_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_enter_serializes_access() {
        let monitor = Arc::new(Monitor::new(0u64));
        let mut handles = Vec::new();
        for _ in 0..4 {
            let monitor = Arc::clone(&monitor);
            handles.push(thread::spawn(move || {
                for _ in 0..1000 {
                    *monitor.enter() += 1;
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(*monitor.enter(), 4000);
    }

    #[test]
    fn test_signal_wakes_waiter() {
        let monitor = Arc::new(Monitor::new(false));
        let cond = Arc::new(Condition::new());

        let waiter = {
            let monitor = Arc::clone(&monitor);
            let cond = Arc::clone(&cond);
            thread::spawn(move || {
                let mut ready = monitor.enter();
                while !*ready {
                    cond.wait(&mut ready);
                }
            })
        };

        {
            let mut ready = monitor.enter();
            *ready = true;
            cond.signal();
        }
        waiter.join().unwrap();
    }

    #[test]
    fn test_broadcast_wakes_all_waiters() {
        let monitor = Arc::new(Monitor::new(false));
        let cond = Arc::new(Condition::new());

        let waiters: Vec<_> = (0..3)
            .map(|_| {
                let monitor = Arc::clone(&monitor);
                let cond = Arc::clone(&cond);
                thread::spawn(move || {
                    let mut ready = monitor.enter();
                    while !*ready {
                        cond.wait(&mut ready);
                    }
                })
            })
            .collect();

        // Give the waiters a moment to park
        thread::sleep(Duration::from_millis(20));
        {
            let mut ready = monitor.enter();
            *ready = true;
            cond.broadcast();
        }
        for waiter in waiters {
            waiter.join().unwrap();
        }
    }

    #[test]
    fn test_wait_timeout_expires() {
        let monitor = Monitor::new(());
        let cond = Condition::new();
        let mut section = monitor.enter();
        assert!(cond.wait_timeout(&mut section, Duration::from_millis(10)));
    }

    #[test]
    fn test_signal_without_waiters_is_noop() {
        let cond = Condition::new();
        cond.signal();
        cond.broadcast();
    }
}
