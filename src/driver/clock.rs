use std::time::{Duration, Instant};

/// Monotonic time source plus a blocking sleep.
pub trait Clock: Clone {
    /// Seconds since an arbitrary fixed origin.
    fn now_s(&self) -> f64;
    fn sleep(&self, duration: Duration);
}

#[derive(Clone, Copy, Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_s(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}
