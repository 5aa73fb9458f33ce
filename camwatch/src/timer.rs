use std::time::{Duration, Instant};

pub struct Timer {
    start: Instant,
    target: Duration,
}

impl Default for Timer {
    fn default() -> Self {
        Self {
            start: Instant::now(),
            target: Default::default(),
        }
    }
}

impl Timer {
    pub fn step_for_fps(fps: u32) -> Duration {
        Duration::from_secs_f64(1.0 / fps.max(1) as f64)
    }

    pub fn sleep(&self) {
        if let Some(duration) = self.target.checked_sub(self.start.elapsed()) {
            std::thread::sleep(duration);
        }
    }

    pub fn add(&mut self, duration: Duration) {
        self.target += duration;
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}
