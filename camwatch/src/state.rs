//! Shared state between the monitor loop and its control surface.

use crate::config::AlertPosition;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

struct Shared {
    paused: AtomicBool,
    running: AtomicBool,
    // x in the high half, y in the low half.
    position: AtomicU64,
}

/// Cloneable handle to the monitor's process-lifetime flags.
///
/// Each field has a single writer. Readers see the latest value, possibly one cycle late.
#[derive(Clone)]
pub struct MonitorHandle {
    shared: Arc<Shared>,
}

impl Default for MonitorHandle {
    fn default() -> Self {
        Self::new(AlertPosition::FALLBACK)
    }
}

impl std::fmt::Debug for MonitorHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MonitorHandle")
            .field("paused", &self.is_paused())
            .field("running", &self.is_running())
            .field("position", &self.position())
            .finish()
    }
}

impl MonitorHandle {
    pub fn new(position: AlertPosition) -> Self {
        Self {
            shared: Arc::new(Shared {
                paused: AtomicBool::new(false),
                running: AtomicBool::new(true),
                position: AtomicU64::new(pack(position)),
            }),
        }
    }

    pub fn is_paused(&self) -> bool {
        self.shared.paused.load(Ordering::Relaxed)
    }

    pub fn set_paused(&self, paused: bool) {
        self.shared.paused.store(paused, Ordering::Relaxed);
    }

    /// Flip the pause flag, returning the new value.
    pub fn toggle_paused(&self) -> bool {
        !self.shared.paused.fetch_xor(true, Ordering::Relaxed)
    }

    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::Relaxed)
    }

    /// Ask the monitor loop to stop after its current cycle.
    pub fn stop(&self) {
        self.shared.running.store(false, Ordering::Relaxed);
    }

    pub fn position(&self) -> AlertPosition {
        unpack(self.shared.position.load(Ordering::Relaxed))
    }

    pub fn set_position(&self, position: AlertPosition) {
        self.shared.position.store(pack(position), Ordering::Relaxed);
    }
}

fn pack(AlertPosition { x, y }: AlertPosition) -> u64 {
    ((x as u32 as u64) << 32) | y as u32 as u64
}

fn unpack(v: u64) -> AlertPosition {
    AlertPosition {
        x: (v >> 32) as u32 as i32,
        y: v as u32 as i32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_survives_packing() {
        for (x, y) in [(0, 0), (50, 50), (-1, 7), (i32::MIN, i32::MAX), (-3000, -20)] {
            let pos = AlertPosition::new(x, y);
            assert_eq!(unpack(pack(pos)), pos);
        }
    }

    #[test]
    fn clones_share_flags() {
        let handle = MonitorHandle::default();
        let ui = handle.clone();

        assert!(!handle.is_paused());
        assert!(ui.toggle_paused());
        assert!(handle.is_paused());
        assert!(!ui.toggle_paused());
        assert!(!handle.is_paused());

        ui.set_position(AlertPosition::new(10, 20));
        assert_eq!(handle.position(), AlertPosition::new(10, 20));

        assert!(handle.is_running());
        ui.stop();
        assert!(!handle.is_running());
    }
}
