//! Duplicate video frame detection

/// Remembers the last video timestamp handed to the projector
#[derive(Debug, Clone, Default)]
pub struct FrameGuard {
    last_timestamp_ms: Option<f64>,
}

impl FrameGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when `timestamp_ms` was already processed, otherwise
    /// records it and returns `true`.
    pub fn accept(&mut self, timestamp_ms: f64) -> bool {
        if self.last_timestamp_ms == Some(timestamp_ms) {
            return false;
        }
        self.last_timestamp_ms = Some(timestamp_ms);
        true
    }

    pub fn last_timestamp_ms(&self) -> Option<f64> {
        self.last_timestamp_ms
    }
}
