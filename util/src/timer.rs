use std::time::{Duration, Instant};

/// Tracks how long a blocking step (a build, a foreground run) took.
pub struct Timer {
    start: Instant,
}

impl Timer {
    /// Create a new `Timer` starting now.
    pub fn now() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Restart the timer.
    pub fn reset(&mut self) {
        self.start = Instant::now();
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Elapsed time rounded to whole seconds, e.g. "1h 02m 05s" or "42s".
    pub fn elapsed_display(&self) -> String {
        format_duration(self.elapsed())
    }
}

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    let (h, m, s) = (secs / 3600, (secs / 60) % 60, secs % 60);
    if h > 0 {
        format!("{h}h {m:02}m {s:02}s")
    } else if m > 0 {
        format!("{m}m {s:02}s")
    } else {
        format!("{s}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(900)), "0s");
        assert_eq!(format_duration(Duration::from_secs(42)), "42s");
        assert_eq!(format_duration(Duration::from_secs(125)), "2m 05s");
        assert_eq!(format_duration(Duration::from_secs(3725)), "1h 02m 05s");
    }
}
