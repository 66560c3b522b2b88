// ---------------------------------------------------------------------------
// Progress reporting
// ---------------------------------------------------------------------------

/// Receives integer percentages (0–100) while an analysis runs.
///
/// Called synchronously on the worker thread, so implementations must return
/// quickly.
pub trait ProgressSink {
    fn report(&mut self, percent: u8);
}

impl<F: FnMut(u8)> ProgressSink for F {
    fn report(&mut self, percent: u8) {
        self(percent)
    }
}

/// Wraps a sink so that reported values never decrease and never exceed 100.
pub struct Monotonic<'a> {
    inner: &'a mut dyn ProgressSink,
    last: u8,
}

impl<'a> Monotonic<'a> {
    pub fn new(inner: &'a mut dyn ProgressSink) -> Self {
        Monotonic { inner, last: 0 }
    }

    #[cfg(test)]
    pub fn last(&self) -> u8 {
        self.last
    }
}

impl ProgressSink for Monotonic<'_> {
    fn report(&mut self, percent: u8) {
        let value = percent.clamp(self.last, 100);
        self.last = value;
        self.inner.report(value);
    }
}

/// A stage's share of the progress bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressWindow {
    pub start: u8,
    pub end: u8,
}

impl ProgressWindow {
    pub const fn new(start: u8, end: u8) -> Self {
        ProgressWindow { start, end }
    }

    /// Percentage after `done` of `total` items (truncating). An empty stage
    /// sits at its end.
    pub fn at(&self, done: usize, total: usize) -> u8 {
        if total == 0 {
            return self.end;
        }
        let span = usize::from(self.end.saturating_sub(self.start));
        let step = span * done.min(total) / total;
        self.start + step as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_steps_truncate() {
        let w = ProgressWindow::new(40, 60);
        assert_eq!(w.at(1, 3), 46);
        assert_eq!(w.at(2, 3), 53);
        assert_eq!(w.at(3, 3), 60);
        assert_eq!(w.at(0, 0), 60);
    }

    #[test]
    fn monotonic_guard_never_goes_backwards() {
        let mut seen = Vec::new();
        {
            let mut sink = |p: u8| seen.push(p);
            let mut guard = Monotonic::new(&mut sink);
            for p in [10, 30, 20, 150, 90] {
                guard.report(p);
            }
            assert_eq!(guard.last(), 100);
        }
        assert_eq!(seen, vec![10, 30, 30, 100, 100]);
    }
}
