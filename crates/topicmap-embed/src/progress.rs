use std::sync::atomic::{AtomicU32, Ordering};

/// Progress relay that keeps reported fractions in `[0, 1]` and never lets
/// them go backwards, even when the cascade switches tiers mid-run.
pub struct ProgressSink<'a> {
    callback: &'a (dyn Fn(f32) + Send + Sync),
    last: AtomicU32,
}

impl<'a> ProgressSink<'a> {
    pub fn new(callback: &'a (dyn Fn(f32) + Send + Sync)) -> Self {
        Self { callback, last: AtomicU32::new(0f32.to_bits()) }
    }

    pub fn report(&self, fraction: f32) {
        let fraction = if fraction.is_nan() || fraction <= 0.0 { 0.0 } else { fraction.min(1.0) };
        let prev = self.last.fetch_max(fraction.to_bits(), Ordering::SeqCst);
        let prev = f32::from_bits(prev);
        (self.callback)(prev.max(fraction));
    }

    /// Report `done / total` of the current tier.
    pub fn report_batches(&self, done: usize, total: usize) {
        if total == 0 { self.report(1.0); } else { self.report(done as f32 / total as f32); }
    }

    pub fn last(&self) -> f32 { f32::from_bits(self.last.load(Ordering::SeqCst)) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn reports_are_clamped_and_monotonic() {
        let seen = Mutex::new(Vec::new());
        let cb = |p: f32| seen.lock().unwrap().push(p);
        let sink = ProgressSink::new(&cb);
        sink.report(0.4);
        sink.report(0.2);
        sink.report(1.7);
        sink.report(-1.0);
        assert_eq!(*seen.lock().unwrap(), vec![0.4, 0.4, 1.0, 1.0]);
        assert_eq!(sink.last(), 1.0);
    }
}
