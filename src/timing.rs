//! Wall-clock accounting of kernel executions and buffer transfers

use crate::util::time_str;
use crate::Result;
use std::time::{Duration, Instant};

/// A count of timed operations and the total time they took
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Tally {
    count: u32,
    total: Duration,
}

impl Tally {
    pub fn record(&mut self, elapsed: Duration) {
        self.count += 1;
        self.total += elapsed;
    }

    /// Run `op`, recording its duration only if it succeeds
    pub fn time<T>(&mut self, op: impl FnOnce() -> Result<T>) -> Result<T> {
        let start = Instant::now();
        let value = op()?;
        self.record(start.elapsed());
        Ok(value)
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn total(&self) -> Duration {
        self.total
    }

    pub fn total_ms(&self) -> f64 {
        self.total.as_secs_f64() * 1000.0
    }
}

/// Accumulated timings of a session
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Timings {
    pub kernel: Tally,
    pub host_to_device: Tally,
    pub device_to_host: Tally,
}

impl Timings {
    pub fn kernel_report(&self) -> String {
        format!(
            "total time spent in {} kernel executions: {}",
            self.kernel.count(),
            time_str(self.kernel.total_ms())
        )
    }

    pub fn transfer_report(&self) -> String {
        format!(
            "total time spent in {} host to device transfers : {}\n\
             total time spent in {} device to host transfers : {}",
            self.host_to_device.count(),
            time_str(self.host_to_device.total_ms()),
            self.device_to_host.count(),
            time_str(self.device_to_host.total_ms())
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn test_tally_records_successes_only() {
        let mut tally = Tally::default();

        assert_eq!(tally.time(|| Ok(7)).unwrap(), 7);
        assert!(tally
            .time::<()>(|| Err(Error::InvalidWorkDimension(0)))
            .is_err());

        assert_eq!(tally.count(), 1);
    }

    #[test]
    fn test_reports() {
        let mut timings = Timings::default();
        timings.kernel.record(Duration::from_millis(1500));
        timings.kernel.record(Duration::from_millis(500));
        timings.host_to_device.record(Duration::from_micros(2500));
        timings.device_to_host.record(Duration::from_millis(61_000));

        assert_eq!(timings.kernel.total_ms(), 2000.0);
        assert_eq!(
            timings.kernel_report(),
            "total time spent in 2 kernel executions: 2 sec 0.0 msec"
        );
        assert_eq!(
            timings.transfer_report(),
            "total time spent in 1 host to device transfers : 2.5 msec\n\
             total time spent in 1 device to host transfers : 1 min 1 sec 0.0 msec"
        );
    }
}
