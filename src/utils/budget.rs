// Tue Jan 13 2026 - Alex

use std::time::{Duration, Instant};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BudgetExceeded {
    #[error("wall-clock budget of {0:?} exceeded")]
    Deadline(Duration),

    #[error("object budget of {0} exceeded")]
    Objects(usize),
}

/// Wall-clock and object-count budget for one analysis run.
#[derive(Debug, Clone, Copy)]
pub struct Budget {
    started: Instant,
    timeout: Option<Duration>,
    max_objects: Option<usize>,
}

impl Budget {
    pub fn new(timeout: Option<Duration>, max_objects: Option<usize>) -> Self {
        Self {
            started: Instant::now(),
            timeout,
            max_objects,
        }
    }

    pub fn unlimited() -> Self {
        Self::new(None, None)
    }

    pub fn check_deadline(&self) -> Result<(), BudgetExceeded> {
        match self.timeout {
            Some(timeout) if self.started.elapsed() > timeout => Err(BudgetExceeded::Deadline(timeout)),
            _ => Ok(()),
        }
    }

    pub fn check_objects(&self, count: usize) -> Result<(), BudgetExceeded> {
        match self.max_objects {
            Some(max) if count > max => Err(BudgetExceeded::Objects(max)),
            _ => Ok(()),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn remaining(&self) -> Option<Duration> {
        self.timeout.map(|t| t.saturating_sub(self.started.elapsed()))
    }
}

impl Default for Budget {
    fn default() -> Self {
        Self::unlimited()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unlimited_never_trips() {
        let budget = Budget::unlimited();
        assert!(budget.check_deadline().is_ok());
        assert!(budget.check_objects(usize::MAX).is_ok());
        assert!(budget.remaining().is_none());
    }

    #[test]
    fn test_object_cap() {
        let budget = Budget::new(None, Some(10));
        assert!(budget.check_objects(10).is_ok());
        assert_eq!(budget.check_objects(11), Err(BudgetExceeded::Objects(10)));
    }

    #[test]
    fn test_zero_deadline_trips() {
        let budget = Budget::new(Some(Duration::ZERO), None);
        std::thread::sleep(Duration::from_millis(2));
        assert_eq!(budget.check_deadline(), Err(BudgetExceeded::Deadline(Duration::ZERO)));
    }
}
