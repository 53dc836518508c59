use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, sync::Mutex};
use tracing::debug;

/// Counters for one test set. A set with no replayed cases has not passed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestSetVerdict {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub status: bool,
}

impl TestSetVerdict {
    fn record(&mut self, passed: bool) {
        self.total += 1;
        if passed {
            self.passed += 1;
        } else {
            self.failed += 1;
        }
        self.status = self.failed == 0 && self.total > 0;
    }
}

/// Collects pass/fail outcomes per test set. Safe to share between concurrent replay tasks.
#[derive(Debug, Default)]
pub struct VerdictAggregator {
    verdicts: Mutex<HashMap<String, TestSetVerdict>>,
}

impl VerdictAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a test set at zero, dropping counters left by an earlier run of the same set.
    pub fn begin(&self, test_set_id: &str) -> Result<(), Error> {
        self.verdicts
            .lock()?
            .insert(String::from(test_set_id), TestSetVerdict::default());
        Ok(())
    }

    pub fn record_outcome(&self, test_set_id: &str, passed: bool) -> Result<(), Error> {
        let mut verdicts = self.verdicts.lock()?;
        let verdict = verdicts.entry(String::from(test_set_id)).or_default();
        let was_passing = verdict.status;

        verdict.record(passed);

        if was_passing != verdict.status {
            debug!(
                test_set_id,
                status = verdict.status,
                total = verdict.total,
                "Test set status changed"
            );
        }

        Ok(())
    }

    pub fn verdict(&self, test_set_id: &str) -> Result<TestSetVerdict, Error> {
        Ok(self
            .verdicts
            .lock()?
            .get(test_set_id)
            .copied()
            .unwrap_or_default())
    }

    pub fn verdicts(&self) -> Result<HashMap<String, TestSetVerdict>, Error> {
        Ok(self.verdicts.lock()?.clone())
    }
}
