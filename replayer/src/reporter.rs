use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    fmt::Debug,
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard},
};
use tracing::{debug, warn};

/// Which mock file backed a test set's replay, and how many replayed cases consulted it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MockUsageRecord {
    pub test_set_id: String,
    pub mock_name: String,
    pub mock_file: PathBuf,
    pub uses: usize,
}

pub trait TestResult: Debug {
    fn test_run_status(&self, passed: bool, test_set_id: &str);
    fn record_mock_usage(&self, test_set_id: &str);
    fn mock_name(&self) -> &str;
}

#[derive(Debug)]
pub struct TestStatusReporter {
    path: PathBuf,
    mock_name: String,
    usage: Mutex<HashMap<String, MockUsageRecord>>,
}

impl TestStatusReporter {
    pub fn new<P: Into<PathBuf>, S: Into<String>>(path: P, mock_name: S) -> Self {
        Self {
            path: path.into(),
            mock_name: mock_name.into(),
            usage: Mutex::new(HashMap::new()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mock_file(&self, test_set_id: &str) -> PathBuf {
        self.path
            .join(test_set_id)
            .join(format!("{}.yaml", self.mock_name))
    }

    pub fn mock_usage(&self, test_set_id: &str) -> Option<MockUsageRecord> {
        self.usage().get(test_set_id).cloned()
    }

    pub fn mock_usages(&self) -> Vec<MockUsageRecord> {
        let mut records = self.usage().values().cloned().collect::<Vec<_>>();
        records.sort_by(|a, b| a.test_set_id.cmp(&b.test_set_id));
        records
    }

    // reporting is best effort, a poisoned lock still holds usable records
    fn usage(&self) -> MutexGuard<'_, HashMap<String, MockUsageRecord>> {
        self.usage.lock().unwrap_or_else(|poisoned| {
            warn!("Mock usage records were poisoned, continuing with what was recorded");
            poisoned.into_inner()
        })
    }
}

impl TestResult for TestStatusReporter {
    fn test_run_status(&self, passed: bool, test_set_id: &str) {
        if passed {
            debug!(test_set_id, "Test case passed");
        } else {
            debug!(test_set_id, "Test case failed");
        }
    }

    fn record_mock_usage(&self, test_set_id: &str) {
        let mock_file = self.mock_file(test_set_id);
        debug!(test_set_id, mock_file = %mock_file.display(), "Mock file for test set");

        self.usage()
            .entry(String::from(test_set_id))
            .or_insert_with(|| MockUsageRecord {
                test_set_id: String::from(test_set_id),
                mock_name: self.mock_name.clone(),
                mock_file,
                uses: 0,
            })
            .uses += 1;
    }

    fn mock_name(&self) -> &str {
        &self.mock_name
    }
}
