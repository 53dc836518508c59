use crate::{
    data::{Kind, TestCase},
    emulator::RequestEmulator,
    error::Error,
    host,
    matcher::ResponseMatcher,
    noise::NoiseMap,
    replay_configuration::ReplayConfiguration,
    reporter::{TestResult, TestStatusReporter},
    verdict::{TestSetVerdict, VerdictAggregator},
};
use futures::future;
use std::{borrow::Cow, sync::Arc};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Replays whole test sets and keeps their verdicts.
#[derive(Debug)]
pub struct TestSetRunner {
    configuration: ReplayConfiguration,
    emulator: Arc<dyn RequestEmulator + Send + Sync>,
    matcher: Arc<dyn ResponseMatcher + Send + Sync>,
    aggregator: Arc<VerdictAggregator>,
    reporter: Arc<dyn TestResult + Send + Sync>,
}

impl TestSetRunner {
    pub fn new(configuration: ReplayConfiguration) -> Self {
        let reporter = Arc::new(TestStatusReporter::new(
            configuration.path(),
            configuration.mock_name(),
        ));

        Self::with_reporter(configuration, reporter)
    }

    pub fn with_reporter(
        configuration: ReplayConfiguration,
        reporter: Arc<dyn TestResult + Send + Sync>,
    ) -> Self {
        Self {
            emulator: configuration.emulator(),
            matcher: configuration.matcher(),
            aggregator: Arc::new(VerdictAggregator::new()),
            configuration,
            reporter,
        }
    }

    pub fn aggregator(&self) -> &Arc<VerdictAggregator> {
        &self.aggregator
    }

    pub fn reporter(&self) -> &Arc<dyn TestResult + Send + Sync> {
        &self.reporter
    }

    /// Replays every test case of a set concurrently and returns the set's final verdict.
    ///
    /// A case that can't be replayed or judged counts as failed. Cancelling
    /// `cancel` stops all in-flight replays; if any replay was cut short the
    /// run fails with `Error::Cancelled`.
    pub async fn run(
        &self,
        cancel: &CancellationToken,
        test_set_id: &str,
        test_cases: &[TestCase],
    ) -> Result<TestSetVerdict, Error> {
        self.aggregator.begin(test_set_id)?;

        let noise = self.configuration.noise_for(test_set_id);
        let replays = test_cases
            .iter()
            .map(|test_case| self.replay(cancel, test_set_id, test_case, &noise));

        let outcomes = future::join_all(replays)
            .await
            .into_iter()
            .collect::<Result<Vec<_>, _>>()?;

        if outcomes.iter().any(Option::is_none) {
            return Err(Error::Cancelled);
        }

        let verdict = self.aggregator.verdict(test_set_id)?;
        info!(
            test_set_id,
            total = verdict.total,
            passed = verdict.passed,
            failed = verdict.failed,
            status = verdict.status,
            "Test set replayed"
        );

        Ok(verdict)
    }

    async fn replay(
        &self,
        cancel: &CancellationToken,
        test_set_id: &str,
        test_case: &TestCase,
        noise: &NoiseMap,
    ) -> Result<Option<bool>, Error> {
        let passed = match self.judge(cancel, test_set_id, test_case, noise).await {
            Ok(passed) => passed,
            Err(Error::Cancelled) => return Ok(None),
            Err(error) => {
                warn!(
                    test_case = %test_case.name,
                    test_set_id,
                    %error,
                    "Couldn't replay the test case"
                );
                false
            }
        };

        self.aggregator.record_outcome(test_set_id, passed)?;
        self.reporter.test_run_status(passed, test_set_id);

        Ok(Some(passed))
    }

    async fn judge(
        &self,
        cancel: &CancellationToken,
        test_set_id: &str,
        test_case: &TestCase,
        noise: &NoiseMap,
    ) -> Result<bool, Error> {
        let test_case = self.target(test_case)?;
        self.reporter.record_mock_usage(test_set_id);

        let response = self
            .emulator
            .simulate_request(
                cancel,
                self.configuration.api_timeout(),
                &test_case,
                test_set_id,
            )
            .await?;

        let expected = match test_case.http_resp.as_ref() {
            Some(expected) => expected,
            None => return Ok(false),
        };

        let noise = noise.merge(&NoiseMap::from_flat(&test_case.noise));
        self.matcher.matches(expected, &response, &noise)
    }

    // points http test cases at the container host when one is configured
    fn target<'a>(&self, test_case: &'a TestCase) -> Result<Cow<'a, TestCase>, Error> {
        let container_host = match self.configuration.container_host() {
            Some(container_host) if test_case.kind == Kind::Http => container_host,
            _ => return Ok(Cow::Borrowed(test_case)),
        };

        let url = match test_case.http_req.as_ref() {
            Some(request) => &request.url,
            None => return Ok(Cow::Borrowed(test_case)),
        };

        match host::rewrite_host(url, container_host) {
            Ok(rewritten) => {
                let mut test_case = test_case.clone();
                if let Some(request) = test_case.http_req.as_mut() {
                    request.url = rewritten;
                }
                Ok(Cow::Owned(test_case))
            }
            Err(Error::UrlParse(url)) => {
                warn!(%url, "Couldn't parse the test case url, replaying against it unchanged");
                Ok(Cow::Borrowed(test_case))
            }
            Err(error) => Err(error),
        }
    }
}
