mod data;
mod emulator;
mod error;
mod host;
mod http_client;
mod matcher;
mod noise;
mod replay_configuration;
mod reporter;
mod runner;
mod util;
mod verdict;

pub use data::{HttpRequest, HttpResponse, Kind, Response, TestCase};
pub use emulator::{Emulator, RequestEmulator};
pub use error::Error;
pub use host::rewrite_host;
pub use http_client::{HyperHttpTransport, Transport, TEST_ID_HEADER, TEST_SET_ID_HEADER};
pub use matcher::{NoiseAwareMatcher, ResponseMatcher};
pub use noise::{NoiseMap, BODY, HEADER};
pub use replay_configuration::ReplayConfiguration;
pub use reporter::{MockUsageRecord, TestResult, TestStatusReporter};
pub use runner::TestSetRunner;
pub use tokio_util::sync::CancellationToken;
pub use verdict::{TestSetVerdict, VerdictAggregator};
