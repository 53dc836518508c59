use crate::{
    emulator::{Emulator, RequestEmulator},
    error::Error,
    matcher::{NoiseAwareMatcher, ResponseMatcher},
    noise::NoiseMap,
};
use serde::Deserialize;
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

pub const DEFAULT_API_TIMEOUT: u64 = 5;
pub const DEFAULT_MOCK_NAME: &str = "mocks";
pub const DEFAULT_PATH: &str = "keploy";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ConfigurationFile {
    api_timeout: Option<u64>,
    global_noise: NoiseMap,
    test_sets: HashMap<String, TestSetFile>,
    container_host: Option<String>,
    mock_name: Option<String>,
    path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TestSetFile {
    noise: NoiseMap,
}

#[derive(Debug)]
pub struct ReplayConfiguration {
    api_timeout: u64,
    global_noise: NoiseMap,
    test_set_noise: HashMap<String, NoiseMap>,
    container_host: Option<String>,
    mock_name: String,
    path: PathBuf,
    emulator: Option<Arc<dyn RequestEmulator + Send + Sync>>,
    matcher: Option<Arc<dyn ResponseMatcher + Send + Sync>>,
}

impl ReplayConfiguration {
    pub fn new() -> Self {
        Self {
            api_timeout: DEFAULT_API_TIMEOUT,
            global_noise: NoiseMap::new(),
            test_set_noise: HashMap::new(),
            container_host: None,
            mock_name: String::from(DEFAULT_MOCK_NAME),
            path: PathBuf::from(DEFAULT_PATH),
            emulator: None,
            matcher: None,
        }
    }

    /// Reads a JSON configuration document. Missing keys keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, Error> {
        let file: ConfigurationFile = serde_json::from_str(json)?;
        let mut configuration = Self::new();

        if let Some(api_timeout) = file.api_timeout {
            configuration.set_api_timeout(api_timeout);
        }
        if let Some(container_host) = file.container_host {
            configuration.set_container_host(container_host);
        }
        if let Some(mock_name) = file.mock_name {
            configuration.set_mock_name(mock_name);
        }
        if let Some(path) = file.path {
            configuration.set_path(path);
        }

        configuration.set_global_noise(file.global_noise);
        for (test_set_id, test_set) in file.test_sets {
            configuration.set_test_set_noise(test_set_id, test_set.noise);
        }

        Ok(configuration)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        Self::from_json_str(&fs::read_to_string(path)?)
    }

    pub fn set_api_timeout(&mut self, seconds: u64) {
        self.api_timeout = seconds;
    }

    pub fn api_timeout(&self) -> u64 {
        self.api_timeout
    }

    pub fn set_global_noise(&mut self, noise: NoiseMap) {
        self.global_noise = noise;
    }

    pub fn global_noise(&self) -> &NoiseMap {
        &self.global_noise
    }

    pub fn set_test_set_noise<S: Into<String>>(&mut self, test_set_id: S, noise: NoiseMap) {
        self.test_set_noise.insert(test_set_id.into(), noise);
    }

    /// The global noise with the test set's own noise layered on top.
    pub fn noise_for(&self, test_set_id: &str) -> NoiseMap {
        match self.test_set_noise.get(test_set_id) {
            Some(overrides) => self.global_noise.merge(overrides),
            None => self.global_noise.clone(),
        }
    }

    pub fn set_container_host<S: Into<String>>(&mut self, host: S) {
        self.container_host = Some(host.into());
    }

    pub fn container_host(&self) -> Option<&String> {
        self.container_host.as_ref()
    }

    pub fn set_mock_name<S: Into<String>>(&mut self, mock_name: S) {
        self.mock_name = mock_name.into();
    }

    pub fn mock_name(&self) -> &str {
        &self.mock_name
    }

    pub fn set_path<P: Into<PathBuf>>(&mut self, path: P) {
        self.path = path.into();
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn emulator(&self) -> Arc<dyn RequestEmulator + Send + Sync> {
        self.emulator
            .clone()
            .unwrap_or_else(|| Arc::new(Emulator::new(self.api_timeout)))
    }

    pub fn set_emulator(&mut self, emulator: Arc<dyn RequestEmulator + Send + Sync>) {
        self.emulator = Some(emulator);
    }

    pub fn matcher(&self) -> Arc<dyn ResponseMatcher + Send + Sync> {
        self.matcher
            .clone()
            .unwrap_or_else(|| Arc::new(NoiseAwareMatcher::new()))
    }

    pub fn set_matcher(&mut self, matcher: Arc<dyn ResponseMatcher + Send + Sync>) {
        self.matcher = Some(matcher);
    }
}

impl Default for ReplayConfiguration {
    fn default() -> Self {
        Self::new()
    }
}
