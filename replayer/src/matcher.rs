use crate::{
    data::{HttpResponse, Response},
    error::Error,
    noise::NoiseMap,
    util,
};
use regex::Regex;
use serde_json::Value;
use std::{collections::HashMap, fmt::Debug};

/// Decides whether a replayed response matches the captured one.
pub trait ResponseMatcher: Debug {
    fn matches(
        &self,
        expected: &HttpResponse,
        actual: &Response,
        noise: &NoiseMap,
    ) -> Result<bool, Error>;
}

/// Compares status, headers and body, skipping or tolerating the fields named in the noise map.
///
/// Only headers present in the captured response are checked. JSON bodies are
/// compared structurally and body noise is addressed by dotted path, with
/// array elements sharing their array's path. The empty path covers the
/// whole body.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoiseAwareMatcher;

impl NoiseAwareMatcher {
    pub fn new() -> Self {
        Self
    }

    fn headers_match(
        expected: &HashMap<String, String>,
        actual: &HashMap<String, String>,
        noise: Option<&HashMap<String, Vec<String>>>,
    ) -> Result<bool, Error> {
        for (name, expected_value) in expected {
            let actual_value = util::find_header(actual, name);
            let patterns = noise.and_then(|noise| util::find_header(noise, name));

            match (actual_value, patterns) {
                (_, Some(patterns)) if patterns.is_empty() => continue,
                (Some(actual_value), Some(patterns)) => {
                    if actual_value != expected_value
                        && !tolerated(patterns, expected_value, actual_value)?
                    {
                        return Ok(false);
                    }
                }
                (Some(actual_value), None) => {
                    if actual_value != expected_value {
                        return Ok(false);
                    }
                }
                (None, _) => return Ok(false),
            }
        }

        Ok(true)
    }

    fn bodies_match(
        expected: &str,
        actual: &str,
        noise: Option<&HashMap<String, Vec<String>>>,
    ) -> Result<bool, Error> {
        let empty = HashMap::new();
        let noise = noise.unwrap_or(&empty);

        match (
            serde_json::from_str::<Value>(expected),
            serde_json::from_str::<Value>(actual),
        ) {
            (Ok(expected), Ok(actual)) => json_match("", &expected, &actual, noise),
            _ => match noise.get("") {
                Some(patterns) => Ok(expected == actual || tolerated(patterns, expected, actual)?),
                None => Ok(expected == actual),
            },
        }
    }
}

impl ResponseMatcher for NoiseAwareMatcher {
    fn matches(
        &self,
        expected: &HttpResponse,
        actual: &Response,
        noise: &NoiseMap,
    ) -> Result<bool, Error> {
        Ok(expected.status_code == actual.status_code
            && Self::headers_match(&expected.headers, &actual.headers, noise.header())?
            && Self::bodies_match(&expected.body, &actual.body, noise.body())?)
    }
}

// an empty pattern list tolerates anything
fn tolerated(patterns: &[String], expected: &str, actual: &str) -> Result<bool, Error> {
    if patterns.is_empty() {
        return Ok(true);
    }

    for pattern in patterns {
        let regex = Regex::new(pattern)?;
        if regex.is_match(expected) && regex.is_match(actual) {
            return Ok(true);
        }
    }

    Ok(false)
}

fn json_match(
    path: &str,
    expected: &Value,
    actual: &Value,
    noise: &HashMap<String, Vec<String>>,
) -> Result<bool, Error> {
    if let Some(patterns) = noise.get(path) {
        if tolerated(patterns, &json_text(expected), &json_text(actual))? {
            return Ok(true);
        }
    }

    match (expected, actual) {
        (Value::Object(expected), Value::Object(actual)) => {
            // each key is visited once, shared keys through `expected`
            let unmatched = actual.keys().filter(|key| !expected.contains_key(*key));

            for key in expected.keys().chain(unmatched) {
                let child = child_path(path, key);

                let matched = match (expected.get(key), actual.get(key)) {
                    (Some(expected), Some(actual)) => {
                        json_match(&child, expected, actual, noise)?
                    }
                    _ => noise.get(&child).map_or(false, Vec::is_empty),
                };

                if !matched {
                    return Ok(false);
                }
            }

            Ok(true)
        }
        (Value::Array(expected), Value::Array(actual)) => {
            if expected.len() != actual.len() {
                return Ok(false);
            }

            for (expected, actual) in expected.iter().zip(actual) {
                if !json_match(path, expected, actual, noise)? {
                    return Ok(false);
                }
            }

            Ok(true)
        }
        _ => Ok(expected == actual),
    }
}

fn child_path(path: &str, key: &str) -> String {
    if path.is_empty() {
        String::from(key)
    } else {
        format!("{}.{}", path, key)
    }
}

fn json_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
