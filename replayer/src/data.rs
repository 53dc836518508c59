use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt::Display, time::Duration};

/// Wire protocol a test case was captured from.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Kind {
    #[serde(rename = "Http")]
    Http,
    #[serde(rename = "gRPC")]
    Grpc,
    #[serde(rename = "Generic")]
    Generic,
    #[serde(rename = "Mongo")]
    Mongo,
    #[serde(rename = "Postgres")]
    Postgres,
    #[serde(rename = "Redis")]
    Redis,
    #[serde(rename = "MySQL")]
    MySql,
}

impl Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Kind::Http => "Http",
            Kind::Grpc => "gRPC",
            Kind::Generic => "Generic",
            Kind::Mongo => "Mongo",
            Kind::Postgres => "Postgres",
            Kind::Redis => "Redis",
            Kind::MySql => "MySQL",
        };

        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HttpRequest {
    pub method: String,
    pub url: String,
    pub headers: HashMap<String, String>,
    pub body: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HttpResponse {
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
}

/// A captured request together with the response it produced at capture time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    #[serde(default)]
    pub version: String,
    pub name: String,
    pub kind: Kind,
    #[serde(default)]
    pub http_req: Option<HttpRequest>,
    #[serde(default)]
    pub http_resp: Option<HttpResponse>,
    /// Per-case noise keyed by `scope.field`, e.g. `body.id` or `header.Date`.
    #[serde(default)]
    pub noise: HashMap<String, Vec<String>>,
}

impl TestCase {
    pub fn http<S: Into<String>>(name: S, request: HttpRequest, expected: HttpResponse) -> Self {
        Self {
            version: String::from("api.keploy.io/v1beta1"),
            name: name.into(),
            kind: Kind::Http,
            http_req: Some(request),
            http_resp: Some(expected),
            noise: HashMap::new(),
        }
    }
}

/// What the system under test answered when a test case was replayed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
    pub elapsed: Duration,
}
