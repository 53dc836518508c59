use crate::{
    data::{Kind, Response, TestCase},
    error::Error,
    util,
};
use async_trait::async_trait;
use hyper::{
    body,
    client::HttpConnector,
    header::{HeaderName, HeaderValue},
    Body, Client, Method, Request,
};
use hyper_tls::HttpsConnector;
use std::{
    fmt::Debug,
    time::{Duration, Instant},
};

pub const TEST_ID_HEADER: &str = "keploy-test-id";
pub const TEST_SET_ID_HEADER: &str = "keploy-test-set-id";

/// Sends a captured request of one protocol kind over the wire.
#[async_trait]
pub trait Transport: Debug {
    fn kind(&self) -> Kind;

    async fn send(
        &self,
        test_case: &TestCase,
        test_set_id: &str,
        timeout: Duration,
    ) -> Result<Response, Error>;
}

#[derive(Debug, Clone)]
pub struct HyperHttpTransport {
    client: Client<HttpsConnector<HttpConnector>>,
}

impl HyperHttpTransport {
    pub fn new() -> Self {
        Self {
            client: Client::builder().build(HttpsConnector::new()),
        }
    }

    fn build_request(test_case: &TestCase, test_set_id: &str) -> Result<Request<Body>, Error> {
        let request_data = test_case
            .http_req
            .as_ref()
            .ok_or(Error::MissingRequest(Kind::Http))?;

        let method = if request_data.method.is_empty() {
            Method::GET
        } else {
            Method::from_bytes(request_data.method.to_uppercase().as_bytes())?
        };

        let mut request_builder = Request::builder()
            .uri(request_data.url.as_str())
            .method(method);

        if let Some(headers_mut) = request_builder.headers_mut() {
            // host and content-length are recomputed for the replayed request
            util::put_headers(
                headers_mut,
                request_data.headers.iter().filter(|(header_name, _)| {
                    !header_name.eq_ignore_ascii_case("host")
                        && !header_name.eq_ignore_ascii_case("content-length")
                }),
            )?;

            headers_mut.insert(
                HeaderName::from_static(TEST_ID_HEADER),
                HeaderValue::from_str(&test_case.name)?,
            );
            headers_mut.insert(
                HeaderName::from_static(TEST_SET_ID_HEADER),
                HeaderValue::from_str(test_set_id)?,
            );
        }

        Ok(request_builder.body(request_data.body.clone().into())?)
    }
}

#[async_trait]
impl Transport for HyperHttpTransport {
    fn kind(&self) -> Kind {
        Kind::Http
    }

    async fn send(
        &self,
        test_case: &TestCase,
        test_set_id: &str,
        timeout: Duration,
    ) -> Result<Response, Error> {
        let request = Self::build_request(test_case, test_set_id)?;
        let started = Instant::now();

        let exchange = async {
            let response = self.client.request(request).await?;

            let status_code = response.status().as_u16();
            let headers = util::extract_headers(response.headers());
            let body = body::to_bytes(response.into_body()).await?;

            Ok::<_, Error>(Response {
                status_code,
                headers,
                body: String::from_utf8_lossy(&body).into(),
                elapsed: started.elapsed(),
            })
        };

        tokio::time::timeout(timeout, exchange)
            .await
            .map_err(|_| Error::Timeout(timeout.as_secs()))?
    }
}

impl Default for HyperHttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{HttpRequest, HttpResponse};

    fn test_case(method: &str) -> TestCase {
        TestCase::http(
            "test-1",
            HttpRequest {
                method: method.into(),
                url: "http://localhost:8080/users?page=2".into(),
                headers: vec![
                    (String::from("Host"), String::from("localhost:8080")),
                    (String::from("Content-Length"), String::from("999")),
                    (String::from("Accept"), String::from("application/json")),
                ]
                .into_iter()
                .collect(),
                body: "{}".into(),
            },
            HttpResponse::default(),
        )
    }

    #[test]
    fn request_carries_captured_data_and_test_ids() {
        let request = HyperHttpTransport::build_request(&test_case("post"), "test-set-0").unwrap();

        assert_eq!(*request.method(), Method::POST);
        assert_eq!(
            request.uri().to_string(),
            "http://localhost:8080/users?page=2"
        );
        assert_eq!(request.headers()["accept"], "application/json");
        assert_eq!(request.headers()[TEST_ID_HEADER], "test-1");
        assert_eq!(request.headers()[TEST_SET_ID_HEADER], "test-set-0");
        assert!(request.headers().get("host").is_none());
        assert!(request.headers().get("content-length").is_none());
    }

    #[test]
    fn empty_method_defaults_to_get() {
        let request = HyperHttpTransport::build_request(&test_case(""), "s").unwrap();

        assert_eq!(*request.method(), Method::GET);
    }

    #[test]
    fn missing_http_request_is_an_error() {
        let mut case = test_case("GET");
        case.http_req = None;

        assert!(matches!(
            HyperHttpTransport::build_request(&case, "s"),
            Err(Error::MissingRequest(Kind::Http))
        ));
    }
}
