#[cfg(test)]
mod tests {
    use hyper::{
        body,
        service::{make_service_fn, service_fn},
        Body, Request, Server,
    };
    use replayer::{
        CancellationToken, Emulator, Error, HttpRequest, HttpResponse, Kind, NoiseMap,
        ReplayConfiguration, RequestEmulator, TestCase, TestResult, TestSetRunner,
        TestStatusReporter, BODY, HEADER,
    };
    use std::{
        convert::Infallible,
        net::SocketAddr,
        sync::{
            atomic::{AtomicUsize, Ordering},
            Arc,
        },
        time::Duration,
    };
    use tracing_subscriber::EnvFilter;

    static NEXT_ID: AtomicUsize = AtomicUsize::new(1);

    fn init_logging() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    async fn handle(mut request: Request<Body>) -> Result<hyper::Response<Body>, Infallible> {
        let path = request.uri().path().to_string();
        let response = match path.as_str() {
            "/ping" => hyper::Response::new(Body::from("pong")),
            "/users" => {
                let id = NEXT_ID.fetch_add(1, Ordering::SeqCst);
                hyper::Response::builder()
                    .header("content-type", "application/json")
                    .header("x-request-id", format!("req-{}", id))
                    .body(Body::from(format!(
                        "{{\"id\": {}, \"name\": \"alice\", \"roles\": [\"admin\"]}}",
                        id
                    )))
                    .unwrap()
            }
            "/ids" => {
                let header = |name: &str| {
                    request
                        .headers()
                        .get(name)
                        .and_then(|value| value.to_str().ok())
                        .unwrap_or("")
                        .to_string()
                };
                let ids = format!(
                    "{}/{}",
                    header(replayer::TEST_ID_HEADER),
                    header(replayer::TEST_SET_ID_HEADER)
                );
                hyper::Response::new(Body::from(ids))
            }
            "/echo" => {
                let bytes = body::to_bytes(request.body_mut()).await.unwrap();
                hyper::Response::builder()
                    .status(201)
                    .body(Body::from(bytes))
                    .unwrap()
            }
            "/slow" => {
                tokio::time::sleep(Duration::from_secs(5)).await;
                hyper::Response::new(Body::from("late"))
            }
            _ => hyper::Response::builder()
                .status(404)
                .body(Body::empty())
                .unwrap(),
        };

        Ok(response)
    }

    fn start_server() -> SocketAddr {
        let addr = SocketAddr::from(([127, 0, 0, 1], 0));
        let server = Server::bind(&addr).serve(make_service_fn(|_| async {
            Ok::<_, Infallible>(service_fn(handle))
        }));
        let local_addr = server.local_addr();

        tokio::spawn(async move {
            if let Err(e) = server.await {
                eprintln!("Test server error: {}", e);
            }
        });

        local_addr
    }

    fn case(
        name: &str,
        method: &str,
        url: String,
        body: &str,
        expected: HttpResponse,
    ) -> TestCase {
        TestCase::http(
            name,
            HttpRequest {
                method: method.into(),
                url,
                headers: vec![(String::from("Accept"), String::from("*/*"))]
                    .into_iter()
                    .collect(),
                body: body.into(),
            },
            expected,
        )
    }

    fn users_response() -> HttpResponse {
        HttpResponse {
            status_code: 200,
            headers: vec![
                (String::from("Content-Type"), String::from("application/json")),
                (String::from("X-Request-Id"), String::from("req-0")),
            ]
            .into_iter()
            .collect(),
            body: "{\"id\": 0, \"name\": \"alice\", \"roles\": [\"admin\"]}".into(),
        }
    }

    #[tokio::test]
    async fn replays_against_a_live_server_with_noise() {
        init_logging();
        let addr = start_server();
        let url = format!("http://{}/users", addr);

        let mut global_noise = NoiseMap::new();
        global_noise.insert(HEADER, "x-request-id", vec![String::from("^req-\\d+$")]);
        let mut test_set_noise = NoiseMap::new();
        test_set_noise.insert(BODY, "id", vec![]);

        let mut configuration = ReplayConfiguration::new();
        configuration.set_global_noise(global_noise);
        configuration.set_test_set_noise("test-set-0", test_set_noise);
        let runner = TestSetRunner::new(configuration);

        let cases = vec![
            case("test-1", "GET", url.clone(), "", users_response()),
            case("test-2", "GET", url, "", users_response()),
        ];

        let verdict = runner
            .run(&CancellationToken::new(), "test-set-0", &cases)
            .await
            .unwrap();
        assert_eq!(verdict.total, 2);
        assert!(verdict.status);

        // without the test set's body noise the ids differ
        let verdict = runner
            .run(&CancellationToken::new(), "test-set-1", &cases)
            .await
            .unwrap();
        assert_eq!(verdict.failed, 2);
        assert!(!verdict.status);
    }

    #[tokio::test]
    async fn posts_the_captured_body() {
        init_logging();
        let addr = start_server();
        let expected = HttpResponse {
            status_code: 201,
            body: "{\"order\": 7}".into(),
            ..HttpResponse::default()
        };
        let runner = TestSetRunner::new(ReplayConfiguration::new());

        let verdict = runner
            .run(
                &CancellationToken::new(),
                "orders",
                &[case(
                    "create-order",
                    "POST",
                    format!("http://{}/echo", addr),
                    "{\"order\": 7}",
                    expected,
                )],
            )
            .await
            .unwrap();

        assert!(verdict.status);
    }

    #[tokio::test]
    async fn replayed_requests_carry_test_ids() {
        let addr = start_server();
        let test_case = case(
            "test-3",
            "GET",
            format!("http://{}/ids", addr),
            "",
            HttpResponse::default(),
        );

        let response = Emulator::new(5)
            .simulate_request(&CancellationToken::new(), 5, &test_case, "test-set-9")
            .await
            .unwrap();

        assert_eq!(response.status_code, 200);
        assert_eq!(response.body, "test-3/test-set-9");
    }

    #[tokio::test]
    async fn slow_target_times_out() {
        let addr = start_server();
        let test_case = case(
            "slow",
            "GET",
            format!("http://{}/slow", addr),
            "",
            HttpResponse::default(),
        );

        let result = Emulator::new(5)
            .simulate_request(&CancellationToken::new(), 1, &test_case, "s")
            .await;

        assert!(matches!(result, Err(Error::Timeout(1))));
    }

    #[tokio::test]
    async fn cancelling_a_run_interrupts_slow_replays() {
        let addr = start_server();
        let runner = TestSetRunner::new(ReplayConfiguration::new());
        let cancel = CancellationToken::new();

        let canceller = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            canceller.cancel();
        });

        let started = std::time::Instant::now();
        let result = runner
            .run(
                &cancel,
                "s",
                &[case(
                    "slow",
                    "GET",
                    format!("http://{}/slow", addr),
                    "",
                    HttpResponse::default(),
                )],
            )
            .await;

        assert!(matches!(result, Err(Error::Cancelled)));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[tokio::test]
    async fn unreachable_target_and_unknown_kind_fail_their_cases() {
        let addr = start_server();
        let mut mongo = case(
            "mongo",
            "GET",
            format!("http://{}/ping", addr),
            "",
            HttpResponse::default(),
        );
        mongo.kind = Kind::Mongo;

        let cases = vec![
            case(
                "ping",
                "GET",
                format!("http://{}/ping", addr),
                "",
                HttpResponse {
                    status_code: 200,
                    body: "pong".into(),
                    ..HttpResponse::default()
                },
            ),
            case(
                "refused",
                "GET",
                String::from("http://127.0.0.1:1/ping"),
                "",
                HttpResponse::default(),
            ),
            mongo,
        ];

        let reporter = Arc::new(TestStatusReporter::new("keploy", "mocks"));
        let runner = TestSetRunner::with_reporter(ReplayConfiguration::new(), reporter.clone());

        let verdict = runner
            .run(&CancellationToken::new(), "mixed", &cases)
            .await
            .unwrap();

        assert_eq!(verdict.total, 3);
        assert_eq!(verdict.passed, 1);
        assert_eq!(verdict.failed, 2);

        let usage = reporter.mock_usage("mixed").unwrap();
        assert_eq!(usage.uses, 3);
        assert_eq!(reporter.mock_name(), "mocks");
    }
}
