//! HTTP API integration tests.
//!
//! Each test serves the real router on an ephemeral port and drives it with
//! an HTTP client, the way an external caller would.

use cp_core::{Dispatcher, SharedDispatcher, VehicleSpec};
use reqwest::{Client, Response, StatusCode};
use serde_json::{Value, json};
use tokio::net::TcpListener;

struct TestServer {
    base: String,
    client: Client,
    dispatcher: SharedDispatcher,
}

impl TestServer {
    async fn start(dispatcher: Dispatcher) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        let dispatcher = SharedDispatcher::new(dispatcher);

        let state = dispatcher.clone();
        tokio::spawn(async move {
            cp_server::http::serve(listener, state, std::future::pending())
                .await
                .unwrap();
        });

        Self {
            base: format!("http://{address}"),
            client: Client::new(),
            dispatcher,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }

    async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> Response {
        self.client
            .post(self.url(path))
            .form(form)
            .send()
            .await
            .unwrap()
    }

    async fn put_cars(&self, body: &Value) -> Response {
        self.client
            .put(self.url("/cars"))
            .json(body)
            .send()
            .await
            .unwrap()
    }

    async fn register(&self) -> u64 {
        let response = self.client.post(self.url("/group")).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        info(response).await
    }
}

async fn body(response: Response) -> Value {
    response.json().await.unwrap()
}

async fn info(response: Response) -> u64 {
    body(response).await["info"].as_u64().unwrap()
}

async fn error_code(response: Response) -> String {
    body(response).await["error"]["code"]
        .as_str()
        .unwrap()
        .to_string()
}

fn reference_fleet() -> Value {
    json!([
        {"id": 1, "seats": 5},
        {"id": 4, "seats": 4},
        {"id": 3, "seats": 2},
        {"id": 2, "seats": 6}
    ])
}

#[tokio::test]
async fn reference_scenario_over_http() {
    let server = TestServer::start(Dispatcher::new()).await;

    let loaded = server.put_cars(&reference_fleet()).await;
    assert_eq!(loaded.status(), StatusCode::ACCEPTED);
    assert_eq!(body(loaded).await, json!({"message": "Accepted", "info": 4}));

    assert_eq!(server.register().await, 1);

    let journey = server
        .post_form("/journey", &[("gid", "1"), ("seats", "4")])
        .await;
    assert_eq!(journey.status(), StatusCode::OK);
    assert_eq!(info(journey).await, 1);

    let located = server.post_form("/locate", &[("gid", "1")]).await;
    assert_eq!(located.status(), StatusCode::OK);
    assert_eq!(info(located).await, 4);

    let unknown = server
        .post_form("/journey", &[("gid", "2"), ("seats", "4")])
        .await;
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);
    assert_eq!(error_code(unknown).await, "group_not_found");

    assert_eq!(server.register().await, 2);
    let waiting = server
        .post_form("/journey", &[("gid", "2"), ("seats", "4")])
        .await;
    assert_eq!(waiting.status(), StatusCode::OK);
    assert_eq!(info(waiting).await, 2);

    let located = server.post_form("/locate", &[("gid", "2")]).await;
    assert_eq!(located.status(), StatusCode::NO_CONTENT);

    let dropped = server.post_form("/dropoff", &[("gid", "1")]).await;
    assert_eq!(dropped.status(), StatusCode::OK);

    let gone = server.post_form("/locate", &[("gid", "1")]).await;
    assert_eq!(gone.status(), StatusCode::NOT_FOUND);
    assert_eq!(error_code(gone).await, "group_not_found");

    let status = server.client.get(server.url("/status")).send().await.unwrap();
    assert_eq!(status.status(), StatusCode::OK);
    let status = body(status).await;
    assert_eq!(status["message"], "OK");
    assert_eq!(status["vehicles"], 4);
    assert_eq!(status["engaged_vehicles"], 0);
    assert_eq!(status["groups"], 1);
    assert_eq!(status["journeys"], 1);
    assert_eq!(status["waiting_journeys"], 1);

    server.dispatcher.verify().unwrap();
}

#[tokio::test]
async fn home_answers_ok() {
    let server = TestServer::start(Dispatcher::new()).await;

    let response = server.client.get(server.url("/")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body(response).await, json!({"message": "OK"}));
}

#[tokio::test]
async fn unknown_route_is_not_found_with_envelope() {
    let server = TestServer::start(Dispatcher::new()).await;

    let response = server.client.get(server.url("/nope")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(error_code(response).await, "unknown_route");
}

#[tokio::test]
async fn locate_without_journey_is_distinct_from_unknown_group() {
    let server = TestServer::start(Dispatcher::new()).await;
    let group = server.register().await.to_string();

    let idle = server.post_form("/locate", &[("gid", &group)]).await;
    assert_eq!(idle.status(), StatusCode::NOT_FOUND);
    assert_eq!(error_code(idle).await, "journey_not_found");

    let unknown = server.post_form("/locate", &[("gid", "999")]).await;
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);
    assert_eq!(error_code(unknown).await, "group_not_found");
}

#[tokio::test]
async fn malformed_group_requests_are_bad_requests() {
    let server = TestServer::start(Dispatcher::new()).await;
    server.register().await;

    let cases: [(&str, &[(&str, &str)], &str); 5] = [
        ("/journey", &[("gid", "1")], "missing_field"),
        ("/journey", &[("gid", "abc"), ("seats", "4")], "invalid_field"),
        ("/journey", &[("gid", "1"), ("seats", "0")], "invalid_field"),
        ("/locate", &[], "missing_field"),
        ("/dropoff", &[("gid", "-1")], "invalid_field"),
    ];

    for (path, form, code) in cases {
        let response = server.post_form(path, form).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{path} {form:?}");
        assert_eq!(error_code(response).await, code, "{path} {form:?}");
    }

    // Nothing was created along the way.
    assert_eq!(server.dispatcher.snapshot().unwrap().journeys, 0);
}

#[tokio::test]
async fn non_form_body_is_rejected() {
    let server = TestServer::start(Dispatcher::new()).await;

    let response = server
        .client
        .post(server.url("/journey"))
        .json(&json!({"gid": 1, "seats": 4}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_code(response).await, "invalid_body");
}

#[tokio::test]
async fn second_journey_for_group_is_rejected() {
    let server = TestServer::start(Dispatcher::new()).await;
    server.put_cars(&reference_fleet()).await;
    server.register().await;

    server
        .post_form("/journey", &[("gid", "1"), ("seats", "5")])
        .await;
    let again = server
        .post_form("/journey", &[("gid", "1"), ("seats", "6")])
        .await;

    assert_eq!(again.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_code(again).await, "journey_already_active");
}

#[tokio::test]
async fn invalid_fleets_are_rejected_without_replacing_current_one() {
    let seed = [VehicleSpec::new(7, 4).unwrap()];
    let server = TestServer::start(Dispatcher::with_fleet(&seed).unwrap()).await;

    let duplicate = server
        .put_cars(&json!([{"id": 1, "seats": 4}, {"id": 1, "seats": 5}]))
        .await;
    assert_eq!(duplicate.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_code(duplicate).await, "duplicate_vehicle");

    let zero_seats = server.put_cars(&json!([{"id": 1, "seats": 0}])).await;
    assert_eq!(zero_seats.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_code(zero_seats).await, "invalid_body");

    let not_json = server
        .client
        .put(server.url("/cars"))
        .header("content-type", "application/json")
        .body("[{")
        .send()
        .await
        .unwrap();
    assert_eq!(not_json.status(), StatusCode::BAD_REQUEST);

    assert_eq!(server.dispatcher.snapshot().unwrap().vehicles, 1);
}

#[tokio::test]
async fn reloading_fleet_discards_journeys() {
    let server = TestServer::start(Dispatcher::new()).await;
    server.put_cars(&reference_fleet()).await;
    let group = server.register().await.to_string();
    server
        .post_form("/journey", &[("gid", &group), ("seats", "4")])
        .await;

    let reloaded = server.put_cars(&json!([{"id": 9, "seats": 4}])).await;
    assert_eq!(reloaded.status(), StatusCode::ACCEPTED);

    let located = server.post_form("/locate", &[("gid", &group)]).await;
    assert_eq!(located.status(), StatusCode::NOT_FOUND);
    assert_eq!(error_code(located).await, "journey_not_found");

    // A fresh request binds the new vehicle and gets a fresh journey id.
    let journey = server
        .post_form("/journey", &[("gid", &group), ("seats", "4")])
        .await;
    assert_eq!(info(journey).await, 2);
    let located = server.post_form("/locate", &[("gid", &group)]).await;
    assert_eq!(info(located).await, 9);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn parallel_journey_requests_never_double_book() {
    let fleet = [VehicleSpec::new(1, 4).unwrap(), VehicleSpec::new(2, 4).unwrap()];
    let server = TestServer::start(Dispatcher::with_fleet(&fleet).unwrap()).await;

    let mut groups = Vec::new();
    for _ in 0..10 {
        groups.push(server.register().await.to_string());
    }

    let handles: Vec<_> = groups
        .iter()
        .cloned()
        .map(|group| {
            let client = server.client.clone();
            let url = server.url("/journey");
            tokio::spawn(async move {
                client
                    .post(url)
                    .form(&[("gid", group.as_str()), ("seats", "4")])
                    .send()
                    .await
                    .unwrap()
                    .status()
            })
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.await.unwrap(), StatusCode::OK);
    }

    let mut vehicles = Vec::new();
    for group in &groups {
        let located = server.post_form("/locate", &[("gid", group)]).await;
        if located.status() == StatusCode::OK {
            vehicles.push(info(located).await);
        }
    }
    vehicles.sort_unstable();
    assert_eq!(vehicles, vec![1, 2]);
    server.dispatcher.verify().unwrap();
}

#[tokio::test]
async fn status_lists_active_journeys() {
    let server = TestServer::start(Dispatcher::new()).await;
    server.put_cars(&reference_fleet()).await;
    let rider = server.register().await.to_string();
    let waiter = server.register().await.to_string();
    server
        .post_form("/journey", &[("gid", &rider), ("seats", "6")])
        .await;
    server
        .post_form("/journey", &[("gid", &waiter), ("seats", "3")])
        .await;

    let status = server.client.get(server.url("/status")).send().await.unwrap();
    assert_eq!(status.status(), StatusCode::OK);
    let status = body(status).await;

    let journeys = status["active_journeys"].as_array().unwrap();
    assert_eq!(journeys.len(), 2);

    assert_eq!(journeys[0]["id"], 1);
    assert_eq!(journeys[0]["group"], 1);
    assert_eq!(journeys[0]["vehicle"], 2);
    assert_eq!(journeys[0]["seats"], 6);
    assert!(journeys[0]["requested_at"].is_string());

    assert_eq!(journeys[1]["id"], 2);
    assert_eq!(journeys[1]["group"], 2);
    assert_eq!(journeys[1]["vehicle"], Value::Null);
    assert_eq!(journeys[1]["seats"], 3);
    assert!(journeys[1]["requested_at"].is_string());
}

#[tokio::test]
async fn wrong_method_gets_error_envelope() {
    let server = TestServer::start(Dispatcher::new()).await;

    let response = server.client.get(server.url("/journey")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    let body = body(response).await;
    assert_eq!(body["message"], "Method Not Allowed");
    assert_eq!(body["error"]["code"], "method_not_allowed");
}

#[tokio::test]
async fn drop_off_unknown_group_is_not_found() {
    let server = TestServer::start(Dispatcher::new()).await;

    let response = server.post_form("/dropoff", &[("gid", "42")]).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(error_code(response).await, "group_not_found");
}

#[tokio::test]
async fn drop_off_without_journey_keeps_group() {
    let server = TestServer::start(Dispatcher::new()).await;
    let group = server.register().await.to_string();

    let response = server.post_form("/dropoff", &[("gid", &group)]).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(error_code(response).await, "journey_not_found");

    assert_eq!(server.dispatcher.snapshot().unwrap().groups, 1);
    let located = server.post_form("/locate", &[("gid", &group)]).await;
    assert_eq!(error_code(located).await, "journey_not_found");
}
