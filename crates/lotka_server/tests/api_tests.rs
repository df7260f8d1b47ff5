//! Integration tests for the HTTP gateway.
//!
//! Requests go through the `Router` via `tower::ServiceExt` without binding a
//! TCP port.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use lotka_core::IntegratorSettings;
use lotka_server::{build_router, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

fn router() -> Router {
    build_router(Arc::new(AppState::default()))
}

fn reference_body() -> Value {
    json!({
        "x0": 10.0,
        "y0": 5.0,
        "alpha": 1.1,
        "beta": 0.4,
        "gamma": 0.4,
        "delta": 0.1,
        "T": 50
    })
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

#[tokio::test]
async fn index_returns_welcome_message() {
    let (status, json) = send(router(), Request::get("/").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Welcome to the Lotka-Volterra Simulator!");
}

#[tokio::test]
async fn health_reports_ok() {
    let (status, json) =
        send(router(), Request::get("/health").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn info_lists_parameters() {
    let (status, json) = send(router(), Request::get("/info").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["name"], "Lotka-Volterra Predator-Prey Model");
    let names: Vec<&str> = json["parameters"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert!(names.contains(&"alpha") && names.contains(&"T"));
}

#[tokio::test]
async fn simulate_returns_three_equal_columns() {
    for uri in ["/simulate", "/simulate/"] {
        let (status, json) = send(router(), post_json(uri, &reference_body())).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        let time = json["time"].as_array().unwrap();
        let prey = json["prey"].as_array().unwrap();
        let predator = json["predator"].as_array().unwrap();
        assert_eq!(time.len(), 500);
        assert_eq!(prey.len(), 500);
        assert_eq!(predator.len(), 500);
        assert_eq!(time[0].as_f64().unwrap(), 0.0);
        assert_eq!(time[499].as_f64().unwrap(), 50.0);
        assert!(prey.iter().all(|v| v.as_f64().unwrap() > 0.0));
        assert!(json.get("summary").is_none());
    }
}

#[tokio::test]
async fn simulate_attaches_summary_on_request() {
    let (status, json) = send(router(), post_json("/simulate?summary=true", &reference_body())).await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["summary"]["prey_peaks"].as_array().unwrap().len() >= 3);
    assert!(json["summary"]["estimated_period"].as_f64().unwrap() > 9.0);
}

#[tokio::test]
async fn simulate_accepts_query_parameters_without_body() {
    let uri = "/simulate/?x0=10&y0=5&alpha=1.1&beta=0.4&gamma=0.4&delta=0.1&T=50";
    let request = Request::post(uri).body(Body::empty()).unwrap();
    let (status, json) = send(router(), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["time"].as_array().unwrap().len(), 500);
    assert_eq!(json["time"][499].as_f64().unwrap(), 50.0);

    let (_, from_body) = send(router(), post_json("/simulate/", &reference_body())).await;
    assert_eq!(json["prey"], from_body["prey"]);
}

#[tokio::test]
async fn simulate_query_parameters_are_validated() {
    let uri = "/simulate?x0=10&y0=5&alpha=1.1&beta=0.4&gamma=0.4&delta=0.1&T=0";
    let request = Request::post(uri).body(Body::empty()).unwrap();
    let (status, json) = send(router(), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["kind"], "invalid_parameter");
    assert_eq!(json["field"], "T");

    let request = Request::post("/simulate?x0=10").body(Body::empty()).unwrap();
    let (status, json) = send(router(), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["kind"], "malformed_request");
}

#[tokio::test]
async fn bad_summary_flag_is_a_json_error() {
    let (status, json) = send(router(), post_json("/simulate?summary=maybe", &reference_body())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["kind"], "malformed_request");
    assert_eq!(json["status"], 400);
}

#[tokio::test]
async fn simulate_rejects_invalid_parameters() {
    let cases = [
        ("x0", json!(0.0), "x0"),
        ("alpha", json!(-1.0), "alpha"),
        ("T", json!(0), "T"),
        ("T", json!(1001), "T"),
    ];
    for (key, value, field) in cases {
        let mut body = reference_body();
        body[key] = value;
        let (status, json) = send(router(), post_json("/simulate", &body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{key}");
        assert_eq!(json["kind"], "invalid_parameter");
        assert_eq!(json["field"], field);
        assert_eq!(json["status"], 400);
    }
}

#[tokio::test]
async fn simulate_rejects_malformed_body() {
    let mut body = reference_body();
    body.as_object_mut().unwrap().remove("gamma");
    let (status, json) = send(router(), post_json("/simulate", &body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["kind"], "malformed_request");

    let mut body = reference_body();
    body["T"] = json!(12.5);
    let (status, json) = send(router(), post_json("/simulate", &body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["kind"], "malformed_request");
}

#[tokio::test]
async fn simulate_reports_divergence_as_computation_failure() {
    let mut body = reference_body();
    body["x0"] = json!(1e200);
    body["y0"] = json!(1e200);
    let (status, json) = send(router(), post_json("/simulate", &body)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["kind"], "computation_failed");
    assert_eq!(json["time"].as_f64().unwrap(), 0.0);
}

#[tokio::test]
async fn simulate_times_out_under_tight_budget() {
    let state = AppState {
        timeout: Duration::from_millis(1),
        settings: IntegratorSettings {
            max_step: 1e-6,
            ..IntegratorSettings::default()
        },
        ..AppState::default()
    };
    let mut body = reference_body();
    body["T"] = json!(1000);
    let (status, json) = send(build_router(Arc::new(state)), post_json("/simulate", &body)).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["kind"], "timeout");
}

#[tokio::test]
async fn equilibrium_classifies_fixed_points() {
    let params = json!({ "alpha": 1.1, "beta": 0.4, "gamma": 0.4, "delta": 0.1 });
    let (status, json) = send(router(), post_json("/equilibrium", &params)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["coexistence"]["kind"], "center");
    assert_eq!(json["extinction"]["kind"], "saddle");
    let prey = json["coexistence"]["state"]["prey"].as_f64().unwrap();
    assert!((prey - 4.0).abs() < 1e-12);
}

#[tokio::test]
async fn equilibrium_rejects_non_positive_rates() {
    let params = json!({ "alpha": 1.1, "beta": 0.0, "gamma": 0.4, "delta": 0.1 });
    let (status, json) = send(router(), post_json("/equilibrium", &params)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("beta"));
}

#[tokio::test]
async fn static_route_is_absent_without_directory() {
    let (status, _) = send(
        router(),
        Request::get("/static/index.html").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
