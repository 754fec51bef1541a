use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use axum_test::TestServer;
use credit_risk_dashboard::{
    Error,
    config::{ChartMode, DashboardConfig},
    model::{Contributions, Outcome, ScoringContext},
    server::{
        router,
        types::{ErrorResponse, HealthResponse, ScoreResponse},
    },
};
use pretty_assertions::assert_eq;
use serde_json::json;
use tower::ServiceExt; // for `oneshot`

mod common;
use common::{
    mocks::{MockClassifier, passthrough_preprocessor},
    test_utils::{create_test_context, create_test_state},
};

fn create_test_app() -> Router {
    router(create_test_state(create_test_context(), DashboardConfig::default()))
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn form_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/predict")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn json_request(body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/score")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_index_renders_idle_dashboard() {
    let app = create_test_app();

    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("<h1>Credit Risk Scoring Dashboard</h1>"));
    assert!(html.contains(r#"name="loan_amnt" min="1000" step="500" value="10000""#));
    assert!(!html.contains("Prediction Results"));
    assert!(html.contains("Interactive Credit Risk Dashboard"));
}

#[tokio::test]
async fn test_predict_renders_results() {
    let app = create_test_app();

    let response = app
        .oneshot(form_request("loan_amnt=10000&annual_inc=50000&dti=15"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Prediction Results"));
    assert!(html.contains("75.93%"));
    assert!(html.contains("24.07%"));
    assert!(html.contains("Predicted outcome: <strong>Fully Paid</strong>"));
    assert!(html.contains("<svg"));
}

#[tokio::test]
async fn test_predict_below_minimum_shows_error_banner() {
    let app = create_test_app();

    let response = app
        .oneshot(form_request("loan_amnt=500&annual_inc=50000&dti=15"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let html = body_text(response).await;
    assert!(html.contains("Prediction failed"));
    assert!(html.contains("loan_amnt"));
    // The rejected value is echoed back into the form.
    assert!(html.contains(r#"value="500""#));
    assert!(!html.contains("Prediction Results"));
}

#[tokio::test]
async fn test_predict_missing_field() {
    let app = create_test_app();

    let response = app
        .oneshot(form_request("loan_amnt=10000&annual_inc=50000"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let html = body_text(response).await;
    assert!(html.contains("is required"));
}

#[tokio::test]
async fn test_predict_non_numeric_field() {
    let app = create_test_app();

    let response = app
        .oneshot(form_request("loan_amnt=lots&annual_inc=50000&dti=15"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let html = body_text(response).await;
    assert!(html.contains("is not a number"));
}

#[tokio::test]
async fn test_score_endpoint_valid_request() {
    let app = create_test_app();

    let body = json!({ "loan_amnt": 10000.0, "annual_inc": 50000.0, "dti": 15.0 });
    let response = app.oneshot(json_request(body.to_string())).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let text = body_text(response).await;
    let score: ScoreResponse = serde_json::from_str(&text).unwrap();
    assert_eq!(score.probability_fully_paid, 75.93);
    assert_eq!(score.probability_default, 24.07);
    assert_eq!(score.predicted_outcome, Outcome::FullyPaid);
    assert_eq!(score.attribution.map(|a| a.len()), Some(3));
    assert!(score.base_value.is_some());
}

#[tokio::test]
async fn test_score_endpoint_validation_error() {
    let app = create_test_app();

    let body = json!({ "loan_amnt": 10000.0, "annual_inc": 50000.0, "dti": -3.0 });
    let response = app.oneshot(json_request(body.to_string())).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let error: ErrorResponse = serde_json::from_str(&body_text(response).await).unwrap();
    assert!(error.error.contains("dti"));
}

#[tokio::test]
async fn test_score_endpoint_missing_fields() {
    let app = create_test_app();

    let body = json!({ "loan_amnt": 10000.0 });
    let response = app.oneshot(json_request(body.to_string())).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_score_endpoint_invalid_json() {
    let app = create_test_app();

    let response = app
        .oneshot(json_request("invalid json".to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_score_endpoint_wrong_method() {
    let app = create_test_app();

    let request = Request::builder()
        .method("GET")
        .uri("/api/score")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_unknown_path() {
    let app = create_test_app();

    let request = Request::builder()
        .uri("/nonexistent")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_inference_failure_returns_500() {
    let mut classifier = MockClassifier::new();
    classifier.expect_num_features().return_const(3usize);
    classifier
        .expect_predict_proba()
        .returning(|_| Err(Error::inference("model unavailable")));
    let context = ScoringContext::new(Box::new(passthrough_preprocessor()), Box::new(classifier))
        .unwrap();
    let app = router(create_test_state(context, DashboardConfig::default()));

    let body = json!({ "loan_amnt": 10000.0, "annual_inc": 50000.0, "dti": 15.0 });
    let response = app.clone().oneshot(json_request(body.to_string())).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let error: ErrorResponse = serde_json::from_str(&body_text(response).await).unwrap();
    assert!(error.error.contains("model unavailable"));

    let response = app
        .oneshot(form_request("loan_amnt=10000&annual_inc=50000&dti=15"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body_text(response).await.contains("model unavailable"));
}

#[tokio::test]
async fn test_health_reports_explainability() {
    let server = TestServer::new(create_test_app()).unwrap();

    let response = server.get("/health").await;

    response.assert_status_ok();
    let health: HealthResponse = response.json();
    assert_eq!(health.status, "ok");
    assert!(health.explainable);
}

#[tokio::test]
async fn test_score_request_ids_are_unique() {
    let server = TestServer::new(create_test_app()).unwrap();
    let body = json!({ "loan_amnt": 20000.0, "annual_inc": 90000.0, "dti": 8.0 });

    let first: ScoreResponse = server.post("/api/score").json(&body).await.json();
    let second: ScoreResponse = server.post("/api/score").json(&body).await.json();

    assert_ne!(first.request_id, second.request_id);
    assert_eq!(first.probability_fully_paid, second.probability_fully_paid);
}

#[tokio::test]
async fn test_feature_values_mode_uses_custom_branding() {
    let dashboard = DashboardConfig {
        title: "Loan Desk".to_string(),
        chart_mode: ChartMode::FeatureValues,
        footer: "Risk & Credit team".to_string(),
        ..DashboardConfig::default()
    };
    let app = router(create_test_state(create_test_context(), dashboard));
    let server = TestServer::new(app).unwrap();

    let response = server
        .post("/predict")
        .form(&[("loan_amnt", "15000"), ("annual_inc", "45000"), ("dti", "30")])
        .await;

    response.assert_status_ok();
    let html = response.text();
    assert!(html.contains("<title>Loan Desk</title>"));
    assert!(html.contains("Adjust loan details"));
    assert!(html.contains("Risk &amp; Credit team"));
    assert!(html.contains("Prediction Results"));
    assert!(html.contains(r#"value="15000""#));
}

#[tokio::test]
async fn test_predict_huge_loan_in_feature_values_mode() {
    let dashboard = DashboardConfig {
        chart_mode: ChartMode::FeatureValues,
        ..DashboardConfig::default()
    };
    let app = router(create_test_state(create_test_context(), dashboard));

    let response = app
        .oneshot(form_request("loan_amnt=1.7e308&annual_inc=50000&dti=15"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Prediction Results"));
    assert!(html.contains("Input Feature Values"));
}

#[tokio::test]
async fn test_chart_failure_renders_failed_page() {
    let mut classifier = MockClassifier::new();
    classifier.expect_num_features().return_const(3usize);
    classifier
        .expect_predict_proba()
        .returning(|_| Ok([0.4, 0.6]));
    classifier
        .expect_predict()
        .returning(|_| Ok(Outcome::FullyPaid));
    classifier.expect_explain().returning(|_| {
        Some(Ok(Contributions {
            values: vec![f64::INFINITY, 0.0, 0.0],
            base_value: 0.0,
        }))
    });
    let context = ScoringContext::new(Box::new(passthrough_preprocessor()), Box::new(classifier))
        .unwrap();
    let app = router(create_test_state(context, DashboardConfig::default()));

    let response = app
        .oneshot(form_request("loan_amnt=10000&annual_inc=50000&dti=15"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/html; charset=utf-8"
    );
    let html = body_text(response).await;
    assert!(html.contains("Prediction failed"));
    assert!(html.contains("Chart rendering error"));
    assert!(html.contains(r#"<form method="post" action="/predict""#));
    assert!(!html.contains("Prediction Results"));
}
