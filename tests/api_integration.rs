//! HTTP API integration tests
//!
//! Drives the router in-process with `tower::ServiceExt::oneshot`.

#[allow(dead_code)]
mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::*;
use serde_json::json;

// =============================================================================
// Without a Model
// =============================================================================

#[tokio::test]
async fn test_health_without_model() {
    let env = TestEnv::new();
    let (status, body) = get(env.app(), "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "healthy", "model_loaded": false}));
}

#[tokio::test]
async fn test_predict_without_model_is_server_error() {
    let env = TestEnv::new();
    let (status, body) = post_json(env.app(), "/predict", &worked_example()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let error = body["error"].as_str().unwrap();
    assert!(error.starts_with("Model not loaded"));
    assert!(error.contains("ckd_model.json"));
}

#[tokio::test]
async fn test_model_check_precedes_body_validation() {
    let env = TestEnv::new();
    let (status, _) = post_raw(env.app(), "/predict", "").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_model_info_without_model_is_not_found() {
    let env = TestEnv::new();
    let (status, body) = get(env.app(), "/model-info").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("Model not loaded"));
}

#[tokio::test]
async fn test_ready_without_model() {
    let env = TestEnv::new();
    let (status, body) = get(env.app(), "/ready").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["ready"], false);
    assert!(body["reason"].is_string());
}

// =============================================================================
// Request Validation
// =============================================================================

#[tokio::test]
async fn test_missing_fields_are_listed_in_order() {
    let env = TestEnv::with_model(&constant_logistic(0.75, "1.0"));
    let payload = without(worked_example(), &["BUNLevels", "GFR"]);
    let (status, body) = post_json(env.app(), "/predict", &payload).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing required fields: GFR, BUNLevels");
}

#[tokio::test]
async fn test_null_counts_as_missing() {
    let env = TestEnv::with_model(&constant_logistic(0.75, "1.0"));
    let payload = with(worked_example(), "Itching", json!(null));
    let (status, body) = post_json(env.app(), "/predict", &payload).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing required fields: Itching");
}

#[tokio::test]
async fn test_non_numeric_value_is_bad_request() {
    let env = TestEnv::with_model(&constant_logistic(0.75, "1.0"));
    let payload = with(worked_example(), "GFR", json!("abc"));
    let (status, body) = post_json(env.app(), "/predict", &payload).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("GFR"));
}

#[tokio::test]
async fn test_empty_body_is_bad_request() {
    let env = TestEnv::with_model(&constant_logistic(0.75, "1.0"));

    for raw in ["", "{}", "null"] {
        let (status, body) = post_raw(env.app(), "/predict", raw).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body {:?}", raw);
        assert_eq!(body["error"], "No data provided");
    }
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let env = TestEnv::with_model(&constant_logistic(0.75, "1.0"));
    let (status, body) = post_raw(env.app(), "/predict", "{\"GFR\": ").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid JSON body"));
}

#[tokio::test]
async fn test_numeric_strings_are_accepted() {
    let env = TestEnv::with_model(&constant_logistic(0.3, "1.0"));
    let payload = with(worked_example(), "GFR", json!(" 40 "));
    let (status, body) = post_json(env.app(), "/predict", &payload).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["prediction"]["ckd_stage"], "Stage 3b (Moderate)");
}

// =============================================================================
// Assessment
// =============================================================================

#[tokio::test]
async fn test_worked_example() {
    let env = TestEnv::with_model(&constant_logistic(0.75, "2024.1"));
    let (status, body) = post_json(env.app(), "/predict", &worked_example()).await;

    assert_eq!(status, StatusCode::OK);

    let prediction = &body["prediction"];
    assert_eq!(prediction["has_ckd"], true);
    assert!((prediction["probability"].as_f64().unwrap() - 0.75).abs() < 1e-9);
    assert_eq!(prediction["risk_level"], "High");
    assert_eq!(prediction["ckd_stage"], "Stage 3b (Moderate)");

    let factors: Vec<&str> = body["analysis"]["key_factors"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|f| f.as_str())
        .collect();
    assert!(factors[0].contains("Reduced GFR (40.0 mL/min/1.73m²)"));
    for needle in ["Proteinuria", "blood urea nitrogen", "Diabetes", "itching"] {
        assert!(factors.iter().any(|f| f.contains(needle)), "missing {}", needle);
    }

    let recs = body["analysis"]["recommendations"].as_array().unwrap();
    assert_eq!(
        recs[0],
        "Schedule appointment with a nephrologist within 2-4 weeks"
    );
    assert!(recs
        .iter()
        .any(|r| r == "Diabetes management is essential - maintain HbA1c < 7%"));

    let metadata = &body["metadata"];
    assert_eq!(metadata["model_version"], "2024.1");
    assert_eq!(metadata["features_used"], json!(FEATURES));
    assert_eq!(metadata["timestamp"].as_str().unwrap().len(), 19);
}

#[tokio::test]
async fn test_camel_case_aliases() {
    let env = TestEnv::with_model(&constant_logistic(0.5, "1.0"));
    let payload = json!({
        "serumCreatinine": 1.0,
        "gfr": 95,
        "itching": 0,
        "fastingBloodSugar": 90,
        "proteinInUrine": 0.1,
        "bunLevels": 15,
        "muscleCramps": 0,
        "systolicBP": 150
    });
    let (status, body) = post_json(env.app(), "/predict", &payload).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["prediction"]["risk_level"], "Moderate");
    assert_eq!(body["prediction"]["ckd_stage"], "Normal/Stage 1");
    assert_eq!(body["analysis"]["key_factors"], json!([]));
    assert!(body["analysis"]["recommendations"]
        .as_array()
        .unwrap()
        .iter()
        .any(|r| r.as_str().unwrap().starts_with("Blood pressure management")));
}

#[tokio::test]
async fn test_label_only_model_reports_hard_probability() {
    let env = TestEnv::with_model(&gfr_svc());

    let (status, body) = post_json(env.app(), "/predict", &worked_example()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["prediction"]["has_ckd"], true);
    assert_eq!(body["prediction"]["probability"], 1.0);
    assert_eq!(body["prediction"]["risk_level"], "Very High");

    let (status, body) = post_json(env.app(), "/predict", &healthy_patient()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["prediction"]["has_ckd"], false);
    assert_eq!(body["prediction"]["probability"], 0.0);
    assert_eq!(body["prediction"]["risk_level"], "Low");
}

#[tokio::test]
async fn test_shape_mismatch_is_prediction_error() {
    let env = TestEnv::with_model(&narrow_model());
    let (status, body) = post_json(env.app(), "/predict", &worked_example()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let error = body["error"].as_str().unwrap();
    assert!(error.starts_with("Error making prediction"));
    assert!(error.contains("7 features"));
}

#[tokio::test]
async fn test_sample_model_serves_random_patients() {
    let env = TestEnv::with_model(
        &std::fs::read_to_string(sample_model_path()).expect("sample model present"),
    );
    let mut patients = PatientGenerator::new(7);

    for _ in 0..50 {
        let (status, body) = post_json(env.app(), "/predict", &patients.patient()).await;
        assert_eq!(status, StatusCode::OK);

        let probability = body["prediction"]["probability"].as_f64().unwrap();
        assert!((0.0..=1.0).contains(&probability));
        if body["prediction"]["has_ckd"] == true {
            assert!(probability >= 0.5 - 1e-9);
        } else {
            assert!(probability <= 0.5 + 1e-9);
        }
    }
}

// =============================================================================
// Model Management
// =============================================================================

#[tokio::test]
async fn test_model_info_with_sample_model() {
    let env = TestEnv::with_model(
        &std::fs::read_to_string(sample_model_path()).expect("sample model present"),
    );
    let (status, body) = get(env.app(), "/model-info").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["model_type"], "RandomForestClassifier");
    assert_eq!(body["model_loaded"], true);
    assert_eq!(body["expected_features"], json!(FEATURES));
    assert_eq!(body["n_features"], 7);
    assert_eq!(body["classes"], json!([0, 1]));
}

#[tokio::test]
async fn test_load_model_picks_up_new_artifact() {
    let env = TestEnv::new();

    let (_, body) = get(env.app(), "/load-model").await;
    assert_eq!(body["model_loaded"], false);

    env.write_model(&constant_logistic(0.9, "2.0"));
    let (status, body) = get(env.app(), "/load-model").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "healthy", "model_loaded": true}));

    let (status, body) = post_json(env.app(), "/predict", &worked_example()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["metadata"]["model_version"], "2.0");
    assert_eq!(body["prediction"]["risk_level"], "Very High");

    let (status, body) = get(env.app(), "/ready").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ready"], true);
    assert_eq!(body["model_version"], "2.0");
}

#[tokio::test]
async fn test_failed_reload_keeps_serving_previous_model() {
    let env = TestEnv::with_model(&constant_logistic(0.75, "1.0"));

    env.write_model("{ not a model");
    let (status, body) = get(env.app(), "/load-model").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["model_loaded"], true);

    let (status, body) = post_json(env.app(), "/predict", &worked_example()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["metadata"]["model_version"], "1.0");
}

// =============================================================================
// Transport
// =============================================================================

#[tokio::test]
async fn test_cors_headers_present() {
    let env = TestEnv::new();
    let request = Request::builder()
        .uri("/health")
        .header("origin", "http://clinic.example")
        .body(Body::empty())
        .unwrap();

    let response = tower::ServiceExt::oneshot(env.app(), request).await.unwrap();
    assert_eq!(
        response.headers().get("access-control-allow-origin").unwrap(),
        "*"
    );
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let env = TestEnv::new();
    let request = Request::builder()
        .uri("/nope")
        .body(Body::empty())
        .unwrap();

    let response = tower::ServiceExt::oneshot(env.app(), request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
