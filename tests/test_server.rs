//! Integration test: HTTP front-end

mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use epilepsy_screen::config::{AppConfig, Variant};
use epilepsy_screen::model::ScreeningModel;
use epilepsy_screen::server::{create_router, AppState};
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceExt;

const BOUNDARY: &str = "----epilepsy-screen-test";

fn test_config(variant: Variant, dir: &tempfile::TempDir) -> AppConfig {
    AppConfig {
        variant,
        host: "127.0.0.1".to_string(),
        port: 0,
        model_path: PathBuf::from(variant.default_model_path()),
        report_path: dir.path().join("reports").join("epilepsy_report.pdf"),
        static_dir: dir.path().join("missing-static"),
        max_upload_size: 1024 * 1024,
        preview_rows: 20,
    }
}

fn test_app(variant: Variant, model: ScreeningModel, dir: &tempfile::TempDir) -> axum::Router {
    let state = Arc::new(AppState::new(test_config(variant, dir), model));
    create_router(state)
}

fn multipart_body(fields: &[(&str, &str)], file: Option<(&str, &str)>) -> String {
    let mut body = String::new();
    for (name, value) in fields {
        body.push_str(&format!(
            "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
            BOUNDARY, name, value
        ));
    }
    if let Some((file_name, content)) = file {
        body.push_str(&format!(
            "--{}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\nContent-Type: text/csv\r\n\r\n{}\r\n",
            BOUNDARY, file_name, content
        ));
    }
    body.push_str(&format!("--{}--\r\n", BOUNDARY));
    body
}

fn predict_request(body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/predict")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(Variant::Svm, common::svm_model(), &dir);
    let response = app
        .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["variant"], "svm");
    assert_eq!(json["model"], "svm");
    assert_eq!(json["n_features"], 2);
}

#[tokio::test]
async fn test_root_serves_form() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(Variant::Forest, common::forest_model(), &dir);
    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_string(response).await;
    assert!(html.contains("Epilepsy Prediction App"));
    assert!(html.contains("DATA DYNAMOS - 2023"));
    assert!(html.contains(r#"action="/predict""#));
    // No static directory, so no images
    assert!(!html.contains("/static/"));
}

#[tokio::test]
async fn test_unknown_route_returns_json_404() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(Variant::Forest, common::forest_model(), &dir);
    let response = app
        .oneshot(Request::builder().uri("/nonexistent").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], true);
}

#[tokio::test]
async fn test_wrong_method_returns_405() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(Variant::Forest, common::forest_model(), &dir);
    let response = app
        .oneshot(Request::builder().uri("/predict").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_forest_predict_writes_report() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(Variant::Forest, common::forest_model(), &dir);

    let body = multipart_body(
        &[("name", "Jane Doe"), ("age", "45"), ("gender", "Female")],
        Some(("eeg.csv", common::SYMPTOMATIC_CSV)),
    );
    let response = app.clone().oneshot(predict_request(body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_string(response).await;
    assert!(html.contains("Jane Doe"));
    assert!(html.contains("45 years"));
    assert!(html.contains("You have symptoms of Epilepsy."));
    assert!(html.contains("Take medication as prescribed."));
    assert!(html.contains("/reports/epilepsy_report.pdf"));
    assert!(html.contains("Classified 2 samples, 1 flagged."));

    let report_path = dir.path().join("reports").join("epilepsy_report.pdf");
    let written = std::fs::read(&report_path).unwrap();
    assert!(written.starts_with(b"%PDF"));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/reports/epilepsy_report.pdf")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(bytes.to_vec(), written);
}

#[tokio::test]
async fn test_report_missing_before_first_prediction() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(Variant::Forest, common::forest_model(), &dir);
    let response = app
        .oneshot(
            Request::builder()
                .uri("/reports/epilepsy_report.pdf")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_svm_predict_shows_preview_without_report() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(Variant::Svm, common::svm_model(), &dir);

    let body = multipart_body(
        &[("name", "Sam"), ("age", "0"), ("gender", "Other")],
        Some(("eeg.csv", common::CLEAR_CSV)),
    );
    let response = app.clone().oneshot(predict_request(body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_string(response).await;
    assert!(html.contains("Uploaded Data:"));
    assert!(html.contains("<th>f1</th><th>f2</th>"));
    assert!(html.contains("You are safe and have no symptoms of Epilepsy. Take care of your health."));
    // Age below the minimum is clamped
    assert!(html.contains("1 years"));
    assert!(!html.contains("/reports/epilepsy_report.pdf"));
    assert!(!dir.path().join("reports").exists());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/reports/epilepsy_report.pdf")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_predict_without_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(Variant::Forest, common::forest_model(), &dir);

    let body = multipart_body(&[("name", "Jane"), ("age", "30"), ("gender", "Male")], None);
    let response = app.oneshot(predict_request(body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let html = body_string(response).await;
    assert!(html.contains("Please upload a CSV file"));
}

#[tokio::test]
async fn test_predict_rejects_column_mismatch() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(Variant::Forest, common::forest_model(), &dir);

    let body = multipart_body(
        &[("name", "Jane"), ("age", "30"), ("gender", "Male")],
        Some(("eeg.csv", "a,b,c\n1,2,3\n")),
    );
    let response = app.oneshot(predict_request(body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let html = body_string(response).await;
    assert!(html.contains("classifier expects 2 columns, upload has 3"));
    assert!(!dir.path().join("reports").exists());
}

#[tokio::test]
async fn test_predict_rejects_non_numeric_cells() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(Variant::Svm, common::svm_model(), &dir);

    let body = multipart_body(
        &[("name", "Jane"), ("age", "30"), ("gender", "Male")],
        Some(("eeg.csv", "f1,f2\n1.0,abc\n2.0,3.0\n")),
    );
    let response = app.oneshot(predict_request(body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_string(response).await.contains("Column &#39;f2&#39;"));
}

#[tokio::test]
async fn test_predict_accepts_padded_and_decimal_cells() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(Variant::Forest, common::forest_model(), &dir);

    let mut csv = String::from("f1, f2\n 15 , 1 \n");
    for _ in 0..120 {
        csv.push_str("5,2\n");
    }
    csv.push_str("5.5,2.25\n");
    let body = multipart_body(
        &[("name", "Jane"), ("age", "30"), ("gender", "Male")],
        Some(("eeg.csv", &csv)),
    );
    let response = app.oneshot(predict_request(body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_string(response).await;
    assert!(html.contains("You have symptoms of Epilepsy."));
    assert!(html.contains("Classified 122 samples, 1 flagged."));
}

#[tokio::test]
async fn test_forest_predict_refuses_name_outside_report_font() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(Variant::Forest, common::forest_model(), &dir);

    let body = multipart_body(
        &[("name", "Zoe 李雷"), ("age", "30"), ("gender", "Female")],
        Some(("eeg.csv", common::SYMPTOMATIC_CSV)),
    );
    let response = app.oneshot(predict_request(body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_string(response).await.contains("is not supported by the report font"));
    assert!(!dir.path().join("reports").exists());
}

#[tokio::test]
async fn test_predict_rejects_non_csv_upload() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(Variant::Svm, common::svm_model(), &dir);

    let body = multipart_body(
        &[("name", "Jane"), ("age", "30"), ("gender", "Male")],
        Some(("eeg.xlsx", "f1,f2\n1,2\n")),
    );
    let response = app.oneshot(predict_request(body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_api_predict_json() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(Variant::Forest, common::forest_model(), &dir);

    let payload = serde_json::json!({
        "patient": {"name": "Ann", "age": 250, "gender": "Female"},
        "rows": [[15.0, 1.0], [5.0, 1.0], [12.0, 0.0]]
    });
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/predict")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["label"], 1);
    assert_eq!(json["labels"], serde_json::json!([1, 0, 1]));
    assert_eq!(json["flagged"], 2);
    assert_eq!(json["patient"]["age"], 100);
    assert_eq!(json["prevention_tips"].as_array().unwrap().len(), 7);
    assert!(json["prevention_tips"][0].as_str().unwrap().starts_with("1. "));
    assert!(json["prevention_tips"][6].as_str().unwrap().starts_with("7. "));
    assert_eq!(json["scaling"], "persisted");
    // The API never touches the report file
    assert!(!dir.path().join("reports").exists());
}

#[tokio::test]
async fn test_api_predict_mismatch_is_400() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(Variant::Svm, common::svm_model(), &dir);

    let payload = serde_json::json!({"rows": [[1.0, 2.0, 3.0]]});
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/predict")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], true);
}
