use super::*;
use crate::test_support::{ok_json, spawn_service, status_json, unreachable_url, Canned};
use axum::http::StatusCode;
use serde_json::json;

#[test]
fn api_base_is_origin_plus_api_prefix() {
    assert_eq!(
        api_base_url("http://127.0.0.1:5000").expect("url"),
        "http://127.0.0.1:5000/api"
    );
    assert_eq!(
        api_base_url(" https://models.example.com/sentinel/ ").expect("url"),
        "https://models.example.com/sentinel/api"
    );
}

#[test]
fn api_base_rejects_unusable_urls() {
    for raw in ["", "127.0.0.1:5000", "ftp://host", "http://host/?x=1"] {
        let err = api_base_url(raw).expect_err("must fail");
        assert!(
            matches!(err, ClientError::InvalidServerUrl { .. }),
            "unexpected error for {raw:?}: {err}"
        );
    }
}

#[tokio::test]
async fn predict_posts_json_body_to_predict_endpoint() {
    let service = spawn_service(Canned {
        predict: ok_json(json!({"success": true, "shape": [1, 2], "prediction": [[0.3, 0.7]]})),
        ..Canned::default()
    })
    .await
    .expect("spawn service");
    let api = HttpPredictionApi::new(&service.url).expect("api");

    let response = api
        .predict(&PredictRequest {
            input: json!([1, 2, 3]),
        })
        .await
        .expect("predict");
    assert!(response.success);
    assert_eq!(response.shape, Some(vec![1, 2]));

    let requests = service.requests().await;
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].path, "/api/predict");
    assert_eq!(requests[0].body, Some(json!({"input": [1, 2, 3]})));
    assert_eq!(requests[0].content_type.as_deref(), Some("application/json"));
}

#[tokio::test]
async fn error_status_body_is_decoded_not_rejected() {
    let service = spawn_service(Canned {
        predict_batch: status_json(
            StatusCode::BAD_REQUEST,
            json!({"success": false, "error": "Batch data must be a list of inputs"}),
        ),
        ..Canned::default()
    })
    .await
    .expect("spawn service");
    let api = HttpPredictionApi::new(&service.url).expect("api");

    let response = api
        .predict_batch(&BatchPredictRequest {
            inputs: json!([[1], [2]]),
        })
        .await
        .expect("decoded body");
    assert!(!response.success);
    assert_eq!(
        response.error.as_deref(),
        Some("Batch data must be a list of inputs")
    );
    assert_eq!(service.requests().await[0].body, Some(json!({"inputs": [[1], [2]]})));
}

#[tokio::test]
async fn health_and_model_info_are_decoded() {
    let service = spawn_service(Canned {
        health: ok_json(json!({"status": "healthy", "model_loaded": true, "service": "cyber_sentinel"})),
        model_info: ok_json(json!({
            "model_info": {"input_size": 10, "device": "cpu"},
            "supported_input_types": ["list", "numpy_array", "dict"],
            "batch_support": true,
            "device": "cpu"
        })),
        ..Canned::default()
    })
    .await
    .expect("spawn service");
    let api = HttpPredictionApi::new(&service.url).expect("api");

    let health = api.health().await.expect("health");
    assert_eq!(health.status, "healthy");
    assert!(health.model_loaded);

    let info = api.model_info().await.expect("model info");
    assert_eq!(info.batch_support, Some(json!(true)));
    assert_eq!(
        info.model_info.and_then(|m| m.input_size),
        Some(json!(10))
    );
}

#[tokio::test]
async fn non_json_body_is_an_invalid_response() {
    let service = spawn_service(Canned::default()).await.expect("spawn service");
    let api = HttpPredictionApi::new(&service.url).expect("api");

    let err = api.example().await.expect_err("must fail");
    match err {
        ClientError::InvalidResponse {
            endpoint, status, ..
        } => {
            assert_eq!(endpoint, "/example");
            assert_eq!(status, 404);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    let url = unreachable_url().await.expect("free port");
    let api = HttpPredictionApi::with_timeout(&url, Some(Duration::from_secs(5))).expect("api");

    let err = api.health().await.expect_err("must fail");
    assert!(matches!(err, ClientError::Transport { endpoint: "/health", .. }));
}
