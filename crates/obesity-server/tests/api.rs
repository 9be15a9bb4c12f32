mod common;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use tower::ServiceExt;

use obesity_classifier::features::TARGET_CLASSES;
use obesity_server::api::create_router;
use obesity_server::PredictionResponse;

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec()
}

fn post_json(body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/predict")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn root_points_to_predict() {
    let app = create_router(common::api_state());
    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, br#""Use /predict""#);
}

#[tokio::test]
async fn predict_returns_known_label() {
    let app = create_router(common::api_state());
    let response = app
        .oneshot(post_json(common::request_json().to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let parsed: PredictionResponse = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert!(TARGET_CLASSES.contains(&parsed.prediction.as_str()));
}

#[tokio::test]
async fn predict_is_deterministic() {
    let state = common::api_state();
    let mut labels = Vec::new();
    for _ in 0..2 {
        let response = create_router(state.clone())
            .oneshot(post_json(common::request_json().to_string()))
            .await
            .unwrap();
        let parsed: PredictionResponse =
            serde_json::from_slice(&body_bytes(response).await).unwrap();
        labels.push(parsed.prediction);
    }
    assert_eq!(labels[0], labels[1]);
}

#[tokio::test]
async fn unknown_literal_is_unprocessable() {
    let mut body = common::request_json();
    body["mtrans"] = "Public Transportation".into();
    let response = create_router(common::api_state())
        .oneshot(post_json(body.to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn missing_field_is_unprocessable() {
    let mut body = common::request_json();
    body.as_object_mut().unwrap().remove("weight");
    let response = create_router(common::api_state())
        .oneshot(post_json(body.to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn malformed_json_is_bad_request() {
    let response = create_router(common::api_state())
        .oneshot(post_json("{\"gender\": ".to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
