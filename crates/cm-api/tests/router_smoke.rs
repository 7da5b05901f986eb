use axum::{body::Body, http::Request, http::StatusCode};
use tower::ServiceExt;

#[tokio::test]
async fn livez_is_healthy_without_a_database() {
    let state = cm_api::test_state();
    let app = cm_api::create_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/livez")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let state = cm_api::test_state();
    let app = cm_api::create_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/match/unknown")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn calculate_rejects_malformed_body() {
    let state = cm_api::test_state();
    let app = cm_api::create_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/match/calculate")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"cadre_id": "not-a-number"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn flow_cadres_rejects_unknown_source_type() {
    let state = cm_api::test_state();
    let app = cm_api::create_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/statistics/flow-cadres?source_type=alien")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn compare_rejects_empty_position_list() {
    let state = cm_api::test_state();
    let app = cm_api::create_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/match/compare")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"cadre_id": 1, "position_ids": []}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
