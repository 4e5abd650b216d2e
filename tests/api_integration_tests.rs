// API Integration Tests
//
// Purpose: drive every route of the router against a temp catalog file
// Run with: cargo test --features api --test api_integration_tests

#[cfg(feature = "api")]
mod api_tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use mushroom_catalog::{
        create_router, AppState, CatalogSource, CatalogStore, ClassifierClient,
    };
    use serde_json::Value;
    use std::io::Write;
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::NamedTempFile;
    use tower::ServiceExt; // for oneshot

    const CATALOG: &str = r#"[
        {"scientific_name": "Amanita muscaria", "common_name": "Fly Agaric, Fly Amanita",
         "edibility": "Poisonous", "habitat": "Birch woodland"},
        {"scientific_name": "Cantharellus cibarius", "common_name": "Golden Chanterelle",
         "edibility": "Choice edible, excellent flavor", "habitat": "Oak forests"},
        {"scientific_name": "Boletus edulis", "common_name": "Porcini, King Bolete",
         "edibility": "Edible", "habitat": "Conifer and oak forests"},
        {"common_name": "Missing scientific name"}
    ]"#;

    fn catalog_file(json: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    fn classifier() -> Arc<ClassifierClient> {
        // Nothing listens on the discard port
        Arc::new(ClassifierClient::new("http://127.0.0.1:9/predict", Duration::from_secs(2)).unwrap())
    }

    // Helper: Create test app over a loaded catalog
    async fn create_test_app(json: &str) -> (axum::Router, Arc<CatalogStore>, NamedTempFile) {
        let file = catalog_file(json);
        let store = Arc::new(CatalogStore::new(CatalogSource::file(file.path())));
        store.load().await.unwrap();
        let app = create_router(AppState::from_parts(store.clone(), classifier()));
        (app, store, file)
    }

    // Helper: Parse JSON response
    async fn json_response(response: axum::response::Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read response body");
        serde_json::from_slice(&body).expect("Failed to parse JSON")
    }

    async fn get(app: axum::Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        (status, json_response(response).await)
    }

    fn scientific_names(body: &Value) -> Vec<String> {
        body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|row| row["scientific_name"].as_str().unwrap().to_string())
            .collect()
    }

    // =========================================================================
    // Section 1: Health & About
    // =========================================================================

    #[tokio::test]
    async fn test_health_check() {
        let (app, _store, _file) = create_test_app(CATALOG).await;
        let (status, body) = get(app, "/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert!(body["timestamp"].is_string());
        assert_eq!(body["catalog"]["status"], "ready");
    }

    #[tokio::test]
    async fn test_about_is_static() {
        let (app, _store, _file) = create_test_app(CATALOG).await;
        let (status, body) = get(app, "/api/about").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["routes"]["about"], "/about");
        assert!(body["safety_warning"].as_str().unwrap().contains("expert"));
    }

    // =========================================================================
    // Section 2: Species list
    // =========================================================================

    #[tokio::test]
    async fn test_list_without_query_returns_catalog() {
        let (app, _store, _file) = create_test_app(CATALOG).await;
        let (status, body) = get(app, "/api/species").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["rows"], 3);
        assert_eq!(
            scientific_names(&body),
            vec!["Amanita muscaria", "Cantharellus cibarius", "Boletus edulis"]
        );
        let first = &body["data"][0];
        assert_eq!(first["display_name"], "Amanita muscaria (Fly Agaric)");
        assert_eq!(first["edibility_info"]["category"], "toxic");
        assert_eq!(first["edibility_info"]["priority"], "critical");
        assert_eq!(first["route"], "/species/Amanita%20muscaria");
        assert_eq!(first["image"], "/images/species/amanita_muscaria.jpg");
    }

    #[tokio::test]
    async fn test_list_with_multi_word_query() {
        let (app, _store, _file) = create_test_app(CATALOG).await;
        let (_, body) = get(app, "/api/species?q=king%20bol").await;
        assert_eq!(scientific_names(&body), vec!["Boletus edulis"]);
    }

    #[tokio::test]
    async fn test_list_with_filters() {
        let (app, _store, _file) = create_test_app(CATALOG).await;
        let (_, body) = get(app, "/api/species?edibility=edible&habitat=oak").await;
        assert_eq!(
            scientific_names(&body),
            vec!["Cantharellus cibarius", "Boletus edulis"]
        );
    }

    #[tokio::test]
    async fn test_random_and_stats() {
        let (app, _store, _file) = create_test_app(CATALOG).await;

        let (status, body) = get(app.clone(), "/api/species/random?count=2").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["rows"], 2);

        let (status, body) = get(app, "/api/species/stats").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 3);
        assert_eq!(body["edible"], 2);
        assert_eq!(body["toxic"], 1);
        assert_eq!(body["dropped"], 1);
        assert!(body["loaded_at"].is_string());
    }

    // =========================================================================
    // Section 3: Species detail
    // =========================================================================

    #[tokio::test]
    async fn test_detail_by_encoded_scientific_name() {
        let (app, _store, _file) = create_test_app(CATALOG).await;
        let (status, body) = get(app, "/api/species/boletus%20EDULIS").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["scientific_name"], "Boletus edulis");
        assert_eq!(body["aliases"], serde_json::json!(["Porcini", "King Bolete"]));
        assert_eq!(body["edibility_info"]["status"], "Edible with Caution");
    }

    #[tokio::test]
    async fn test_detail_not_found() {
        let (app, _store, _file) = create_test_app(CATALOG).await;
        let (status, body) = get(app, "/api/species/Psilocybe%20cubensis").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().unwrap().contains("Psilocybe cubensis"));
    }

    // =========================================================================
    // Section 4: Catalog lifecycle
    // =========================================================================

    #[tokio::test]
    async fn test_unloaded_catalog_is_unavailable() {
        let store = Arc::new(CatalogStore::new(CatalogSource::file("/nonexistent/mushrooms.json")));
        let _ = store.load().await;
        let app = create_router(AppState::from_parts(store, classifier()));

        let (status, body) = get(app, "/api/species").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(body["error"].as_str().unwrap().contains("/nonexistent/mushrooms.json"));
    }

    #[tokio::test]
    async fn test_reload_endpoint_swaps_catalog() {
        let (app, store, file) = create_test_app(CATALOG).await;

        std::fs::write(
            file.path(),
            r#"[{"scientific_name": "Morchella esculenta", "common_name": "Morel"}]"#,
        )
        .unwrap();

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/catalog/reload")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_response(response).await;
        assert_eq!(body["status"], "reloaded");
        assert_eq!(body["records"], 1);

        assert_eq!(store.snapshot().len(), 1);
        let (_, body) = get(app, "/api/species").await;
        assert_eq!(scientific_names(&body), vec!["Morchella esculenta"]);
    }

    // =========================================================================
    // Section 5: Classification proxy
    // =========================================================================

    fn multipart_request(file_name: &str, content_type: &str, bytes: &[u8]) -> Request<Body> {
        let boundary = "mushroomboundary";
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n",
                file_name
            )
            .as_bytes(),
        );
        body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

        Request::builder()
            .method("POST")
            .uri("/api/predict")
            .header("content-type", format!("multipart/form-data; boundary={}", boundary))
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_predict_rejects_non_image() {
        let (app, _store, _file) = create_test_app(CATALOG).await;
        let response = app
            .oneshot(multipart_request("notes.txt", "text/plain", b"hello"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_response(response).await;
        assert_eq!(body["error"], "Uploaded file is not an image");
        assert_eq!(body["kind"], "upload");
    }

    #[tokio::test]
    async fn test_predict_unreachable_classifier() {
        let (app, store, _file) = create_test_app(CATALOG).await;
        let response = app
            .oneshot(multipart_request("cap.jpg", "image/jpeg", b"\xff\xd8\xff"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = json_response(response).await;
        assert_eq!(body["kind"], "connectivity");

        // Classifier failures leave the catalog alone
        assert_eq!(store.snapshot().len(), 3);
    }
}
