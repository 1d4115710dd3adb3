use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers;
use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let upload_limit = state.config.max_upload_size as usize;

    Router::new()
        // Materials catalog
        .route("/materials", get(handlers::list_properties))
        .route("/materials/:property/:tab", get(handlers::list_materials))
        .route(
            "/materials/:property/:tab",
            post(handlers::upload_material).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route(
            "/materials/:property/:tab/:filename",
            put(handlers::update_material),
        )
        .route(
            "/materials/:property/:tab/:filename",
            delete(handlers::delete_material),
        )
        .route("/search", get(handlers::search))
        // Stored files
        .route("/files/*key", get(handlers::serve_file))
        .route(
            "/results/:property/:tab/*filename",
            get(handlers::result_info),
        )
        // Datasets and tables
        .route("/view/*key", get(handlers::preview_view))
        .route("/view/*key", post(handlers::import_view))
        .route("/tables/:name", get(handlers::get_table))
        .route("/tables/:name/csv", get(handlers::export_table))
        .route("/query/tables", get(handlers::list_query_tables))
        .route("/query", post(handlers::run_query))
        // Clips
        .route("/clips", get(handlers::list_clips))
        .route(
            "/clips",
            post(handlers::upload_clip).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/clips/drive", post(handlers::add_drive_clip))
        .route("/clips/:id", delete(handlers::delete_clip))
        // Admin and internal
        .route("/admin/overview", get(handlers::overview))
        .route("/_internal/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use serde_json::Value as Json;
    use tower::ServiceExt;

    use super::create_router;
    use crate::testutil::{test_state, TEST_ADMIN_PASSWORD};

    const BOUNDARY: &str = "X-TEST-BOUNDARY";

    fn multipart_body(filename: &str, data: &[u8], fields: &[(&str, &str)]) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn upload_request(uri: &str, body: Vec<u8>, admin: bool) -> Request<Body> {
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            );
        if admin {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {TEST_ADMIN_PASSWORD}"));
        }
        builder.body(Body::from(body)).unwrap()
    }

    fn json_request(method: Method, uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::AUTHORIZATION, format!("Bearer {TEST_ADMIN_PASSWORD}"))
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn read_json(response: axum::response::Response) -> Json {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let dir = tempfile::tempdir().unwrap();
        let app = create_router(test_state(&dir));

        let response = app.oneshot(get("/_internal/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["status"], "success");
        assert_eq!(body["data"]["status"], "ok");
    }

    #[tokio::test]
    async fn test_upload_list_view_and_download() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        let app = create_router(state);

        let body = multipart_body("sample.csv", b"material,bandgap\nSi,1.12\nGe,0.66\n", &[]);
        let response = app
            .clone()
            .oneshot(upload_request("/materials/bandgap/dataset", body, true))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["data"]["key"], "bandgap/dataset/sample.csv");
        assert_eq!(body["data"]["table"], "sample_csv");

        let response = app
            .clone()
            .oneshot(get("/materials/bandgap/dataset"))
            .await
            .unwrap();
        let body = read_json(response).await;
        assert_eq!(body["data"]["property"]["title"], "Band Gap");
        assert_eq!(body["data"]["entries"][0]["filename"], "sample.csv");

        let response = app
            .clone()
            .oneshot(get("/tables/sample_csv"))
            .await
            .unwrap();
        let body = read_json(response).await;
        assert_eq!(body["data"]["columns"][1], "bandgap");
        assert_eq!(body["data"]["rows"][0][1], 1.12);

        let response = app
            .clone()
            .oneshot(get("/tables/sample_csv/csv"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"material,bandgap\nSi,1.12\nGe,0.66\n");

        let response = app
            .oneshot(get("/files/bandgap/dataset/sample.csv"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE].to_str().unwrap(),
            "text/csv"
        );
    }

    #[tokio::test]
    async fn test_upload_requires_admin() {
        let dir = tempfile::tempdir().unwrap();
        let app = create_router(test_state(&dir));

        let body = multipart_body("sample.csv", b"a\n1\n", &[]);
        let response = app
            .clone()
            .oneshot(upload_request("/materials/bandgap/dataset", body, false))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app
            .oneshot(get("/materials/bandgap/dataset"))
            .await
            .unwrap();
        let body = read_json(response).await;
        assert_eq!(body["data"]["entries"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_disallowed_extension_is_bad_request() {
        let dir = tempfile::tempdir().unwrap();
        let app = create_router(test_state(&dir));

        let body = multipart_body("chart.txt", b"hello", &[]);
        let response = app
            .oneshot(upload_request("/materials/bandgap/results", body, true))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = read_json(response).await;
        assert_eq!(body["status"], "fail");
        assert!(body["data"]["message"]
            .as_str()
            .unwrap()
            .contains("JPG, PNG, GIF, PDF, or DOCX"));
    }

    #[tokio::test]
    async fn test_unknown_property_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let app = create_router(test_state(&dir));

        let response = app
            .clone()
            .oneshot(get("/materials/unobtainium/dataset"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app
            .oneshot(get("/materials/bandgap/drafts"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_update_metadata_rules() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        state
            .db
            .record_upload(
                "bandgap",
                crate::storage::models::SubCategory::Results,
                "plot.png",
                chrono::Utc::now(),
            )
            .unwrap();
        let app = create_router(state);

        let response = app
            .clone()
            .oneshot(json_request(
                Method::PUT,
                "/materials/bandgap/results/plot.png",
                r#"{"source": "lab"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app
            .clone()
            .oneshot(json_request(
                Method::PUT,
                "/materials/bandgap/results/plot.png",
                r#"{"description": "Band gap vs. strain"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["data"]["description"], "Band gap vs. strain");

        let response = app
            .oneshot(json_request(
                Method::PUT,
                "/materials/bandgap/results/missing.png",
                r#"{"description": "x"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_query_requires_admin_and_runs_sql() {
        let dir = tempfile::tempdir().unwrap();
        let app = create_router(test_state(&dir));

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/query")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"sql": "SELECT 1"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app
            .clone()
            .oneshot(json_request(Method::POST, "/query", r#"{"sql": "SELECT 1 AS one"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["data"]["columns"][0], "one");
        assert_eq!(body["data"]["rows"][0][0], 1);

        let response = app
            .oneshot(json_request(Method::POST, "/query", r#"{"sql": "SELEC"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_clips_merge_drive_and_uploads() {
        let dir = tempfile::tempdir().unwrap();
        let app = create_router(test_state(&dir));

        let response = app
            .clone()
            .oneshot(json_request(
                Method::POST,
                "/clips/drive",
                r#"{"link": "https://drive.google.com/file/d/abcdefghij12/view", "title": "Hosted"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = multipart_body("intro.mp3", b"ID3", &[("title", "Intro")]);
        let response = app
            .clone()
            .oneshot(upload_request("/clips", body, true))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app.clone().oneshot(get("/clips")).await.unwrap();
        let body = read_json(response).await;
        let clips = body["data"].as_array().unwrap();
        assert_eq!(clips.len(), 2);
        assert_eq!(clips[0]["title"], "Hosted");
        assert!(clips[0]["id"].is_null());
        assert_eq!(clips[1]["title"], "Intro");
        assert_eq!(clips[1]["preview_url"], "/files/clips/intro.mp3");

        let response = app.oneshot(get("/search?q=intro")).await.unwrap();
        let body = read_json(response).await;
        assert_eq!(body["data"]["clips"].as_array().unwrap().len(), 1);
    }
}
