//! Application router: HTML pages at the root, JSON API under `/api/`.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! API responses carry `Cache-Control: no-store` so a shared browser
//! never caches medication data; panics anywhere in a handler become
//! the styled fault page instead of a dropped connection.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::api::endpoints;
use crate::api::pages;
use crate::api::types::ApiContext;
use crate::config;
use crate::core_state::CoreState;

/// Build the full application router.
///
/// Endpoint handlers use `State<ApiContext>` provided via `with_state`.
///
/// NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
pub fn app_router(core: Arc<CoreState>) -> Router {
    let ctx = ApiContext::new(core);
    build_router(ctx)
}

fn build_router(ctx: ApiContext) -> Router {
    let api = Router::new()
        .route("/health", get(endpoints::health::check))
        .route(
            "/medications",
            get(endpoints::medications::list).post(endpoints::medications::add),
        )
        .route("/scan", post(endpoints::scan::scan))
        .route("/schedule", get(endpoints::schedule::list))
        .route(
            "/schedule/:entry_id/toggle",
            post(endpoints::schedule::toggle),
        )
        .route(
            "/cart",
            get(endpoints::cart::view).delete(endpoints::cart::clear),
        )
        .route("/cart/items", post(endpoints::cart::add_item))
        .route(
            "/cart/items/:medication_id",
            axum::routing::delete(endpoints::cart::remove_item),
        )
        .route("/cart/checkout", post(endpoints::cart::checkout))
        .fallback(endpoints::not_found)
        .with_state(ctx.clone())
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ));

    let views = Router::new()
        .route("/", get(pages::home))
        .route("/scanner", get(pages::scanner))
        .route("/shop", get(pages::shop))
        .route("/reminders", get(pages::reminders))
        .with_state(ctx);

    Router::new()
        .nest("/api", api)
        .merge(views)
        // Unknown pages land on the dashboard rather than a bare 404.
        .fallback(redirect_home)
        .layer(DefaultBodyLimit::max(config::MAX_UPLOAD_BYTES))
        .layer(CatchPanicLayer::custom(handle_panic))
}

async fn redirect_home() -> Redirect {
    Redirect::to("/")
}

/// Convert a caught handler panic into the styled fault page.
fn handle_panic(err: Box<dyn std::any::Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "Unknown panic".to_string()
    };
    tracing::error!(detail, "Handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Html(pages::render_fault_page(&detail)),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    use crate::scan::{MockRecognizer, TextRecognizer};
    use crate::store::MedicationStore;

    const SEED_TRANSCRIPT: &str = "Amoxicillin 500mg Take 14 tablet";
    const JPEG_HEADER: [u8; 4] = [0xFF, 0xD8, 0xFF, 0xE0];

    fn test_core_state_with(
        recognizer: Arc<dyn TextRecognizer>,
    ) -> (Arc<CoreState>, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = MedicationStore::open(dir.path().join("meds.json")).unwrap();
        let core = CoreState::new(store, recognizer)
            .with_checkout_delay(Duration::from_millis(10));
        (Arc::new(core), dir)
    }

    fn test_core_state() -> (Arc<CoreState>, tempfile::TempDir) {
        test_core_state_with(Arc::new(MockRecognizer::new(SEED_TRANSCRIPT)))
    }

    fn make_request(method: &str, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    /// Hand-rolled multipart body; enough for the scan endpoint.
    fn multipart_request(uri: &str, field: &str, bytes: &[u8]) -> Request<Body> {
        let boundary = "pillbox-test-boundary";
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; \
                 name=\"{field}\"; filename=\"label.jpg\"\r\n\
                 Content-Type: image/jpeg\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn response_json(response: Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), 65536)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    async fn response_text(response: Response) -> String {
        let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .unwrap();
        String::from_utf8_lossy(&body).to_string()
    }

    // ── Health and API plumbing ──────────────────────────────

    #[tokio::test]
    async fn health_response_shape() {
        let (core, _dir) = test_core_state();
        let app = app_router(core);

        let response = app.oneshot(make_request("GET", "/api/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = response_json(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["medication_count"], 2);
        assert!(!json["version"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn api_responses_are_never_cached() {
        let (core, _dir) = test_core_state();
        let app = app_router(core);

        let response = app.oneshot(make_request("GET", "/api/health")).await.unwrap();
        assert_eq!(response.headers().get("Cache-Control").unwrap(), "no-store");
    }

    #[tokio::test]
    async fn unknown_api_path_returns_structured_404() {
        let (core, _dir) = test_core_state();
        let app = app_router(core);

        let response = app
            .oneshot(make_request("GET", "/api/nonexistent"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let json = response_json(response).await;
        assert_eq!(json["error"]["code"], "NOT_FOUND");
    }

    // ── Medications ──────────────────────────────────────────

    #[tokio::test]
    async fn medications_list_returns_seeds() {
        let (core, _dir) = test_core_state();
        let app = app_router(core);

        let response = app
            .oneshot(make_request("GET", "/api/medications"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = response_json(response).await;
        let meds = json["medications"].as_array().unwrap();
        assert_eq!(meds.len(), 2);
        assert_eq!(meds[0]["name"], "Amoxicillin");
        assert_eq!(meds[0]["frequency"], "Every 8 hours");
        assert_eq!(meds[1]["name"], "Lisinopril");
        assert!(json["last_updated"].is_string());
    }

    #[tokio::test]
    async fn add_medication_returns_201_with_stored_record() {
        let (core, _dir) = test_core_state();

        let body = serde_json::json!({
            "name": "Metformin",
            "dosage": "850mg",
            "quantity": 60,
            "frequency": "Twice daily"
        });
        let response = app_router(core.clone())
            .oneshot(json_request("POST", "/api/medications", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let json = response_json(response).await;
        assert_eq!(json["name"], "Metformin");
        assert_eq!(json["refills"], 0);
        assert!(!json["id"].as_str().unwrap().is_empty());

        let response = app_router(core)
            .oneshot(make_request("GET", "/api/medications"))
            .await
            .unwrap();
        let json = response_json(response).await;
        assert_eq!(json["medications"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn add_medication_rejects_blank_name() {
        let (core, _dir) = test_core_state();

        let body = serde_json::json!({ "name": "   " });
        let response = app_router(core.clone())
            .oneshot(json_request("POST", "/api/medications", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = response_json(response).await;
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
        assert_eq!(json["error"]["message"], "Medication name is required");

        let response = app_router(core)
            .oneshot(make_request("GET", "/api/medications"))
            .await
            .unwrap();
        let json = response_json(response).await;
        assert_eq!(json["medications"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn add_medication_fills_missing_fields_with_defaults() {
        let (core, _dir) = test_core_state();

        let body = serde_json::json!({ "name": "Aspirin" });
        let response = app_router(core)
            .oneshot(json_request("POST", "/api/medications", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let json = response_json(response).await;
        assert_eq!(json["quantity"], 30);
        assert_eq!(json["frequency"], "Once daily");
        assert_eq!(json["dosage"], "");
    }

    // ── Scan ─────────────────────────────────────────────────

    #[tokio::test]
    async fn scan_returns_extracted_candidate() {
        let (core, _dir) = test_core_state();
        let app = app_router(core);

        let response = app
            .oneshot(multipart_request("/api/scan", "image", &JPEG_HEADER))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = response_json(response).await;
        assert_eq!(json["candidate"]["name"], "Amoxicillin");
        assert_eq!(json["candidate"]["dosage"], "500mg");
        assert_eq!(json["candidate"]["quantity"], 14);
        assert_eq!(json["candidate"]["frequency"], "Once daily");
        assert_eq!(json["recognized_chars"], SEED_TRANSCRIPT.len());
    }

    #[tokio::test]
    async fn scan_without_image_field_returns_400() {
        let (core, _dir) = test_core_state();
        let app = app_router(core);

        let response = app
            .oneshot(multipart_request("/api/scan", "file", &JPEG_HEADER))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = response_json(response).await;
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn scan_of_non_image_returns_422() {
        let (core, _dir) = test_core_state();
        let app = app_router(core);

        let response = app
            .oneshot(multipart_request("/api/scan", "image", b"just some text"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let json = response_json(response).await;
        assert_eq!(json["error"]["code"], "UNREADABLE_IMAGE");
    }

    #[tokio::test]
    async fn scan_engine_failure_returns_502_with_friendly_message() {
        let (core, _dir) = test_core_state_with(Arc::new(MockRecognizer::failing()));
        let app = app_router(core);

        let response = app
            .oneshot(multipart_request("/api/scan", "image", &JPEG_HEADER))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let json = response_json(response).await;
        assert_eq!(json["error"]["code"], "RECOGNITION_FAILED");
        assert_eq!(
            json["error"]["message"],
            "Failed to scan image. Please try again or enter manually."
        );
    }

    // ── Schedule ─────────────────────────────────────────────

    #[tokio::test]
    async fn schedule_lists_seed_doses_morning_first() {
        let (core, _dir) = test_core_state();
        let app = app_router(core);

        let response = app.oneshot(make_request("GET", "/api/schedule")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = response_json(response).await;
        let entries = json["entries"].as_array().unwrap();
        // Amoxicillin every-8-hours gets two slots, Lisinopril one.
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0]["time"], "08:00 AM");
        assert_eq!(entries[2]["time"], "08:00 PM");
        assert!(entries.iter().all(|e| e["taken"] == false));
    }

    #[tokio::test]
    async fn schedule_toggle_marks_taken() {
        let (core, _dir) = test_core_state();

        let response = app_router(core.clone())
            .oneshot(make_request("GET", "/api/schedule"))
            .await
            .unwrap();
        let json = response_json(response).await;
        let entry_id = json["entries"][0]["id"].as_str().unwrap().to_string();

        let response = app_router(core)
            .oneshot(make_request(
                "POST",
                &format!("/api/schedule/{entry_id}/toggle"),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = response_json(response).await;
        assert_eq!(json["taken"], true);
        assert_eq!(json["id"], entry_id);
    }

    #[tokio::test]
    async fn schedule_toggle_unknown_entry_returns_404() {
        let (core, _dir) = test_core_state();
        let app = app_router(core);

        let response = app
            .oneshot(make_request("POST", "/api/schedule/bogus-am/toggle"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let json = response_json(response).await;
        assert_eq!(json["error"]["code"], "NOT_FOUND");
    }

    // ── Cart and checkout ────────────────────────────────────

    #[tokio::test]
    async fn cart_starts_empty() {
        let (core, _dir) = test_core_state();
        let app = app_router(core);

        let response = app.oneshot(make_request("GET", "/api/cart")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = response_json(response).await;
        assert!(json["items"].as_array().unwrap().is_empty());
        assert_eq!(json["total"], "0.00");
    }

    #[tokio::test]
    async fn cart_add_bump_and_remove() {
        let (core, _dir) = test_core_state();
        let med_id = core.medications().unwrap()[0].id;

        let body = serde_json::json!({ "medication_id": med_id });
        let response = app_router(core.clone())
            .oneshot(json_request("POST", "/api/cart/items", body.clone()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        assert_eq!(json["items"][0]["cart_quantity"], 1);
        assert_eq!(json["total"], "15.00");

        let response = app_router(core.clone())
            .oneshot(json_request("POST", "/api/cart/items", body))
            .await
            .unwrap();
        let json = response_json(response).await;
        assert_eq!(json["items"][0]["cart_quantity"], 2);
        assert_eq!(json["total"], "30.00");

        let response = app_router(core)
            .oneshot(make_request(
                "DELETE",
                &format!("/api/cart/items/{med_id}"),
            ))
            .await
            .unwrap();
        let json = response_json(response).await;
        assert!(json["items"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn cart_add_unknown_medication_returns_404() {
        let (core, _dir) = test_core_state();
        let app = app_router(core);

        let body = serde_json::json!({ "medication_id": uuid::Uuid::new_v4() });
        let response = app
            .oneshot(json_request("POST", "/api/cart/items", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn cart_remove_with_malformed_id_returns_400() {
        let (core, _dir) = test_core_state();
        let app = app_router(core);

        let response = app
            .oneshot(make_request("DELETE", "/api/cart/items/not-a-uuid"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn cart_clear_empties_it() {
        let (core, _dir) = test_core_state();
        let med_id = core.medications().unwrap()[0].id;
        core.add_to_cart(&med_id).unwrap();

        let response = app_router(core)
            .oneshot(make_request("DELETE", "/api/cart"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = response_json(response).await;
        assert!(json["items"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn checkout_of_empty_cart_returns_400() {
        let (core, _dir) = test_core_state();
        let app = app_router(core);

        let response = app
            .oneshot(make_request("POST", "/api/cart/checkout"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = response_json(response).await;
        assert_eq!(json["error"]["message"], "Cart is empty");
    }

    #[tokio::test]
    async fn checkout_returns_receipt_and_clears_cart() {
        let (core, _dir) = test_core_state();
        let meds = core.medications().unwrap();
        core.add_to_cart(&meds[0].id).unwrap();
        core.add_to_cart(&meds[1].id).unwrap();

        let response = app_router(core.clone())
            .oneshot(make_request("POST", "/api/cart/checkout"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = response_json(response).await;
        assert!(!json["order_id"].as_str().unwrap().is_empty());
        assert_eq!(json["total"], "30.00");
        assert_eq!(json["item_count"], 2);
        assert!(json["placed_at"].is_string());

        let response = app_router(core)
            .oneshot(make_request("GET", "/api/cart"))
            .await
            .unwrap();
        let json = response_json(response).await;
        assert!(json["items"].as_array().unwrap().is_empty());
    }

    // ── Pages ────────────────────────────────────────────────

    #[tokio::test]
    async fn home_page_lists_medications() {
        let (core, _dir) = test_core_state();
        let app = app_router(core);

        let response = app.oneshot(make_request("GET", "/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let html = response_text(response).await;
        assert!(html.contains("My Medications"));
        assert!(html.contains("Amoxicillin"));
        assert!(html.contains("Lisinopril"));
        assert!(html.contains("No Refills"));
        assert!(html.contains("14 remaining"));
    }

    #[tokio::test]
    async fn scanner_page_renders_form() {
        let (core, _dir) = test_core_state();
        let app = app_router(core);

        let response = app.oneshot(make_request("GET", "/scanner")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let html = response_text(response).await;
        assert!(html.contains("Scan Prescription"));
        assert!(html.contains("Confirm &amp; Add Medication"));
        assert!(html.contains("Every 8 hours"));
    }

    #[tokio::test]
    async fn shop_page_shows_prescriptions_and_cart() {
        let (core, _dir) = test_core_state();
        let med_id = core.medications().unwrap()[0].id;
        core.add_to_cart(&med_id).unwrap();

        let response = app_router(core)
            .oneshot(make_request("GET", "/shop"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let html = response_text(response).await;
        assert!(html.contains("Pharmacy Shop"));
        assert!(html.contains("$15.00"));
        assert!(html.contains("Order Summary"));
        assert!(html.contains("Checkout"));
    }

    #[tokio::test]
    async fn reminders_page_shows_dose_entries() {
        let (core, _dir) = test_core_state();
        let app = app_router(core);

        let response = app.oneshot(make_request("GET", "/reminders")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let html = response_text(response).await;
        assert!(html.contains("Daily Reminders"));
        assert!(html.contains("08:00 AM"));
        assert!(html.contains("08:00 PM"));
    }

    #[tokio::test]
    async fn unknown_page_redirects_to_dashboard() {
        let (core, _dir) = test_core_state();
        let app = app_router(core);

        let response = app.oneshot(make_request("GET", "/no-such-page")).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get("Location").unwrap(), "/");
    }

    #[tokio::test]
    async fn handler_panic_renders_fault_page() {
        async fn boom() -> &'static str {
            panic!("exploded while rendering")
        }

        let app = Router::new()
            .route("/boom", get(boom))
            .layer(CatchPanicLayer::custom(handle_panic));

        let response = app.oneshot(make_request("GET", "/boom")).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let html = response_text(response).await;
        assert!(html.contains("Something went wrong"));
        assert!(html.contains("exploded while rendering"));
    }
}
