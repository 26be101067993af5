pub mod documents;
pub mod health;
pub mod payments;
pub mod rendering;

use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/templates", get(rendering::handle_list_templates))
        .route("/api/v1/tax-id/check", post(rendering::handle_check_tax_id))
        // Workspaces & documents
        .route("/api/v1/workspaces", post(documents::handle_create_workspace))
        .route(
            "/api/v1/workspaces/:id",
            get(documents::handle_get_workspace).delete(documents::handle_delete_workspace),
        )
        .route(
            "/api/v1/workspaces/:id/document",
            get(documents::handle_get_document).put(documents::handle_import_document),
        )
        .route(
            "/api/v1/workspaces/:id/document/reset",
            post(documents::handle_reset_document),
        )
        .route(
            "/api/v1/workspaces/:id/personal",
            patch(documents::handle_update_personal),
        )
        .route("/api/v1/workspaces/:id/entries", post(documents::handle_add_entry))
        .route(
            "/api/v1/workspaces/:id/entries/:kind/:entry_id",
            patch(documents::handle_update_entry).delete(documents::handle_remove_entry),
        )
        .route(
            "/api/v1/workspaces/:id/entries/:kind/:entry_id/move",
            post(documents::handle_move_entry),
        )
        .route(
            "/api/v1/workspaces/:id/projects/:entry_id/technologies",
            post(documents::handle_add_technology),
        )
        .route(
            "/api/v1/workspaces/:id/projects/:entry_id/technologies/:technology",
            delete(documents::handle_remove_technology),
        )
        .route("/api/v1/workspaces/:id/skills", post(documents::handle_add_skill))
        .route(
            "/api/v1/workspaces/:id/skills/:index",
            delete(documents::handle_remove_skill),
        )
        // Analysis & rendering
        .route("/api/v1/workspaces/:id/analysis", get(rendering::handle_analysis))
        .route("/api/v1/workspaces/:id/render", get(rendering::handle_render))
        .route(
            "/api/v1/workspaces/:id/template",
            put(rendering::handle_select_template),
        )
        // Coupon, payment & export
        .route(
            "/api/v1/workspaces/:id/coupon",
            post(payments::handle_apply_coupon).delete(payments::handle_remove_coupon),
        )
        .route("/api/v1/workspaces/:id/quote", get(payments::handle_quote))
        .route(
            "/api/v1/workspaces/:id/payment",
            post(payments::handle_open_payment)
                .get(payments::handle_get_payment)
                .delete(payments::handle_close_payment),
        )
        .route(
            "/api/v1/workspaces/:id/payment/submit",
            post(payments::handle_submit_payment),
        )
        .route(
            "/api/v1/workspaces/:id/payment/recheck",
            post(payments::handle_recheck_payment),
        )
        .route(
            "/api/v1/workspaces/:id/export",
            get(payments::handle_get_export).post(payments::handle_retry_export),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tokio::sync::mpsc;
    use tower::ServiceExt;

    use crate::billing::gateway::testing::ScriptedGateway;
    use crate::billing::{PollSettings, PriceList};
    use crate::export::{
        spawn_export_worker, ExportArtifact, ExportError, ExportOrchestrator, ExportSink,
        FsExportSink,
    };
    use crate::workspace::WorkspaceStore;

    fn fast_polling() -> PollSettings {
        PollSettings {
            interval: Duration::from_millis(10),
            confirmation_delay: Duration::from_millis(5),
            timeout: None,
        }
    }

    fn test_app(gateway: Arc<ScriptedGateway>, dir: &tempfile::TempDir) -> Router {
        test_app_with(gateway, Arc::new(FsExportSink::new(dir.path())), fast_polling())
    }

    fn test_app_with(
        gateway: Arc<ScriptedGateway>,
        sink: Arc<dyn ExportSink>,
        poll: PollSettings,
    ) -> Router {
        let store = WorkspaceStore::new();
        let exports = ExportOrchestrator::new(store.clone(), sink);
        let (tx, rx) = mpsc::unbounded_channel();
        spawn_export_worker(exports.clone(), rx);
        build_router(AppState {
            workspaces: store,
            gateway,
            exports,
            prices: PriceList::default(),
            poll,
            settlements: tx,
        })
    }

    /// Fails the first `failures` deliveries, then writes to disk.
    struct FlakySink {
        failures: AtomicUsize,
        attempts: AtomicUsize,
        inner: FsExportSink,
    }

    impl FlakySink {
        fn new(failures: usize, dir: &tempfile::TempDir) -> Self {
            Self {
                failures: AtomicUsize::new(failures),
                attempts: AtomicUsize::new(0),
                inner: FsExportSink::new(dir.path()),
            }
        }

        fn attempts(&self) -> usize {
            self.attempts.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ExportSink for FlakySink {
        async fn deliver(&self, artifact: &ExportArtifact) -> Result<String, ExportError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            let failing = self
                .failures
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            if failing {
                return Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full").into());
            }
            self.inner.deliver(artifact).await
        }
    }

    async fn wait_for_state(app: &Router, base: &str, wanted: &str) {
        for _ in 0..200 {
            let (_, session) = call(app, "GET", &format!("{base}/payment"), None).await;
            if session["state"] == wanted {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("payment never reached {wanted}");
    }

    async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(match body {
                Some(v) => Body::from(v.to_string()),
                None => Body::empty(),
            })
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    async fn create_workspace(app: &Router, document: Value) -> String {
        let (status, body) = call(app, "POST", "/api/v1/workspaces", Some(document)).await;
        assert_eq!(status, StatusCode::CREATED);
        body["workspace"]["id"].as_str().unwrap().to_string()
    }

    fn payer() -> Value {
        json!({"name": "Ana Souza", "email": "ana@example.com", "taxId": "529.982.247-25"})
    }

    #[tokio::test]
    async fn test_health() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(Arc::new(ScriptedGateway::new()), &dir);
        let (status, body) = call(&app, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_authoring_and_analysis() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(Arc::new(ScriptedGateway::new()), &dir);
        let id = create_workspace(&app, json!({})).await;
        let base = format!("/api/v1/workspaces/{id}");

        let (status, _) = call(
            &app,
            "PATCH",
            &format!("{base}/personal"),
            Some(json!({"fullName": "Ana Souza", "email": "ana@example.com"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, created) = call(
            &app,
            "POST",
            &format!("{base}/entries"),
            Some(json!({"kind": "project", "name": "Pipeline"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let project_id = created["id"].as_str().unwrap().to_string();

        let (status, techs) = call(
            &app,
            "POST",
            &format!("{base}/projects/{project_id}/technologies"),
            Some(json!({"technology": "Rust"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(techs["technologies"], json!(["Rust"]));

        let (status, _) = call(
            &app,
            "POST",
            &format!("{base}/projects/{project_id}/technologies"),
            Some(json!({"technology": "Rust"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, doc) = call(
            &app,
            "PATCH",
            &format!("{base}/entries/project/{project_id}"),
            Some(json!({"description": "Aumentou a vazão em 40%"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(doc["projects"][0]["name"], "Pipeline");

        let (status, report) = call(&app, "GET", &format!("{base}/analysis"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(report["score"].as_u64().unwrap() <= 100);

        let (status, _) = call(&app, "DELETE", &format!("{base}/entries/project/missing"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_preview_is_watermarked() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(Arc::new(ScriptedGateway::new()), &dir);
        let id = create_workspace(&app, json!({"personal": {"fullName": "Ana"}, "skills": ["SQL"]})).await;

        let (status, out) = call(
            &app,
            "GET",
            &format!("/api/v1/workspaces/{id}/render?template=minimal&mode=preview"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(out["template"], "minimal");
        assert_eq!(out["watermarked"], true);
        assert_eq!(out["sections"], json!(["skills"]));
    }

    #[tokio::test]
    async fn test_paid_flow_exports_after_settlement() {
        let dir = tempfile::tempdir().unwrap();
        let gateway = Arc::new(ScriptedGateway::new().with_statuses(&[false, true]));
        let app = test_app(gateway.clone(), &dir);
        let id = create_workspace(&app, json!({"personal": {"fullName": "Ana Souza"}})).await;
        let base = format!("/api/v1/workspaces/{id}");

        let (status, opened) = call(&app, "POST", &format!("{base}/payment"), None).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(opened["outcome"], "session");
        assert_eq!(opened["session"]["state"], "collecting_tax_id");
        assert_eq!(opened["session"]["quote"]["final_price"], json!(10.0));

        let (status, session) = call(&app, "POST", &format!("{base}/payment/submit"), Some(payer())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(session["state"], "awaiting_settlement");
        assert_eq!(gateway.charge_requests()[0].tax_id, "52998224725");

        let mut exported = Value::Null;
        for _ in 0..200 {
            let (status, body) = call(&app, "GET", &format!("{base}/export"), None).await;
            if status == StatusCode::OK {
                exported = body;
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(exported["payment_reference"], "pay_1");

        let (status, _) = call(&app, "GET", &format!("{base}/payment"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (_, ws) = call(&app, "GET", &base, None).await;
        assert_eq!(ws["workspace"]["export"]["payment_reference"], "pay_1");

        let (status, _) = call(&app, "POST", &format!("{base}/payment"), None).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (_, out) = call(&app, "GET", &format!("{base}/render?mode=export"), None).await;
        assert_eq!(out["watermarked"], false);
    }

    #[tokio::test]
    async fn test_full_discount_skips_payment() {
        let dir = tempfile::tempdir().unwrap();
        let gateway = Arc::new(ScriptedGateway::new().with_coupon("FREE100", 100.0));
        let app = test_app(gateway.clone(), &dir);
        let id = create_workspace(&app, json!({})).await;
        let base = format!("/api/v1/workspaces/{id}");

        let (status, applied) = call(&app, "POST", &format!("{base}/coupon"), Some(json!({"code": "free100"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(applied["validation"]["valid"], true);
        assert_eq!(applied["quote"]["status"], "free");

        let (status, opened) = call(&app, "POST", &format!("{base}/payment"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(opened["outcome"], "free");
        assert_eq!(opened["export"]["payment_reference"], "free_FREE100");
        assert!(gateway.charge_requests().is_empty());
    }

    #[tokio::test]
    async fn test_sub_minimum_coupon_blocks_payment() {
        let dir = tempfile::tempdir().unwrap();
        let gateway = Arc::new(ScriptedGateway::new().with_coupon("PROMO60", 60.0));
        let app = test_app(gateway.clone(), &dir);
        let id = create_workspace(&app, json!({})).await;
        let base = format!("/api/v1/workspaces/{id}");

        let (_, applied) = call(&app, "POST", &format!("{base}/coupon"), Some(json!({"code": "PROMO60"}))).await;
        assert_eq!(applied["quote"]["final_price"], json!(4.0));
        assert_eq!(applied["quote"]["status"], "below_minimum");

        let (status, body) = call(&app, "POST", &format!("{base}/payment"), None).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "UNPROCESSABLE_ENTITY");
        assert!(gateway.charge_requests().is_empty());
    }

    #[tokio::test]
    async fn test_coupon_locked_while_payment_open() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(Arc::new(ScriptedGateway::new()), &dir);
        let id = create_workspace(&app, json!({})).await;
        let base = format!("/api/v1/workspaces/{id}");

        call(&app, "POST", &format!("{base}/payment"), None).await;
        let (status, _) = call(&app, "DELETE", &format!("{base}/coupon"), None).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = call(&app, "DELETE", &format!("{base}/payment"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = call(&app, "DELETE", &format!("{base}/coupon"), None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_tax_id_check_and_templates() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(Arc::new(ScriptedGateway::new()), &dir);

        let (_, check) = call(&app, "POST", "/api/v1/tax-id/check", Some(json!({"value": "52998224725"}))).await;
        assert_eq!(check["display"], "529.982.247-25");
        assert_eq!(check["valid"], true);

        let (_, templates) = call(&app, "GET", "/api/v1/templates", None).await;
        assert_eq!(templates.as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_malformed_import_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(Arc::new(ScriptedGateway::new()), &dir);
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/workspaces")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_reopening_after_confirmation_does_not_charge_again() {
        let dir = tempfile::tempdir().unwrap();
        let gateway = Arc::new(ScriptedGateway::new().with_statuses(&[true]));
        let poll = PollSettings {
            confirmation_delay: Duration::from_millis(300),
            ..fast_polling()
        };
        let app = test_app_with(gateway.clone(), Arc::new(FsExportSink::new(dir.path())), poll);
        let id = create_workspace(&app, json!({"personal": {"fullName": "Ana Souza"}})).await;
        let base = format!("/api/v1/workspaces/{id}");

        call(&app, "POST", &format!("{base}/payment"), None).await;
        let (status, _) = call(&app, "POST", &format!("{base}/payment/submit"), Some(payer())).await;
        assert_eq!(status, StatusCode::OK);
        wait_for_state(&app, &base, "confirmed").await;

        // closed before the export signal fires
        let (status, _) = call(&app, "DELETE", &format!("{base}/payment"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (_, ws) = call(&app, "GET", &base, None).await;
        assert_eq!(ws["workspace"]["pending_settlement"], "pay_1");

        let (status, reopened) = call(&app, "POST", &format!("{base}/payment"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(reopened["outcome"], "settled");
        assert_eq!(reopened["export"]["payment_reference"], "pay_1");
        assert_eq!(gateway.charge_requests().len(), 1);

        // the late signal finds the export already recorded
        tokio::time::sleep(Duration::from_millis(500)).await;
        let (status, exported) = call(&app, "GET", &format!("{base}/export"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(exported, reopened["export"]);
        let (status, _) = call(&app, "POST", &format!("{base}/payment"), None).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(gateway.charge_requests().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_export_after_settlement_can_be_retried() {
        let dir = tempfile::tempdir().unwrap();
        let gateway = Arc::new(ScriptedGateway::new().with_statuses(&[true]));
        let sink = Arc::new(FlakySink::new(1, &dir));
        let app = test_app_with(gateway.clone(), sink.clone(), fast_polling());
        let id = create_workspace(&app, json!({"personal": {"fullName": "Ana Souza"}})).await;
        let base = format!("/api/v1/workspaces/{id}");

        call(&app, "POST", &format!("{base}/payment"), None).await;
        call(&app, "POST", &format!("{base}/payment/submit"), Some(payer())).await;
        wait_for_state(&app, &base, "confirmed").await;
        for _ in 0..200 {
            if sink.attempts() > 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(sink.attempts(), 1);

        let (status, _) = call(&app, "GET", &format!("{base}/export"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (_, ws) = call(&app, "GET", &base, None).await;
        assert_eq!(ws["workspace"]["pending_settlement"], "pay_1");

        // closing keeps the paid reference, so nothing new is charged
        let (status, _) = call(&app, "DELETE", &format!("{base}/payment"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, exported) = call(&app, "POST", &format!("{base}/export"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(exported["payment_reference"], "pay_1");
        assert_eq!(gateway.charge_requests().len(), 1);

        let (status, again) = call(&app, "POST", &format!("{base}/export"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(again, exported);
        assert_eq!(sink.attempts(), 2);
    }

    #[tokio::test]
    async fn test_failed_free_export_is_not_registered_twice() {
        let dir = tempfile::tempdir().unwrap();
        let gateway = Arc::new(ScriptedGateway::new().with_coupon("FREE100", 100.0));
        let app = test_app_with(gateway.clone(), Arc::new(FlakySink::new(1, &dir)), fast_polling());
        let id = create_workspace(&app, json!({})).await;
        let base = format!("/api/v1/workspaces/{id}");

        call(&app, "POST", &format!("{base}/coupon"), Some(json!({"code": "FREE100"}))).await;
        let (status, _) = call(&app, "POST", &format!("{base}/payment"), None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

        let (status, reopened) = call(&app, "POST", &format!("{base}/payment"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(reopened["outcome"], "settled");
        assert_eq!(reopened["export"]["payment_reference"], "free_FREE100");
        assert_eq!(gateway.free_usages.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_export_retry_without_payment_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(Arc::new(ScriptedGateway::new()), &dir);
        let id = create_workspace(&app, json!({})).await;
        let (status, _) = call(&app, "POST", &format!("/api/v1/workspaces/{id}/export"), None).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_document_roundtrips_through_import() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(Arc::new(ScriptedGateway::new()), &dir);
        let id = create_workspace(&app, json!({})).await;
        let uri = format!("/api/v1/workspaces/{id}/document");

        let (status, _) = call(
            &app,
            "PUT",
            &uri,
            Some(json!({"personal": {"fullName": "Ana"}, "projects": [{"id": 1712345678, "name": "Pipeline"}]})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, doc) = call(&app, "GET", &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(doc["projects"][0]["id"], "1712345678");
        assert_eq!(doc["personal"]["fullName"], "Ana");
    }
}
