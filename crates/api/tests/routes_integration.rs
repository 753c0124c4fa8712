//! End-to-end tests for the HTTP routes over stubbed collaborators.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::Utc;
use harvester_api::{build_router, AppState};
use harvester_core::ports::{ChannelSender, ChannelStore, LoginStore, RewardsApi};
use harvester_core::{AuthService, NotificationDispatcher, ScheduledJob};
use harvester_domain::{
    ActiveBonusCard, BonusCardEntitlement, CaptchaChallenge, HarvestOutcome, HarvesterError,
    LoginSession, NotificationChannel, Result,
};
use harvester_infra::{AutomationScheduler, DbManager, SchedulerConfig};
use http_body_util::BodyExt;
use tempfile::TempDir;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

/// Stub rewards API with switchable rejection of the login flow.
#[derive(Default)]
struct StubRewardsApi {
    reject_login: AtomicBool,
}

#[async_trait]
impl RewardsApi for StubRewardsApi {
    async fn fetch_captcha(&self, _cancel: &CancellationToken) -> Result<CaptchaChallenge> {
        Ok(CaptchaChallenge {
            captcha_id: "cap-1".into(),
            captcha_url: "https://example.com/cap-1.png".into(),
        })
    }

    async fn send_sms(
        &self,
        _phone_number: &str,
        _captcha_id: &str,
        _captcha_code: &str,
        _cancel: &CancellationToken,
    ) -> Result<()> {
        if self.reject_login.load(Ordering::SeqCst) {
            return Err(HarvesterError::Validation("captcha mismatch".into()));
        }
        Ok(())
    }

    async fn verify_sms(
        &self,
        _phone_number: &str,
        _otp_code: &str,
        _cancel: &CancellationToken,
    ) -> Result<String> {
        if self.reject_login.load(Ordering::SeqCst) {
            return Err(HarvesterError::Validation("wrong code".into()));
        }
        Ok("tok-fresh".into())
    }

    async fn refresh_login(
        &self,
        _phone_number: &str,
        _cancel: &CancellationToken,
    ) -> Result<String> {
        Ok("tok-refreshed".into())
    }

    async fn harvest_reward(
        &self,
        _access_token: &str,
        _cancel: &CancellationToken,
    ) -> Result<HarvestOutcome> {
        Ok(HarvestOutcome { claimed_points: 100 })
    }

    async fn activated_bonus_cards(
        &self,
        _access_token: &str,
        _cancel: &CancellationToken,
    ) -> Result<Vec<ActiveBonusCard>> {
        Ok(Vec::new())
    }

    async fn all_bonus_cards(
        &self,
        _access_token: &str,
        _cancel: &CancellationToken,
    ) -> Result<Vec<BonusCardEntitlement>> {
        Ok(Vec::new())
    }

    async fn activate_bonus_card(
        &self,
        _access_token: &str,
        _type_id: &str,
        _cancel: &CancellationToken,
    ) -> Result<()> {
        Ok(())
    }
}

#[derive(Default)]
struct StubLoginStore {
    session: std::sync::Mutex<Option<LoginSession>>,
}

#[async_trait]
impl LoginStore for StubLoginStore {
    async fn get(&self) -> Result<Option<LoginSession>> {
        Ok(self.session.lock().unwrap().clone())
    }

    async fn put(&self, session: LoginSession) -> Result<()> {
        *self.session.lock().unwrap() = Some(session);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        *self.session.lock().unwrap() = None;
        Ok(())
    }
}

#[derive(Default)]
struct StubChannelStore {
    channels: std::sync::Mutex<Vec<NotificationChannel>>,
}

#[async_trait]
impl ChannelStore for StubChannelStore {
    async fn all(&self) -> Result<Vec<NotificationChannel>> {
        Ok(self.channels.lock().unwrap().clone())
    }

    async fn replace(&self, channels: Vec<NotificationChannel>) -> Result<()> {
        *self.channels.lock().unwrap() = channels;
        Ok(())
    }
}

struct StubChannelSender;

#[async_trait]
impl ChannelSender for StubChannelSender {
    async fn send(&self, _channel: &NotificationChannel, _message: &str) -> Result<()> {
        Ok(())
    }
}

/// Job that blocks until cancelled, for exercising the busy path.
struct BlockingJob;

#[async_trait]
impl ScheduledJob for BlockingJob {
    fn name(&self) -> &'static str {
        "harvest"
    }

    async fn run(&self, cancel: &CancellationToken) -> Result<()> {
        cancel.cancelled().await;
        Ok(())
    }
}

struct TestApp {
    router: Router,
    api: Arc<StubRewardsApi>,
    login_store: Arc<StubLoginStore>,
    // Keeps the database file alive for the app's lifetime.
    _temp_dir: TempDir,
}

async fn test_app() -> TestApp {
    let api = Arc::new(StubRewardsApi::default());
    let login_store = Arc::new(StubLoginStore::default());
    let channel_store = Arc::new(StubChannelStore::default());

    let auth = Arc::new(AuthService::new(api.clone(), login_store.clone()));
    let dispatcher =
        Arc::new(NotificationDispatcher::new(channel_store, Arc::new(StubChannelSender)));

    let mut scheduler = AutomationScheduler::new(SchedulerConfig {
        job_timeout: Duration::from_secs(30),
        ..SchedulerConfig::default()
    })
    .await
    .expect("scheduler built");
    scheduler
        .register(Arc::new(BlockingJob), "0 0 0 1 1 * 2099")
        .await
        .expect("job registered");

    let temp_dir = TempDir::new().expect("temp dir");
    let db = Arc::new(
        DbManager::new(temp_dir.path().join("api.db"), 2).expect("db manager built"),
    );
    db.run_migrations().expect("migrations run");

    let state = AppState::new(auth, dispatcher, Arc::new(Mutex::new(scheduler)), db);
    TestApp { router: build_router(state), api, login_store, _temp_dir: temp_dir }
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = router.clone().oneshot(request).await.expect("request handled");
    let status = response.status();
    let bytes = response.into_body().collect().await.expect("body read").to_bytes();
    let body = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().method("GET").uri(uri).body(Body::empty()).expect("request built")
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request built")
}

#[tokio::test]
async fn captcha_returns_a_challenge() {
    let app = test_app().await;
    let (status, body) = send(&app.router, get("/api/captcha")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["captcha_id"], "cap-1");
    assert_eq!(body["captcha_url"], "https://example.com/cap-1.png");
}

#[tokio::test]
async fn login_flow_persists_a_session() {
    let app = test_app().await;

    let (status, _) = send(
        &app.router,
        post_json(
            "/api/sms",
            serde_json::json!({
                "phone_number": "13800000000",
                "captcha_id": "cap-1",
                "captcha_code": "abcd"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(
        &app.router,
        post_json(
            "/api/login/verify",
            serde_json::json!({ "phone_number": "13800000000", "otp_code": "123456" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let stored = app.login_store.get().await.expect("get").expect("session persisted");
    assert_eq!(stored.access_token, "tok-fresh");
}

#[tokio::test]
async fn rejected_otp_is_a_bad_request() {
    let app = test_app().await;
    app.api.reject_login.store(true, Ordering::SeqCst);

    let (status, body) = send(
        &app.router,
        post_json(
            "/api/login/verify",
            serde_json::json!({ "phone_number": "13800000000", "otp_code": "000000" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["type"], "Validation");
}

#[tokio::test]
async fn login_info_masks_the_token_by_default() {
    let app = test_app().await;
    app.login_store
        .put(LoginSession {
            phone_number: "13800000000".into(),
            access_token: "tok-secret".into(),
            obtained_at: Utc::now(),
        })
        .await
        .expect("put");

    let (status, body) = send(&app.router, get("/api/login")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["phone_number"], "13800000000");
    assert_eq!(body["token"], "MASKED");

    let (status, body) = send(&app.router, get("/api/login?show_token=true")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token"], "tok-secret");
}

#[tokio::test]
async fn login_info_without_session_is_an_empty_object() {
    let app = test_app().await;
    let (status, body) = send(&app.router, get("/api/login")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!({}));
}

#[tokio::test]
async fn refresh_without_session_is_a_bad_request() {
    let app = test_app().await;
    let (status, _) =
        send(&app.router, post_json("/api/login/refresh", serde_json::Value::Null)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn logout_clears_the_session() {
    let app = test_app().await;
    app.login_store
        .put(LoginSession {
            phone_number: "13800000000".into(),
            access_token: "tok-1".into(),
            obtained_at: Utc::now(),
        })
        .await
        .expect("put");

    let request = Request::builder()
        .method("DELETE")
        .uri("/api/login")
        .body(Body::empty())
        .expect("request built");
    let (status, _) = send(&app.router, request).await;

    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(app.login_store.get().await.expect("get").is_none());
}

#[tokio::test]
async fn notification_update_and_masked_listing() {
    let app = test_app().await;

    let request = Request::builder()
        .method("PUT")
        .uri("/api/notifications")
        .header("content-type", "application/json")
        .body(Body::from(
            serde_json::json!([
                { "name": "bark", "key": "bark-key", "enabled": true }
            ])
            .to_string(),
        ))
        .expect("request built");
    let (status, _) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app.router, get("/api/notifications")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["name"], "bark");
    assert_eq!(body[0]["key"], "********");
}

#[tokio::test]
async fn invalid_notification_update_is_a_bad_request() {
    let app = test_app().await;

    let request = Request::builder()
        .method("PUT")
        .uri("/api/notifications")
        .header("content-type", "application/json")
        .body(Body::from(
            serde_json::json!([
                { "name": "pigeon", "key": "coop", "enabled": true }
            ])
            .to_string(),
        ))
        .expect("request built");
    let (status, body) = send(&app.router, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["type"], "Validation");
}

#[tokio::test]
async fn notification_test_of_unknown_channel_is_not_found() {
    let app = test_app().await;
    let (status, _) = send(
        &app.router,
        post_json("/api/notifications/test?channel=bark", serde_json::Value::Null),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn trigger_of_unknown_job_is_not_found() {
    let app = test_app().await;
    let (status, body) =
        send(&app.router, post_json("/api/jobs/no_such_job/trigger", serde_json::Value::Null))
            .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["type"], "NotFound");
}

#[tokio::test]
async fn second_trigger_while_running_is_a_conflict() {
    let app = test_app().await;

    let (status, body) =
        send(&app.router, post_json("/api/jobs/harvest/trigger", serde_json::Value::Null)).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["status"], "triggered");

    // BlockingJob holds the lock until shutdown, so the retrigger conflicts.
    let (status, _) =
        send(&app.router, post_json("/api/jobs/harvest/trigger", serde_json::Value::Null)).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn health_reports_ok() {
    let app = test_app().await;
    let (status, body) = send(&app.router, get("/api/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "ok");
}
