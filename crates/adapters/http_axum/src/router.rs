//! Axum router assembly.

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::routing::get;
use serde::Serialize;
use tower_http::trace::TraceLayer;

use homelink_app::ports::{CommandPublisher, UserRepository};
use homelink_domain::time::{Timestamp, now};

use crate::state::AppState;

/// Build the top-level axum [`Router`].
///
/// Nests the API under `/api` and exposes an open `/health` probe.
/// Includes a [`TraceLayer`] that logs each HTTP request/response at the
/// `DEBUG` level using the `tracing` ecosystem.
pub fn build<UR, CP>(state: AppState<UR, CP>) -> Router
where
    UR: UserRepository + Send + Sync + 'static,
    CP: CommandPublisher + Send + Sync + 'static,
{
    Router::new()
        .route("/health", get(health::<UR, CP>))
        .nest("/api", crate::api::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Body of the `/health` probe.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    mqtt: bool,
    timestamp: Timestamp,
}

async fn health<UR, CP>(State(state): State<AppState<UR, CP>>) -> Json<HealthResponse>
where
    UR: UserRepository + Send + Sync + 'static,
    CP: CommandPublisher + Send + Sync + 'static,
{
    Json(HealthResponse {
        status: "OK",
        mqtt: state.store.snapshot().link_connected,
        timestamp: now(),
    })
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, HashMap};
    use std::future::Future;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use homelink_app::broadcast::StateBroadcaster;
    use homelink_app::dispatch::CommandDispatcher;
    use homelink_app::ports::{NewUser, StoredUser};
    use homelink_app::services::auth_service::AuthService;
    use homelink_app::services::user_service::UserService;
    use homelink_app::state_store::StateStore;
    use homelink_domain::error::HomeLinkError;
    use homelink_domain::time::now;
    use homelink_domain::topics::{DeviceTopics, TopicMap};
    use homelink_domain::user::{Role, User, UserId};

    use super::*;

    // ── In-memory user repository ──────────────────────────────────

    #[derive(Default)]
    struct InMemoryUserRepo {
        store: Mutex<HashMap<String, StoredUser>>,
    }

    impl UserRepository for InMemoryUserRepo {
        fn create(
            &self,
            new_user: NewUser,
        ) -> impl Future<Output = Result<User, HomeLinkError>> + Send {
            let ts = now();
            let user = User {
                id: UserId::new(),
                username: new_user.username.clone(),
                role: new_user.role,
                created_at: ts,
                updated_at: ts,
            };
            self.store.lock().unwrap().insert(
                new_user.username,
                StoredUser {
                    user: user.clone(),
                    password_hash: new_user.password_hash,
                },
            );
            async { Ok(user) }
        }

        fn find_by_username(
            &self,
            username: &str,
        ) -> impl Future<Output = Result<Option<StoredUser>, HomeLinkError>> + Send {
            let result = self.store.lock().unwrap().get(username).cloned();
            async { Ok(result) }
        }

        fn get_all(&self) -> impl Future<Output = Result<Vec<User>, HomeLinkError>> + Send {
            let result: Vec<User> = self
                .store
                .lock()
                .unwrap()
                .values()
                .map(|s| s.user.clone())
                .collect();
            async { Ok(result) }
        }

        fn update_password(
            &self,
            username: &str,
            password_hash: &str,
        ) -> impl Future<Output = Result<bool, HomeLinkError>> + Send {
            let mut store = self.store.lock().unwrap();
            let updated = match store.get_mut(username) {
                Some(stored) => {
                    stored.password_hash = password_hash.to_string();
                    true
                }
                None => false,
            };
            async move { Ok(updated) }
        }

        fn delete(
            &self,
            username: &str,
        ) -> impl Future<Output = Result<bool, HomeLinkError>> + Send {
            let removed = self.store.lock().unwrap().remove(username).is_some();
            async move { Ok(removed) }
        }

        fn count(&self) -> impl Future<Output = Result<u64, HomeLinkError>> + Send {
            let len = self.store.lock().unwrap().len() as u64;
            async move { Ok(len) }
        }
    }

    // ── Recording command publisher ────────────────────────────────

    #[derive(Default)]
    struct RecordingPublisher {
        published: Mutex<Vec<(String, String)>>,
        link_down: AtomicBool,
    }

    impl CommandPublisher for RecordingPublisher {
        fn publish(
            &self,
            topic: &str,
            payload: &str,
        ) -> impl Future<Output = Result<(), HomeLinkError>> + Send {
            let result = if self.link_down.load(Ordering::SeqCst) {
                Err(HomeLinkError::LinkUnavailable)
            } else {
                self.published
                    .lock()
                    .unwrap()
                    .push((topic.to_string(), payload.to_string()));
                Ok(())
            };
            async { result }
        }
    }

    // ── Fixture ────────────────────────────────────────────────────

    fn topic_map() -> Arc<TopicMap> {
        let mut devices = BTreeMap::new();
        devices.insert(
            "light".to_string(),
            DeviceTopics {
                control: "home/room/light/control".to_string(),
                status: "home/room/light/status".to_string(),
            },
        );
        let mut continuous = BTreeMap::new();
        continuous.insert(
            "temperature".to_string(),
            "home/sensors/temperature".to_string(),
        );
        Arc::new(TopicMap::new(devices, continuous, BTreeMap::new()).unwrap())
    }

    async fn app() -> (Router, Arc<RecordingPublisher>, Arc<StateStore>) {
        let topics = topic_map();
        let store = Arc::new(StateStore::new(&topics));
        let fanout = Arc::new(StateBroadcaster::new(16));
        let publisher = Arc::new(RecordingPublisher::default());
        let repo = Arc::new(InMemoryUserRepo::default());

        let user_service = UserService::new(Arc::clone(&repo));
        user_service
            .create_user("admin", "admin123", Role::Admin)
            .await
            .unwrap();
        user_service
            .create_user("lucas", "hunter2", Role::User)
            .await
            .unwrap();

        let state = AppState::new(
            Arc::clone(&store),
            fanout,
            CommandDispatcher::new(topics, Arc::clone(&publisher)),
            AuthService::new(Arc::clone(&repo), b"test-secret", chrono::Duration::hours(1)),
            user_service,
        );
        (build(state), publisher, store)
    }

    async fn login(app: &Router, username: &str, password: &str) -> String {
        let resp = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/auth/login")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(format!(
                        r#"{{"username":"{username}","password":"{password}"}}"#
                    )))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body: serde_json::Value =
            serde_json::from_slice(&resp.into_body().collect().await.unwrap().to_bytes()).unwrap();
        body["token"].as_str().unwrap().to_string()
    }

    fn get_with_token(uri: &str, token: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap()
    }

    // ── Health ─────────────────────────────────────────────────────

    #[tokio::test]
    async fn should_serve_health_without_authentication() {
        let (app, _publisher, _store) = app().await;
        let resp = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let body: serde_json::Value =
            serde_json::from_slice(&resp.into_body().collect().await.unwrap().to_bytes()).unwrap();
        assert_eq!(body["status"], "OK");
        assert_eq!(body["mqtt"], false);
    }

    // ── Authentication ─────────────────────────────────────────────

    #[tokio::test]
    async fn should_reject_status_without_token() {
        let (app, _publisher, _store) = app().await;
        let resp = app
            .oneshot(
                Request::builder()
                    .uri("/api/status")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn should_reject_bad_credentials_on_login() {
        let (app, _publisher, _store) = app().await;
        let resp = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/auth/login")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"username":"admin","password":"wrong"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn should_reject_garbage_token_with_forbidden() {
        let (app, _publisher, _store) = app().await;
        let resp = app
            .oneshot(get_with_token("/api/status", "garbage"))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn should_verify_token_and_echo_identity() {
        let (app, _publisher, _store) = app().await;
        let token = login(&app, "lucas", "hunter2").await;

        let resp = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/auth/verify")
                    .header(header::AUTHORIZATION, format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let body: serde_json::Value =
            serde_json::from_slice(&resp.into_body().collect().await.unwrap().to_bytes()).unwrap();
        assert_eq!(body["username"], "lucas");
        assert_eq!(body["role"], "user");
    }

    // ── Status ─────────────────────────────────────────────────────

    #[tokio::test]
    async fn should_serve_snapshot_to_authenticated_caller() {
        let (app, _publisher, store) = app().await;
        store.merge_update(homelink_domain::state::StateDelta::continuous(
            "temperature",
            22.5,
        ));
        let token = login(&app, "lucas", "hunter2").await;

        let resp = app.oneshot(get_with_token("/api/status", &token)).await.unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let body: serde_json::Value =
            serde_json::from_slice(&resp.into_body().collect().await.unwrap().to_bytes()).unwrap();
        assert_eq!(body["sensors"]["continuous"]["temperature"], 22.5);
        assert_eq!(body["actuators"]["light"], false);
        assert_eq!(body["linkConnected"], false);
    }

    // ── Control ────────────────────────────────────────────────────

    async fn send_control(app: &Router, token: &str, device: &str, command: bool) -> (StatusCode, serde_json::Value) {
        let resp = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(format!("/api/control/{device}"))
                    .header(header::AUTHORIZATION, format!("Bearer {token}"))
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(format!(r#"{{"command":{command}}}"#)))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = resp.status();
        let body: serde_json::Value =
            serde_json::from_slice(&resp.into_body().collect().await.unwrap().to_bytes()).unwrap();
        (status, body)
    }

    #[tokio::test]
    async fn should_publish_command_for_known_device() {
        let (app, publisher, _store) = app().await;
        let token = login(&app, "lucas", "hunter2").await;

        let (status, body) = send_control(&app, &token, "light", true).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(
            *publisher.published.lock().unwrap(),
            vec![("home/room/light/control".to_string(), "1".to_string())]
        );
    }

    #[tokio::test]
    async fn should_reject_unknown_device_without_publishing() {
        let (app, publisher, _store) = app().await;
        let token = login(&app, "lucas", "hunter2").await;

        let (status, body) = send_control(&app, &token, "furnace", true).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Unknown device");
        assert!(publisher.published.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_report_bad_gateway_when_link_is_down() {
        let (app, publisher, _store) = app().await;
        publisher.link_down.store(true, Ordering::SeqCst);
        let token = login(&app, "lucas", "hunter2").await;

        let (status, body) = send_control(&app, &token, "light", false).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["success"], false);
    }

    // ── User management ────────────────────────────────────────────

    #[tokio::test]
    async fn should_require_admin_for_user_listing() {
        let (app, _publisher, _store) = app().await;

        let token = login(&app, "lucas", "hunter2").await;
        let resp = app
            .clone()
            .oneshot(get_with_token("/api/users", &token))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let token = login(&app, "admin", "admin123").await;
        let resp = app.oneshot(get_with_token("/api/users", &token)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body: serde_json::Value =
            serde_json::from_slice(&resp.into_body().collect().await.unwrap().to_bytes()).unwrap();
        assert_eq!(body.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn should_create_user_as_admin_and_reject_duplicates() {
        let (app, _publisher, _store) = app().await;
        let token = login(&app, "admin", "admin123").await;

        let request = |body: &str| {
            Request::builder()
                .method("POST")
                .uri("/api/users")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap()
        };

        let resp = app
            .clone()
            .oneshot(request(r#"{"username":"guest","password":"guest123"}"#))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: serde_json::Value =
            serde_json::from_slice(&resp.into_body().collect().await.unwrap().to_bytes()).unwrap();
        assert_eq!(body["username"], "guest");
        assert_eq!(body["role"], "user");

        let resp = app
            .oneshot(request(r#"{"username":"guest","password":"other"}"#))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn should_let_users_change_only_their_own_password() {
        let (app, _publisher, _store) = app().await;
        let token = login(&app, "lucas", "hunter2").await;

        let change = |target: &str, token: &str| {
            Request::builder()
                .method("PUT")
                .uri(format!("/api/users/{target}/password"))
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"new_password":"updated"}"#))
                .unwrap()
        };

        let resp = app.clone().oneshot(change("admin", &token)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let resp = app.clone().oneshot(change("lucas", &token)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);

        // The new password works, the old one no longer does.
        login(&app, "lucas", "updated").await;
    }

    #[tokio::test]
    async fn should_prevent_admin_self_deletion() {
        let (app, _publisher, _store) = app().await;
        let token = login(&app, "admin", "admin123").await;

        let delete = |target: &str| {
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/users/{target}"))
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap()
        };

        let resp = app.clone().oneshot(delete("admin")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = app.clone().oneshot(delete("lucas")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);

        let resp = app.oneshot(delete("ghost")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    // ── Real-time channel ──────────────────────────────────────────

    #[tokio::test]
    async fn should_send_catch_up_frames_to_late_joining_sse_client() {
        let (app, _publisher, store) = app().await;
        store.merge_update(homelink_domain::state::StateDelta::actuator("light", true));
        store.merge_update(homelink_domain::state::StateDelta::continuous(
            "temperature",
            22.5,
        ));
        let token = login(&app, "lucas", "hunter2").await;

        let resp = app
            .oneshot(get_with_token(
                &format!("/api/events/stream?token={token}"),
                &token,
            ))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers()[header::CONTENT_TYPE].to_str().unwrap(),
            "text/event-stream"
        );

        let mut body = resp.into_body();
        let frame = body.frame().await.unwrap().unwrap();
        let chunk = String::from_utf8(frame.into_data().unwrap().to_vec()).unwrap();
        assert!(chunk.contains("event: device-update"));
        assert!(chunk.contains("\"temperature\":22.5"));
        assert!(chunk.contains("\"light\":true"));
    }

    #[tokio::test]
    async fn should_reject_sse_stream_without_token() {
        let (app, _publisher, _store) = app().await;
        let resp = app
            .oneshot(
                Request::builder()
                    .uri("/api/events/stream")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}
