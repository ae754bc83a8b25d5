use std::net::SocketAddr;
use axum::{Router, routing::get};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use crate::state::AppState;
use crate::{accounts, admin, insight};

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1",
              Router::new()
                  .merge(accounts::router())
                  .merge(admin::router())
                  .merge(insight::router())
                  .route("/health", get(|| async { "ok" }))
        )
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!(
                        "http_request",
                        %method,
                        uri = %uri,
                        status = tracing::field::Empty
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        let latency_ms = latency.as_millis() as u64;
                        if status.is_server_error() {
                            tracing::error!(%status, latency_ms, "response");
                        } else {
                            tracing::info!(%status, latency_ms, "response");
                        }
                    },
                ),
        )
}

pub async fn serve(app: Router) -> anyhow::Result<()> {
    let addr: SocketAddr = format!(
        "{}:{}",
        std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
        std::env::var("APP_PORT").unwrap_or_else(|_| "8080".into())
    )
        .parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod app_tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn call(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let res = app.clone().oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), 1024 * 1024).await.unwrap();
        let body = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        (status, body)
    }

    fn post_json(uri: &str, body: Value, token: Option<&str>) -> Request<Body> {
        let mut b = Request::post(uri).header(header::CONTENT_TYPE, "application/json");
        if let Some(t) = token {
            b = b.header(header::AUTHORIZATION, format!("Bearer {}", t));
        }
        b.body(Body::from(body.to_string())).unwrap()
    }

    fn get(uri: &str, token: &str) -> Request<Body> {
        Request::get(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap()
    }

    async fn login(app: &Router, username: &str, password: &str) -> (StatusCode, Value) {
        call(
            app,
            post_json(
                "/api/v1/auth/login",
                json!({ "username": username, "password": password }),
                None,
            ),
        )
        .await
    }

    #[tokio::test]
    async fn health_is_ok() {
        let app = build_app(AppState::fake());
        let res = app
            .oneshot(Request::get("/api/v1/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn registration_and_approval_flow() {
        let app = build_app(AppState::fake());

        let (status, body) = login(&app, "admin", "admin1234").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"]["role"], "admin");
        assert!(body["user"].get("password").is_none());
        let admin_token = body["access_token"].as_str().unwrap().to_string();

        let (status, body) = call(
            &app,
            post_json(
                "/api/v1/auth/register",
                json!({
                    "username": "bob",
                    "email": "b@x.com",
                    "password": "pw123",
                    "building": "VTH"
                }),
                None,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["status"], "pending");
        assert!(body.get("access_token").is_none());
        let bob_id = body["id"].as_str().unwrap().to_string();

        let (status, body) = login(&app, "bob", "pw123").await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body, "your account is pending approval");

        let (status, body) =
            call(&app, get("/api/v1/admin/users/pending-count", &admin_token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["pending"], 1);

        let (status, body) = call(
            &app,
            post_json(
                &format!("/api/v1/admin/users/{}/approve", bob_id),
                json!({}),
                Some(admin_token.as_str()),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "approved");

        let (status, body) = login(&app, "bob", "pw123").await;
        assert_eq!(status, StatusCode::OK);
        let bob_token = body["access_token"].as_str().unwrap().to_string();

        let (status, body) = call(&app, get("/api/v1/me", &bob_token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["username"], "bob");
        assert_eq!(body["building"], "VTH");

        let (status, _) = call(&app, get("/api/v1/admin/users", &bob_token)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn register_errors_map_to_status_codes() {
        let app = build_app(AppState::fake());
        let (status, _) = call(
            &app,
            post_json(
                "/api/v1/auth/register",
                json!({ "username": "bob", "password": "pw" }),
                None,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = call(
            &app,
            post_json(
                "/api/v1/auth/register",
                json!({ "username": "admin", "email": "new@x.com", "password": "pw" }),
                None,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn bad_credentials_are_unauthorized() {
        let app = build_app(AppState::fake());
        let (status, body) = login(&app, "admin", "wrong").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, "invalid credentials");
    }

    #[tokio::test]
    async fn rejected_registration_cannot_log_in() {
        let app = build_app(AppState::fake());
        let (_, body) = login(&app, "admin", "admin1234").await;
        let admin_token = body["access_token"].as_str().unwrap().to_string();

        let (_, body) = call(
            &app,
            post_json(
                "/api/v1/auth/register",
                json!({ "username": "eve", "email": "e@x.com", "password": "pw" }),
                None,
            ),
        )
        .await;
        let eve_id = body["id"].as_str().unwrap().to_string();

        let uri = format!("/api/v1/admin/users/{}/reject", eve_id);
        let (status, _) = call(&app, post_json(&uri, json!({}), Some(admin_token.as_str()))).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = call(&app, post_json(&uri, json!({}), Some(admin_token.as_str()))).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, body) = login(&app, "eve", "pw").await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body, "your registration has been rejected");
    }

    #[tokio::test]
    async fn protected_routes_need_a_token() {
        let app = build_app(AppState::fake());
        let res = app
            .oneshot(Request::get("/api/v1/me").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn insight_without_provider_uses_fallback() {
        let app = build_app(AppState::fake());
        let (_, body) = login(&app, "admin", "admin1234").await;
        let token = body["access_token"].as_str().unwrap().to_string();

        let (status, body) = call(&app, get("/api/v1/dashboard/insight?lang=EN", &token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["insight"], "Warning: Neural bridge unstable.");
    }
}
