// Responsibility
// - v1 の URL 構造を定義
// - /auth/** と /health は白リスト (認証不要)、/users/** に bearer_auth を適用
use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::middleware;
use crate::state::AppState;

use crate::api::v1::handlers::{
    auth::{authenticate, logout, refresh_token, register},
    health::health,
    users::{change_password, delete_user, get_user, list_users, update_user},
};

pub fn routes(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/health", get(health))
        .route("/auth/register", post(register))
        .route("/auth/authenticate", post(authenticate))
        .route("/auth/refresh-token", post(refresh_token))
        .route("/auth/logout", post(logout));

    let protected = Router::new()
        .route("/users", get(list_users))
        .route(
            "/users/{id}",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route("/users/{id}/change-password", patch(change_password));

    public.merge(middleware::bearer_auth::apply(protected, state))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use chrono::Utc;
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::*;
    use crate::repos::memory::{self, InMemoryDirectory};
    use crate::repos::user_repo::{NewUser, Role, User, UserDirectory};
    use crate::services::auth::flow::AuthFlow;
    use crate::services::auth::jwt::{Claims, JwtCodec};
    use crate::services::auth::password::PasswordService;
    use crate::services::auth::token_service::TokenService;
    use crate::services::users::UserService;

    const SECRET: &str = "test-secret";

    fn test_state() -> (AppState, Arc<InMemoryDirectory>) {
        let directory = Arc::new(InMemoryDirectory::new());
        let tokens = TokenService::new(JwtCodec::new(SECRET), 900, 604_800);
        let passwords = PasswordService::new();
        let auth = AuthFlow::new(directory.clone(), tokens.clone(), passwords);
        let users = UserService::new(directory.clone(), passwords);

        (
            AppState::new(directory.clone(), tokens, auth, users),
            directory,
        )
    }

    fn app(state: AppState) -> Router {
        Router::new()
            .nest("/api/v1", routes(state.clone()))
            .with_state(state)
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let res = app.clone().oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn post_json(uri: &str, body: &Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn with_bearer(mut req: Request<Body>, token: &str) -> Request<Body> {
        req.headers_mut().insert(
            header::AUTHORIZATION,
            format!("Bearer {token}").parse().unwrap(),
        );
        req
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn seed(directory: &InMemoryDirectory, username: &str, role: Role) -> User {
        directory
            .insert(NewUser {
                first_name: "Test".to_string(),
                last_name: "User".to_string(),
                username: username.to_string(),
                password_hash: PasswordService::new().hash("secret123").unwrap(),
                role,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn health_is_public() {
        let (state, _) = test_state();
        let app = app(state);

        let (status, body) = send(&app, get_req("/api/v1/health")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn register_returns_token_pair_for_its_subject() {
        let (state, _) = test_state();
        let tokens = state.tokens.clone();
        let app = app(state);

        let (status, body) = send(
            &app,
            post_json(
                "/api/v1/auth/register",
                &json!({
                    "first_name": "Alice",
                    "last_name": "Smith",
                    "username": "alice",
                    "password": "secret123"
                }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["token_type"], "Bearer");
        let access = body["access_token"].as_str().unwrap();
        assert_eq!(tokens.extract_subject(access).unwrap(), "alice");
        assert!(body["refresh_token"].as_str().is_some());
    }

    #[tokio::test]
    async fn register_with_taken_username_is_conflict() {
        let (state, directory) = test_state();
        seed(&directory, "alice", Role::User).await;
        let app = app(state);

        let (status, body) = send(
            &app,
            post_json(
                "/api/v1/auth/register",
                &json!({
                    "first_name": "Alice",
                    "last_name": "Jones",
                    "username": "alice",
                    "password": "secret123"
                }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn register_with_short_password_is_unprocessable() {
        let (state, _) = test_state();
        let app = app(state);

        let (status, _) = send(
            &app,
            post_json(
                "/api/v1/auth/register",
                &json!({
                    "first_name": "Alice",
                    "last_name": "Smith",
                    "username": "alice",
                    "password": "ab"
                }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn authenticate_with_wrong_password_is_unauthorized_without_token() {
        let (state, directory) = test_state();
        seed(&directory, "alice", Role::User).await;
        let app = app(state);

        let (status, body) = send(
            &app,
            post_json(
                "/api/v1/auth/authenticate",
                &json!({"username": "alice", "password": "wrong"}),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.get("access_token").is_none());
    }

    #[tokio::test]
    async fn authenticate_with_correct_password_returns_tokens() {
        let (state, directory) = test_state();
        seed(&directory, "alice", Role::User).await;
        let tokens = state.tokens.clone();
        let app = app(state);

        let (status, body) = send(
            &app,
            post_json(
                "/api/v1/auth/authenticate",
                &json!({"username": "alice", "password": "secret123"}),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let access = body["access_token"].as_str().unwrap();
        assert_eq!(tokens.extract_subject(access).unwrap(), "alice");
    }

    #[tokio::test]
    async fn protected_route_without_token_is_unauthorized() {
        let (state, _) = test_state();
        let app = app(state);

        let (status, _) = send(&app, get_req("/api/v1/users")).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn protected_route_with_garbage_token_is_unauthorized() {
        let (state, _) = test_state();
        let app = app(state);

        let (status, _) = send(&app, with_bearer(get_req("/api/v1/users"), "not-a-jwt")).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn token_for_unknown_user_is_unauthorized() {
        let (state, _) = test_state();
        let ghost = memory::user("ghost", Role::User);
        let token = state.tokens.issue_access_token(&ghost).unwrap();
        let app = app(state);

        let (status, _) = send(&app, with_bearer(get_req("/api/v1/users"), &token)).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn expired_access_token_is_unauthorized() {
        let (state, directory) = test_state();
        let alice = seed(&directory, "alice", Role::User).await;

        let iat = Utc::now().timestamp() - 10_000;
        let expired = JwtCodec::new(SECRET)
            .encode(&Claims {
                sub: "alice".to_string(),
                iat,
                exp: iat + 900,
            })
            .unwrap();
        let app = app(state);

        let uri = format!("/api/v1/users/{}", alice.id);
        let (status, _) = send(&app, with_bearer(get_req(&uri), &expired)).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn owner_can_read_self_but_not_others() {
        let (state, directory) = test_state();
        let alice = seed(&directory, "alice", Role::User).await;
        let bob = seed(&directory, "bob", Role::User).await;
        let token = state.tokens.issue_access_token(&alice).unwrap();
        let app = app(state);

        let own = format!("/api/v1/users/{}", alice.id);
        let (status, body) = send(&app, with_bearer(get_req(&own), &token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["username"], "alice");

        let other = format!("/api/v1/users/{}", bob.id);
        let (status, _) = send(&app, with_bearer(get_req(&other), &token)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn admin_can_read_anyone_and_list() {
        let (state, directory) = test_state();
        let bob = seed(&directory, "bob", Role::User).await;
        let admin = seed(&directory, "admin", Role::Admin).await;
        let token = state.tokens.issue_access_token(&admin).unwrap();
        let app = app(state);

        let uri = format!("/api/v1/users/{}", bob.id);
        let (status, _) = send(&app, with_bearer(get_req(&uri), &token)).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(&app, with_bearer(get_req("/api/v1/users"), &token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn list_requires_admin() {
        let (state, directory) = test_state();
        let alice = seed(&directory, "alice", Role::User).await;
        let token = state.tokens.issue_access_token(&alice).unwrap();
        let app = app(state);

        let (status, _) = send(&app, with_bearer(get_req("/api/v1/users"), &token)).await;

        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn get_unknown_id_is_not_found_for_admin() {
        let (state, directory) = test_state();
        let admin = seed(&directory, "admin", Role::Admin).await;
        let token = state.tokens.issue_access_token(&admin).unwrap();
        let app = app(state);

        let uri = format!("/api/v1/users/{}", Uuid::new_v4());
        let (status, _) = send(&app, with_bearer(get_req(&uri), &token)).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn owner_can_update_and_delete_self() {
        let (state, directory) = test_state();
        let alice = seed(&directory, "alice", Role::User).await;
        let token = state.tokens.issue_access_token(&alice).unwrap();
        let app = app(state);

        let uri = format!("/api/v1/users/{}", alice.id);
        let update = Request::builder()
            .method("PUT")
            .uri(&uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({
                    "first_name": "Alicia",
                    "last_name": "Smith",
                    "username": "alice"
                })
                .to_string(),
            ))
            .unwrap();
        let (status, body) = send(&app, with_bearer(update, &token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["first_name"], "Alicia");

        let delete = Request::builder()
            .method("DELETE")
            .uri(&uri)
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(&app, with_bearer(delete, &token)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        assert!(
            directory
                .find_by_username("alice")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn change_password_with_wrong_current_is_bad_request() {
        let (state, directory) = test_state();
        let alice = seed(&directory, "alice", Role::User).await;
        let token = state.tokens.issue_access_token(&alice).unwrap();
        let app = app(state);

        let uri = format!("/api/v1/users/{}/change-password", alice.id);
        let req = Request::builder()
            .method("PATCH")
            .uri(&uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({
                    "current_password": "wrong",
                    "new_password": "newpass",
                    "confirmation_password": "newpass"
                })
                .to_string(),
            ))
            .unwrap();
        let (status, body) = send(&app, with_bearer(req, &token)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "WRONG_PASSWORD");
    }

    #[tokio::test]
    async fn refresh_with_valid_token_returns_new_access_token() {
        let (state, directory) = test_state();
        let alice = seed(&directory, "alice", Role::User).await;
        let refresh = state.tokens.issue_refresh_token(&alice).unwrap();
        let tokens = state.tokens.clone();
        let app = app(state);

        let req = with_bearer(
            Request::builder()
                .method("POST")
                .uri("/api/v1/auth/refresh-token")
                .body(Body::empty())
                .unwrap(),
            &refresh,
        );
        let (status, body) = send(&app, req).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["refresh_token"], refresh);
        let access = body["access_token"].as_str().unwrap();
        assert_eq!(tokens.extract_subject(access).unwrap(), "alice");
    }

    #[tokio::test]
    async fn refresh_with_expired_token_is_unauthorized() {
        let (state, directory) = test_state();
        seed(&directory, "alice", Role::User).await;

        let iat = Utc::now().timestamp() - 10_000;
        let expired = JwtCodec::new(SECRET)
            .encode(&Claims {
                sub: "alice".to_string(),
                iat,
                exp: iat + 900,
            })
            .unwrap();
        let app = app(state);

        let req = with_bearer(
            Request::builder()
                .method("POST")
                .uri("/api/v1/auth/refresh-token")
                .body(Body::empty())
                .unwrap(),
            &expired,
        );
        let (status, body) = send(&app, req).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.get("access_token").is_none());
    }

    #[tokio::test]
    async fn logout_is_a_no_content_no_op() {
        let (state, _) = test_state();
        let app = app(state);

        let req = Request::builder()
            .method("POST")
            .uri("/api/v1/auth/logout")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(&app, req).await;

        assert_eq!(status, StatusCode::NO_CONTENT);
    }
}
