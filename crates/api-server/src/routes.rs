use application::EmployeeApp;
use axum::{
    middleware,
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{generate_auth_token, require_bearer, TokenIssuer};
use crate::handlers::{
    create_employee, delete_employee, get_employee, health_check, list_employees, root,
    update_employee,
};

#[derive(Clone)]
pub struct AppState {
    pub employee_app: Arc<EmployeeApp>,
    pub token_issuer: Arc<TokenIssuer>,
}

fn employee_routes() -> Router<AppState> {
    Router::new()
        .route("/employee", get(list_employees).post(create_employee))
        .route(
            "/employee/:id",
            get(get_employee).patch(update_employee).delete(delete_employee),
        )
}

/// Public employee routes, token issuance and the bearer-guarded copy under `/protected`.
pub fn api_router(state: AppState) -> Router {
    let protected = employee_routes()
        .route_layer(middleware::from_fn_with_state(state.clone(), require_bearer));

    Router::new()
        .merge(employee_routes())
        .route("/auth", get(generate_auth_token))
        .nest("/protected", protected)
        .with_state(state)
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .nest("/api", api_router(state))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use chrono::Duration;
    use domain::DocumentRef;
    use infrastructure::{CollectionRef, Document, DocumentStore, Query, Snapshot, StoreError};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn state_with(employee_app: EmployeeApp) -> AppState {
        AppState {
            employee_app: Arc::new(employee_app),
            token_issuer: Arc::new(TokenIssuer::new("test_secret", Duration::hours(24))),
        }
    }

    fn test_app() -> Router {
        app(state_with(EmployeeApp::in_memory("employees")))
    }

    fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn empty_request(method: Method, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    fn ann() -> Value {
        json!({ "name": "Ann", "email": "Ann@X.com", "team": "Eng", "company": "Acme" })
    }

    async fn create(app: &Router, body: Value) -> Value {
        let (status, body) = send(app, json_request(Method::POST, "/api/employee", body)).await;
        assert_eq!(status, StatusCode::CREATED);
        body
    }

    #[tokio::test]
    async fn test_create_returns_created_record() {
        let app = test_app();

        let body = create(&app, ann()).await;

        assert_eq!(body["success"], json!(true));
        assert_eq!(body["message"], json!("Employee record of Ann is created successfully."));
        assert_eq!(body["response"]["email"], json!("ann@x.com"));
        assert!(body["response"]["id"].is_string());
        assert!(body["response"]["createdAt"].is_string());
    }

    #[tokio::test]
    async fn test_business_failures_keep_success_status() {
        let app = test_app();
        create(&app, ann()).await;

        let duplicate = create(&app, ann()).await;
        assert_eq!(duplicate["success"], json!(false));
        assert!(duplicate.get("response").is_none());

        let invalid = create(&app, json!({ "name": "", "email": "nope" })).await;
        assert_eq!(invalid["success"], json!(false));
        assert!(invalid["message"].as_str().unwrap().contains("Field 'email' invalid format."));

        let (status, missing) = send(&app, empty_request(Method::GET, "/api/employee/nope")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(missing["success"], json!(false));
        assert_eq!(missing["message"], json!("Employee with id nope not found."));
    }

    #[tokio::test]
    async fn test_non_string_values_are_validation_failures() {
        let app = test_app();

        let body = create(
            &app,
            json!({ "name": 0, "email": "ann@x.com", "team": "Eng", "company": "Acme" }),
        )
        .await;
        assert_eq!(body["success"], json!(false));
        assert_eq!(body["message"], json!("Field 'name' cannot be empty."));

        let mut falsy_manager = ann();
        falsy_manager["manager"] = json!(false);
        let body = create(&app, falsy_manager).await;
        assert_eq!(body["success"], json!(false));
        assert_eq!(body["message"], json!("Field 'manager' cannot be empty."));

        let created = create(&app, ann()).await;
        let uri = format!("/api/employee/{}", created["response"]["id"].as_str().unwrap());
        let (status, body) =
            send(&app, json_request(Method::PATCH, &uri, json!({ "team": 7 }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], json!(false));
        assert_eq!(body["message"], json!("Field 'team' must be a string."));
    }

    #[tokio::test]
    async fn test_crud_cycle() {
        let app = test_app();
        let created = create(&app, ann()).await;
        let id = created["response"]["id"].as_str().unwrap().to_string();
        let uri = format!("/api/employee/{}", id);

        let (status, fetched) = send(&app, empty_request(Method::GET, &uri)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["response"], created["response"]);

        let (status, updated) =
            send(&app, json_request(Method::PATCH, &uri, json!({ "team": "Ops" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["success"], json!(true));
        assert_eq!(updated["response"]["team"], json!("Ops"));

        let (status, deleted) = send(&app, empty_request(Method::DELETE, &uri)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(deleted["success"], json!(true));

        let (_, gone) = send(&app, empty_request(Method::GET, &uri)).await;
        assert_eq!(gone["success"], json!(false));

        let (_, again) = send(&app, empty_request(Method::DELETE, &uri)).await;
        assert_eq!(again["success"], json!(false));
    }

    #[tokio::test]
    async fn test_list_with_query_filters() {
        let app = test_app();
        let boss = create(&app, ann()).await;
        let boss_id = boss["response"]["id"].as_str().unwrap().to_string();

        create(
            &app,
            json!({ "name": "Bob", "email": "bob@x.com", "team": "Ops", "company": "Acme", "manager": boss_id }),
        )
        .await;

        let (status, all) = send(&app, empty_request(Method::GET, "/api/employee")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(all["response"].as_array().unwrap().len(), 2);

        let uri = format!("/api/employee?team=Ops&manager={}", boss_id);
        let (_, filtered) = send(&app, empty_request(Method::GET, &uri)).await;
        let reports = filtered["response"].as_array().unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0]["name"], json!("Bob"));
        assert_eq!(reports[0]["manager"]["id"], json!(boss_id));

        let (_, none) = send(&app, empty_request(Method::GET, "/api/employee?shoe_size=42")).await;
        assert_eq!(none["response"], json!([]));
    }

    #[tokio::test]
    async fn test_protected_routes_require_a_valid_token() {
        let app = test_app();

        let (status, body) = send(&app, empty_request(Method::GET, "/api/protected/employee")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], json!("Authorization header is missing"));

        let bad = Request::builder()
            .uri("/api/protected/employee")
            .header(header::AUTHORIZATION, "Bearer not.a.token")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&app, bad).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["message"], json!("Token is not valid"));

        let (status, issued) = send(&app, empty_request(Method::GET, "/api/auth")).await;
        assert_eq!(status, StatusCode::OK);
        let token = issued["accessToken"].as_str().unwrap().to_string();

        let mut request = json_request(Method::POST, "/api/protected/employee", ann());
        request.headers_mut().insert(
            header::AUTHORIZATION,
            format!("Bearer {}", token).parse().unwrap(),
        );
        let (status, created) = send(&app, request).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["success"], json!(true));

        // Public and protected trees share the same records.
        let (_, all) = send(&app, empty_request(Method::GET, "/api/employee")).await;
        assert_eq!(all["response"].as_array().unwrap().len(), 1);
    }

    struct UnavailableStore;

    #[async_trait]
    impl DocumentStore for UnavailableStore {
        async fn create(&self, _: &CollectionRef, _: Document) -> Result<Snapshot, StoreError> {
            Err(StoreError::Connection("store offline".to_string()))
        }

        async fn get(&self, _: &DocumentRef) -> Result<Option<Snapshot>, StoreError> {
            Err(StoreError::Connection("store offline".to_string()))
        }

        async fn update(&self, _: &DocumentRef, _: Document) -> Result<Option<Snapshot>, StoreError> {
            Err(StoreError::Connection("store offline".to_string()))
        }

        async fn delete(&self, _: &DocumentRef) -> Result<(), StoreError> {
            Err(StoreError::Connection("store offline".to_string()))
        }

        async fn find(&self, _: &Query) -> Result<Vec<Snapshot>, StoreError> {
            Err(StoreError::Connection("store offline".to_string()))
        }
    }

    #[tokio::test]
    async fn test_store_faults_are_internal_errors() {
        let app = app(state_with(EmployeeApp::new(Arc::new(UnavailableStore), "employees")));

        let (status, body) = send(&app, json_request(Method::POST, "/api/employee", ann())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], json!(false));
        let message = body["message"].as_str().unwrap();
        assert!(message.starts_with("Failed to create employee; "));
        assert!(message.contains("store offline"));

        let (status, _) = send(&app, empty_request(Method::GET, "/api/employee")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_health_and_root() {
        let app = test_app();

        let (status, body) = send(&app, empty_request(Method::GET, "/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], json!("healthy"));

        let (status, _) = send(&app, empty_request(Method::GET, "/")).await;
        assert_eq!(status, StatusCode::OK);
    }
}
