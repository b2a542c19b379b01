use chrono::{Duration as ChronoDuration, Utc};
use accessctl_api::config::ApiConfig;
use accessctl_auth::{JwtClaims, Role};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use reqwest::StatusCode;
use serde_json::{json, Value};

const SECRET: &str = "test-secret";

struct TestServer {
    base_url: String,
    client: reqwest::Client,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        Self::spawn_with(ApiConfig::for_tests(SECRET)).await
    }

    async fn spawn_with(config: ApiConfig) -> Self {
        // Same router as prod, in-memory store, ephemeral port.
        let app = accessctl_api::app::build_app(&config)
            .await
            .expect("failed to build app");
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            client: reqwest::Client::new(),
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn login(&self, username: &str, password: &str) -> reqwest::Response {
        self.client
            .post(self.url("/login"))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await
            .unwrap()
    }

    async fn admin_token(&self) -> String {
        let res = self.login("admin", "admin").await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = res.json().await.unwrap();
        body["access_token"].as_str().unwrap().to_string()
    }

    async fn get(&self, path: &str, token: &str) -> reqwest::Response {
        self.client.get(self.url(path)).bearer_auth(token).send().await.unwrap()
    }

    async fn post(&self, path: &str, token: &str, body: Value) -> reqwest::Response {
        self.client.post(self.url(path)).bearer_auth(token).json(&body).send().await.unwrap()
    }

    async fn put(&self, path: &str, token: &str, body: Value) -> reqwest::Response {
        self.client.put(self.url(path)).bearer_auth(token).json(&body).send().await.unwrap()
    }

    async fn delete(&self, path: &str, token: &str) -> reqwest::Response {
        self.client.delete(self.url(path)).bearer_auth(token).send().await.unwrap()
    }

    async fn role_id(&self, token: &str, name: &str) -> i64 {
        let roles: Value = self.get("/roles", token).await.json().await.unwrap();
        roles
            .as_array()
            .unwrap()
            .iter()
            .find(|r| r["name"] == name)
            .and_then(|r| r["role_id"].as_i64())
            .expect("seeded role")
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn mint_jwt(secret: &str, role: &str, issued_at: chrono::DateTime<Utc>, ttl: ChronoDuration) -> String {
    let claims = JwtClaims {
        sub: "someone".to_string(),
        role: Role::new(role.to_string()),
        issued_at,
        expires_at: issued_at + ttl,
    };

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("failed to encode jwt")
}

async fn error_of(res: reqwest::Response) -> String {
    let body: Value = res.json().await.unwrap();
    body["error"].as_str().unwrap_or_default().to_string()
}

fn ada(role_id: i64) -> Value {
    json!({
        "first_name": "Ada",
        "last_name": "Lovelace",
        "login": "ada",
        "password": "analytical",
        "other_details": "engine",
        "role_id": role_id,
    })
}

#[tokio::test]
async fn public_endpoints_need_no_token() {
    let srv = TestServer::spawn().await;

    let res = srv.client.get(srv.url("/")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Users Access Control");
    assert!(body["endpoints"]["/users"].is_string());

    let res = srv.client.get(srv.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn unknown_route_is_json_404() {
    let srv = TestServer::spawn().await;
    let res = srv.client.get(srv.url("/nowhere")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(error_of(res).await, "Resource not found");
}

#[tokio::test]
async fn wrong_method_is_json_405() {
    let srv = TestServer::spawn().await;

    let res = srv.client.get(srv.url("/login")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert!(res.headers().contains_key(reqwest::header::ALLOW));
    assert_eq!(error_of(res).await, "Method not allowed");

    let token = srv.admin_token().await;
    let res = srv
        .client
        .patch(srv.url("/users/1"))
        .bearer_auth(&token)
        .json(&json!({ "first_name": "Root" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(error_of(res).await, "Method not allowed");
}

#[tokio::test]
async fn admin_login_then_list_users() {
    let srv = TestServer::spawn().await;
    let token = srv.admin_token().await;

    let res = srv.get("/users", &token).await;
    assert_eq!(res.status(), StatusCode::OK);
    let users: Value = res.json().await.unwrap();
    let admin = users
        .as_array()
        .unwrap()
        .iter()
        .find(|u| u["login"] == "admin")
        .expect("seeded admin listed");
    assert_eq!(admin["role"], "Administrator");
    assert!(admin.get("password_hash").is_none());
}

#[tokio::test]
async fn bad_credentials_are_rejected_uniformly() {
    let srv = TestServer::spawn().await;

    let res = srv.login("x", "y").await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "error": "Invalid credentials" }));

    let res = srv.login("admin", "wrong").await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_of(res).await, "Invalid credentials");
}

#[tokio::test]
async fn unknown_login_costs_a_password_check() {
    let srv = TestServer::spawn_with(ApiConfig {
        bcrypt_cost: 8,
        ..ApiConfig::for_tests(SECRET)
    })
    .await;

    async fn timed(srv: &TestServer, username: &str, password: &str) -> std::time::Duration {
        let started = std::time::Instant::now();
        let res = srv.login(username, password).await;
        let elapsed = started.elapsed();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(error_of(res).await, "Invalid credentials");
        elapsed
    }

    let mut unknown = std::time::Duration::ZERO;
    let mut wrong = std::time::Duration::ZERO;
    for _ in 0..3 {
        unknown += timed(&srv, "nobody", "x").await;
        wrong += timed(&srv, "admin", "wrong").await;
    }

    // Both paths run one bcrypt verification at the same cost.
    assert!(
        unknown * 3 >= wrong,
        "unknown login took {unknown:?}, wrong password took {wrong:?}"
    );
}

#[tokio::test]
async fn login_requires_username_and_password() {
    let srv = TestServer::spawn().await;
    let res = srv
        .client
        .post(srv.url("/login"))
        .json(&json!({ "username": "admin" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_of(res).await, "Missing required fields: password");
}

#[tokio::test]
async fn guard_distinguishes_missing_invalid_expired_and_forbidden() {
    let srv = TestServer::spawn().await;

    let res = srv.client.get(srv.url("/users")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = srv.get("/users", "not-a-jwt").await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_of(res).await, "Invalid token");

    let forged = mint_jwt("other-secret", "admin", Utc::now(), ChronoDuration::minutes(10));
    assert_eq!(srv.get("/users", &forged).await.status(), StatusCode::UNAUTHORIZED);

    let expired = mint_jwt(SECRET, "admin", Utc::now() - ChronoDuration::minutes(30), ChronoDuration::minutes(10));
    let res = srv.get("/users/1", &expired).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_of(res).await, "Token has expired");

    let user = mint_jwt(SECRET, "user", Utc::now(), ChronoDuration::minutes(10));
    let res = srv.get("/users", &user).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert_eq!(error_of(res).await, "Access forbidden: You do not have the required role");

    let admin = mint_jwt(SECRET, "admin", Utc::now(), ChronoDuration::minutes(10));
    assert_eq!(srv.get("/users", &admin).await.status(), StatusCode::OK);
}

#[tokio::test]
async fn create_user_lists_missing_fields() {
    let srv = TestServer::spawn().await;
    let token = srv.admin_token().await;

    let res = srv.post("/users", &token, json!({ "first_name": "Ada", "login": "" })).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        error_of(res).await,
        "Missing required fields: last_name, login, password, other_details, role_id"
    );
}

#[tokio::test]
async fn created_user_round_trips_and_logs_in() {
    let srv = TestServer::spawn().await;
    let token = srv.admin_token().await;
    let role_id = srv.role_id(&token, "user").await;

    let res = srv.post("/users", &token, ada(role_id)).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await.unwrap();
    let user_id = body["user_id"].as_i64().unwrap();
    assert!(body["message"].is_string());

    let res = srv.get(&format!("/users/{user_id}"), &token).await;
    assert_eq!(res.status(), StatusCode::OK);
    let user: Value = res.json().await.unwrap();
    assert_eq!(
        user,
        json!({
            "user_id": user_id,
            "first_name": "Ada",
            "last_name": "Lovelace",
            "login": "ada",
            "other_details": "engine",
            "role_id": role_id,
            "role": "Standard user",
        })
    );

    // Non-admin token from a real login is refused by the guard.
    let res = srv.login("ada", "analytical").await;
    assert_eq!(res.status(), StatusCode::OK);
    let ada_token = res.json::<Value>().await.unwrap()["access_token"].as_str().unwrap().to_string();
    let claims = jsonwebtoken::decode::<JwtClaims>(
        &ada_token,
        &DecodingKey::from_secret(SECRET.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .expect("issued token decodes")
    .claims;
    assert_eq!(claims.sub, "ada");
    assert_eq!(claims.role.as_str(), "user");
    assert_eq!(srv.get("/users", &ada_token).await.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn integrity_failures_are_400() {
    let srv = TestServer::spawn().await;
    let token = srv.admin_token().await;

    let res = srv.post("/users", &token, ada(999)).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(error_of(res).await.starts_with("Integrity error"));

    let role_id = srv.role_id(&token, "user").await;
    assert_eq!(srv.post("/users", &token, ada(role_id)).await.status(), StatusCode::CREATED);
    let res = srv.post("/users", &token, ada(role_id)).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(error_of(res).await.starts_with("Integrity error"));
}

#[tokio::test]
async fn partial_update_changes_only_given_fields() {
    let srv = TestServer::spawn().await;
    let token = srv.admin_token().await;
    let role_id = srv.role_id(&token, "user").await;
    let created: Value = srv.post("/users", &token, ada(role_id)).await.json().await.unwrap();
    let path = format!("/users/{}", created["user_id"]);

    let before: Value = srv.get(&path, &token).await.json().await.unwrap();
    let res = srv.put(&path, &token, json!({ "first_name": "X", "last_name": null })).await;
    assert_eq!(res.status(), StatusCode::OK);
    let after: Value = srv.get(&path, &token).await.json().await.unwrap();

    assert_eq!(after["first_name"], "X");
    let mut expected = before.clone();
    expected["first_name"] = json!("X");
    assert_eq!(after, expected);

    // Password changes are re-hashed and take effect.
    assert_eq!(srv.put(&path, &token, json!({ "password": "babbage" })).await.status(), StatusCode::OK);
    assert_eq!(srv.login("ada", "analytical").await.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(srv.login("ada", "babbage").await.status(), StatusCode::OK);

    let res = srv.put("/users/9999", &token, json!({ "first_name": "X" })).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(error_of(res).await, "User not found");
}

#[tokio::test]
async fn delete_user_then_get_is_404() {
    let srv = TestServer::spawn().await;
    let token = srv.admin_token().await;

    assert_eq!(srv.delete("/users/9999", &token).await.status(), StatusCode::NOT_FOUND);

    let role_id = srv.role_id(&token, "user").await;
    let created: Value = srv.post("/users", &token, ada(role_id)).await.json().await.unwrap();
    let path = format!("/users/{}", created["user_id"]);

    assert_eq!(srv.delete(&path, &token).await.status(), StatusCode::OK);
    let res = srv.get(&path, &token).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(error_of(res).await, "User not found");
}

#[tokio::test]
async fn malformed_ids_and_bodies_are_400() {
    let srv = TestServer::spawn().await;
    let token = srv.admin_token().await;

    assert_eq!(srv.get("/users/abc", &token).await.status(), StatusCode::BAD_REQUEST);

    let res = srv
        .client
        .post(srv.url("/users"))
        .bearer_auth(&token)
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(!error_of(res).await.is_empty());
}

#[tokio::test]
async fn facility_links_and_access_rights_cascade_on_delete() {
    let srv = TestServer::spawn().await;
    let token = srv.admin_token().await;

    let types: Value = srv.get("/facility-types", &token).await.json().await.unwrap();
    assert_eq!(types.as_array().unwrap().len(), 3);
    let type_id = types[0]["facility_type_id"].as_i64().unwrap();

    let res = srv.post("/facilities", &token, json!({ "name": "Payroll" })).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        error_of(res).await,
        "Missing required fields: facility_type_id, access_count, description, other_details"
    );

    let res = srv
        .post(
            "/facilities",
            &token,
            json!({
                "facility_type_id": type_id,
                "access_count": 0,
                "name": "Payroll",
                "description": "Payroll screen",
                "other_details": "-",
            }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let facility_id = res.json::<Value>().await.unwrap()["facility_id"].as_i64().unwrap();

    let res = srv
        .post("/functional-areas", &token, json!({ "description": "Finance", "category": "Department" }))
        .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let area_id = res.json::<Value>().await.unwrap()["functional_area_id"].as_i64().unwrap();

    let link = format!("/facilities/{facility_id}/functional-areas/{area_id}");
    assert_eq!(srv.put(&link, &token, json!({})).await.status(), StatusCode::OK);
    assert_eq!(srv.put(&link, &token, json!({})).await.status(), StatusCode::OK);
    let areas: Value = srv
        .get(&format!("/facilities/{facility_id}/functional-areas"), &token)
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(areas.as_array().unwrap().len(), 1);

    let role_id = srv.role_id(&token, "user").await;
    let right = format!("/roles/{role_id}/access-rights/{facility_id}");
    assert_eq!(srv.put(&right, &token, json!({ "crud_value": "XX" })).await.status(), StatusCode::BAD_REQUEST);
    assert_eq!(srv.put(&right, &token, json!({ "crud_value": "rw" })).await.status(), StatusCode::OK);
    let rights: Value = srv
        .get(&format!("/roles/{role_id}/access-rights"), &token)
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(rights, json!([{ "role_id": role_id, "facility_id": facility_id, "crud_value": "RW" }]));

    assert_eq!(srv.delete(&format!("/facilities/{facility_id}"), &token).await.status(), StatusCode::OK);

    let rights: Value = srv
        .get(&format!("/roles/{role_id}/access-rights"), &token)
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(rights, json!([]));
    assert_eq!(srv.delete(&right, &token).await.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        srv.get(&format!("/functional-areas/{area_id}"), &token).await.status(),
        StatusCode::OK
    );
}

#[tokio::test]
async fn functional_area_cannot_become_its_own_ancestor() {
    let srv = TestServer::spawn().await;
    let token = srv.admin_token().await;

    let mut ids = Vec::new();
    let mut parent: Option<i64> = None;
    for description in ["Company", "Finance", "Payroll"] {
        let res = srv
            .post(
                "/functional-areas",
                &token,
                json!({ "description": description, "category": "Org", "parent_id": parent }),
            )
            .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let id = res.json::<Value>().await.unwrap()["functional_area_id"].as_i64().unwrap();
        ids.push(id);
        parent = Some(id);
    }

    let res = srv
        .put(&format!("/functional-areas/{}", ids[0]), &token, json!({ "parent_id": ids[2] }))
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_of(res).await, "Functional area cannot be its own ancestor");

    // Deleting an area that still has children is refused.
    let res = srv.delete(&format!("/functional-areas/{}", ids[1]), &token).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // Detaching makes it a root.
    let path = format!("/functional-areas/{}", ids[2]);
    assert_eq!(srv.put(&path, &token, json!({ "parent_id": null })).await.status(), StatusCode::OK);
    let area: Value = srv.get(&path, &token).await.json().await.unwrap();
    assert_eq!(area["parent_id"], Value::Null);
    assert_eq!(area["description"], "Payroll");
}
