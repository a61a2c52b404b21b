//! HTTP-level tests against the in-memory store

use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Request, StatusCode, header},
};
use fixit_api::{
    AppConfig, AppState, create_router,
    models::{NewUser, Role},
};
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

struct TestApp {
    router: Router,
    state: AppState,
    _uploads: TempDir,
}

struct TestResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Value,
}

impl TestResponse {
    fn set_cookie(&self) -> Option<String> {
        self.headers
            .get(header::SET_COOKIE)
            .map(|v| v.to_str().unwrap().to_string())
    }

    /// `name=value` part of the Set-Cookie header, ready to send back
    fn session_cookie(&self) -> String {
        let set_cookie = self.set_cookie().expect("no Set-Cookie header");
        set_cookie.split(';').next().unwrap().to_string()
    }
}

impl TestApp {
    fn new() -> Self {
        Self::with_config(|_| {})
    }

    fn with_config(tweak: impl FnOnce(&mut AppConfig)) -> Self {
        let uploads = tempfile::tempdir().unwrap();
        let mut config = AppConfig {
            session_secret: Some("integration-test-secret".to_string()),
            upload_dir: uploads.path().to_path_buf(),
            login_max_attempts: 3,
            password_memory_kib: 8,
            password_iterations: 1,
            password_parallelism: 1,
            ..AppConfig::default()
        };
        tweak(&mut config);
        let state = AppState::in_memory(config).unwrap();

        Self {
            router: create_router(state.clone()),
            state,
            _uploads: uploads,
        }
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            body,
        }
    }

    async fn json(
        &self,
        method: &str,
        uri: &str,
        cookie: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let body = match body {
            Some(body) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(body.to_string())
            }
            None => Body::empty(),
        };
        self.send(builder.body(body).unwrap()).await
    }

    async fn seed_user(&self, name: &str, email: &str, password: &str, role: Role) {
        let password_hash = self.state.passwords.hash(password).unwrap();
        self.state
            .users
            .create(NewUser {
                name: name.to_string(),
                email: email.to_string(),
                password_hash,
                role,
            })
            .await
            .unwrap();
    }

    async fn login(&self, email: &str, password: &str) -> String {
        let response = self
            .json(
                "POST",
                "/api/auth/login",
                None,
                Some(json!({ "email": email, "password": password })),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK);
        response.session_cookie()
    }

    async fn admin_cookie(&self) -> String {
        self.seed_user("Root", "root@fixit.example", "rootpass", Role::Admin)
            .await;
        self.login("root@fixit.example", "rootpass").await
    }

    async fn user_cookie(&self, name: &str, email: &str) -> String {
        self.seed_user(name, email, "userpass", Role::User).await;
        self.login(email, "userpass").await
    }
}

fn issue_body(title: &str) -> Value {
    json!({
        "title": title,
        "location": "Main St & 3rd Ave",
        "description": "Needs attention",
        "category": "Roads",
    })
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new();
    let response = app.json("GET", "/health", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
    assert_eq!(response.body["database"], "in-memory");
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let app = TestApp::new();
    let response = app.json("GET", "/api/nope", None, None).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert!(response.body["error"].is_string());
}

#[tokio::test]
async fn test_anonymous_issue_gets_defaults() {
    let app = TestApp::new();
    let response = app
        .json("POST", "/api/issues", None, Some(issue_body("Pothole")))
        .await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["status"], "Pending");
    assert_eq!(response.body["reporter"], "Citizen X");
    assert_eq!(response.body["imageUrl"], "/assets/issues/issue-1.avif");
    assert!(response.body["id"].is_string());
    assert!(response.body.get("reporterId").is_none());

    let id = response.body["id"].as_str().unwrap();
    let fetched = app
        .json("GET", &format!("/api/issues/{}", id), None, None)
        .await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.body["title"], "Pothole");
}

#[tokio::test]
async fn test_issue_requires_fields() {
    let app = TestApp::new();

    let missing_title = json!({
        "location": "Main St",
        "description": "Broken",
        "category": "Roads",
    });
    let response = app
        .json("POST", "/api/issues", None, Some(missing_title))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "Title is required");

    let mut missing_category = issue_body("Pothole");
    missing_category.as_object_mut().unwrap().remove("category");
    let response = app
        .json("POST", "/api/issues", None, Some(missing_category))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app
        .send(
            Request::builder()
                .method("POST")
                .uri("/api/issues")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_logged_in_reporter_owns_issue() {
    let app = TestApp::new();
    let alice = app.user_cookie("Alice", "alice@fixit.example").await;
    let bob = app.user_cookie("Bob", "bob@fixit.example").await;

    let created = app
        .json(
            "POST",
            "/api/issues",
            Some(&alice),
            Some(json!({
                "title": "Leaking hydrant",
                "location": "Oak Rd",
                "description": "Water on the street",
                "category": "Water Supply",
                "reporter": "Someone Else",
            })),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.body["reporter"], "Alice");
    let uri = format!("/api/issues/{}", created.body["id"].as_str().unwrap());

    let edit = json!({ "status": "In Progress" });
    let by_bob = app.json("PUT", &uri, Some(&bob), Some(edit.clone())).await;
    assert_eq!(by_bob.status, StatusCode::FORBIDDEN);

    let by_bob = app.json("DELETE", &uri, Some(&bob), None).await;
    assert_eq!(by_bob.status, StatusCode::FORBIDDEN);

    let anonymous = app.json("PUT", &uri, None, Some(edit.clone())).await;
    assert_eq!(anonymous.status, StatusCode::FORBIDDEN);

    let by_alice = app.json("PUT", &uri, Some(&alice), Some(edit)).await;
    assert_eq!(by_alice.status, StatusCode::OK);
    assert_eq!(by_alice.body["status"], "In Progress");
    assert_eq!(by_alice.body["title"], "Leaking hydrant");

    let by_alice = app.json("DELETE", &uri, Some(&alice), None).await;
    assert_eq!(by_alice.status, StatusCode::OK);
    assert_eq!(by_alice.body["message"], "Deleted");

    let gone = app.json("GET", &uri, None, None).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_manages_anonymous_issue() {
    let app = TestApp::new();
    let admin = app.admin_cookie().await;
    let user = app.user_cookie("Carol", "carol@fixit.example").await;

    let created = app
        .json("POST", "/api/issues", None, Some(issue_body("Graffiti")))
        .await;
    let uri = format!("/api/issues/{}", created.body["id"].as_str().unwrap());

    let by_user = app.json("DELETE", &uri, Some(&user), None).await;
    assert_eq!(by_user.status, StatusCode::FORBIDDEN);

    let resolve = json!({ "status": "Resolved" });
    let by_admin = app.json("PUT", &uri, Some(&admin), Some(resolve)).await;
    assert_eq!(by_admin.status, StatusCode::OK);
    assert_eq!(by_admin.body["status"], "Resolved");

    let blank_title = json!({ "title": "   " });
    let rejected = app.json("PUT", &uri, Some(&admin), Some(blank_title)).await;
    assert_eq!(rejected.status, StatusCode::BAD_REQUEST);

    let by_admin = app.json("DELETE", &uri, Some(&admin), None).await;
    assert_eq!(by_admin.status, StatusCode::OK);
}

#[tokio::test]
async fn test_missing_and_malformed_issue_ids() {
    let app = TestApp::new();
    let admin = app.admin_cookie().await;
    let missing = format!("/api/issues/{}", uuid::Uuid::new_v4());

    let response = app.json("DELETE", &missing, Some(&admin), None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    // Not found wins over forbidden
    let response = app.json("DELETE", &missing, None, None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = app.json("GET", "/api/issues/42", None, None).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "Invalid ID");
}

#[tokio::test]
async fn test_issue_listing_filters() {
    let app = TestApp::new();

    for (title, reporter, category) in [
        ("Dark streetlight", "Dana", "Electrical"),
        ("Overflowing bins", "Eli", "Waste"),
        ("Cracked road", "Dana", "Roads"),
    ] {
        let response = app
            .json(
                "POST",
                "/api/issues",
                None,
                Some(json!({
                    "title": title,
                    "location": "Somewhere",
                    "description": "Details",
                    "category": category,
                    "reporter": reporter,
                })),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED);
    }

    let all = app.json("GET", "/api/issues", None, None).await;
    let titles: Vec<_> = all
        .body
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["title"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(titles, ["Cracked road", "Overflowing bins", "Dark streetlight"]);

    let mine = app.json("GET", "/api/issues?reporter=Dana", None, None).await;
    assert_eq!(mine.body.as_array().unwrap().len(), 2);

    let others = app
        .json("GET", "/api/issues?reporter=Dana&exclude=1", None, None)
        .await;
    let others = others.body.as_array().unwrap();
    assert_eq!(others.len(), 1);
    assert_eq!(others[0]["reporter"], "Eli");

    let search = app.json("GET", "/api/issues?q=WASTE", None, None).await;
    assert_eq!(search.body.as_array().unwrap().len(), 1);

    let bad_status = app.json("GET", "/api/issues?status=Done", None, None).await;
    assert_eq!(bad_status.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_signup_and_login() {
    let app = TestApp::new();

    let signup = app
        .json(
            "POST",
            "/api/auth/signup",
            None,
            Some(json!({
                "username": " Frank ",
                "email": "Frank@Fixit.Example",
                "password": "frankpass",
                "role": "admin",
            })),
        )
        .await;
    assert_eq!(signup.status, StatusCode::CREATED);
    assert_eq!(signup.body["message"], "Signup success");
    assert_eq!(signup.body["user"]["name"], "Frank");
    assert_eq!(signup.body["user"]["email"], "frank@fixit.example");
    assert_eq!(signup.body["user"]["role"], "user");
    assert!(signup.body["user"].get("password").is_none());

    let duplicate = app
        .json(
            "POST",
            "/api/auth/signup",
            None,
            Some(json!({
                "name": "Frank Again",
                "email": "frank@fixit.example",
                "password": "otherpass",
            })),
        )
        .await;
    assert_eq!(duplicate.status, StatusCode::CONFLICT);

    let login = app
        .json(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": "FRANK@fixit.example", "password": "frankpass" })),
        )
        .await;
    assert_eq!(login.status, StatusCode::OK);
    assert_eq!(login.body["message"], "Login success");
    let set_cookie = login.set_cookie().unwrap();
    assert!(set_cookie.starts_with("auth-token="));
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("SameSite=Lax"));
    assert!(set_cookie.contains("Max-Age=604800"));

    let me = app
        .json("GET", "/api/auth/me", Some(&login.session_cookie()), None)
        .await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["user"]["email"], "frank@fixit.example");
}

#[tokio::test]
async fn test_signup_validation() {
    let app = TestApp::new();

    let response = app
        .json(
            "POST",
            "/api/auth/signup",
            None,
            Some(json!({ "name": "Gus", "email": "not-an-email", "password": "guspass" })),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app
        .json(
            "POST",
            "/api/auth/signup",
            None,
            Some(json!({ "email": "gus@fixit.example" })),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_bad_credentials_set_no_cookie() {
    let app = TestApp::new();
    app.seed_user("Hana", "hana@fixit.example", "hanapass", Role::User)
        .await;

    let wrong_password = app
        .json(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": "hana@fixit.example", "password": "nope" })),
        )
        .await;
    assert_eq!(wrong_password.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password.body["error"], "Invalid email or password");
    assert!(wrong_password.set_cookie().is_none());

    let unknown = app
        .json(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": "nobody@fixit.example", "password": "hanapass" })),
        )
        .await;
    assert_eq!(unknown.status, StatusCode::UNAUTHORIZED);
    assert!(unknown.set_cookie().is_none());

    let empty = app
        .json("POST", "/api/auth/login", None, Some(json!({})))
        .await;
    assert_eq!(empty.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_throttled_after_failures() {
    let app = TestApp::new();
    app.seed_user("Ivy", "ivy@fixit.example", "ivypass", Role::User)
        .await;
    let wrong = json!({ "email": "ivy@fixit.example", "password": "wrong" });

    for _ in 0..3 {
        let response = app
            .json("POST", "/api/auth/login", None, Some(wrong.clone()))
            .await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    }

    let throttled = app
        .json(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": "ivy@fixit.example", "password": "ivypass" })),
        )
        .await;
    assert_eq!(throttled.status, StatusCode::TOO_MANY_REQUESTS);
    assert!(throttled.set_cookie().is_none());
}

#[tokio::test]
async fn test_forged_cookie_is_anonymous() {
    let app = TestApp::new();
    app.seed_user("Jo", "jo@fixit.example", "jopass", Role::Admin)
        .await;

    let plain_identity =
        r#"auth-token={"id":"1","name":"Jo","email":"jo@fixit.example","role":"admin"}"#;
    let me = app.json("GET", "/api/auth/me", Some(plain_identity), None).await;
    assert_eq!(me.status, StatusCode::OK);
    assert!(me.body["user"].is_null());

    let admins = app
        .json("GET", "/api/admins", Some(plain_identity), None)
        .await;
    assert_eq!(admins.status, StatusCode::UNAUTHORIZED);

    let garbage = app
        .json("GET", "/api/auth/me", Some("auth-token=abc.def.ghi"), None)
        .await;
    assert!(garbage.body["user"].is_null());
}

#[tokio::test]
async fn test_logout_clears_cookie() {
    let app = TestApp::new();
    let cookie = app.user_cookie("Kai", "kai@fixit.example").await;

    let logout = app
        .json("POST", "/api/auth/logout", Some(&cookie), None)
        .await;
    assert_eq!(logout.status, StatusCode::OK);
    assert_eq!(logout.body["message"], "Logout success");
    let set_cookie = logout.set_cookie().unwrap();
    assert!(set_cookie.starts_with("auth-token=;"));
    assert!(set_cookie.contains("Max-Age=0"));

    let me = app.json("GET", "/api/auth/me", None, None).await;
    assert!(me.body["user"].is_null());
}

#[tokio::test]
async fn test_session_follows_account_changes() {
    let app = TestApp::new();
    let admin = app.admin_cookie().await;
    let user = app.user_cookie("Lee", "lee@fixit.example").await;

    let me = app.json("GET", "/api/auth/me", Some(&user), None).await;
    let user_id = me.body["user"]["id"].as_str().unwrap().to_string();

    let forbidden = app.json("GET", "/api/stats", Some(&user), None).await;
    assert_eq!(forbidden.status, StatusCode::FORBIDDEN);

    let promote = app
        .json(
            "PUT",
            &format!("/api/admins/{}", user_id),
            Some(&admin),
            Some(json!({ "role": "admin" })),
        )
        .await;
    assert_eq!(promote.status, StatusCode::OK);

    let allowed = app.json("GET", "/api/stats", Some(&user), None).await;
    assert_eq!(allowed.status, StatusCode::OK);

    let deleted = app
        .json("DELETE", &format!("/api/admins/{}", user_id), Some(&admin), None)
        .await;
    assert_eq!(deleted.status, StatusCode::OK);

    let me = app.json("GET", "/api/auth/me", Some(&user), None).await;
    assert!(me.body["user"].is_null());
}

#[tokio::test]
async fn test_admin_routes_require_admin() {
    let app = TestApp::new();
    let user = app.user_cookie("Max", "max@fixit.example").await;

    for (method, uri) in [
        ("GET", "/api/admins"),
        ("GET", "/api/contact"),
        ("GET", "/api/stats"),
    ] {
        let anonymous = app.json(method, uri, None, None).await;
        assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED, "{}", uri);

        let regular = app.json(method, uri, Some(&user), None).await;
        assert_eq!(regular.status, StatusCode::FORBIDDEN, "{}", uri);
    }
}

#[tokio::test]
async fn test_admin_create_list_delete() {
    let app = TestApp::new();
    let admin = app.admin_cookie().await;

    let created = app
        .json(
            "POST",
            "/api/admins",
            Some(&admin),
            Some(json!({
                "name": "Nia",
                "email": "nia@fixit.example",
                "password": "niapass",
            })),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.body["role"], "admin");
    let nia_id = created.body["id"].as_str().unwrap().to_string();

    let duplicate = app
        .json(
            "POST",
            "/api/admins",
            Some(&admin),
            Some(json!({
                "name": "Nia 2",
                "email": "NIA@fixit.example",
                "password": "niapass",
            })),
        )
        .await;
    assert_eq!(duplicate.status, StatusCode::CONFLICT);

    let listed = app.json("GET", "/api/admins", Some(&admin), None).await;
    let emails: Vec<_> = listed
        .body
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["email"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(emails, ["nia@fixit.example", "root@fixit.example"]);
    assert!(listed.body[0].get("password").is_none());

    let uri = format!("/api/admins/{}", nia_id);
    let deleted = app.json("DELETE", &uri, Some(&admin), None).await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert_eq!(deleted.body["message"], "Deleted");

    let listed = app.json("GET", "/api/admins", Some(&admin), None).await;
    assert_eq!(listed.body.as_array().unwrap().len(), 1);

    let again = app.json("DELETE", &uri, Some(&admin), None).await;
    assert_eq!(again.status, StatusCode::NOT_FOUND);

    let malformed = app
        .json("DELETE", "/api/admins/not-a-uuid", Some(&admin), None)
        .await;
    assert_eq!(malformed.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_admin_update_password_rules() {
    let app = TestApp::new();
    let admin = app.admin_cookie().await;
    app.seed_user("Omar", "omar@fixit.example", "omarpass", Role::Admin)
        .await;
    let omar = app
        .state
        .users
        .find_by_email("omar@fixit.example")
        .await
        .unwrap()
        .unwrap();
    let uri = format!("/api/admins/{}", omar.id);

    let wrong = app
        .json(
            "PUT",
            &uri,
            Some(&admin),
            Some(json!({ "name": "Omar K", "currentPassword": "rootpass" })),
        )
        .await;
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong.body["error"], "Incorrect password");

    let missing = app
        .json("PUT", &uri, Some(&admin), Some(json!({ "name": "Omar K" })))
        .await;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);
    assert_eq!(missing.body["error"], "Current password is required");

    let role_only = app
        .json("PUT", &uri, Some(&admin), Some(json!({ "role": "user" })))
        .await;
    assert_eq!(role_only.status, StatusCode::OK);
    assert_eq!(role_only.body["role"], "user");

    let renamed = app
        .json(
            "PUT",
            &uri,
            Some(&admin),
            Some(json!({
                "name": "Omar K",
                "password": "newomarpass",
                "currentPassword": "omarpass",
            })),
        )
        .await;
    assert_eq!(renamed.status, StatusCode::OK);
    assert_eq!(renamed.body["name"], "Omar K");
    app.login("omar@fixit.example", "newomarpass").await;

    let taken = app
        .json(
            "PUT",
            &uri,
            Some(&admin),
            Some(json!({
                "email": "root@fixit.example",
                "currentPassword": "newomarpass",
            })),
        )
        .await;
    assert_eq!(taken.status, StatusCode::CONFLICT);

    let unknown = app
        .json(
            "PUT",
            &format!("/api/admins/{}", uuid::Uuid::new_v4()),
            Some(&admin),
            Some(json!({ "role": "admin" })),
        )
        .await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_contact_messages() {
    let app = TestApp::new();
    let admin = app.admin_cookie().await;

    let created = app
        .json(
            "POST",
            "/api/contact",
            None,
            Some(json!({ "firstName": "A", "lastName": "B", "message": "hi" })),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    let id = created.body["id"].as_str().unwrap().to_string();

    let listed = app.json("GET", "/api/contact", Some(&admin), None).await;
    assert_eq!(listed.status, StatusCode::OK);
    let listed = listed.body.as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["id"], id.as_str());
    assert_eq!(listed[0]["message"], "hi");

    let incomplete = app
        .json(
            "POST",
            "/api/contact",
            None,
            Some(json!({ "firstName": "A", "message": "hi" })),
        )
        .await;
    assert_eq!(incomplete.status, StatusCode::BAD_REQUEST);

    let uri = format!("/api/contact/{}", id);
    let deleted = app.json("DELETE", &uri, Some(&admin), None).await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert_eq!(deleted.body["message"], "Contact deleted successfully");

    let again = app.json("DELETE", &uri, Some(&admin), None).await;
    assert_eq!(again.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_dashboard_stats() {
    let app = TestApp::new();
    let admin = app.admin_cookie().await;

    for title in ["One", "Two"] {
        app.json("POST", "/api/issues", None, Some(issue_body(title)))
            .await;
    }
    let resolved = app
        .json("POST", "/api/issues", None, Some(issue_body("Three")))
        .await;
    let uri = format!("/api/issues/{}", resolved.body["id"].as_str().unwrap());
    app.json(
        "PUT",
        &uri,
        Some(&admin),
        Some(json!({ "status": "Resolved" })),
    )
    .await;
    app.json(
        "POST",
        "/api/contact",
        None,
        Some(json!({ "firstName": "A", "lastName": "B", "message": "hi" })),
    )
    .await;

    let stats = app.json("GET", "/api/stats", Some(&admin), None).await;
    assert_eq!(stats.status, StatusCode::OK);
    assert_eq!(stats.body["adminCount"], 1);
    assert_eq!(stats.body["contactCount"], 1);
    assert_eq!(stats.body["totalIssues"], 3);
    assert_eq!(stats.body["byStatus"]["pending"], 2);
    assert_eq!(stats.body["byStatus"]["resolved"], 1);
    assert_eq!(stats.body["byCategory"]["Roads"], 3);
    assert_eq!(stats.body["byCategory"]["Water Supply"], 0);
    assert_eq!(stats.body["resolvedThisMonth"], 1);
}

fn multipart_request(content_type: &str, data: &[u8]) -> Request<Body> {
    let boundary = "fixit-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"photo\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_upload_image_and_serve_it() {
    let app = TestApp::new();
    let data = b"\x89PNG\r\n\x1a\nnot really a png";

    let uploaded = app.send(multipart_request("image/png", data)).await;
    assert_eq!(uploaded.status, StatusCode::CREATED);
    let url = uploaded.body["url"].as_str().unwrap().to_string();
    assert!(url.starts_with("/uploads/"));
    assert!(url.ends_with(".png"));

    let response = app
        .router
        .clone()
        .oneshot(Request::builder().uri(&url).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
    assert_eq!(
        response.headers()[header::CONTENT_SECURITY_POLICY],
        "default-src 'none'; sandbox"
    );
    let served = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&served[..], &data[..]);
}

#[tokio::test]
async fn test_upload_rejects_non_images() {
    let app = TestApp::new();

    let response = app.send(multipart_request("text/plain", b"hello")).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let no_multipart = app
        .json("POST", "/api/upload", None, Some(json!({ "file": "x" })))
        .await;
    assert_eq!(no_multipart.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upload_rejects_svg() {
    let app = TestApp::new();
    let svg = br#"<svg xmlns="http://www.w3.org/2000/svg"><script>alert(document.cookie)</script></svg>"#;

    let response = app.send(multipart_request("image/svg+xml", svg)).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "Only image files can be uploaded");

    let unknown_image = app.send(multipart_request("image/x-icon", b"\0\0\x01\0")).await;
    assert_eq!(unknown_image.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upload_over_limit_is_payload_too_large() {
    let app = TestApp::with_config(|config| config.max_upload_bytes = 1024);

    let response = app
        .send(multipart_request("image/png", &[0u8; 4096]))
        .await;
    assert_eq!(response.status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(response.body["error"], "Upload exceeds the size limit");

    let small = app.send(multipart_request("image/png", &[1u8; 256])).await;
    assert_eq!(small.status, StatusCode::CREATED);
}
