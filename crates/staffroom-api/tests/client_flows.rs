//! Integration tests for the assembled client: catalog, cache, session and
//! HTTP adapter working against a mock backend.
//!
//! Run with: cargo test -p staffroom-api --test client_flows

use assert_json_diff::assert_json_include;
use futures_util::future::join_all;
use serde_json::json;
use staffroom_api::{Api, JobFilter, QueryView};
use staffroom_auth::{RouteDecision, require_authenticated};
use staffroom_config::ClientConfig;
use staffroom_core::{ApiError, JobDraft, LoginRequest, Role, SignupRequest};
use std::sync::Arc;
use std::time::Duration;
use tokio_test::assert_ok;
use url::Url;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> ClientConfig {
    ClientConfig::default()
        .with_base_url(Url::parse(&format!("{}/api", server.uri())).expect("mock server url"))
}

fn api_for(server: &MockServer) -> Api {
    Api::new(config_for(server)).expect("catalog binds")
}

fn user_envelope(id: &str, email: &str, role: &str) -> serde_json::Value {
    json!({
        "success": true,
        "user": {
            "id": id,
            "email": email,
            "name": "Taylor",
            "role": role,
        }
    })
}

fn job_summary(id: &str, title: &str) -> serde_json::Value {
    json!({
        "id": id,
        "title": title,
        "schoolName": "Northside High",
        "status": "open",
        "postedAt": "2026-08-01T09:00:00Z",
    })
}

// ----------------------------------------------------------------------------
// De-duplication
// ----------------------------------------------------------------------------

#[tokio::test]
async fn test_concurrent_subscriptions_share_one_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/jobs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "jobs": [job_summary("j1", "Math Teacher"), job_summary("j2", "Art Teacher")],
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = api_for(&server);
    let mut subs = (0..6)
        .map(|_| api.jobs.list_jobs.subscribe(JobFilter::default()).unwrap())
        .collect::<Vec<_>>();

    let views = join_all(subs.iter_mut().map(|sub| sub.settled())).await;
    for view in views {
        let jobs = view.data().expect("shared payload");
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].title, "Math Teacher");
    }
    assert_eq!(api.store().stats().entries, 1);
}

#[tokio::test]
async fn test_distinct_arguments_are_distinct_cache_entries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/applications"))
        .and(query_param("applicant", "u-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "applications": [{
                "id": "a-1",
                "jobId": "j1",
                "applicantId": "u-1",
                "status": "applied",
                "submittedAt": "2026-08-15T10:00:00Z",
            }],
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/applications"))
        .and(query_param("applicant", "u-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "applications": [],
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = api_for(&server);
    let mut first = api
        .applications
        .my_applications
        .subscribe("u-1".to_string())
        .unwrap();
    let mut second = api
        .applications
        .my_applications
        .subscribe("u-2".to_string())
        .unwrap();

    let first_view = first.settled().await;
    let second_view = second.settled().await;

    assert_eq!(first_view.data().unwrap().len(), 1);
    assert_eq!(first_view.data().unwrap()[0].applicant_id, "u-1");
    assert!(second_view.data().unwrap().is_empty());
    assert_eq!(api.store().stats().entries, 2);
}

// ----------------------------------------------------------------------------
// Invalidation through mutations
// ----------------------------------------------------------------------------

#[tokio::test]
async fn test_create_job_refetches_roster_but_not_open_detail() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/jobs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "jobs": [job_summary("j1", "Math Teacher")],
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/jobs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "jobs": [job_summary("j1", "Math Teacher"), job_summary("j2", "Chemistry Teacher")],
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/jobs/j1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "job": {
                "id": "j1",
                "title": "Math Teacher",
                "description": "Algebra and calculus",
                "schoolName": "Northside High",
                "status": "open",
                "postedAt": "2026-08-01T09:00:00Z",
            },
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/jobs"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "success": true,
            "job": {
                "id": "j2",
                "title": "Chemistry Teacher",
                "description": "Lab heavy",
                "schoolName": "Northside High",
                "status": "draft",
                "postedAt": "2026-08-21T09:00:00Z",
            },
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = api_for(&server);
    let mut roster = api.jobs.list_jobs.subscribe(JobFilter::default()).unwrap();
    let mut detail = api.jobs.job.subscribe("j1".to_string()).unwrap();
    assert_eq!(roster.settled().await.data().unwrap().len(), 1);
    assert!(detail.settled().await.is_ready());

    let draft = JobDraft {
        title: "Chemistry Teacher".into(),
        description: "Lab heavy".into(),
        location: None,
        subject: None,
        salary_min: None,
        salary_max: None,
        requirements: vec![],
    };
    let created = api.jobs.create_job.run(&draft).await.unwrap();
    assert_eq!(created.id, "j2");

    // The roster was invalidated and refetches; the open detail entry only
    // provides its item tag and is left alone (the j1 mock's expect(1)
    // verifies that on shutdown).
    let refreshed = roster.settled().await;
    assert_eq!(refreshed.data().unwrap().len(), 2);

    let recorded = server.received_requests().await.unwrap();
    let posted = recorded
        .iter()
        .find(|r| r.method.as_str() == "POST" && r.url.path() == "/api/jobs")
        .expect("create request recorded");
    assert_json_include!(
        actual: serde_json::from_slice::<serde_json::Value>(&posted.body).unwrap(),
        expected: json!({"title": "Chemistry Teacher", "description": "Lab heavy"})
    );
}

#[tokio::test]
async fn test_failed_mutation_invalidates_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/jobs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "jobs": [job_summary("j1", "Math Teacher")],
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/jobs"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"message": "Database offline"})),
        )
        .mount(&server)
        .await;

    let api = api_for(&server);
    let mut roster = api.jobs.list_jobs.subscribe(JobFilter::default()).unwrap();
    roster.settled().await;

    let draft = JobDraft {
        title: "Doomed".into(),
        description: "Never lands".into(),
        location: None,
        subject: None,
        salary_min: None,
        salary_max: None,
        requirements: vec![],
    };
    let err = api.jobs.create_job.run(&draft).await.unwrap_err();
    assert_eq!(err.status_code(), Some(500));
    assert_eq!(err.user_message(), "Database offline");

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(roster.current().is_ready());
}

// ----------------------------------------------------------------------------
// Login and session
// ----------------------------------------------------------------------------

#[tokio::test]
async fn test_login_feeds_session_and_bearer_travels() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "token=tok-e2e; Path=/")
                .set_body_json(user_envelope("u-1", "dana@school.example", "employer")),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .and(header("authorization", "Bearer tok-e2e"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(user_envelope("u-1", "dana@school.example", "employer")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let api = api_for(&server);
    assert!(api.session().is_pending());

    let user = tokio_test::assert_ok!(
        api.login(LoginRequest {
            email: "dana@school.example".into(),
            password: "pw".into(),
        })
        .await
    );
    assert_eq!(user.role, Some(Role::Employer));
    assert!(api.session().is_authenticated());
    assert_eq!(
        require_authenticated(api.session()),
        RouteDecision::Allow
    );

    // The cookie set at login now travels as a bearer header.
    let probed = api.auth.current_user.fetch(&()).await.unwrap();
    assert_eq!(probed.id, "u-1");
}

#[tokio::test]
async fn test_client_side_validation_never_reaches_the_network() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/signup"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let api = api_for(&server);

    let err = api
        .login(LoginRequest {
            email: "  ".into(),
            password: "pw".into(),
        })
        .await
        .unwrap_err();
    assert_eq!(err, ApiError::validation("Please fill in all fields"));

    let err = api
        .signup(SignupRequest {
            name: "Jo".into(),
            email: "jo@x.y".into(),
            password: "one".into(),
            confirm_password: "two".into(),
            role: Role::Employee,
        })
        .await
        .unwrap_err();
    assert_eq!(err, ApiError::validation("Passwords do not match"));
    assert!(api.session().is_pending());
}

// ----------------------------------------------------------------------------
// Logout
// ----------------------------------------------------------------------------

#[tokio::test]
async fn test_logout_clears_session_and_cache_before_network_finishes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "token=tok-x; Path=/")
                .set_body_json(user_envelope("u-1", "dana@school.example", "college")),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/jobs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "jobs": [job_summary("j1", "Math Teacher")],
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/logout"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": true}))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let api = Arc::new(api_for(&server));
    api.login(LoginRequest {
        email: "dana@school.example".into(),
        password: "pw".into(),
    })
    .await
    .unwrap();
    let mut roster = api.jobs.list_jobs.subscribe(JobFilter::default()).unwrap();
    roster.settled().await;

    let logging_out = tokio::spawn({
        let api = api.clone();
        async move { api.logout().await }
    });

    // Session and cache are gone while the backend call is still in flight.
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!api.session().is_authenticated());
    assert_eq!(
        require_authenticated(api.session()),
        RouteDecision::RedirectToLogin
    );
    assert_eq!(api.store().stats().entries, 0);
    assert_eq!(roster.current(), QueryView::Uninitialized);

    logging_out.await.unwrap();
}

// ----------------------------------------------------------------------------
// Boot sequence
// ----------------------------------------------------------------------------

#[tokio::test]
async fn test_boot_session_installs_user_on_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(user_envelope("u-9", "sam@college.example", "college")),
        )
        .mount(&server)
        .await;

    let api = api_for(&server);
    assert!(api.session().is_pending());
    api.boot_session().await;

    let user = api.session().user().expect("session installed");
    assert_eq!(user.email, "sam@college.example");
    assert_eq!(user.role, Some(Role::College));
}

#[tokio::test]
async fn test_boot_session_resolves_401_to_logged_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"message": "Not authenticated"})),
        )
        .mount(&server)
        .await;

    let api = api_for(&server);
    api.boot_session().await;

    assert!(!api.session().is_authenticated());
    assert!(!api.session().is_pending());
    // The probe bypasses the cache; nothing from the failed boot lingers.
    assert_eq!(api.store().stats().entries, 0);
}

#[tokio::test]
async fn test_boot_session_treats_server_failure_as_logged_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
        .mount(&server)
        .await;

    let api = api_for(&server);
    api.boot_session().await;
    assert!(!api.session().is_authenticated());
    assert!(!api.session().is_pending());
}

// ----------------------------------------------------------------------------
// Polling
// ----------------------------------------------------------------------------

#[tokio::test]
async fn test_notifications_poll_on_configured_interval() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/notifications"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "notifications": [{
                "id": "n-1",
                "message": "Your application was viewed",
                "read": false,
                "createdAt": "2026-08-20T12:30:00Z",
            }],
        })))
        .mount(&server)
        .await;

    let config = config_for(&server).with_poll_interval(Duration::from_millis(40));
    let api = Api::new(config).unwrap();

    let mut sub = api.notifications.notifications.subscribe(()).unwrap();
    let view = sub.settled().await;
    assert_eq!(view.data().unwrap()[0].id, "n-1");

    tokio::time::sleep(Duration::from_millis(200)).await;
    let while_mounted = server.received_requests().await.unwrap().len();
    assert!(while_mounted >= 3, "expected repeated polls, saw {while_mounted}");

    drop(sub);
    tokio::time::sleep(Duration::from_millis(200)).await;
    let after_drop = server.received_requests().await.unwrap().len();
    assert!(after_drop <= while_mounted + 1);
}
