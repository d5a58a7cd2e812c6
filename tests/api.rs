use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, Response, StatusCode};
use lead_gateway::client_ip::ForwardedTrust;
use lead_gateway::rate_limit::{InMemoryStore, ManualClock, Policies, RateLimiter};
use lead_gateway::server::build_router;
use lead_gateway::state::AppState;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

fn app_with(policies: Policies, trust: ForwardedTrust) -> (Router, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(1_700_000_000_000));
    let limiter = RateLimiter::new(Arc::new(InMemoryStore::new()), clock.clone());
    let state = Arc::new(AppState::new(limiter, policies, trust));
    (build_router(state), clock)
}

fn app() -> (Router, Arc<ManualClock>) {
    app_with(Policies::default(), ForwardedTrust::Any)
}

fn post(path: &str, ip: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(path)
        .header("content-type", "application/json")
        .header("x-forwarded-for", format!("{ip}, 10.0.0.1"))
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn contact_body() -> Value {
    json!({
        "firstName": "Claire",
        "lastName": "Martin",
        "email": "claire.martin@example.fr",
        "company": "Martin SAS",
        "message": "Nous envisageons une cession."
    })
}

async fn body_json(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}

fn header<'a>(response: &'a Response<Body>, name: &str) -> &'a str {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

#[tokio::test]
async fn contact_submission_is_accepted() {
    let (app, _) = app();

    let response = app
        .oneshot(post("/api/contact", "203.0.113.5", contact_body()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], json!(true));
    assert_eq!(
        body["message"],
        json!("Votre message a bien été envoyé. Nous vous recontacterons rapidement.")
    );
}

#[tokio::test]
async fn sixth_contact_request_gets_429_with_reset_headers() {
    let (app, _) = app();

    for _ in 0..5 {
        let response = app
            .clone()
            .oneshot(post("/api/contact", "203.0.113.5", contact_body()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .oneshot(post("/api/contact", "203.0.113.5", contact_body()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(header(&response, "x-ratelimit-remaining"), "0");
    assert_eq!(header(&response, "x-ratelimit-reset"), "1700000060000");
    let body = body_json(response).await;
    assert_eq!(
        body["error"],
        json!("Trop de requêtes. Veuillez réessayer dans quelques instants.")
    );
}

#[tokio::test]
async fn window_reopens_after_reset_time() {
    let (app, clock) = app();
    let body = json!({ "email": "lecteur@example.fr" });

    for _ in 0..3 {
        app.clone()
            .oneshot(post("/api/newsletter", "198.51.100.7", body.clone()))
            .await
            .unwrap();
    }
    let limited = app
        .clone()
        .oneshot(post("/api/newsletter", "198.51.100.7", body.clone()))
        .await
        .unwrap();
    assert_eq!(limited.status(), StatusCode::TOO_MANY_REQUESTS);

    clock.advance(60_001);
    let reopened = app
        .oneshot(post("/api/newsletter", "198.51.100.7", body))
        .await
        .unwrap();
    assert_eq!(reopened.status(), StatusCode::OK);
}

#[tokio::test]
async fn clients_are_limited_independently() {
    let (app, _) = app();
    let body = json!({ "email": "lecteur@example.fr" });

    for _ in 0..4 {
        app.clone()
            .oneshot(post("/api/newsletter", "198.51.100.7", body.clone()))
            .await
            .unwrap();
    }

    let other = app
        .oneshot(post("/api/newsletter", "198.51.100.8", body))
        .await
        .unwrap();
    assert_eq!(other.status(), StatusCode::OK);
}

#[tokio::test]
async fn endpoints_keep_separate_quotas() {
    let (app, _) = app();
    let newsletter = json!({ "email": "lecteur@example.fr" });

    for _ in 0..4 {
        app.clone()
            .oneshot(post("/api/newsletter", "198.51.100.7", newsletter.clone()))
            .await
            .unwrap();
    }

    let response = app
        .oneshot(post("/api/contact", "198.51.100.7", contact_body()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn throttling_happens_before_validation() {
    let (app, _) = app();
    let empty = json!({});

    for _ in 0..3 {
        let response = app
            .clone()
            .oneshot(post("/api/newsletter", "192.0.2.44", empty.clone()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], json!("L'email est requis"));
    }

    let response = app
        .oneshot(post("/api/newsletter", "192.0.2.44", empty))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn contact_validation_errors() {
    let (app, _) = app();

    let mut missing = contact_body();
    missing["lastName"] = json!("");
    let response = app
        .clone()
        .oneshot(post("/api/contact", "192.0.2.50", missing))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error"],
        json!("Tous les champs requis doivent être remplis")
    );

    let mut bad_email = contact_body();
    bad_email["email"] = json!("claire.martin@example");
    let response = app
        .clone()
        .oneshot(post("/api/contact", "192.0.2.50", bad_email))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], json!("Format d'email invalide"));

    let garbage = Request::builder()
        .method("POST")
        .uri("/api/contact")
        .header("content-type", "application/json")
        .header("x-forwarded-for", "192.0.2.50")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.oneshot(garbage).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn valuation_lead_is_accepted() {
    let (app, _) = app();
    let body = json!({
        "revenue": 4_500_000,
        "ebitda": 620_000,
        "sector": "distribution",
        "email": "dirigeant@example.fr",
        "company": "Distri Ouest",
        "result": { "low": 3_100_000, "high": 4_000_000 }
    });

    let response = app
        .oneshot(post("/api/valuation", "203.0.113.9", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["success"], json!(true));
}

fn valuation_body() -> Value {
    json!({
        "revenue": "2 000 000",
        "ebitda": 310_000,
        "sector": "services",
        "email": "dg@example.fr",
        "result": 1_900_000
    })
}

#[tokio::test]
async fn fourth_newsletter_request_gets_429_with_reset_headers() {
    let (app, clock) = app();
    let body = json!({ "email": "lecteur@example.fr" });

    for _ in 0..3 {
        let response = app
            .clone()
            .oneshot(post("/api/newsletter", "203.0.113.30", body.clone()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        clock.advance(1_000);
    }

    let response = app
        .oneshot(post("/api/newsletter", "203.0.113.30", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(header(&response, "x-ratelimit-remaining"), "0");
    // window opened by the first request
    assert_eq!(header(&response, "x-ratelimit-reset"), "1700000060000");
}

#[tokio::test]
async fn eleventh_valuation_request_gets_429_with_reset_headers() {
    let (app, _) = app();

    for _ in 0..10 {
        let response = app
            .clone()
            .oneshot(post("/api/valuation", "203.0.113.31", valuation_body()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .oneshot(post("/api/valuation", "203.0.113.31", valuation_body()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(header(&response, "x-ratelimit-remaining"), "0");
    assert_eq!(header(&response, "x-ratelimit-reset"), "1700000060000");
}

#[tokio::test]
async fn non_string_fields_are_judged_like_the_form() {
    let (app, _) = app();

    let mut numeric_name = contact_body();
    numeric_name["firstName"] = json!(42);
    let response = app
        .clone()
        .oneshot(post("/api/contact", "192.0.2.60", numeric_name))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let mut numeric_email = contact_body();
    numeric_email["email"] = json!(42);
    let response = app
        .oneshot(post("/api/contact", "192.0.2.60", numeric_email))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], json!("Format d'email invalide"));
}

#[tokio::test]
async fn generic_api_policy_spans_endpoints() {
    let mut policies = Policies::default();
    policies.apply_override("api=2/60000").unwrap();
    let (app, _) = app_with(policies, ForwardedTrust::Any);

    let newsletter = json!({ "email": "lecteur@example.fr" });
    app.clone()
        .oneshot(post("/api/newsletter", "203.0.113.20", newsletter))
        .await
        .unwrap();
    app.clone()
        .oneshot(post("/api/contact", "203.0.113.20", contact_body()))
        .await
        .unwrap();

    let response = app
        .oneshot(post("/api/contact", "203.0.113.20", contact_body()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(header(&response, "x-ratelimit-remaining"), "0");
}

#[tokio::test]
async fn untrusted_peers_cannot_rotate_identity() {
    let trust = ForwardedTrust::parse("10.0.0.254").unwrap();
    let (app, _) = app_with(Policies::default(), trust);
    let body = json!({ "email": "lecteur@example.fr" });

    // no trusted peer in front, so every spoofed address lands in one bucket
    for i in 0..3 {
        let response = app
            .clone()
            .oneshot(post("/api/newsletter", &format!("198.51.100.{i}"), body.clone()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .oneshot(post("/api/newsletter", "198.51.100.99", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn health_and_metrics_are_not_throttled() {
    let (app, _) = app();

    let response = app
        .clone()
        .oneshot(post("/api/newsletter", "203.0.113.77", json!({ "email": "a@b.fr" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let health = app
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(health.status(), StatusCode::OK);
    assert_eq!(body_json(health).await["status"], json!("healthy"));

    let metrics = app
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(metrics.status(), StatusCode::OK);
    let bytes = to_bytes(metrics.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("lead_gateway_requests_total"));
    assert!(text.contains("lead_gateway_rate_limit_decisions_total"));
    assert!(text.contains("policy=\"newsletter\""));
    assert!(text.contains("policy=\"api\""));
}
