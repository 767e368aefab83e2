//! End-to-end: the reqwest client against the axum development backend on an
//! ephemeral port.

use anyhow::Result;

use murmur::api::{Backend, HttpBackend};
use murmur::app::App;
use murmur::auth::MutationOutcome;
use murmur::config::ClientConfig;
use murmur::error::AppError;
use murmur::feed::FeedState;
use murmur::identity::{LoginForm, LoginRequest, Session, SessionKind, SignupForm, SignupRequest};
use murmur::notify::ToastKind;
use murmur::router::View;
use murmur::server::store::{DEMO_PASSWORD, DEMO_USERNAME, MSG_INVALID_CREDENTIALS, MSG_USERNAME_TAKEN};
use murmur::server::MSG_BAD_BODY;

async fn client_for(seed_demo: bool) -> Result<(ClientConfig, tokio::task::JoinHandle<()>)> {
    murmur::logging::init_for_tests();
    let (addr, handle) = murmur::server::spawn("127.0.0.1", seed_demo).await?;
    let cfg = ClientConfig::new(&format!("http://{}", addr))?;
    Ok((cfg, handle))
}

fn alice_signup() -> SignupForm {
    SignupForm {
        email: "alice@example.com".into(),
        username: "alice".into(),
        full_name: "Alice Liddell".into(),
        password: "secret1".into(),
        confirm_password: "secret1".into(),
    }
}

#[tokio::test]
async fn http_backend_speaks_the_contract() -> Result<()> {
    let (cfg, server) = client_for(true).await?;
    let backend = HttpBackend::new(&cfg)?;

    // no cookie yet
    match backend.current_user().await {
        Err(AppError::Rejected { status, message }) => {
            assert_eq!(status, 401);
            assert!(message.is_some());
        }
        other => panic!("expected 401, got {:?}", other),
    }

    let bad = LoginRequest { username: DEMO_USERNAME.into(), password: "nope".into() };
    assert_eq!(
        backend.login(&bad).await.unwrap_err(),
        AppError::rejected(400, Some(MSG_INVALID_CREDENTIALS.into()))
    );

    let good = LoginRequest { username: DEMO_USERNAME.into(), password: DEMO_PASSWORD.into() };
    assert_eq!(backend.login(&good).await?.username, DEMO_USERNAME);
    // cookie jar carries the session
    assert_eq!(backend.current_user().await?.username, DEMO_USERNAME);

    let posts = backend.all_posts().await?;
    assert_eq!(posts.len(), 3);
    assert!(posts.windows(2).all(|w| w[0].created_at >= w[1].created_at));

    backend.logout().await?;
    assert!(backend.current_user().await.is_err());

    let dup = SignupRequest {
        email: "someone@example.com".into(),
        username: DEMO_USERNAME.into(),
        full_name: "Someone".into(),
        password: "secret1".into(),
    };
    assert_eq!(backend.signup(&dup).await.unwrap_err(), AppError::rejected(400, Some(MSG_USERNAME_TAKEN.into())));

    server.abort();
    Ok(())
}

#[tokio::test]
async fn full_client_flow_over_http() -> Result<()> {
    let (cfg, server) = client_for(false).await?;
    let app = App::new(&cfg)?;
    app.start();

    let nav = app.settle().await;
    assert_eq!(app.session(), Session::Anonymous);
    assert_eq!(nav.frame.view(), Some(&View::Landing));
    assert_eq!(app.load_posts().await, FeedState::Empty);

    let nav = app.navigate("/notifications");
    assert_eq!(nav.location, "/login");

    let mut form = alice_signup();
    assert_eq!(app.signup(&mut form).await, MutationOutcome::Succeeded);
    let nav = app.settle().await;
    assert_eq!(app.session().kind(), SessionKind::Authenticated);
    // the login page redirects home once authenticated
    assert_eq!(nav.location, "/");
    assert_eq!(nav.frame.view(), Some(&View::Feed));

    assert_eq!(app.logout().await, MutationOutcome::Succeeded);
    app.settle().await;
    assert_eq!(app.session(), Session::Anonymous);
    assert_eq!(app.navigate("/profile/alice").location, "/login");

    let outcome = app.login(&LoginForm::new("alice", "wrong-one")).await;
    assert_eq!(outcome, MutationOutcome::Failed { message: MSG_INVALID_CREDENTIALS.into() });
    assert_eq!(app.session(), Session::Anonymous);

    assert_eq!(app.login(&LoginForm::new("alice", "secret1")).await, MutationOutcome::Succeeded);
    app.settle().await;
    assert_eq!(app.navigate("/profile/alice").frame.view(), Some(&View::Profile { username: "alice".into() }));

    assert_eq!(app.notifier().count(ToastKind::Error), 1);
    assert_eq!(app.notifier().count(ToastKind::Success), 3);

    server.abort();
    Ok(())
}

#[tokio::test]
async fn unreachable_backend_is_anonymous() -> Result<()> {
    murmur::logging::init_for_tests();
    // bind then drop to get a port nobody listens on
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);

    let app = App::new(&ClientConfig::new(&format!("http://{}", addr))?)?;
    app.start();
    app.settle().await;
    assert_eq!(app.session(), Session::Anonymous);
    assert!(app.notifier().snapshot().is_empty());
    Ok(())
}

#[tokio::test]
async fn malformed_bodies_get_json_errors() -> Result<()> {
    let (cfg, server) = client_for(false).await?;
    let client = reqwest::Client::new();
    for path in [murmur::api::LOGIN_PATH, murmur::api::SIGNUP_PATH] {
        let url = cfg.endpoint(path)?;
        // no content type, then broken JSON
        let bare = client.post(url.clone()).body("username=alice").send().await?;
        let broken = client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body("{\"username\":")
            .send()
            .await?;
        for resp in [bare, broken] {
            assert_eq!(resp.status().as_u16(), 400, "{path}");
            let body: serde_json::Value = resp.json().await?;
            assert_eq!(body["error"], MSG_BAD_BODY, "{path}");
        }
    }
    server.abort();
    Ok(())
}

#[tokio::test]
async fn null_error_field_still_authenticates() -> Result<()> {
    murmur::logging::init_for_tests();
    let routes = axum::Router::new().route(
        murmur::api::ME_PATH,
        axum::routing::get(|| async { axum::Json(serde_json::json!({ "username": "alice", "error": null })) }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let server = tokio::spawn(async move {
        let _ = axum::serve(listener, routes).await;
    });

    let app = App::new(&ClientConfig::new(&format!("http://{}", addr))?)?;
    app.start();
    app.settle().await;
    assert_eq!(app.session().kind(), SessionKind::Authenticated);
    assert_eq!(app.session().identity().map(|i| i.username.as_str()), Some("alice"));

    server.abort();
    Ok(())
}
