mod common;

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use resume_builder::{api::create_app, domain::UserRole, service::ServiceContext};
use tower::ServiceExt;

struct TestApp {
    app: Router,
    context: Arc<ServiceContext>,
    _media: tempfile::TempDir,
}

async fn test_app() -> anyhow::Result<TestApp> {
    let media = tempfile::tempdir()?;
    let settings = common::test_settings(media.path());
    let pool = common::test_pool().await?;
    let context = Arc::new(ServiceContext::new(pool, &settings));
    let app = create_app(context.clone(), Arc::new(settings));

    Ok(TestApp { app, context, _media: media })
}

fn form(uri: &str, fields: &[(&str, &str)], session: Option<&str>) -> Request<Body> {
    let mut builder = Request::post(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(token) = session {
        builder = builder.header(header::COOKIE, format!("session={}", token));
    }
    builder
        .body(Body::from(serde_urlencoded::to_string(fields).unwrap()))
        .unwrap()
}

fn get(uri: &str, session: Option<&str>) -> Request<Body> {
    let mut builder = Request::get(uri);
    if let Some(token) = session {
        builder = builder.header(header::COOKIE, format!("session={}", token));
    }
    builder.body(Body::empty()).unwrap()
}

fn location(response: &Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

fn session_token(response: &Response) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.strip_prefix("session="))
        .map(|v| v.split(';').next().unwrap_or_default().to_string())
        .find(|v| !v.is_empty())
}

async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8_lossy(&bytes).into_owned()
}

async fn login(app: &Router, username: &str) -> anyhow::Result<String> {
    let response = app
        .clone()
        .oneshot(form("/login", &[("username", username), ("password", common::PASSWORD)], None))
        .await?;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    Ok(session_token(&response).expect("session cookie"))
}

#[tokio::test]
async fn test_health_check() -> anyhow::Result<()> {
    let test = test_app().await?;

    let response = test.app.clone().oneshot(get("/health", None)).await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("healthy"));

    Ok(())
}

#[tokio::test]
async fn test_anonymous_users_are_sent_to_login() -> anyhow::Result<()> {
    let test = test_app().await?;

    let response = test.app.clone().oneshot(get("/resume/1/edit", None)).await?;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login?next=%2Fresume%2F1%2Fedit");

    // Public pages render without a session
    for uri in ["/", "/templates", "/announcements", "/login", "/register"] {
        let response = test.app.clone().oneshot(get(uri, None)).await?;
        assert_eq!(response.status(), StatusCode::OK, "GET {}", uri);
    }

    Ok(())
}

#[tokio::test]
async fn test_register_then_login_with_next() -> anyhow::Result<()> {
    let test = test_app().await?;

    let response = test.app.clone().oneshot(form(
        "/register",
        &[("username", "alice"), ("password1", "long-enough"), ("password2", "long-enough")],
        None,
    )).await?;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
    let token = session_token(&response).expect("registration logs the user in");

    let response = test.app.clone().oneshot(get("/profile", Some(&token))).await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("alice"));

    // Duplicate usernames and mismatched passwords re-render the form
    let response = test.app.clone().oneshot(form(
        "/register",
        &[("username", "alice"), ("password1", "long-enough"), ("password2", "long-enough")],
        None,
    )).await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("already exists"));

    let response = test.app.clone().oneshot(form(
        "/register",
        &[("username", "bob"), ("password1", "long-enough"), ("password2", "different!")],
        None,
    )).await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("didn&#x27;t match"));

    // Login honours a local `next`
    let response = test.app.clone().oneshot(form(
        "/login",
        &[("username", "alice"), ("password", "long-enough"), ("next", "/resumes")],
        None,
    )).await?;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/resumes");

    let response = test.app.clone().oneshot(form(
        "/login",
        &[("username", "alice"), ("password", "wrong-password")],
        None,
    )).await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(session_token(&response).is_none());
    assert!(body_text(response).await.contains("Please enter a correct username and password."));

    Ok(())
}

#[tokio::test]
async fn test_logout_ends_the_session() -> anyhow::Result<()> {
    let test = test_app().await?;
    common::create_user(&test.context, "alice", UserRole::Member).await?;
    let token = login(&test.app, "alice").await?;

    let response = test.app.clone().oneshot(form("/logout", &[], Some(&token))).await?;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let response = test.app.clone().oneshot(get("/resumes", Some(&token))).await?;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(location(&response).starts_with("/login"));

    Ok(())
}

#[tokio::test]
async fn test_resume_lifecycle_over_http() -> anyhow::Result<()> {
    let test = test_app().await?;
    let alice = common::create_user(&test.context, "alice", UserRole::Member).await?;
    common::create_user(&test.context, "bob", UserRole::Member).await?;
    let alice_token = login(&test.app, "alice").await?;
    let bob_token = login(&test.app, "bob").await?;

    // Create through the multipart form
    let boundary = "resume-builder-test-boundary";
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"title\"\r\n\r\nJane Doe\r\n\
         --{b}\r\nContent-Disposition: form-data; name=\"template\"\r\n\r\n\r\n\
         --{b}\r\nContent-Disposition: form-data; name=\"photo\"; filename=\"\"\r\n\
         Content-Type: application/octet-stream\r\n\r\n\r\n\
         --{b}--\r\n",
        b = boundary
    );
    let request = Request::post("/resume/create")
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={}", boundary))
        .header(header::COOKIE, format!("session={}", alice_token))
        .body(Body::from(body))?;
    let response = test.app.clone().oneshot(request).await?;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let resumes = test.context.resume_service.list_resumes(&alice).await?;
    assert_eq!(resumes.len(), 1);
    let resume = &resumes[0];
    assert_eq!(resume.title, "Jane Doe");
    assert_eq!(resume.photo, None);
    assert_eq!(location(&response), format!("/resume/{}/edit", resume.id));

    // Bulk save
    let sections = test.context.resume_service.get_resume(&alice, resume.id).await?.sections;
    let field = format!("section_content_{}", sections[3].id);
    let response = test.app.clone().oneshot(form(
        &format!("/resume/{}/edit", resume.id),
        &[(field.as_str(), "Rust, SQL"), ("save_sections", "1")],
        Some(&alice_token),
    )).await?;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let sections = test.context.resume_service.get_resume(&alice, resume.id).await?.sections;
    assert_eq!(sections[3].content, "Rust, SQL");

    // Add a section, then an empty one which changes nothing
    let edit_uri = format!("/resume/{}/edit", resume.id);
    let response = test.app.clone().oneshot(form(
        &edit_uri,
        &[("section_title", "Projects"), ("section_content", "CV tool"), ("add_section", "1")],
        Some(&alice_token),
    )).await?;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let response = test.app.clone().oneshot(form(
        &edit_uri,
        &[("section_title", ""), ("section_content", ""), ("add_section", "1")],
        Some(&alice_token),
    )).await?;
    assert_eq!(response.status(), StatusCode::OK);
    let sections = test.context.resume_service.get_resume(&alice, resume.id).await?.sections;
    assert_eq!(sections.len(), 5);
    assert_eq!(sections[4].order, 4);

    // Export
    let response = test.app.clone()
        .oneshot(get(&format!("/resume/{}/export/pdf", resume.id), Some(&alice_token)))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"Jane Doe.pdf\""
    );
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    assert!(bytes.starts_with(b"%PDF"));

    let response = test.app.clone()
        .oneshot(get(&format!("/resume/{}/export/docx", resume.id), Some(&alice_token)))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
    );

    // Someone else's résumé
    for uri in [
        format!("/resume/{}/edit", resume.id),
        format!("/resume/{}/view", resume.id),
        format!("/resume/{}/delete", resume.id),
        format!("/resume/{}/export/pdf", resume.id),
    ] {
        let response = test.app.clone().oneshot(get(&uri, Some(&bob_token))).await?;
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "GET {}", uri);
    }
    let response = test.app.clone()
        .oneshot(form(&format!("/section/{}/delete", sections[0].id), &[], Some(&bob_token)))
        .await?;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = test.app.clone().oneshot(get("/resume/9999/edit", Some(&alice_token))).await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Section delete via the DELETE verb
    let request = Request::delete(format!("/section/{}", sections[4].id))
        .header(header::COOKIE, format!("session={}", alice_token))
        .body(Body::empty())?;
    let response = test.app.clone().oneshot(request).await?;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), format!("/resume/{}/edit", resume.id));

    // Clone, then delete the original after the confirmation page
    let response = test.app.clone()
        .oneshot(form(&format!("/resume/{}/clone", resume.id), &[], Some(&alice_token)))
        .await?;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let response = test.app.clone()
        .oneshot(get(&format!("/resume/{}/delete", resume.id), Some(&alice_token)))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(test.context.resume_service.list_resumes(&alice).await?.len(), 2);

    let response = test.app.clone()
        .oneshot(form(&format!("/resume/{}/delete", resume.id), &[], Some(&alice_token)))
        .await?;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/resumes");

    let remaining = test.context.resume_service.list_resumes(&alice).await?;
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].title, "Copy Jane Doe");

    Ok(())
}

#[tokio::test]
async fn test_announcement_pages_require_staff() -> anyhow::Result<()> {
    let test = test_app().await?;
    common::create_user(&test.context, "member", UserRole::Member).await?;
    common::create_user(&test.context, "staff", UserRole::Staff).await?;
    let member = login(&test.app, "member").await?;
    let staff = login(&test.app, "staff").await?;

    let response = test.app.clone().oneshot(get("/announcement/create", Some(&member))).await?;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = test.app.clone()
        .oneshot(form("/announcement/create", &[("title", "Hi"), ("content", "x")], Some(&member)))
        .await?;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Staff sees validation errors instead of a save
    let response = test.app.clone()
        .oneshot(form("/announcement/create", &[("title", ""), ("content", "x")], Some(&staff)))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Title must be between 1 and 255 characters"));
    assert!(test.context.announcement_service.list().await?.is_empty());

    let response = test.app.clone()
        .oneshot(form("/announcement/create", &[("title", "Launch"), ("content", "We are live")], Some(&staff)))
        .await?;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/announcements");

    let response = test.app.clone().oneshot(get("/", None)).await?;
    assert!(body_text(response).await.contains("We are live"));

    Ok(())
}

#[tokio::test]
async fn test_rejected_section_still_consumes_pending_flash() -> anyhow::Result<()> {
    use axum_extra::extract::CookieJar;
    use resume_builder::{
        domain::CreateResumeRequest,
        web::flash::{self, FlashLevel, FLASH_COOKIE},
    };

    let test = test_app().await?;
    let alice = common::create_user(&test.context, "alice", UserRole::Member).await?;
    let token = login(&test.app, "alice").await?;
    let resume = test.context.resume_service.create_resume(&alice, CreateResumeRequest {
        title: "CV".to_string(),
        template_id: None,
        photo: None,
    }).await?;

    let pending = flash::push(CookieJar::new(), FlashLevel::Success, "Changes saved!");
    let pending = pending.get(FLASH_COOKIE).map(|c| c.value().to_string()).unwrap_or_default();

    let long_title = "T".repeat(101);
    let body = serde_urlencoded::to_string([
        ("section_title", long_title.as_str()),
        ("section_content", "content"),
        ("add_section", "1"),
    ])?;
    let request = Request::post(format!("/resume/{}/edit", resume.id))
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .header(header::COOKIE, format!("session={}; {}={}", token, FLASH_COOKIE, pending))
        .body(Body::from(body))?;
    let response = test.app.clone().oneshot(request).await?;

    assert_eq!(response.status(), StatusCode::OK);
    let cleared = response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|v| v.starts_with(&format!("{}=;", FLASH_COOKIE)));
    assert!(cleared, "the pending flash cookie is cleared");

    let html = body_text(response).await;
    assert!(html.contains("Changes saved!"));
    assert!(html.contains("Section title must be at most 100 characters"));
    assert_eq!(test.context.resume_service.get_resume(&alice, resume.id).await?.sections.len(), 4);

    Ok(())
}
