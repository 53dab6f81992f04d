mod common;

use std::collections::HashMap;

use resume_builder::{
    domain::{CreateResumeRequest, CreateResumeTemplateRequest, UserRole, DEFAULT_SECTIONS},
    error::AppError,
    export::ExportFormat,
    repository::ResumeRepository,
};

fn request(title: &str) -> CreateResumeRequest {
    CreateResumeRequest {
        title: title.to_string(),
        template_id: None,
        photo: None,
    }
}

#[tokio::test]
async fn test_create_resume_adds_default_sections() -> anyhow::Result<()> {
    let context = common::test_context().await?;
    let user = common::create_user(&context, "alice", UserRole::Member).await?;

    let resume = context.resume_service.create_resume(&user, request("  Backend CV ")).await?;
    assert_eq!(resume.title, "Backend CV");
    assert_eq!(resume.user_id, user.id);

    let full = context.resume_service.get_resume(&user, resume.id).await?;
    let orders: Vec<i64> = full.sections.iter().map(|s| s.order).collect();
    assert_eq!(orders, vec![0, 1, 2, 3]);

    for (section, (title, content)) in full.sections.iter().zip(DEFAULT_SECTIONS) {
        assert_eq!(section.title, title);
        assert_eq!(section.content, content);
    }

    Ok(())
}

#[tokio::test]
async fn test_create_resume_validates_input() -> anyhow::Result<()> {
    let context = common::test_context().await?;
    let user = common::create_user(&context, "alice", UserRole::Member).await?;

    let err = context.resume_service.create_resume(&user, request("   ")).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let err = context.resume_service
        .create_resume(&user, request(&"x".repeat(256)))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let missing_template = CreateResumeRequest { template_id: Some(999), ..request("CV") };
    let err = context.resume_service.create_resume(&user, missing_template).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    assert!(context.resume_service.list_resumes(&user).await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_list_only_returns_own_resumes() -> anyhow::Result<()> {
    let context = common::test_context().await?;
    let alice = common::create_user(&context, "alice", UserRole::Member).await?;
    let bob = common::create_user(&context, "bob", UserRole::Member).await?;

    let first = context.resume_service.create_resume(&alice, request("One")).await?;
    let second = context.resume_service.create_resume(&alice, request("Two")).await?;
    context.resume_service.create_resume(&bob, request("Bob's")).await?;

    let ids: Vec<i64> = context.resume_service
        .list_resumes(&alice)
        .await?
        .iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(ids, vec![first.id, second.id]);

    Ok(())
}

#[tokio::test]
async fn test_non_owner_is_forbidden_and_missing_is_not_found() -> anyhow::Result<()> {
    let context = common::test_context().await?;
    let alice = common::create_user(&context, "alice", UserRole::Member).await?;
    let mallory = common::create_user(&context, "mallory", UserRole::Staff).await?;
    let service = &context.resume_service;

    let resume = service.create_resume(&alice, request("Private")).await?;

    assert!(matches!(service.get_resume(&mallory, resume.id).await, Err(AppError::Forbidden)));
    assert!(matches!(service.clone_resume(&mallory, resume.id).await, Err(AppError::Forbidden)));
    assert!(matches!(service.delete_resume(&mallory, resume.id).await, Err(AppError::Forbidden)));
    assert!(matches!(
        service.export(&mallory, resume.id, ExportFormat::Pdf).await,
        Err(AppError::Forbidden)
    ));
    assert!(matches!(
        service.add_section(&mallory, resume.id, "Hack", "x").await,
        Err(AppError::Forbidden)
    ));

    let section_id = service.get_resume(&alice, resume.id).await?.sections[0].id;
    assert!(matches!(service.delete_section(&mallory, section_id).await, Err(AppError::Forbidden)));

    assert!(matches!(service.get_resume(&alice, 9999).await, Err(AppError::NotFound(_))));
    assert!(matches!(service.delete_section(&alice, 9999).await, Err(AppError::NotFound(_))));

    // Nothing was touched
    assert_eq!(service.get_resume(&alice, resume.id).await?.sections.len(), 4);
    assert_eq!(service.list_resumes(&mallory).await?.len(), 0);

    Ok(())
}

#[tokio::test]
async fn test_bulk_save_ignores_foreign_sections() -> anyhow::Result<()> {
    let context = common::test_context().await?;
    let alice = common::create_user(&context, "alice", UserRole::Member).await?;
    let bob = common::create_user(&context, "bob", UserRole::Member).await?;
    let service = &context.resume_service;

    let mine = service.create_resume(&alice, request("Mine")).await?;
    let theirs = service.create_resume(&bob, request("Theirs")).await?;

    let my_sections = service.get_resume(&alice, mine.id).await?.sections;
    let their_sections = service.get_resume(&bob, theirs.id).await?.sections;

    let mut contents = HashMap::new();
    contents.insert(my_sections[1].id, "Rust engineer at Acme".to_string());
    contents.insert(their_sections[0].id, "overwritten".to_string());
    contents.insert(424242, "nobody".to_string());

    let updated = service.save_sections(&alice, mine.id, &contents).await?;
    assert_eq!(updated, 1);

    let my_sections = service.get_resume(&alice, mine.id).await?.sections;
    assert_eq!(my_sections[1].content, "Rust engineer at Acme");
    assert_eq!(my_sections[0].content, DEFAULT_SECTIONS[0].1);

    let their_sections = service.get_resume(&bob, theirs.id).await?.sections;
    assert_eq!(their_sections[0].content, DEFAULT_SECTIONS[0].1);

    Ok(())
}

#[tokio::test]
async fn test_add_section_order_and_empty_input() -> anyhow::Result<()> {
    let context = common::test_context().await?;
    let user = common::create_user(&context, "alice", UserRole::Member).await?;
    let service = &context.resume_service;

    let resume = service.create_resume(&user, request("CV")).await?;

    let added = service.add_section(&user, resume.id, "Projects", "resume-builder").await?;
    assert_eq!(added.map(|s| s.order), Some(4));

    // Empty title or content is ignored
    assert!(service.add_section(&user, resume.id, "  ", "content").await?.is_none());
    assert!(service.add_section(&user, resume.id, "Title", "   ").await?.is_none());
    assert_eq!(service.get_resume(&user, resume.id).await?.sections.len(), 5);

    // With every section removed the next one starts again at zero
    for section in service.get_resume(&user, resume.id).await?.sections {
        let parent = service.delete_section(&user, section.id).await?;
        assert_eq!(parent, resume.id);
    }
    let first = service.add_section(&user, resume.id, "Summary", "Hello").await?;
    assert_eq!(first.map(|s| s.order), Some(0));

    Ok(())
}

#[tokio::test]
async fn test_clone_copies_sections() -> anyhow::Result<()> {
    let context = common::test_context().await?;
    let user = common::create_user(&context, "alice", UserRole::Member).await?;
    let service = &context.resume_service;

    let original = service.create_resume(&user, request("Data CV")).await?;
    service.add_section(&user, original.id, "Projects", "ETL pipeline").await?;

    let cloned = service.clone_resume(&user, original.id).await?;
    assert_ne!(cloned.id, original.id);
    assert_eq!(cloned.user_id, user.id);
    assert_eq!(cloned.title, "Copy Data CV");

    let key = |s: &resume_builder::domain::ResumeSection| (s.title.clone(), s.content.clone(), s.order);
    let mut source: Vec<_> = service.get_resume(&user, original.id).await?.sections.iter().map(key).collect();
    let mut copy: Vec<_> = service.get_resume(&user, cloned.id).await?.sections.iter().map(key).collect();
    source.sort();
    copy.sort();
    assert_eq!(source.len(), 5);
    assert_eq!(source, copy);

    // Long titles stay within the column limit
    let long = service.create_resume(&user, request(&"t".repeat(255))).await?;
    let long_clone = service.clone_resume(&user, long.id).await?;
    assert_eq!(long_clone.title.chars().count(), 255);
    assert!(long_clone.title.starts_with("Copy "));

    Ok(())
}

#[tokio::test]
async fn test_delete_resume_removes_sections() -> anyhow::Result<()> {
    let context = common::test_context().await?;
    let user = common::create_user(&context, "alice", UserRole::Member).await?;

    let resume = context.resume_service.create_resume(&user, request("CV")).await?;
    context.resume_service.delete_resume(&user, resume.id).await?;

    assert!(context.resume_repo.find_by_id(resume.id).await?.is_none());
    assert!(context.resume_repo.list_sections(resume.id).await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_deleting_template_keeps_resumes() -> anyhow::Result<()> {
    let context = common::test_context().await?;
    let staff = common::create_user(&context, "staff", UserRole::Staff).await?;
    let user = common::create_user(&context, "alice", UserRole::Member).await?;

    let template = context.template_service.create(&staff, CreateResumeTemplateRequest {
        name: "Classic".to_string(),
        preview_image: "template_previews/classic.png".to_string(),
        description: String::new(),
    }).await?;

    let resume = context.resume_service.create_resume(&user, CreateResumeRequest {
        template_id: Some(template.id),
        ..request("CV")
    }).await?;
    assert_eq!(resume.template_id, Some(template.id));

    // Members cannot delete templates
    assert!(matches!(
        context.template_service.delete(&user, template.id).await,
        Err(AppError::Forbidden)
    ));

    context.template_service.delete(&staff, template.id).await?;

    let resume = context.resume_service.get_resume(&user, resume.id).await?.resume;
    assert_eq!(resume.template_id, None);

    Ok(())
}

#[tokio::test]
async fn test_export_uses_title_and_format() -> anyhow::Result<()> {
    let context = common::test_context().await?;
    let user = common::create_user(&context, "alice", UserRole::Member).await?;

    let resume = context.resume_service.create_resume(&user, request("Jane Doe")).await?;

    let pdf = context.resume_service.export(&user, resume.id, ExportFormat::Pdf).await?;
    assert_eq!(pdf.filename, "Jane Doe.pdf");
    assert_eq!(pdf.content_type, "application/pdf");
    assert!(pdf.bytes.starts_with(b"%PDF"));

    let docx = context.resume_service.export(&user, resume.id, ExportFormat::Docx).await?;
    assert_eq!(docx.filename, "Jane Doe.docx");
    assert!(docx.bytes.starts_with(b"PK"));

    Ok(())
}
