mod common;

use resume_builder::{
    domain::{CreateResumeRequest, CreateUserRequest, NewSection, UpdateUserRequest, UserRole},
    repository::{ResumeRepository, SqliteResumeRepository, SqliteUserRepository, UserRepository},
};

#[tokio::test]
async fn test_user_crud() -> anyhow::Result<()> {
    let pool = common::test_pool().await?;
    let repo = SqliteUserRepository::new(pool.clone());

    // Create
    let user = repo.create(CreateUserRequest {
        username: "jdoe".to_string(),
        password: "secure_password123".to_string(),
        email: Some("jdoe@example.com".to_string()),
        role: UserRole::Member,
    }).await?;
    assert_eq!(user.username, "jdoe");
    assert_eq!(user.email.as_deref(), Some("jdoe@example.com"));
    assert_eq!(user.role, UserRole::Member);
    assert!(!user.is_staff());

    // Find by id and username
    let found = repo.find_by_id(user.id).await?;
    assert_eq!(found.map(|u| u.id), Some(user.id));
    let found = repo.find_by_username("jdoe").await?;
    assert_eq!(found.map(|u| u.id), Some(user.id));
    assert!(repo.find_by_username("nobody").await?.is_none());

    // The stored hash is not the password
    let hash = repo.password_hash("jdoe").await?.expect("hash stored");
    assert_ne!(hash, "secure_password123");
    assert!(hash.starts_with("$argon2"));

    // Update
    let updated = repo.update(user.id, UpdateUserRequest {
        email: Some(None),
        first_name: Some("Jane".to_string()),
        last_name: Some("Doe".to_string()),
        role: Some(UserRole::Staff),
    }).await?;
    assert_eq!(updated.email, None);
    assert_eq!(updated.display_name(), "Jane Doe");
    assert!(updated.is_staff());

    // Delete
    repo.delete(user.id).await?;
    assert!(repo.find_by_id(user.id).await?.is_none());

    Ok(())
}

#[tokio::test]
async fn test_deleting_user_removes_resumes_and_sections() -> anyhow::Result<()> {
    let pool = common::test_pool().await?;
    let users = SqliteUserRepository::new(pool.clone());
    let resumes = SqliteResumeRepository::new(pool.clone());

    let user = users.create(CreateUserRequest {
        username: "leaver".to_string(),
        password: "secure_password123".to_string(),
        email: None,
        role: UserRole::Member,
    }).await?;

    let resume = resumes.create_with_sections(
        user.id,
        CreateResumeRequest { title: "CV".to_string(), template_id: None, photo: None },
        &NewSection::defaults(),
    ).await?;
    assert_eq!(resumes.list_sections(resume.id).await?.len(), 4);

    users.delete(user.id).await?;

    assert!(resumes.find_by_id(resume.id).await?.is_none());
    assert!(resumes.list_sections(resume.id).await?.is_empty());

    let (orphans,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM resume_sections")
        .fetch_one(&pool)
        .await?;
    assert_eq!(orphans, 0);

    Ok(())
}
