use std::collections::HashMap;

use clap::Parser;
use fake::{
    faker::{
        company::en::{Buzzword, CompanyName},
        internet::en::SafeEmail,
        lorem::en::{Paragraph, Sentence},
        name::en::{FirstName, LastName},
    },
    Fake,
};
use resume_builder::{
    config::Settings,
    domain::{
        AnnouncementInput, CreateResumeRequest, CreateResumeTemplateRequest, CreateUserRequest,
        UpdateUserRequest, UserRole,
    },
    service::ServiceContext,
    web::uploads::{save_uploaded_image, UploadedImage, TEMPLATE_PREVIEWS_DIR},
};
use sqlx::sqlite::SqlitePoolOptions;

/// 1x1 transparent PNG used as a stand-in template preview.
const PLACEHOLDER_PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52,
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F, 0x15, 0xC4,
    0x89, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00, 0x01, 0x00, 0x00,
    0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE,
    0x42, 0x60, 0x82,
];

const SAMPLE_TEMPLATES: [(&str, &str); 3] = [
    ("Classic", "A single-column layout with serif headings."),
    ("Modern", "Bold headings and a sidebar for skills."),
    ("Minimal", "Plenty of white space, nothing else."),
];

#[derive(Parser, Debug)]
#[command(about = "Populate the database with demo accounts, templates and résumés")]
struct Args {
    /// Database URL; defaults to the configured one
    #[arg(long)]
    database_url: Option<String>,

    /// Number of regular member accounts to create
    #[arg(long, default_value_t = 3)]
    users: usize,

    /// Résumés created for every member
    #[arg(long, default_value_t = 2)]
    resumes_per_user: usize,

    /// Password shared by every seeded account
    #[arg(long, default_value = "password123")]
    password: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    println!("🌱 Starting database seeding...");

    let mut settings = Settings::new().unwrap_or_default();
    if let Some(url) = args.database_url {
        settings.database.url = url;
    }

    let db_pool = SqlitePoolOptions::new()
        .max_connections(settings.database.max_connections)
        .connect(&settings.database.url)
        .await?;

    println!("📋 Running migrations...");
    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await?;

    let context = ServiceContext::new(db_pool, &settings);

    // Staff account
    println!("👥 Creating accounts...");
    let staff = context.account_service.create_user(CreateUserRequest {
        username: "staff".to_string(),
        password: args.password.clone(),
        email: Some("staff@resume-builder.local".to_string()),
        role: UserRole::Staff,
    }).await?;
    println!("  ✅ Created staff user (staff / {})", args.password);

    let mut members = Vec::with_capacity(args.users);
    for i in 0..args.users {
        let first: String = FirstName().fake();
        let last: String = LastName().fake();
        let username = format!("{}{}", first.to_lowercase(), i + 1);

        let user = context.account_service.create_user(CreateUserRequest {
            username,
            password: args.password.clone(),
            email: Some(SafeEmail().fake()),
            role: UserRole::Member,
        }).await?;

        let user = context.account_service.update_profile(&user, UpdateUserRequest {
            first_name: Some(first),
            last_name: Some(last),
            ..Default::default()
        }).await?;

        members.push(user);
    }
    println!("  ✅ Created {} members", members.len());

    // Templates
    println!("🎨 Creating templates...");
    let media_root = settings.media.root_path();
    let mut template_ids = Vec::new();
    for (name, description) in SAMPLE_TEMPLATES {
        let preview = save_uploaded_image(
            &media_root,
            TEMPLATE_PREVIEWS_DIR,
            &UploadedImage {
                filename: format!("{}.png", name.to_lowercase()),
                data: PLACEHOLDER_PNG.to_vec(),
            },
            settings.media.max_upload_bytes,
        ).await?;

        let template = context.template_service.create(&staff, CreateResumeTemplateRequest {
            name: name.to_string(),
            preview_image: preview,
            description: description.to_string(),
        }).await?;
        template_ids.push(template.id);
    }
    println!("  ✅ Created {} templates", template_ids.len());

    // Résumés with filled-in sections
    println!("📄 Creating résumés...");
    let mut created = 0;
    for member in &members {
        for n in 0..args.resumes_per_user {
            let company: String = CompanyName().fake();
            let resume = context.resume_service.create_resume(member, CreateResumeRequest {
                title: format!("{} - {}", member.display_name(), company),
                template_id: template_ids.get(n % template_ids.len().max(1)).copied(),
                photo: None,
            }).await?;

            let sections = context.resume_service.get_resume(member, resume.id).await?.sections;
            let contents: HashMap<i64, String> = sections
                .iter()
                .map(|section| {
                    let content = match section.order {
                        0 => member.email.clone().unwrap_or_default(),
                        3 => (0..5).map(|_| Buzzword().fake::<String>()).collect::<Vec<_>>().join(", "),
                        _ => Paragraph(2..4).fake(),
                    };
                    (section.id, content)
                })
                .collect();
            context.resume_service.save_sections(member, resume.id, &contents).await?;

            context.resume_service
                .add_section(member, resume.id, "Projects", &Paragraph(1..3).fake::<String>())
                .await?;

            created += 1;
        }
    }
    println!("  ✅ Created {} résumés", created);

    // Announcements
    println!("📢 Creating announcements...");
    for _ in 0..3 {
        context.announcement_service.create(&staff, AnnouncementInput {
            title: Sentence(3..6).fake(),
            content: Paragraph(2..5).fake(),
        }).await?;
    }
    println!("  ✅ Created 3 announcements");

    println!("🎉 Seeding complete!");

    Ok(())
}
