//! Development seeding tool: populates sample categories and posts through
//! the repositories so a fresh database has something to paginate.

use std::process;

use time::OffsetDateTime;
use vellum::application::repos::{
    CategoriesRepo, CreateCategoryParams, CreatePostParams, PostsRepo, RepoError, public_id_from,
};
use vellum::config;
use vellum::infra::db::PostgresRepositories;

const CATEGORIES: &[(&str, &str)] = &[
    ("Sports", "Sports news and updates"),
    ("Technology", "Latest tech news and innovations"),
    ("Entertainment", "Movies, music, and entertainment news"),
    ("Lifestyle", "Lifestyle tips and trends"),
    ("News", "General news and current events"),
    ("Education", "Educational content and resources"),
    ("Art", "Art and creative expressions"),
];

const POSTS: &[(&str, &str, &str)] = &[
    (
        "Getting started with the API",
        "A quick tour of the endpoints, cursors, and cache behavior.",
        "Technology",
    ),
    (
        "Weekend match roundup",
        "Results and highlights from the weekend fixtures.",
        "Sports",
    ),
    (
        "Five habits for calmer mornings",
        "Small routines that compound into a noticeably better day.",
        "Lifestyle",
    ),
    (
        "Festival season preview",
        "The releases and shows worth planning around this year.",
        "Entertainment",
    ),
    (
        "Learning in public",
        "Why writing up what you study makes it stick.",
        "Education",
    ),
];

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("seed failed: {err}");
        process::exit(1);
    }
    println!("database seeded successfully");
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let (_args, settings) = config::load_with_cli()?;
    let repos = PostgresRepositories::connect(&settings.database).await?;

    seed_categories(&repos).await?;
    seed_posts(&repos).await?;
    Ok(())
}

async fn seed_categories(repos: &PostgresRepositories) -> Result<(), RepoError> {
    if !repos.list_categories().await?.is_empty() {
        println!("categories already exist, skipping");
        return Ok(());
    }

    for (name, description) in CATEGORIES {
        repos
            .create_category(CreateCategoryParams {
                name: (*name).to_string(),
                description: (*description).to_string(),
            })
            .await?;
    }
    println!("seeded {} categories", CATEGORIES.len());
    Ok(())
}

async fn seed_posts(repos: &PostgresRepositories) -> Result<(), RepoError> {
    // Stagger public ids so the sample set pages deterministically.
    let base = public_id_from(OffsetDateTime::now_utc());

    for (offset, (title, content, category)) in POSTS.iter().enumerate() {
        let result = repos
            .create_post(CreatePostParams {
                public_id: base + offset as i64,
                title: (*title).to_string(),
                content: (*content).to_string(),
                caption: String::new(),
                category: (*category).to_string(),
                tag: String::new(),
                image: String::new(),
                trivia: String::new(),
            })
            .await;

        match result {
            Ok(_) => {}
            Err(RepoError::Duplicate { .. }) => {
                println!("post `{title}` already seeded, skipping");
            }
            Err(err) => return Err(err),
        }
    }
    println!("seeded {} posts", POSTS.len());
    Ok(())
}
