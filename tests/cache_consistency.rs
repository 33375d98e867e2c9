//! Cache-coherency properties: transparency of warm reads, invalidation
//! after every mutation class, counter consistency, and the intentional
//! staleness window for view counts.

mod common;

use std::sync::atomic::Ordering;

use vellum::application::categories::{CreateCategoryCommand, UpdateCategoryCommand};
use vellum::application::comments::CreateCommentCommand;
use vellum::application::knowledge::{CreateKnowledgeCommand, UpdateKnowledgeCommand};
use vellum::application::pagination::PageRequest;
use vellum::application::posts::{CreatePostCommand, UpdatePostCommand};

use common::{post_at, seed_posts, test_app};

fn tech_post_command(title: &str) -> CreatePostCommand {
    CreatePostCommand {
        title: title.to_string(),
        content: "content".to_string(),
        category: "tech".to_string(),
        ..Default::default()
    }
}

#[tokio::test]
async fn warm_read_equals_cold_read_and_skips_the_store() {
    let app = test_app();
    seed_posts(
        &app,
        vec![post_at(1, 1_000, "tech"), post_at(2, 2_000, "tech")],
    );

    let cold = app
        .posts
        .list(Some("tech"), PageRequest::first(10))
        .await
        .expect("cold read");
    let warm = app
        .posts
        .list(Some("tech"), PageRequest::first(10))
        .await
        .expect("warm read");

    assert_eq!(cold, warm);
    assert_eq!(app.store.post_list_queries.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn distinct_limits_do_not_share_cache_entries() {
    let app = test_app();
    seed_posts(
        &app,
        vec![
            post_at(1, 1_000, "tech"),
            post_at(2, 2_000, "tech"),
            post_at(3, 3_000, "tech"),
        ],
    );

    let narrow = app
        .posts
        .list(None, PageRequest::first(2))
        .await
        .expect("limit 2");
    let wide = app
        .posts
        .list(None, PageRequest::first(3))
        .await
        .expect("limit 3");

    assert_eq!(narrow.data.len(), 2);
    assert_eq!(wide.data.len(), 3);
    assert_eq!(app.store.post_list_queries.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn post_create_invalidates_cached_lists() {
    let app = test_app();
    seed_posts(&app, vec![post_at(1, 1_000, "tech")]);

    let before = app
        .posts
        .list(Some("tech"), PageRequest::first(10))
        .await
        .expect("warm the cache");
    assert_eq!(before.data.len(), 1);

    app.posts
        .create(tech_post_command("fresh"))
        .await
        .expect("create post");

    let after = app
        .posts
        .list(Some("tech"), PageRequest::first(10))
        .await
        .expect("re-read");
    assert_eq!(after.data.len(), 2);
    // The second list read went back to the store.
    assert_eq!(app.store.post_list_queries.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn post_update_refreshes_singleton_and_search() {
    let app = test_app();
    seed_posts(&app, vec![post_at(7, 1_000, "tech")]);

    let stale = app.posts.get(7).await.expect("warm singleton");
    assert_eq!(stale.title, "Post 7");
    let found = app
        .posts
        .search("post", PageRequest::first(10))
        .await
        .expect("warm search");
    assert_eq!(found.data.len(), 1);

    app.posts
        .update(
            7,
            UpdatePostCommand {
                title: Some("Renamed".to_string()),
                ..Default::default()
            },
        )
        .await
        .expect("update");

    let fresh = app.posts.get(7).await.expect("re-read singleton");
    assert_eq!(fresh.title, "Renamed");
    let requeried = app
        .posts
        .search("renamed", PageRequest::first(10))
        .await
        .expect("search after update");
    assert_eq!(requeried.data.len(), 1);
}

#[tokio::test]
async fn post_delete_purges_singleton() {
    let app = test_app();
    seed_posts(&app, vec![post_at(7, 1_000, "tech")]);

    app.posts.get(7).await.expect("warm singleton");
    app.posts.delete(7).await.expect("delete");

    let missing = app.posts.get(7).await;
    assert!(missing.is_err(), "deleted post served from cache");
}

#[tokio::test]
async fn comment_create_increments_counter_and_purges_comment_pages() {
    let app = test_app();
    seed_posts(&app, vec![post_at(42, 1_000, "tech")]);

    // Warm the comment list and the post singleton.
    let empty = app
        .comments
        .list_for_post(42, PageRequest::first(10))
        .await
        .expect("warm comments");
    assert!(empty.data.is_empty());
    assert_eq!(app.posts.get(42).await.expect("warm post").comment_count, 0);

    app.comments
        .create(CreateCommentCommand {
            post_id: 42,
            name: None,
            comment: "first!".to_string(),
        })
        .await
        .expect("create comment");

    // The comment list read misses cache and sees the new comment.
    let comments = app
        .comments
        .list_for_post(42, PageRequest::first(10))
        .await
        .expect("re-read comments");
    assert_eq!(comments.data.len(), 1);
    assert_eq!(comments.data[0].name, "Anonymous");
    assert_eq!(app.store.comment_list_queries.load(Ordering::SeqCst), 2);

    // The post singleton was purged, so the embedded counter is fresh.
    assert_eq!(app.posts.get(42).await.expect("re-read post").comment_count, 1);
}

#[tokio::test]
async fn comment_churn_keeps_counter_consistent() {
    let app = test_app();
    seed_posts(&app, vec![post_at(42, 1_000, "tech")]);

    let mut ids = Vec::new();
    for n in 0..5 {
        let comment = app
            .comments
            .create(CreateCommentCommand {
                post_id: 42,
                name: Some(format!("user-{n}")),
                comment: format!("comment {n}"),
            })
            .await
            .expect("create");
        ids.push(comment.id);
    }
    for id in ids.drain(..2) {
        app.comments.delete(id).await.expect("delete");
    }

    assert_eq!(app.posts.get(42).await.expect("post").comment_count, 3);
}

#[tokio::test]
async fn comments_of_other_posts_stay_cached() {
    let app = test_app();
    seed_posts(
        &app,
        vec![post_at(1, 1_000, "tech"), post_at(2, 2_000, "tech")],
    );

    app.comments
        .list_for_post(1, PageRequest::first(10))
        .await
        .expect("warm post 1 comments");
    app.comments
        .list_for_post(2, PageRequest::first(10))
        .await
        .expect("warm post 2 comments");
    assert_eq!(app.store.comment_list_queries.load(Ordering::SeqCst), 2);

    app.comments
        .create(CreateCommentCommand {
            post_id: 1,
            name: None,
            comment: "only post 1".to_string(),
        })
        .await
        .expect("create");

    // Post 2's page is untouched and still served from cache.
    app.comments
        .list_for_post(2, PageRequest::first(10))
        .await
        .expect("still cached");
    assert_eq!(app.store.comment_list_queries.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn view_increment_refreshes_singleton_but_leaves_lists_cached() {
    let app = test_app();
    seed_posts(&app, vec![post_at(9, 1_000, "tech")]);

    app.posts
        .list(None, PageRequest::first(10))
        .await
        .expect("warm list");
    assert_eq!(app.posts.get(9).await.expect("warm post").views, 0);

    app.posts.increment_view(9).await.expect("count view");

    // Singleton purged: the view count is fresh.
    assert_eq!(app.posts.get(9).await.expect("fresh post").views, 1);
    // List untouched: still served from cache, by design.
    app.posts
        .list(None, PageRequest::first(10))
        .await
        .expect("cached list");
    assert_eq!(app.store.post_list_queries.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn category_rename_is_visible_after_invalidation() {
    let app = test_app();

    let created = app
        .categories
        .create(CreateCategoryCommand {
            name: "Tech".to_string(),
            description: "tech things".to_string(),
        })
        .await
        .expect("create");

    let listed = app.categories.list().await.expect("warm list");
    assert_eq!(listed.len(), 1);

    app.categories
        .update(
            created.id,
            UpdateCategoryCommand {
                name: Some("Technology".to_string()),
                description: None,
            },
        )
        .await
        .expect("rename");

    let relisted = app.categories.list().await.expect("re-read list");
    assert_eq!(relisted[0].name, "Technology");
    assert_eq!(
        app.categories.get(created.id).await.expect("singleton").name,
        "Technology"
    );
}

#[tokio::test]
async fn duplicate_category_names_conflict_case_insensitively() {
    let app = test_app();

    app.categories
        .create(CreateCategoryCommand {
            name: "Tech".to_string(),
            description: String::new(),
        })
        .await
        .expect("create");

    let duplicate = app
        .categories
        .create(CreateCategoryCommand {
            name: "TECH".to_string(),
            description: String::new(),
        })
        .await;
    assert!(duplicate.is_err(), "case-insensitive duplicate accepted");
}

#[tokio::test]
async fn knowledge_mutations_purge_the_whole_namespace() {
    let app = test_app();

    let article = app
        .knowledge
        .create(CreateKnowledgeCommand {
            title: "Cursors".to_string(),
            content: "<p>how paging works</p>".to_string(),
        })
        .await
        .expect("create");

    let listed = app
        .knowledge
        .list(PageRequest::first(10))
        .await
        .expect("warm list");
    assert_eq!(listed.data.len(), 1);
    app.knowledge.get(article.id).await.expect("warm singleton");

    app.knowledge
        .update(
            article.id,
            UpdateKnowledgeCommand {
                title: Some("Cursor pagination".to_string()),
                content: None,
            },
        )
        .await
        .expect("update");

    let relisted = app
        .knowledge
        .list(PageRequest::first(10))
        .await
        .expect("re-read list");
    assert_eq!(relisted.data[0].title, "Cursor pagination");
    assert_eq!(
        app.knowledge.get(article.id).await.expect("singleton").title,
        "Cursor pagination"
    );
}

#[tokio::test]
async fn dashboard_reflects_post_mutations() {
    let app = test_app();
    seed_posts(&app, vec![post_at(1, 1_000, "tech")]);

    let before = app.posts.dashboard().await.expect("warm stats");
    assert_eq!(before.total_posts, 1);

    app.posts
        .create(tech_post_command("another"))
        .await
        .expect("create");

    let after = app.posts.dashboard().await.expect("fresh stats");
    assert_eq!(after.total_posts, 2);
}

#[tokio::test]
async fn home_digest_caps_posts_per_category() {
    let app = test_app();
    let posts: Vec<_> = (0..8i64)
        .map(|n| post_at(n, 1_000 + n, "tech"))
        .chain((10..12i64).map(|n| post_at(n, 2_000 + n, "sports")))
        .collect();
    seed_posts(&app, posts);

    let digest = app.posts.home().await.expect("digest");
    assert_eq!(digest.categories.len(), 2);
    for entry in &digest.categories {
        assert!(entry.posts.len() <= common::HOME_DIGEST_SIZE as usize);
    }
}
