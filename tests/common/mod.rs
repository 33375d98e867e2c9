//! Shared test fixtures: in-memory repositories over the document-store
//! traits, plus a fully wired set of services backed by the in-memory
//! key-value store. Repository call counters let tests assert whether a
//! read was served from cache or fell through to the store.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use vellum::application::categories::CategoryService;
use vellum::application::comments::CommentService;
use vellum::application::knowledge::KnowledgeService;
use vellum::application::pagination::{Cursor, CursorKeyed, CursorPage, PageRequest};
use vellum::application::posts::PostService;
use vellum::application::repos::{
    CategoriesRepo, CommentsRepo, CreateCategoryParams, CreateCommentParams,
    CreateKnowledgeParams, CreatePostParams, KnowledgeRepo, PostQueryFilter, PostsRepo, RepoError,
    UpdateCategoryParams, UpdateKnowledgeParams, UpdatePostParams,
};
use vellum::cache::{CacheConfig, CacheService, Invalidator};
use vellum::domain::entities::{
    CategoryDigest, CategoryRecord, CommentRecord, DashboardStats, KnowledgeRecord, PostRecord,
};
use vellum::infra::kv::MemoryKv;

#[derive(Default)]
pub struct MemoryRepos {
    pub posts: Mutex<Vec<PostRecord>>,
    pub comments: Mutex<Vec<CommentRecord>>,
    pub categories: Mutex<Vec<CategoryRecord>>,
    pub knowledge: Mutex<Vec<KnowledgeRecord>>,
    /// Number of `list_posts` store queries actually executed.
    pub post_list_queries: AtomicUsize,
    /// Number of `list_for_post` store queries actually executed.
    pub comment_list_queries: AtomicUsize,
    /// Number of `find_by_public_id` store queries actually executed.
    pub post_find_queries: AtomicUsize,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

/// Canonical sort plus compound-cursor filter and limit+1 over-fetch, the
/// same contract the Postgres repositories satisfy.
fn page_of<T: CursorKeyed + Clone>(rows: &[T], page: PageRequest) -> CursorPage<T> {
    let limit = page.limit.clamp(1, 100);
    let mut rows: Vec<T> = rows
        .iter()
        .filter(|row| match page.cursor {
            Some(Cursor { created_at, id }) => {
                row.sort_time() < created_at || (row.sort_time() == created_at && row.sort_id() < id)
            }
            None => true,
        })
        .cloned()
        .collect();
    rows.sort_by(|a, b| {
        b.sort_time()
            .cmp(&a.sort_time())
            .then_with(|| b.sort_id().cmp(&a.sort_id()))
    });
    rows.truncate(limit as usize + 1);
    CursorPage::from_rows(rows, limit)
}

#[async_trait]
impl PostsRepo for MemoryRepos {
    async fn list_posts(
        &self,
        filter: &PostQueryFilter,
        page: PageRequest,
    ) -> Result<CursorPage<PostRecord>, RepoError> {
        self.post_list_queries.fetch_add(1, Ordering::SeqCst);
        let posts = lock(&self.posts);
        let filtered: Vec<PostRecord> = posts
            .iter()
            .filter(|post| match &filter.category {
                Some(category) => post.category.eq_ignore_ascii_case(category),
                None => true,
            })
            .cloned()
            .collect();
        Ok(page_of(&filtered, page))
    }

    async fn search_posts(
        &self,
        term: &str,
        page: PageRequest,
    ) -> Result<CursorPage<PostRecord>, RepoError> {
        let term = term.to_lowercase();
        let posts = lock(&self.posts);
        let matched: Vec<PostRecord> = posts
            .iter()
            .filter(|post| {
                [
                    &post.title,
                    &post.content,
                    &post.caption,
                    &post.tag,
                    &post.category,
                ]
                .iter()
                .any(|field| field.to_lowercase().contains(&term))
            })
            .cloned()
            .collect();
        Ok(page_of(&matched, page))
    }

    async fn find_by_public_id(&self, public_id: i64) -> Result<Option<PostRecord>, RepoError> {
        self.post_find_queries.fetch_add(1, Ordering::SeqCst);
        let posts = lock(&self.posts);
        Ok(posts.iter().find(|post| post.public_id == public_id).cloned())
    }

    async fn create_post(&self, params: CreatePostParams) -> Result<PostRecord, RepoError> {
        let mut posts = lock(&self.posts);
        if posts.iter().any(|post| post.public_id == params.public_id) {
            return Err(RepoError::Duplicate {
                constraint: "posts_public_id_key".to_string(),
            });
        }
        let now = OffsetDateTime::now_utc();
        let post = PostRecord {
            id: Uuid::new_v4(),
            public_id: params.public_id,
            title: params.title,
            content: params.content,
            caption: params.caption,
            category: params.category,
            tag: params.tag,
            image: params.image,
            trivia: params.trivia,
            comment_count: 0,
            views: 0,
            created_at: now,
            updated_at: now,
        };
        posts.push(post.clone());
        Ok(post)
    }

    async fn update_post(
        &self,
        public_id: i64,
        params: UpdatePostParams,
    ) -> Result<Option<PostRecord>, RepoError> {
        let mut posts = lock(&self.posts);
        let Some(post) = posts.iter_mut().find(|post| post.public_id == public_id) else {
            return Ok(None);
        };
        if let Some(title) = params.title {
            post.title = title;
        }
        if let Some(content) = params.content {
            post.content = content;
        }
        if let Some(caption) = params.caption {
            post.caption = caption;
        }
        if let Some(category) = params.category {
            post.category = category;
        }
        if let Some(tag) = params.tag {
            post.tag = tag;
        }
        if let Some(image) = params.image {
            post.image = image;
        }
        if let Some(trivia) = params.trivia {
            post.trivia = trivia;
        }
        post.updated_at = OffsetDateTime::now_utc();
        Ok(Some(post.clone()))
    }

    async fn delete_post(&self, public_id: i64) -> Result<Option<PostRecord>, RepoError> {
        let mut posts = lock(&self.posts);
        let index = posts.iter().position(|post| post.public_id == public_id);
        Ok(index.map(|index| posts.remove(index)))
    }

    async fn increment_views(&self, public_id: i64) -> Result<bool, RepoError> {
        let mut posts = lock(&self.posts);
        match posts.iter_mut().find(|post| post.public_id == public_id) {
            Some(post) => {
                post.views += 1;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn adjust_comment_count(&self, public_id: i64, delta: i64) -> Result<bool, RepoError> {
        let mut posts = lock(&self.posts);
        match posts.iter_mut().find(|post| post.public_id == public_id) {
            Some(post) => {
                post.comment_count += delta;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn dashboard_stats(&self) -> Result<DashboardStats, RepoError> {
        let posts = lock(&self.posts);
        Ok(DashboardStats {
            total_posts: posts.len() as i64,
            total_views: posts.iter().map(|post| post.views).sum(),
            total_comments: posts.iter().map(|post| post.comment_count).sum(),
        })
    }

    async fn home_digest(&self, per_category: u32) -> Result<Vec<CategoryDigest>, RepoError> {
        let posts = lock(&self.posts);
        let mut categories: Vec<String> = posts
            .iter()
            .map(|post| post.category.to_lowercase())
            .collect();
        categories.sort();
        categories.dedup();

        let mut digest = Vec::new();
        for category in categories {
            let members: Vec<PostRecord> = posts
                .iter()
                .filter(|post| post.category.eq_ignore_ascii_case(&category))
                .cloned()
                .collect();
            let mut page = page_of(&members, PageRequest::first(per_category.max(1)));
            let display = page
                .data
                .first()
                .map(|post| post.category.clone())
                .unwrap_or(category);
            digest.push(CategoryDigest {
                category: display,
                posts: std::mem::take(&mut page.data),
            });
        }
        Ok(digest)
    }
}

#[async_trait]
impl CommentsRepo for MemoryRepos {
    async fn list_for_post(
        &self,
        post_public_id: i64,
        page: PageRequest,
    ) -> Result<CursorPage<CommentRecord>, RepoError> {
        self.comment_list_queries.fetch_add(1, Ordering::SeqCst);
        let comments = lock(&self.comments);
        let matched: Vec<CommentRecord> = comments
            .iter()
            .filter(|comment| comment.post_id == post_public_id)
            .cloned()
            .collect();
        Ok(page_of(&matched, page))
    }

    async fn create_comment(
        &self,
        params: CreateCommentParams,
    ) -> Result<CommentRecord, RepoError> {
        let now = OffsetDateTime::now_utc();
        let comment = CommentRecord {
            id: Uuid::new_v4(),
            post_id: params.post_id,
            name: params.name,
            comment: params.comment,
            created_at: now,
            updated_at: now,
        };
        lock(&self.comments).push(comment.clone());
        Ok(comment)
    }

    async fn find_comment(&self, id: Uuid) -> Result<Option<CommentRecord>, RepoError> {
        let comments = lock(&self.comments);
        Ok(comments.iter().find(|comment| comment.id == id).cloned())
    }

    async fn delete_comment(&self, id: Uuid) -> Result<Option<CommentRecord>, RepoError> {
        let mut comments = lock(&self.comments);
        let index = comments.iter().position(|comment| comment.id == id);
        Ok(index.map(|index| comments.remove(index)))
    }
}

#[async_trait]
impl CategoriesRepo for MemoryRepos {
    async fn list_categories(&self) -> Result<Vec<CategoryRecord>, RepoError> {
        let mut categories = lock(&self.categories).clone();
        categories.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(categories)
    }

    async fn find_category(&self, id: Uuid) -> Result<Option<CategoryRecord>, RepoError> {
        let categories = lock(&self.categories);
        Ok(categories.iter().find(|category| category.id == id).cloned())
    }

    async fn find_by_name(
        &self,
        name: &str,
        exclude: Option<Uuid>,
    ) -> Result<Option<CategoryRecord>, RepoError> {
        let categories = lock(&self.categories);
        Ok(categories
            .iter()
            .find(|category| {
                category.name.eq_ignore_ascii_case(name) && Some(category.id) != exclude
            })
            .cloned())
    }

    async fn create_category(
        &self,
        params: CreateCategoryParams,
    ) -> Result<CategoryRecord, RepoError> {
        let mut categories = lock(&self.categories);
        if categories
            .iter()
            .any(|category| category.name.eq_ignore_ascii_case(&params.name))
        {
            return Err(RepoError::Duplicate {
                constraint: "categories_name_lower_key".to_string(),
            });
        }
        let now = OffsetDateTime::now_utc();
        let category = CategoryRecord {
            id: Uuid::new_v4(),
            name: params.name,
            description: params.description,
            created_at: now,
            updated_at: now,
        };
        categories.push(category.clone());
        Ok(category)
    }

    async fn update_category(
        &self,
        id: Uuid,
        params: UpdateCategoryParams,
    ) -> Result<Option<CategoryRecord>, RepoError> {
        let mut categories = lock(&self.categories);
        let Some(category) = categories.iter_mut().find(|category| category.id == id) else {
            return Ok(None);
        };
        if let Some(name) = params.name {
            category.name = name;
        }
        if let Some(description) = params.description {
            category.description = description;
        }
        category.updated_at = OffsetDateTime::now_utc();
        Ok(Some(category.clone()))
    }

    async fn delete_category(&self, id: Uuid) -> Result<bool, RepoError> {
        let mut categories = lock(&self.categories);
        let before = categories.len();
        categories.retain(|category| category.id != id);
        Ok(categories.len() < before)
    }
}

#[async_trait]
impl KnowledgeRepo for MemoryRepos {
    async fn list_articles(
        &self,
        page: PageRequest,
    ) -> Result<CursorPage<KnowledgeRecord>, RepoError> {
        let articles = lock(&self.knowledge).clone();
        Ok(page_of(&articles, page))
    }

    async fn find_article(&self, id: Uuid) -> Result<Option<KnowledgeRecord>, RepoError> {
        let articles = lock(&self.knowledge);
        Ok(articles.iter().find(|article| article.id == id).cloned())
    }

    async fn create_article(
        &self,
        params: CreateKnowledgeParams,
    ) -> Result<KnowledgeRecord, RepoError> {
        let now = OffsetDateTime::now_utc();
        let article = KnowledgeRecord {
            id: Uuid::new_v4(),
            title: params.title,
            content: params.content,
            created_at: now,
            updated_at: now,
        };
        lock(&self.knowledge).push(article.clone());
        Ok(article)
    }

    async fn update_article(
        &self,
        id: Uuid,
        params: UpdateKnowledgeParams,
    ) -> Result<Option<KnowledgeRecord>, RepoError> {
        let mut articles = lock(&self.knowledge);
        let Some(article) = articles.iter_mut().find(|article| article.id == id) else {
            return Ok(None);
        };
        if let Some(title) = params.title {
            article.title = title;
        }
        if let Some(content) = params.content {
            article.content = content;
        }
        article.updated_at = OffsetDateTime::now_utc();
        Ok(Some(article.clone()))
    }

    async fn delete_article(&self, id: Uuid) -> Result<bool, RepoError> {
        let mut articles = lock(&self.knowledge);
        let before = articles.len();
        articles.retain(|article| article.id != id);
        Ok(articles.len() < before)
    }
}

/// Fully wired services over in-memory repositories and an in-memory
/// key-value store.
pub struct TestApp {
    pub store: Arc<MemoryRepos>,
    pub kv: Arc<MemoryKv>,
    pub cache: CacheService,
    pub posts: PostService,
    pub comments: CommentService,
    pub categories: CategoryService,
    pub knowledge: KnowledgeService,
}

pub const HOME_DIGEST_SIZE: u32 = 5;

pub fn test_app() -> TestApp {
    let store = Arc::new(MemoryRepos::default());
    let kv = Arc::new(MemoryKv::new());
    let cache = CacheService::new(kv.clone(), CacheConfig::default());
    let invalidator = Invalidator::new(cache.clone());

    TestApp {
        posts: PostService::new(
            store.clone(),
            cache.clone(),
            invalidator.clone(),
            HOME_DIGEST_SIZE,
        ),
        comments: CommentService::new(
            store.clone(),
            store.clone(),
            cache.clone(),
            invalidator.clone(),
        ),
        categories: CategoryService::new(store.clone(), cache.clone(), invalidator.clone()),
        knowledge: KnowledgeService::new(store.clone(), cache.clone(), invalidator),
        store,
        kv,
        cache,
    }
}

/// A post row with a fixed creation second, inserted directly into the
/// store so pagination tests control the sort order exactly.
pub fn post_at(public_id: i64, created_secs: i64, category: &str) -> PostRecord {
    let created_at = OffsetDateTime::from_unix_timestamp(created_secs).expect("valid timestamp");
    PostRecord {
        id: Uuid::new_v4(),
        public_id,
        title: format!("Post {public_id}"),
        content: "content".to_string(),
        caption: String::new(),
        category: category.to_string(),
        tag: String::new(),
        image: String::new(),
        trivia: String::new(),
        comment_count: 0,
        views: 0,
        created_at,
        updated_at: created_at,
    }
}

pub fn seed_posts(app: &TestApp, posts: Vec<PostRecord>) {
    lock(&app.store.posts).extend(posts);
}
