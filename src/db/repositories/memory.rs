//! In-memory repository implementations
//!
//! Used by the test suite and usable as a volatile session store for
//! single-process deployments. Behavior mirrors the Postgres
//! implementations, including duplicate detection on user creation.

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::models::{
    Comment, CommentWithAuthor, NewPost, NewSpot, NewUser, Post, PostWithMeta, ProfileUpdate,
    Session, SpotSource, SpotTip, SurfSpot, TipWithAuthor, UpdatePost, User,
};

use super::post::LikeStatus;
use super::spot::SpotFilter;
use super::user::CreateUserError;
use super::{
    CommentRepository, PostRepository, SessionRepository, SpotRepository, TipRepository,
    UserRepository,
};

/// In-memory user repository
#[derive(Default)]
pub struct MemoryUserRepository {
    users: RwLock<Vec<User>>,
    next_id: AtomicI64,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(Vec::new()),
            next_id: AtomicI64::new(1),
        }
    }

    pub fn boxed() -> Arc<dyn UserRepository> {
        Arc::new(Self::new())
    }

    async fn username_of(&self, id: i64) -> String {
        self.users
            .read()
            .await
            .iter()
            .find(|u| u.id == id)
            .map(|u| u.username.clone())
            .unwrap_or_else(|| "[deleted]".to_string())
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, CreateUserError> {
        let mut users = self.users.write().await;

        if users.iter().any(|u| u.username == user.username) {
            return Err(CreateUserError::DuplicateUsername);
        }
        if users.iter().any(|u| u.email == user.email) {
            return Err(CreateUserError::DuplicateEmail);
        }

        let created = User {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            first_name: user.first_name,
            last_name: user.last_name,
            bio: None,
            profile_pic_url: None,
            created_at: Utc::now(),
        };
        users.push(created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        Ok(self.users.read().await.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn update_profile(&self, id: i64, update: ProfileUpdate) -> Result<Option<User>> {
        let mut users = self.users.write().await;
        let Some(user) = users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };

        if let Some(first_name) = update.first_name {
            user.first_name = Some(first_name);
        }
        if let Some(last_name) = update.last_name {
            user.last_name = Some(last_name);
        }
        if let Some(bio) = update.bio {
            user.bio = Some(bio);
        }
        if let Some(profile_pic_url) = update.profile_pic_url {
            user.profile_pic_url = Some(profile_pic_url);
        }

        Ok(Some(user.clone()))
    }
}

/// In-memory session repository
///
/// Sessions evaporate on restart, which is the documented trade-off of
/// running without a database-backed store.
#[derive(Default)]
pub struct MemorySessionRepository {
    sessions: RwLock<HashMap<String, Session>>,
}

impl MemorySessionRepository {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub fn boxed() -> Arc<dyn SessionRepository> {
        Arc::new(Self::new())
    }
}

#[async_trait]
impl SessionRepository for MemorySessionRepository {
    async fn create(&self, session: &Session) -> Result<()> {
        self.sessions
            .write()
            .await
            .insert(session.token.clone(), session.clone());
        Ok(())
    }

    async fn get(&self, token: &str) -> Result<Option<Session>> {
        Ok(self.sessions.read().await.get(token).cloned())
    }

    async fn delete(&self, token: &str) -> Result<bool> {
        Ok(self.sessions.write().await.remove(token).is_some())
    }

    async fn delete_expired(&self) -> Result<u64> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired());
        Ok((before - sessions.len()) as u64)
    }
}

/// In-memory surf spot repository
#[derive(Default)]
pub struct MemorySpotRepository {
    spots: RwLock<Vec<SurfSpot>>,
    next_id: AtomicI64,
}

impl MemorySpotRepository {
    pub fn new() -> Self {
        Self {
            spots: RwLock::new(Vec::new()),
            next_id: AtomicI64::new(1),
        }
    }

    pub fn boxed() -> Arc<dyn SpotRepository> {
        Arc::new(Self::new())
    }
}

#[async_trait]
impl SpotRepository for MemorySpotRepository {
    async fn insert(
        &self,
        spot: NewSpot,
        source: SpotSource,
        created_by: Option<i64>,
    ) -> Result<SurfSpot> {
        let created = SurfSpot {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            name: spot.name,
            description: spot.description,
            latitude: spot.latitude,
            longitude: spot.longitude,
            country: spot.country,
            region: spot.region,
            source,
            created_by,
            created_at: Utc::now(),
        };
        self.spots.write().await.push(created.clone());
        Ok(created)
    }

    async fn find(&self, id: i64) -> Result<Option<SurfSpot>> {
        Ok(self.spots.read().await.iter().find(|s| s.id == id).cloned())
    }

    async fn list(&self, filter: &SpotFilter) -> Result<Vec<SurfSpot>> {
        let spots = self.spots.read().await;
        let q = filter.q.as_deref().map(str::to_lowercase);
        let region = filter.region.as_deref().map(str::to_lowercase);

        let mut matching: Vec<SurfSpot> = spots
            .iter()
            .filter(|s| {
                q.as_deref()
                    .map(|q| s.name.to_lowercase().contains(q))
                    .unwrap_or(true)
            })
            .filter(|s| {
                region
                    .as_deref()
                    .map(|r| {
                        s.region
                            .as_deref()
                            .map(|sr| sr.to_lowercase() == r)
                            .unwrap_or(false)
                    })
                    .unwrap_or(true)
            })
            .cloned()
            .collect();

        matching.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(matching)
    }
}

/// In-memory post repository
pub struct MemoryPostRepository {
    posts: RwLock<Vec<Post>>,
    likes: RwLock<HashSet<(i64, i64)>>,
    users: Arc<MemoryUserRepository>,
    next_id: AtomicI64,
}

impl MemoryPostRepository {
    pub fn new(users: Arc<MemoryUserRepository>) -> Self {
        Self {
            posts: RwLock::new(Vec::new()),
            likes: RwLock::new(HashSet::new()),
            users,
            next_id: AtomicI64::new(1),
        }
    }

    async fn with_meta(&self, post: Post, viewer: Option<i64>) -> PostWithMeta {
        let likes = self.likes.read().await;
        let like_count = likes.iter().filter(|(p, _)| *p == post.id).count() as i64;
        let is_liked = viewer
            .map(|v| likes.contains(&(post.id, v)))
            .unwrap_or(false);
        drop(likes);

        PostWithMeta {
            username: self.users.username_of(post.user_id).await,
            id: post.id,
            user_id: post.user_id,
            title: post.title,
            content: post.content,
            image_url: post.image_url,
            like_count,
            is_liked,
            created_at: post.created_at,
        }
    }
}

#[async_trait]
impl PostRepository for MemoryPostRepository {
    async fn insert(&self, user_id: i64, post: NewPost) -> Result<Post> {
        let created = Post {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            user_id,
            title: post.title,
            content: post.content,
            image_url: post.image_url,
            created_at: Utc::now(),
        };
        self.posts.write().await.push(created.clone());
        Ok(created)
    }

    async fn find(&self, id: i64) -> Result<Option<Post>> {
        Ok(self.posts.read().await.iter().find(|p| p.id == id).cloned())
    }

    async fn find_with_meta(&self, id: i64, viewer: Option<i64>) -> Result<Option<PostWithMeta>> {
        let post = self.posts.read().await.iter().find(|p| p.id == id).cloned();
        match post {
            Some(post) => Ok(Some(self.with_meta(post, viewer).await)),
            None => Ok(None),
        }
    }

    async fn list(&self, viewer: Option<i64>) -> Result<Vec<PostWithMeta>> {
        let mut posts: Vec<Post> = self.posts.read().await.clone();
        posts.sort_by(|a, b| b.id.cmp(&a.id));

        let mut result = Vec::with_capacity(posts.len());
        for post in posts {
            result.push(self.with_meta(post, viewer).await);
        }
        Ok(result)
    }

    async fn update(&self, id: i64, update: UpdatePost) -> Result<Option<Post>> {
        let mut posts = self.posts.write().await;
        let Some(post) = posts.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };

        post.title = update.title;
        post.content = update.content;
        post.image_url = update.image_url;
        Ok(Some(post.clone()))
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let mut posts = self.posts.write().await;
        let before = posts.len();
        posts.retain(|p| p.id != id);
        let deleted = posts.len() < before;
        if deleted {
            self.likes.write().await.retain(|(p, _)| *p != id);
        }
        Ok(deleted)
    }

    async fn toggle_like(&self, post_id: i64, user_id: i64) -> Result<LikeStatus> {
        let mut likes = self.likes.write().await;
        let key = (post_id, user_id);
        let liked = if likes.contains(&key) {
            likes.remove(&key);
            false
        } else {
            likes.insert(key);
            true
        };
        let like_count = likes.iter().filter(|(p, _)| *p == post_id).count() as i64;
        Ok(LikeStatus { liked, like_count })
    }
}

/// In-memory comment repository
pub struct MemoryCommentRepository {
    comments: RwLock<Vec<Comment>>,
    users: Arc<MemoryUserRepository>,
    next_id: AtomicI64,
}

impl MemoryCommentRepository {
    pub fn new(users: Arc<MemoryUserRepository>) -> Self {
        Self {
            comments: RwLock::new(Vec::new()),
            users,
            next_id: AtomicI64::new(1),
        }
    }
}

#[async_trait]
impl CommentRepository for MemoryCommentRepository {
    async fn list_for_post(&self, post_id: i64) -> Result<Vec<CommentWithAuthor>> {
        let comments: Vec<Comment> = self
            .comments
            .read()
            .await
            .iter()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect();

        let mut result = Vec::with_capacity(comments.len());
        for comment in comments {
            result.push(CommentWithAuthor {
                username: self.users.username_of(comment.user_id).await,
                id: comment.id,
                post_id: comment.post_id,
                user_id: comment.user_id,
                content: comment.content,
                created_at: comment.created_at,
            });
        }
        Ok(result)
    }

    async fn insert(&self, post_id: i64, user_id: i64, content: &str) -> Result<Comment> {
        let created = Comment {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            post_id,
            user_id,
            content: content.to_string(),
            created_at: Utc::now(),
        };
        self.comments.write().await.push(created.clone());
        Ok(created)
    }

    async fn find(&self, id: i64) -> Result<Option<Comment>> {
        Ok(self
            .comments
            .read()
            .await
            .iter()
            .find(|c| c.id == id)
            .cloned())
    }

    async fn update(&self, id: i64, content: &str) -> Result<Option<Comment>> {
        let mut comments = self.comments.write().await;
        let Some(comment) = comments.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        comment.content = content.to_string();
        Ok(Some(comment.clone()))
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let mut comments = self.comments.write().await;
        let before = comments.len();
        comments.retain(|c| c.id != id);
        Ok(comments.len() < before)
    }
}

/// In-memory spot tip repository
pub struct MemoryTipRepository {
    tips: RwLock<Vec<SpotTip>>,
    users: Arc<MemoryUserRepository>,
    next_id: AtomicI64,
}

impl MemoryTipRepository {
    pub fn new(users: Arc<MemoryUserRepository>) -> Self {
        Self {
            tips: RwLock::new(Vec::new()),
            users,
            next_id: AtomicI64::new(1),
        }
    }
}

#[async_trait]
impl TipRepository for MemoryTipRepository {
    async fn list_for_spot(&self, spot_id: i64) -> Result<Vec<TipWithAuthor>> {
        let tips: Vec<SpotTip> = self
            .tips
            .read()
            .await
            .iter()
            .filter(|t| t.spot_id == spot_id)
            .cloned()
            .collect();

        let mut result = Vec::with_capacity(tips.len());
        for tip in tips {
            result.push(TipWithAuthor {
                username: self.users.username_of(tip.user_id).await,
                id: tip.id,
                spot_id: tip.spot_id,
                user_id: tip.user_id,
                content: tip.content,
                created_at: tip.created_at,
            });
        }
        Ok(result)
    }

    async fn insert(&self, spot_id: i64, user_id: i64, content: &str) -> Result<SpotTip> {
        let created = SpotTip {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            spot_id,
            user_id,
            content: content.to_string(),
            created_at: Utc::now(),
        };
        self.tips.write().await.push(created.clone());
        Ok(created)
    }

    async fn find(&self, id: i64) -> Result<Option<SpotTip>> {
        Ok(self.tips.read().await.iter().find(|t| t.id == id).cloned())
    }

    async fn update(&self, id: i64, content: &str) -> Result<Option<SpotTip>> {
        let mut tips = self.tips.write().await;
        let Some(tip) = tips.iter_mut().find(|t| t.id == id) else {
            return Ok(None);
        };
        tip.content = content.to_string();
        Ok(Some(tip.clone()))
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let mut tips = self.tips.write().await;
        let before = tips.len();
        tips.retain(|t| t.id != id);
        Ok(tips.len() < before)
    }
}
