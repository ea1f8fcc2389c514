//! Post service
//!
//! Ownership checks live here: mutations fetch the row first, return
//! NotFound if it is missing, Forbidden if the caller is not the author,
//! and only then mutate.

use std::sync::Arc;

use crate::db::repositories::{LikeStatus, PostRepository};
use crate::models::{NewPost, Post, PostWithMeta, UpdatePost, User};

/// Post service errors
#[derive(Debug, thiserror::Error)]
pub enum PostServiceError {
    #[error("{0}")]
    Validation(String),
    #[error("Post not found")]
    NotFound,
    #[error("You do not own this post")]
    Forbidden,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Post service
pub struct PostService {
    posts: Arc<dyn PostRepository>,
}

impl PostService {
    pub fn new(posts: Arc<dyn PostRepository>) -> Self {
        Self { posts }
    }

    pub async fn list(&self, viewer: Option<i64>) -> Result<Vec<PostWithMeta>, PostServiceError> {
        Ok(self.posts.list(viewer).await?)
    }

    pub async fn get(
        &self,
        id: i64,
        viewer: Option<i64>,
    ) -> Result<PostWithMeta, PostServiceError> {
        self.posts
            .find_with_meta(id, viewer)
            .await?
            .ok_or(PostServiceError::NotFound)
    }

    pub async fn create(&self, user: &User, post: NewPost) -> Result<Post, PostServiceError> {
        validate_post(&post.title, &post.content)?;
        Ok(self.posts.insert(user.id, post).await?)
    }

    pub async fn update(
        &self,
        user: &User,
        id: i64,
        update: UpdatePost,
    ) -> Result<Post, PostServiceError> {
        validate_post(&update.title, &update.content)?;
        let existing = self.posts.find(id).await?.ok_or(PostServiceError::NotFound)?;
        if !user.owns(existing.user_id) {
            return Err(PostServiceError::Forbidden);
        }

        self.posts
            .update(id, update)
            .await?
            .ok_or(PostServiceError::NotFound)
    }

    pub async fn delete(&self, user: &User, id: i64) -> Result<(), PostServiceError> {
        let existing = self.posts.find(id).await?.ok_or(PostServiceError::NotFound)?;
        if !user.owns(existing.user_id) {
            return Err(PostServiceError::Forbidden);
        }

        self.posts.delete(id).await?;
        Ok(())
    }

    /// Toggle the caller's like on a post
    pub async fn toggle_like(
        &self,
        user: &User,
        post_id: i64,
    ) -> Result<LikeStatus, PostServiceError> {
        if self.posts.find(post_id).await?.is_none() {
            return Err(PostServiceError::NotFound);
        }
        Ok(self.posts.toggle_like(post_id, user.id).await?)
    }
}

fn validate_post(title: &str, content: &str) -> Result<(), PostServiceError> {
    if title.trim().is_empty() {
        return Err(PostServiceError::Validation(
            "Title is required".to_string(),
        ));
    }
    if content.trim().is_empty() {
        return Err(PostServiceError::Validation(
            "Content is required".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{MemoryPostRepository, MemoryUserRepository, UserRepository};
    use crate::models::NewUser;

    async fn setup() -> (PostService, User, User) {
        let users = Arc::new(MemoryUserRepository::new());
        let alice = users
            .create(NewUser {
                username: "alice".to_string(),
                email: "alice@example.com".to_string(),
                password_hash: "$argon2id$dummy".to_string(),
                first_name: None,
                last_name: None,
            })
            .await
            .unwrap();
        let bob = users
            .create(NewUser {
                username: "bob".to_string(),
                email: "bob@example.com".to_string(),
                password_hash: "$argon2id$dummy".to_string(),
                first_name: None,
                last_name: None,
            })
            .await
            .unwrap();

        let service = PostService::new(Arc::new(MemoryPostRepository::new(users)));
        (service, alice, bob)
    }

    fn new_post(title: &str) -> NewPost {
        NewPost {
            title: title.to_string(),
            content: "Overhead and glassy at dawn".to_string(),
            image_url: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let (service, alice, _) = setup().await;
        let post = service.create(&alice, new_post("Dawn patrol")).await.unwrap();

        let fetched = service.get(post.id, None).await.unwrap();
        assert_eq!(fetched.title, "Dawn patrol");
        assert_eq!(fetched.username, "alice");
        assert_eq!(fetched.like_count, 0);
    }

    #[tokio::test]
    async fn test_create_rejects_blank_fields() {
        let (service, alice, _) = setup().await;

        let err = service.create(&alice, new_post("  ")).await.unwrap_err();
        assert!(matches!(err, PostServiceError::Validation(_)));

        let err = service
            .create(
                &alice,
                NewPost {
                    title: "t".to_string(),
                    content: "".to_string(),
                    image_url: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, PostServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn test_owner_can_update() {
        let (service, alice, _) = setup().await;
        let post = service.create(&alice, new_post("Dawn patrol")).await.unwrap();

        let updated = service
            .update(
                &alice,
                post.id,
                UpdatePost {
                    title: "Dawn patrol (updated)".to_string(),
                    content: "Wind came up".to_string(),
                    image_url: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.title, "Dawn patrol (updated)");
    }

    #[tokio::test]
    async fn test_non_owner_cannot_update() {
        let (service, alice, bob) = setup().await;
        let post = service.create(&alice, new_post("Dawn patrol")).await.unwrap();

        let err = service
            .update(
                &bob,
                post.id,
                UpdatePost {
                    title: "Hijacked".to_string(),
                    content: "x".to_string(),
                    image_url: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, PostServiceError::Forbidden));
    }

    #[tokio::test]
    async fn test_non_owner_cannot_delete() {
        let (service, alice, bob) = setup().await;
        let post = service.create(&alice, new_post("Dawn patrol")).await.unwrap();

        let err = service.delete(&bob, post.id).await.unwrap_err();
        assert!(matches!(err, PostServiceError::Forbidden));

        service.delete(&alice, post.id).await.unwrap();
        let err = service.get(post.id, None).await.unwrap_err();
        assert!(matches!(err, PostServiceError::NotFound));
    }

    #[tokio::test]
    async fn test_update_missing_post() {
        let (service, alice, _) = setup().await;
        let err = service
            .update(
                &alice,
                999,
                UpdatePost {
                    title: "t".to_string(),
                    content: "c".to_string(),
                    image_url: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, PostServiceError::NotFound));
    }

    #[tokio::test]
    async fn test_like_toggle() {
        let (service, alice, bob) = setup().await;
        let post = service.create(&alice, new_post("Dawn patrol")).await.unwrap();

        let status = service.toggle_like(&bob, post.id).await.unwrap();
        assert!(status.liked);
        assert_eq!(status.like_count, 1);

        let fetched = service.get(post.id, Some(bob.id)).await.unwrap();
        assert!(fetched.is_liked);

        let status = service.toggle_like(&bob, post.id).await.unwrap();
        assert!(!status.liked);
        assert_eq!(status.like_count, 0);
    }

    #[tokio::test]
    async fn test_like_missing_post() {
        let (service, alice, _) = setup().await;
        let err = service.toggle_like(&alice, 999).await.unwrap_err();
        assert!(matches!(err, PostServiceError::NotFound));
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let (service, alice, _) = setup().await;
        service.create(&alice, new_post("first")).await.unwrap();
        service.create(&alice, new_post("second")).await.unwrap();

        let posts = service.list(None).await.unwrap();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].title, "second");
        assert_eq!(posts[1].title, "first");
    }
}
