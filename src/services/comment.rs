//! Comment service

use std::sync::Arc;

use crate::db::repositories::{CommentRepository, PostRepository};
use crate::models::{Comment, CommentWithAuthor, User};

/// Comment service errors
#[derive(Debug, thiserror::Error)]
pub enum CommentServiceError {
    #[error("{0}")]
    Validation(String),
    #[error("Not found")]
    NotFound,
    #[error("You do not own this comment")]
    Forbidden,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Comment service
pub struct CommentService {
    comments: Arc<dyn CommentRepository>,
    posts: Arc<dyn PostRepository>,
}

impl CommentService {
    pub fn new(comments: Arc<dyn CommentRepository>, posts: Arc<dyn PostRepository>) -> Self {
        Self { comments, posts }
    }

    pub async fn list_for_post(
        &self,
        post_id: i64,
    ) -> Result<Vec<CommentWithAuthor>, CommentServiceError> {
        if self.posts.find(post_id).await?.is_none() {
            return Err(CommentServiceError::NotFound);
        }
        Ok(self.comments.list_for_post(post_id).await?)
    }

    pub async fn create(
        &self,
        user: &User,
        post_id: i64,
        content: &str,
    ) -> Result<CommentWithAuthor, CommentServiceError> {
        validate_content(content)?;
        if self.posts.find(post_id).await?.is_none() {
            return Err(CommentServiceError::NotFound);
        }

        let comment = self.comments.insert(post_id, user.id, content).await?;
        Ok(with_author(comment, &user.username))
    }

    pub async fn update(
        &self,
        user: &User,
        id: i64,
        content: &str,
    ) -> Result<CommentWithAuthor, CommentServiceError> {
        validate_content(content)?;
        let existing = self
            .comments
            .find(id)
            .await?
            .ok_or(CommentServiceError::NotFound)?;
        if !user.owns(existing.user_id) {
            return Err(CommentServiceError::Forbidden);
        }

        let comment = self
            .comments
            .update(id, content)
            .await?
            .ok_or(CommentServiceError::NotFound)?;
        Ok(with_author(comment, &user.username))
    }

    pub async fn delete(&self, user: &User, id: i64) -> Result<(), CommentServiceError> {
        let existing = self
            .comments
            .find(id)
            .await?
            .ok_or(CommentServiceError::NotFound)?;
        if !user.owns(existing.user_id) {
            return Err(CommentServiceError::Forbidden);
        }

        self.comments.delete(id).await?;
        Ok(())
    }
}

fn validate_content(content: &str) -> Result<(), CommentServiceError> {
    if content.trim().is_empty() {
        return Err(CommentServiceError::Validation(
            "Comment content is required".to_string(),
        ));
    }
    Ok(())
}

fn with_author(comment: Comment, username: &str) -> CommentWithAuthor {
    CommentWithAuthor {
        id: comment.id,
        post_id: comment.post_id,
        user_id: comment.user_id,
        username: username.to_string(),
        content: comment.content,
        created_at: comment.created_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{
        MemoryCommentRepository, MemoryPostRepository, MemoryUserRepository, UserRepository,
    };
    use crate::models::{NewPost, NewUser};

    async fn setup() -> (CommentService, User, User, i64) {
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

        let posts = Arc::new(MemoryPostRepository::new(users.clone()));
        let post = crate::db::repositories::PostRepository::insert(
            posts.as_ref(),
            alice.id,
            NewPost {
                title: "Dawn patrol".to_string(),
                content: "Glassy".to_string(),
                image_url: None,
            },
        )
        .await
        .unwrap();

        let service = CommentService::new(Arc::new(MemoryCommentRepository::new(users)), posts);
        (service, alice, bob, post.id)
    }

    #[tokio::test]
    async fn test_create_and_list() {
        let (service, alice, bob, post_id) = setup().await;

        service.create(&alice, post_id, "So good").await.unwrap();
        service.create(&bob, post_id, "Wish I was there").await.unwrap();

        let comments = service.list_for_post(post_id).await.unwrap();
        assert_eq!(comments.len(), 2);
        // Oldest first
        assert_eq!(comments[0].username, "alice");
        assert_eq!(comments[1].username, "bob");
    }

    #[tokio::test]
    async fn test_create_on_missing_post() {
        let (service, alice, _, _) = setup().await;
        let err = service.create(&alice, 999, "hello").await.unwrap_err();
        assert!(matches!(err, CommentServiceError::NotFound));
    }

    #[tokio::test]
    async fn test_create_rejects_blank_content() {
        let (service, alice, _, post_id) = setup().await;
        let err = service.create(&alice, post_id, "   ").await.unwrap_err();
        assert!(matches!(err, CommentServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn test_owner_can_edit_and_delete() {
        let (service, alice, _, post_id) = setup().await;
        let comment = service.create(&alice, post_id, "So good").await.unwrap();

        let updated = service
            .update(&alice, comment.id, "So, so good")
            .await
            .unwrap();
        assert_eq!(updated.content, "So, so good");

        service.delete(&alice, comment.id).await.unwrap();
        assert!(service.list_for_post(post_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_non_owner_cannot_edit_or_delete() {
        let (service, alice, bob, post_id) = setup().await;
        let comment = service.create(&alice, post_id, "So good").await.unwrap();

        let err = service.update(&bob, comment.id, "hijack").await.unwrap_err();
        assert!(matches!(err, CommentServiceError::Forbidden));

        let err = service.delete(&bob, comment.id).await.unwrap_err();
        assert!(matches!(err, CommentServiceError::Forbidden));
    }

    #[tokio::test]
    async fn test_missing_comment_is_not_found() {
        let (service, alice, _, _) = setup().await;
        let err = service.update(&alice, 999, "x").await.unwrap_err();
        assert!(matches!(err, CommentServiceError::NotFound));
        let err = service.delete(&alice, 999).await.unwrap_err();
        assert!(matches!(err, CommentServiceError::NotFound));
    }
}
