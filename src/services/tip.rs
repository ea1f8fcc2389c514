//! Spot tip service

use std::sync::Arc;

use crate::db::repositories::{SpotRepository, TipRepository};
use crate::models::{SpotTip, TipWithAuthor, User};

/// Tip service errors
#[derive(Debug, thiserror::Error)]
pub enum TipServiceError {
    #[error("{0}")]
    Validation(String),
    #[error("Not found")]
    NotFound,
    #[error("You do not own this tip")]
    Forbidden,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Spot tip service
pub struct TipService {
    tips: Arc<dyn TipRepository>,
    spots: Arc<dyn SpotRepository>,
}

impl TipService {
    pub fn new(tips: Arc<dyn TipRepository>, spots: Arc<dyn SpotRepository>) -> Self {
        Self { tips, spots }
    }

    pub async fn list_for_spot(&self, spot_id: i64) -> Result<Vec<TipWithAuthor>, TipServiceError> {
        if self.spots.find(spot_id).await?.is_none() {
            return Err(TipServiceError::NotFound);
        }
        Ok(self.tips.list_for_spot(spot_id).await?)
    }

    pub async fn create(
        &self,
        user: &User,
        spot_id: i64,
        content: &str,
    ) -> Result<TipWithAuthor, TipServiceError> {
        validate_content(content)?;
        if self.spots.find(spot_id).await?.is_none() {
            return Err(TipServiceError::NotFound);
        }

        let tip = self.tips.insert(spot_id, user.id, content).await?;
        Ok(with_author(tip, &user.username))
    }

    pub async fn update(
        &self,
        user: &User,
        id: i64,
        content: &str,
    ) -> Result<TipWithAuthor, TipServiceError> {
        validate_content(content)?;
        let existing = self.tips.find(id).await?.ok_or(TipServiceError::NotFound)?;
        if !user.owns(existing.user_id) {
            return Err(TipServiceError::Forbidden);
        }

        let tip = self
            .tips
            .update(id, content)
            .await?
            .ok_or(TipServiceError::NotFound)?;
        Ok(with_author(tip, &user.username))
    }

    pub async fn delete(&self, user: &User, id: i64) -> Result<(), TipServiceError> {
        let existing = self.tips.find(id).await?.ok_or(TipServiceError::NotFound)?;
        if !user.owns(existing.user_id) {
            return Err(TipServiceError::Forbidden);
        }

        self.tips.delete(id).await?;
        Ok(())
    }
}

fn validate_content(content: &str) -> Result<(), TipServiceError> {
    if content.trim().is_empty() {
        return Err(TipServiceError::Validation(
            "Tip content is required".to_string(),
        ));
    }
    Ok(())
}

fn with_author(tip: SpotTip, username: &str) -> TipWithAuthor {
    TipWithAuthor {
        id: tip.id,
        spot_id: tip.spot_id,
        user_id: tip.user_id,
        username: username.to_string(),
        content: tip.content,
        created_at: tip.created_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{
        MemorySpotRepository, MemoryTipRepository, MemoryUserRepository, SpotRepository,
        UserRepository,
    };
    use crate::models::{NewSpot, NewUser, SpotSource};

    async fn setup() -> (TipService, User, User, i64) {
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

        let spots = Arc::new(MemorySpotRepository::new());
        let spot = spots
            .insert(
                NewSpot {
                    name: "Nazaré".to_string(),
                    description: None,
                    latitude: 39.6,
                    longitude: -9.07,
                    country: None,
                    region: None,
                },
                SpotSource::Seed,
                None,
            )
            .await
            .unwrap();

        let service = TipService::new(Arc::new(MemoryTipRepository::new(users)), spots);
        (service, alice, bob, spot.id)
    }

    #[tokio::test]
    async fn test_create_and_list() {
        let (service, alice, _, spot_id) = setup().await;
        service
            .create(&alice, spot_id, "Only works on a big swell")
            .await
            .unwrap();

        let tips = service.list_for_spot(spot_id).await.unwrap();
        assert_eq!(tips.len(), 1);
        assert_eq!(tips[0].username, "alice");
    }

    #[tokio::test]
    async fn test_create_on_missing_spot() {
        let (service, alice, _, _) = setup().await;
        let err = service.create(&alice, 999, "tip").await.unwrap_err();
        assert!(matches!(err, TipServiceError::NotFound));
    }

    #[tokio::test]
    async fn test_ownership_enforced() {
        let (service, alice, bob, spot_id) = setup().await;
        let tip = service.create(&alice, spot_id, "Watch the rip").await.unwrap();

        let err = service.update(&bob, tip.id, "hijack").await.unwrap_err();
        assert!(matches!(err, TipServiceError::Forbidden));
        let err = service.delete(&bob, tip.id).await.unwrap_err();
        assert!(matches!(err, TipServiceError::Forbidden));

        let updated = service
            .update(&alice, tip.id, "Watch the rip by the rocks")
            .await
            .unwrap();
        assert_eq!(updated.content, "Watch the rip by the rocks");
        service.delete(&alice, tip.id).await.unwrap();
    }

    #[tokio::test]
    async fn test_blank_content_rejected() {
        let (service, alice, _, spot_id) = setup().await;
        let err = service.create(&alice, spot_id, " ").await.unwrap_err();
        assert!(matches!(err, TipServiceError::Validation(_)));
    }
}
