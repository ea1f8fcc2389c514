//! Session model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Session entity
///
/// The token is an opaque 256-bit value, hex encoded. Sessions map a token
/// back to the username that created it; everything else about the user is
/// looked up fresh on each request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub username: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Check if the session has expired
    pub fn is_expired(&self) -> bool {
        self.expires_at < Utc::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample_session(expires_at: DateTime<Utc>) -> Session {
        Session {
            token: "a".repeat(64),
            username: "kailani".to_string(),
            created_at: Utc::now(),
            expires_at,
        }
    }

    #[test]
    fn test_not_expired_in_future() {
        let session = sample_session(Utc::now() + Duration::days(1));
        assert!(!session.is_expired());
    }

    #[test]
    fn test_expired_in_past() {
        let session = sample_session(Utc::now() - Duration::seconds(1));
        assert!(session.is_expired());
    }
}
