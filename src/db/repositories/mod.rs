//! Repository traits and implementations
//!
//! Each entity gets a trait describing its persistence operations, a
//! Postgres implementation, and an in-memory implementation in
//! [`memory`]. Services hold `Arc<dyn ...Repository>` so the two are
//! interchangeable.

pub mod comment;
pub mod memory;
pub mod post;
pub mod session;
pub mod spot;
pub mod tip;
pub mod user;

pub use comment::{CommentRepository, PgCommentRepository};
pub use memory::{
    MemoryCommentRepository, MemoryPostRepository, MemorySessionRepository, MemorySpotRepository,
    MemoryTipRepository, MemoryUserRepository,
};
pub use post::{LikeStatus, PgPostRepository, PostRepository};
pub use session::{PgSessionRepository, SessionRepository};
pub use spot::{PgSpotRepository, SpotFilter, SpotRepository};
pub use tip::{PgTipRepository, TipRepository};
pub use user::{CreateUserError, PgUserRepository, UserRepository};
