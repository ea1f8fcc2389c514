//! Data models

pub mod comment;
pub mod post;
pub mod session;
pub mod spot;
pub mod tip;
pub mod user;

pub use comment::{Comment, CommentWithAuthor, NewComment};
pub use post::{NewPost, Post, PostWithMeta, UpdatePost};
pub use session::Session;
pub use spot::{NewSpot, SpotSource, SurfSpot};
pub use tip::{NewTip, SpotTip, TipWithAuthor};
pub use user::{NewUser, ProfileUpdate, User};
