//! Business logic services

pub mod comment;
pub mod geocode;
pub mod password;
pub mod post;
pub mod spot;
pub mod tip;
pub mod token;
pub mod user;
pub mod weather;

pub use comment::{CommentService, CommentServiceError};
pub use geocode::{GeocodeService, Geocoder, OpenMeteoGeocoder};
pub use post::{PostService, PostServiceError};
pub use spot::{SpotService, SpotServiceError};
pub use tip::{TipService, TipServiceError};
pub use user::{RegisterInput, UserService, UserServiceError};
pub use weather::{ForecastFetcher, OpenMeteoFetcher, WeatherService};
