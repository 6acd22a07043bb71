//! Storage and business rules of the subscription tracker.
//!
//! Everything a user owns is reached through [`Engine::for_user`], which
//! returns a [`UserScope`] whose every query is filtered by that user.

pub use api_types::{GenreColor, MealType, snapshot::Snapshot};
pub use daily_meals::DailyMeal;
pub use error::EngineError;
pub use genres::Genre;
pub use ops::{Engine, EngineBuilder, UserScope};
pub use snapshot::ImportReport;
pub use subscriptions::{NewSubscription, Subscription, SubscriptionPatch, SubscriptionWithGenres};
pub use summary::{GenreSummary, Summary, Unassigned};

mod daily_meals;
mod error;
mod genres;
mod ops;
mod snapshot;
mod subscription_genres;
mod subscriptions;
mod summary;
mod users;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
