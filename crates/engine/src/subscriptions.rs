//! The module contains `Subscription`, a recurring monthly expense, and the
//! input types used to create and patch it.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use uuid::Uuid;

use crate::Genre;

/// A recurring expense billed every month.
///
/// `price` is expressed in minor currency units and is always `> 0`.
#[derive(Clone, Debug, PartialEq)]
pub struct Subscription {
    pub id: Uuid,
    pub name: String,
    pub price: i64,
    pub description: Option<String>,
    pub is_active: bool,
    pub monthly_count: Option<i32>,
    pub daily_count: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A subscription with the genres it belongs to, in genre creation order.
#[derive(Clone, Debug, PartialEq)]
pub struct SubscriptionWithGenres {
    pub subscription: Subscription,
    pub genres: Vec<Genre>,
}

/// Input of `create_subscription`.
#[derive(Clone, Debug, Default)]
pub struct NewSubscription {
    pub name: String,
    pub price: i64,
    pub description: Option<String>,
    /// Defaults to `true` when `None`.
    pub is_active: Option<bool>,
    pub genre_ids: Vec<Uuid>,
    pub monthly_count: Option<i32>,
    pub daily_count: Option<i32>,
}

/// Partial update of a subscription.
///
/// `None` leaves a field untouched. For the nullable fields `Some(None)`
/// clears the stored value.
#[derive(Clone, Debug, Default)]
pub struct SubscriptionPatch {
    pub name: Option<String>,
    pub price: Option<i64>,
    pub description: Option<Option<String>>,
    pub is_active: Option<bool>,
    pub monthly_count: Option<Option<i32>>,
    pub daily_count: Option<Option<i32>>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "subscriptions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: String,
    pub name: String,
    pub price: i64,
    pub description: Option<String>,
    pub is_active: bool,
    pub monthly_count: Option<i32>,
    pub daily_count: Option<i32>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Username",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Users,
    #[sea_orm(has_many = "super::subscription_genres::Entity")]
    SubscriptionGenres,
    #[sea_orm(has_many = "super::daily_meals::Entity")]
    DailyMeals,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::subscription_genres::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SubscriptionGenres.def()
    }
}

impl Related<super::daily_meals::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DailyMeals.def()
    }
}

impl Related<super::genres::Entity> for Entity {
    fn to() -> RelationDef {
        super::subscription_genres::Relation::Genres.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::subscription_genres::Relation::Subscriptions.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Subscription {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            price: model.price,
            description: model.description,
            is_active: model.is_active,
            monthly_count: model.monthly_count,
            daily_count: model.daily_count,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
