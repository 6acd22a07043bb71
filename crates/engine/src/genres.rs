//! The module contains `Genre`, the user-defined label subscriptions are
//! grouped by, and its table.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use uuid::Uuid;

use crate::{EngineError, GenreColor, util::model_color};

/// A genre.
///
/// At most one genre per user is the *calendar target*: its subscriptions
/// are the ones daily meals can be attributed to.
#[derive(Clone, Debug, PartialEq)]
pub struct Genre {
    pub id: Uuid,
    pub name: String,
    pub color: GenreColor,
    pub is_calendar_target: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "genres")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: String,
    pub name: String,
    pub color: String,
    pub is_calendar_target: bool,
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

impl Related<super::subscriptions::Entity> for Entity {
    fn to() -> RelationDef {
        super::subscription_genres::Relation::Subscriptions.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::subscription_genres::Relation::Genres.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Genre {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            color: model_color(&model.color)?,
            name: model.name,
            is_calendar_target: model.is_calendar_target,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
