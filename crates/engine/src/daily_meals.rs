//! Daily meal records: which subscription (if any) covered a meal slot.

use chrono::NaiveDate;
use sea_orm::entity::prelude::*;
use uuid::Uuid;

use crate::{EngineError, MealType, util::model_meal_type};

/// One meal slot of one day.
///
/// There is at most one record per `(user, date, meal_type)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DailyMeal {
    pub id: Uuid,
    pub date: NaiveDate,
    pub meal_type: MealType,
    pub subscription_id: Option<Uuid>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "daily_meals")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: String,
    pub date: Date,
    pub meal_type: String,
    pub subscription_id: Option<Uuid>,
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
    #[sea_orm(
        belongs_to = "super::subscriptions::Entity",
        from = "Column::SubscriptionId",
        to = "super::subscriptions::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Subscriptions,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::subscriptions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Subscriptions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for DailyMeal {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            date: model.date,
            meal_type: model_meal_type(&model.meal_type)?,
            subscription_id: model.subscription_id,
        })
    }
}
