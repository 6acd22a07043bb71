use chrono::NaiveDate;
use sea_orm::{
    ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*, sea_query::OnConflict,
};
use uuid::Uuid;

use crate::{DailyMeal, EngineError, MealType, ResultEngine, daily_meals};

use super::{UserScope, with_tx};

impl UserScope<'_> {
    /// Return meal records with `start <= date <= end`, ordered by date and
    /// then breakfast, lunch, dinner.
    pub async fn daily_meals(&self, start: NaiveDate, end: NaiveDate) -> ResultEngine<Vec<DailyMeal>> {
        if start > end {
            return Err(EngineError::InvalidDate(format!(
                "start {start} is after end {end}"
            )));
        }
        let mut meals = daily_meals::Entity::find()
            .filter(daily_meals::Column::UserId.eq(self.user_id.as_str()))
            .filter(daily_meals::Column::Date.between(start, end))
            .order_by_asc(daily_meals::Column::Date)
            .all(self.database)
            .await?
            .into_iter()
            .map(DailyMeal::try_from)
            .collect::<ResultEngine<Vec<_>>>()?;
        meals.sort_by_key(|m| (m.date, m.meal_type));
        Ok(meals)
    }

    /// Create or overwrite the record of one meal slot.
    ///
    /// The record of `(date, meal_type)` keeps its id, only the subscription
    /// changes.
    pub async fn upsert_daily_meal(
        &self,
        date: NaiveDate,
        meal_type: MealType,
        subscription_id: Option<Uuid>,
    ) -> ResultEngine<DailyMeal> {
        with_tx!(self, |db_tx| {
            if let Some(id) = subscription_id {
                self.require_subscription(&db_tx, id).await?;
            }
            daily_meals::Entity::insert(daily_meals::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                user_id: ActiveValue::Set(self.user_id.clone()),
                date: ActiveValue::Set(date),
                meal_type: ActiveValue::Set(meal_type.as_str().to_string()),
                subscription_id: ActiveValue::Set(subscription_id),
            })
            .on_conflict(
                OnConflict::columns([
                    daily_meals::Column::UserId,
                    daily_meals::Column::Date,
                    daily_meals::Column::MealType,
                ])
                .update_column(daily_meals::Column::SubscriptionId)
                .to_owned(),
            )
            .exec_without_returning(&db_tx)
            .await?;

            let model = self
                .find_daily_meal(&db_tx, date, meal_type)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("daily meal not exists".to_string()))?;
            DailyMeal::try_from(model)
        })
    }

    /// Delete the record of one meal slot. A missing record is not an error.
    pub async fn delete_daily_meal(&self, date: NaiveDate, meal_type: MealType) -> ResultEngine<()> {
        daily_meals::Entity::delete_many()
            .filter(daily_meals::Column::UserId.eq(self.user_id.as_str()))
            .filter(daily_meals::Column::Date.eq(date))
            .filter(daily_meals::Column::MealType.eq(meal_type.as_str()))
            .exec(self.database)
            .await?;
        Ok(())
    }

    pub(super) async fn find_daily_meal<C: sea_orm::ConnectionTrait>(
        &self,
        db: &C,
        date: NaiveDate,
        meal_type: MealType,
    ) -> ResultEngine<Option<daily_meals::Model>> {
        daily_meals::Entity::find()
            .filter(daily_meals::Column::UserId.eq(self.user_id.as_str()))
            .filter(daily_meals::Column::Date.eq(date))
            .filter(daily_meals::Column::MealType.eq(meal_type.as_str()))
            .one(db)
            .await
            .map_err(Into::into)
    }
}
