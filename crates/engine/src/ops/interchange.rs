//! Export and import of the portable snapshot.

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    DailyMeal, Genre, ImportReport, ResultEngine, Snapshot, daily_meals, genres,
    snapshot::{build_snapshot, validate_snapshot},
    subscription_genres, subscriptions,
};

use super::{UserScope, with_tx};

impl UserScope<'_> {
    /// Serialize all the user's data into a name-keyed snapshot.
    pub async fn export_snapshot(&self) -> ResultEngine<Snapshot> {
        let genres = self
            .genre_models(self.database)
            .await?
            .into_iter()
            .map(Genre::try_from)
            .collect::<ResultEngine<Vec<_>>>()?;
        let subscriptions = self.subscriptions_with_genres(self.database).await?;
        let mut meals = daily_meals::Entity::find()
            .filter(daily_meals::Column::UserId.eq(self.user_id.as_str()))
            .order_by_asc(daily_meals::Column::Date)
            .all(self.database)
            .await?
            .into_iter()
            .map(DailyMeal::try_from)
            .collect::<ResultEngine<Vec<_>>>()?;
        meals.sort_by_key(|m| (m.date, m.meal_type));

        let snapshot = build_snapshot(&genres, &subscriptions, &meals);
        tracing::info!(
            user = %self.user_id,
            genres = snapshot.genres.len(),
            subscriptions = snapshot.subscriptions.len(),
            daily_meals = snapshot.daily_meals.len(),
            "snapshot exported"
        );
        Ok(snapshot)
    }

    /// Merge a snapshot into the user's data.
    ///
    /// Rows are matched by name. Existing genres, subscriptions and meal
    /// records are never modified and nothing is deleted, so importing the
    /// same snapshot twice creates nothing the second time. The whole import
    /// is one transaction.
    pub async fn import_snapshot(&self, snapshot: Snapshot) -> ResultEngine<ImportReport> {
        let snapshot = validate_snapshot(snapshot)?;
        let mut report = ImportReport::default();

        with_tx!(self, |db_tx| {
            let now = Utc::now();

            let existing_genres = self.genre_models(&db_tx).await?;
            let mut has_target = existing_genres.iter().any(|g| g.is_calendar_target);
            let mut genre_ids: HashMap<String, Uuid> = existing_genres
                .into_iter()
                .map(|g| (g.name, g.id))
                .collect();

            for genre in &snapshot.genres {
                if genre_ids.contains_key(&genre.name) {
                    continue;
                }
                let is_target = genre.is_calendar_target.unwrap_or(false) && !has_target;
                has_target |= is_target;
                let model = genres::ActiveModel {
                    id: ActiveValue::Set(Uuid::new_v4()),
                    user_id: ActiveValue::Set(self.user_id.clone()),
                    name: ActiveValue::Set(genre.name.clone()),
                    color: ActiveValue::Set(genre.color.unwrap_or_default().as_str().to_string()),
                    is_calendar_target: ActiveValue::Set(is_target),
                    created_at: ActiveValue::Set(now),
                    updated_at: ActiveValue::Set(now),
                }
                .insert(&db_tx)
                .await?;
                genre_ids.insert(model.name, model.id);
                report.genres_created += 1;
            }

            let mut subscription_ids: HashMap<String, Uuid> = self
                .subscription_models(&db_tx)
                .await?
                .into_iter()
                .map(|s| (s.name, s.id))
                .collect();

            for subscription in &snapshot.subscriptions {
                if subscription_ids.contains_key(&subscription.name) {
                    continue;
                }
                let model = subscriptions::ActiveModel {
                    id: ActiveValue::Set(Uuid::new_v4()),
                    user_id: ActiveValue::Set(self.user_id.clone()),
                    name: ActiveValue::Set(subscription.name.clone()),
                    price: ActiveValue::Set(subscription.price),
                    description: ActiveValue::Set(subscription.description.clone()),
                    is_active: ActiveValue::Set(subscription.is_active.unwrap_or(true)),
                    monthly_count: ActiveValue::Set(subscription.monthly_count),
                    daily_count: ActiveValue::Set(subscription.daily_count),
                    created_at: ActiveValue::Set(now),
                    updated_at: ActiveValue::Set(now),
                }
                .insert(&db_tx)
                .await?;
                subscription_ids.insert(model.name, model.id);
                report.subscriptions_created += 1;
            }

            let existing_pairs: HashSet<(Uuid, Uuid)> =
                self.membership_pairs(&db_tx).await?.into_iter().collect();
            for subscription in &snapshot.subscriptions {
                let Some(&subscription_id) = subscription_ids.get(&subscription.name) else {
                    continue;
                };
                let mut seen = HashSet::new();
                let missing: Vec<Uuid> = subscription
                    .genres
                    .iter()
                    .filter_map(|name| genre_ids.get(name).copied())
                    .filter(|genre_id| !existing_pairs.contains(&(subscription_id, *genre_id)))
                    .filter(|genre_id| seen.insert(*genre_id))
                    .collect();
                if missing.is_empty() {
                    continue;
                }
                report.memberships_created += missing.len();
                subscription_genres::Entity::insert_many(missing.into_iter().map(|genre_id| {
                    subscription_genres::ActiveModel {
                        subscription_id: ActiveValue::Set(subscription_id),
                        genre_id: ActiveValue::Set(genre_id),
                    }
                }))
                .exec_without_returning(&db_tx)
                .await?;
            }

            for meal in &snapshot.daily_meals {
                if self
                    .find_daily_meal(&db_tx, meal.date, meal.meal_type)
                    .await?
                    .is_some()
                {
                    continue;
                }
                let subscription_id = meal
                    .subscription_name
                    .as_ref()
                    .and_then(|name| subscription_ids.get(name).copied());
                daily_meals::ActiveModel {
                    id: ActiveValue::Set(Uuid::new_v4()),
                    user_id: ActiveValue::Set(self.user_id.clone()),
                    date: ActiveValue::Set(meal.date),
                    meal_type: ActiveValue::Set(meal.meal_type.as_str().to_string()),
                    subscription_id: ActiveValue::Set(subscription_id),
                }
                .insert(&db_tx)
                .await?;
                report.daily_meals_created += 1;
            }

            tracing::info!(
                user = %self.user_id,
                genres = report.genres_created,
                subscriptions = report.subscriptions_created,
                memberships = report.memberships_created,
                daily_meals = report.daily_meals_created,
                "snapshot imported"
            );
            Ok(report)
        })
    }
}
