use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveValue, ConnectionTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    Genre, NewSubscription, ResultEngine, Subscription, SubscriptionPatch,
    SubscriptionWithGenres, subscription_genres, subscriptions,
    util::{normalize_name, normalize_optional_text, validate_count, validate_price},
};

use super::{UserScope, with_tx};

impl UserScope<'_> {
    /// Return all subscriptions of the user with their genres.
    pub async fn subscriptions(&self) -> ResultEngine<Vec<SubscriptionWithGenres>> {
        self.subscriptions_with_genres(self.database).await
    }

    /// Return the subscriptions belonging to `genre_id`.
    pub async fn subscriptions_by_genre(&self, genre_id: Uuid) -> ResultEngine<Vec<Subscription>> {
        self.require_genre(self.database, genre_id).await?;
        let models = subscriptions::Entity::find()
            .inner_join(subscription_genres::Entity)
            .filter(subscription_genres::Column::GenreId.eq(genre_id))
            .filter(subscriptions::Column::UserId.eq(self.user_id.as_str()))
            .order_by_asc(subscriptions::Column::CreatedAt)
            .order_by_asc(subscriptions::Column::Name)
            .all(self.database)
            .await?;
        Ok(models.into_iter().map(Subscription::from).collect())
    }

    /// Create a subscription, optionally already linked to some genres.
    pub async fn create_subscription(
        &self,
        input: NewSubscription,
    ) -> ResultEngine<SubscriptionWithGenres> {
        let name = normalize_name(&input.name, "subscription")?;
        validate_price(input.price)?;
        validate_count(input.monthly_count, "monthlyCount")?;
        validate_count(input.daily_count, "dailyCount")?;
        let description = normalize_optional_text(input.description.as_deref());

        with_tx!(self, |db_tx| {
            self.ensure_subscription_name_free(&db_tx, &name, None)
                .await?;
            let genre_ids = self.require_genres(&db_tx, &input.genre_ids).await?;

            let now = Utc::now();
            let model = subscriptions::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                user_id: ActiveValue::Set(self.user_id.clone()),
                name: ActiveValue::Set(name.clone()),
                price: ActiveValue::Set(input.price),
                description: ActiveValue::Set(description.clone()),
                is_active: ActiveValue::Set(input.is_active.unwrap_or(true)),
                monthly_count: ActiveValue::Set(input.monthly_count),
                daily_count: ActiveValue::Set(input.daily_count),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
            }
            .insert(&db_tx)
            .await?;

            self.insert_memberships(&db_tx, model.id, &genre_ids)
                .await?;
            tracing::debug!(
                user = %self.user_id,
                subscription = %model.id,
                genres = genre_ids.len(),
                "subscription created"
            );
            self.subscription_with_genres(&db_tx, model).await
        })
    }

    /// Apply a partial update.
    pub async fn update_subscription(
        &self,
        subscription_id: Uuid,
        patch: SubscriptionPatch,
    ) -> ResultEngine<SubscriptionWithGenres> {
        let name = patch
            .name
            .as_deref()
            .map(|n| normalize_name(n, "subscription"))
            .transpose()?;
        if let Some(price) = patch.price {
            validate_price(price)?;
        }
        if let Some(count) = patch.monthly_count {
            validate_count(count, "monthlyCount")?;
        }
        if let Some(count) = patch.daily_count {
            validate_count(count, "dailyCount")?;
        }

        with_tx!(self, |db_tx| {
            let model = self.require_subscription(&db_tx, subscription_id).await?;
            if let Some(name) = &name {
                self.ensure_subscription_name_free(&db_tx, name, Some(subscription_id))
                    .await?;
            }

            let mut active: subscriptions::ActiveModel = model.into();
            if let Some(name) = name.clone() {
                active.name = ActiveValue::Set(name);
            }
            if let Some(price) = patch.price {
                active.price = ActiveValue::Set(price);
            }
            if let Some(description) = &patch.description {
                active.description =
                    ActiveValue::Set(normalize_optional_text(description.as_deref()));
            }
            if let Some(is_active) = patch.is_active {
                active.is_active = ActiveValue::Set(is_active);
            }
            if let Some(count) = patch.monthly_count {
                active.monthly_count = ActiveValue::Set(count);
            }
            if let Some(count) = patch.daily_count {
                active.daily_count = ActiveValue::Set(count);
            }
            active.updated_at = ActiveValue::Set(Utc::now());

            let model = active.update(&db_tx).await?;
            self.subscription_with_genres(&db_tx, model).await
        })
    }

    /// Delete a subscription.
    ///
    /// Memberships are removed, meal records pointing at it keep existing
    /// without a subscription.
    pub async fn delete_subscription(&self, subscription_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_subscription(&db_tx, subscription_id).await?;
            subscriptions::Entity::delete_by_id(subscription_id)
                .exec(&db_tx)
                .await?;
            tracing::debug!(
                user = %self.user_id,
                subscription = %subscription_id,
                "subscription deleted"
            );
            Ok(())
        })
    }

    pub(super) async fn subscriptions_with_genres<C: ConnectionTrait>(
        &self,
        db: &C,
    ) -> ResultEngine<Vec<SubscriptionWithGenres>> {
        let models = self.subscription_models(db).await?;
        if models.is_empty() {
            return Ok(Vec::new());
        }
        let genres: HashMap<Uuid, Genre> = self
            .genre_models(db)
            .await?
            .into_iter()
            .map(|m| Genre::try_from(m).map(|g| (g.id, g)))
            .collect::<ResultEngine<_>>()?;
        let pairs = self.membership_pairs(db).await?;
        Ok(attach_genres(models, &genres, &pairs))
    }

    async fn subscription_with_genres<C: ConnectionTrait>(
        &self,
        db: &C,
        model: subscriptions::Model,
    ) -> ResultEngine<SubscriptionWithGenres> {
        let genre_ids: Vec<Uuid> = subscription_genres::Entity::find()
            .filter(subscription_genres::Column::SubscriptionId.eq(model.id))
            .all(db)
            .await?
            .into_iter()
            .map(|row| row.genre_id)
            .collect();
        let genres = self
            .genre_models(db)
            .await?
            .into_iter()
            .filter(|m| genre_ids.contains(&m.id))
            .map(Genre::try_from)
            .collect::<ResultEngine<Vec<_>>>()?;
        Ok(SubscriptionWithGenres {
            subscription: Subscription::from(model),
            genres,
        })
    }
}

/// Pairs each subscription with its genres, ordered by genre creation.
fn attach_genres(
    models: Vec<subscriptions::Model>,
    genres: &HashMap<Uuid, Genre>,
    pairs: &[(Uuid, Uuid)],
) -> Vec<SubscriptionWithGenres> {
    let mut by_subscription: HashMap<Uuid, Vec<Genre>> = HashMap::new();
    for (subscription_id, genre_id) in pairs {
        if let Some(genre) = genres.get(genre_id) {
            by_subscription
                .entry(*subscription_id)
                .or_default()
                .push(genre.clone());
        }
    }
    for list in by_subscription.values_mut() {
        list.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.name.cmp(&b.name))
        });
    }

    models
        .into_iter()
        .map(|model| SubscriptionWithGenres {
            genres: by_subscription.remove(&model.id).unwrap_or_default(),
            subscription: Subscription::from(model),
        })
        .collect()
}
