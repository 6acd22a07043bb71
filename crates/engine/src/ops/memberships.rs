use sea_orm::{
    ActiveValue, ConnectionTrait, QueryFilter, TransactionTrait, prelude::*,
    sea_query::OnConflict,
};
use uuid::Uuid;

use crate::{ResultEngine, subscription_genres};

use super::{UserScope, with_tx};

impl UserScope<'_> {
    /// Link a subscription to a genre. Linking twice is a no-op.
    pub async fn add_to_genre(&self, subscription_id: Uuid, genre_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_subscription(&db_tx, subscription_id).await?;
            self.require_genre(&db_tx, genre_id).await?;
            self.insert_memberships(&db_tx, subscription_id, &[genre_id])
                .await?;
            Ok(())
        })
    }

    /// Unlink a subscription from a genre.
    pub async fn remove_from_genre(
        &self,
        subscription_id: Uuid,
        genre_id: Uuid,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_subscription(&db_tx, subscription_id).await?;
            self.require_genre(&db_tx, genre_id).await?;
            subscription_genres::Entity::delete_many()
                .filter(subscription_genres::Column::SubscriptionId.eq(subscription_id))
                .filter(subscription_genres::Column::GenreId.eq(genre_id))
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    /// Replace all memberships of a subscription with `genre_ids`.
    pub async fn set_genres(&self, subscription_id: Uuid, genre_ids: &[Uuid]) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_subscription(&db_tx, subscription_id).await?;
            let genre_ids = self.require_genres(&db_tx, genre_ids).await?;
            subscription_genres::Entity::delete_many()
                .filter(subscription_genres::Column::SubscriptionId.eq(subscription_id))
                .exec(&db_tx)
                .await?;
            self.insert_memberships(&db_tx, subscription_id, &genre_ids)
                .await?;
            tracing::debug!(
                user = %self.user_id,
                subscription = %subscription_id,
                genres = genre_ids.len(),
                "subscription genres replaced"
            );
            Ok(())
        })
    }

    /// Insert the missing `(subscription_id, genre_id)` rows.
    ///
    /// Ownership must already be checked by the caller.
    pub(super) async fn insert_memberships<C: ConnectionTrait>(
        &self,
        db: &C,
        subscription_id: Uuid,
        genre_ids: &[Uuid],
    ) -> ResultEngine<()> {
        if genre_ids.is_empty() {
            return Ok(());
        }
        let rows = genre_ids
            .iter()
            .map(|genre_id| subscription_genres::ActiveModel {
                subscription_id: ActiveValue::Set(subscription_id),
                genre_id: ActiveValue::Set(*genre_id),
            });
        subscription_genres::Entity::insert_many(rows)
            .on_conflict(
                OnConflict::columns([
                    subscription_genres::Column::SubscriptionId,
                    subscription_genres::Column::GenreId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(db)
            .await?;
        Ok(())
    }
}
