use std::collections::HashSet;

use sea_orm::{ConnectionTrait, QueryFilter, QueryOrder, prelude::*};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, genres, subscription_genres, subscriptions};

use super::UserScope;

/// Generates `find_*` and `require_*` lookups of a row owned by the scope's user.
macro_rules! impl_owned_lookup {
    ($find_fn:ident, $require_fn:ident, $module:ident, $err_msg:literal) => {
        pub(super) async fn $find_fn<C: ConnectionTrait>(
            &self,
            db: &C,
            id: Uuid,
        ) -> ResultEngine<Option<$module::Model>> {
            $module::Entity::find_by_id(id)
                .filter($module::Column::UserId.eq(self.user_id.as_str()))
                .one(db)
                .await
                .map_err(Into::into)
        }

        pub(super) async fn $require_fn<C: ConnectionTrait>(
            &self,
            db: &C,
            id: Uuid,
        ) -> ResultEngine<$module::Model> {
            self.$find_fn(db, id)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound($err_msg.to_string()))
        }
    };
}

impl UserScope<'_> {
    impl_owned_lookup!(find_genre, require_genre, genres, "genre not exists");

    impl_owned_lookup!(
        find_subscription,
        require_subscription,
        subscriptions,
        "subscription not exists"
    );

    /// Checks every id names a genre of the user and returns them deduplicated,
    /// in first-seen order.
    pub(super) async fn require_genres<C: ConnectionTrait>(
        &self,
        db: &C,
        genre_ids: &[Uuid],
    ) -> ResultEngine<Vec<Uuid>> {
        let mut seen = HashSet::new();
        let unique: Vec<Uuid> = genre_ids
            .iter()
            .copied()
            .filter(|id| seen.insert(*id))
            .collect();
        if unique.is_empty() {
            return Ok(unique);
        }

        let owned = genres::Entity::find()
            .filter(genres::Column::UserId.eq(self.user_id.as_str()))
            .filter(genres::Column::Id.is_in(unique.clone()))
            .count(db)
            .await?;
        if owned as usize != unique.len() {
            return Err(EngineError::KeyNotFound("genre not exists".to_string()));
        }
        Ok(unique)
    }

    pub(super) async fn ensure_genre_name_free<C: ConnectionTrait>(
        &self,
        db: &C,
        name: &str,
        except: Option<Uuid>,
    ) -> ResultEngine<()> {
        let mut query = genres::Entity::find()
            .filter(genres::Column::UserId.eq(self.user_id.as_str()))
            .filter(genres::Column::Name.eq(name));
        if let Some(id) = except {
            query = query.filter(genres::Column::Id.ne(id));
        }
        if query.one(db).await?.is_some() {
            return Err(EngineError::ExistingKey(name.to_string()));
        }
        Ok(())
    }

    pub(super) async fn ensure_subscription_name_free<C: ConnectionTrait>(
        &self,
        db: &C,
        name: &str,
        except: Option<Uuid>,
    ) -> ResultEngine<()> {
        let mut query = subscriptions::Entity::find()
            .filter(subscriptions::Column::UserId.eq(self.user_id.as_str()))
            .filter(subscriptions::Column::Name.eq(name));
        if let Some(id) = except {
            query = query.filter(subscriptions::Column::Id.ne(id));
        }
        if query.one(db).await?.is_some() {
            return Err(EngineError::ExistingKey(name.to_string()));
        }
        Ok(())
    }

    /// All genres of the user, oldest first.
    pub(super) async fn genre_models<C: ConnectionTrait>(
        &self,
        db: &C,
    ) -> ResultEngine<Vec<genres::Model>> {
        genres::Entity::find()
            .filter(genres::Column::UserId.eq(self.user_id.as_str()))
            .order_by_asc(genres::Column::CreatedAt)
            .order_by_asc(genres::Column::Name)
            .all(db)
            .await
            .map_err(Into::into)
    }

    /// All subscriptions of the user, oldest first.
    pub(super) async fn subscription_models<C: ConnectionTrait>(
        &self,
        db: &C,
    ) -> ResultEngine<Vec<subscriptions::Model>> {
        subscriptions::Entity::find()
            .filter(subscriptions::Column::UserId.eq(self.user_id.as_str()))
            .order_by_asc(subscriptions::Column::CreatedAt)
            .order_by_asc(subscriptions::Column::Name)
            .all(db)
            .await
            .map_err(Into::into)
    }

    /// Every `(subscription_id, genre_id)` pair of the user's subscriptions.
    pub(super) async fn membership_pairs<C: ConnectionTrait>(
        &self,
        db: &C,
    ) -> ResultEngine<Vec<(Uuid, Uuid)>> {
        let rows = subscription_genres::Entity::find()
            .inner_join(subscriptions::Entity)
            .filter(subscriptions::Column::UserId.eq(self.user_id.as_str()))
            .all(db)
            .await?;
        Ok(rows
            .into_iter()
            .map(|row| (row.subscription_id, row.genre_id))
            .collect())
    }
}
