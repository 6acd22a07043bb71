use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, TransactionTrait, prelude::*, sea_query::Expr};
use uuid::Uuid;

use crate::{Genre, GenreColor, ResultEngine, genres, util::normalize_name};

use super::{UserScope, with_tx};

impl UserScope<'_> {
    /// Return all genres of the user, oldest first.
    pub async fn genres(&self) -> ResultEngine<Vec<Genre>> {
        self.genre_models(self.database)
            .await?
            .into_iter()
            .map(Genre::try_from)
            .collect()
    }

    /// Create a genre. The color defaults to amber.
    pub async fn create_genre(&self, name: &str, color: Option<GenreColor>) -> ResultEngine<Genre> {
        let name = normalize_name(name, "genre")?;
        with_tx!(self, |db_tx| {
            self.ensure_genre_name_free(&db_tx, &name, None).await?;
            let now = Utc::now();
            let model = genres::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                user_id: ActiveValue::Set(self.user_id.clone()),
                name: ActiveValue::Set(name.clone()),
                color: ActiveValue::Set(color.unwrap_or_default().as_str().to_string()),
                is_calendar_target: ActiveValue::Set(false),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
            }
            .insert(&db_tx)
            .await?;
            tracing::debug!(user = %self.user_id, genre = %model.id, "genre created");
            Genre::try_from(model)
        })
    }

    pub async fn rename_genre(&self, genre_id: Uuid, name: &str) -> ResultEngine<Genre> {
        let name = normalize_name(name, "genre")?;
        with_tx!(self, |db_tx| {
            let model = self.require_genre(&db_tx, genre_id).await?;
            self.ensure_genre_name_free(&db_tx, &name, Some(genre_id))
                .await?;
            let mut active: genres::ActiveModel = model.into();
            active.name = ActiveValue::Set(name.clone());
            active.updated_at = ActiveValue::Set(Utc::now());
            Genre::try_from(active.update(&db_tx).await?)
        })
    }

    pub async fn update_genre_color(&self, genre_id: Uuid, color: GenreColor) -> ResultEngine<Genre> {
        with_tx!(self, |db_tx| {
            let model = self.require_genre(&db_tx, genre_id).await?;
            let mut active: genres::ActiveModel = model.into();
            active.color = ActiveValue::Set(color.as_str().to_string());
            active.updated_at = ActiveValue::Set(Utc::now());
            Genre::try_from(active.update(&db_tx).await?)
        })
    }

    /// Delete a genre. Its memberships go with it, the subscriptions stay.
    pub async fn delete_genre(&self, genre_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_genre(&db_tx, genre_id).await?;
            genres::Entity::delete_by_id(genre_id).exec(&db_tx).await?;
            tracing::debug!(user = %self.user_id, genre = %genre_id, "genre deleted");
            Ok(())
        })
    }

    /// Make `genre_id` the only calendar target of the user.
    ///
    /// Clearing the previous target and setting the new one happen in the
    /// same transaction.
    pub async fn set_calendar_target(&self, genre_id: Uuid) -> ResultEngine<Genre> {
        with_tx!(self, |db_tx| {
            let model = self.require_genre(&db_tx, genre_id).await?;
            genres::Entity::update_many()
                .col_expr(genres::Column::IsCalendarTarget, Expr::value(false))
                .filter(genres::Column::UserId.eq(self.user_id.as_str()))
                .filter(genres::Column::IsCalendarTarget.eq(true))
                .exec(&db_tx)
                .await?;

            let mut active: genres::ActiveModel = model.into();
            active.is_calendar_target = ActiveValue::Set(true);
            active.updated_at = ActiveValue::Set(Utc::now());
            Genre::try_from(active.update(&db_tx).await?)
        })
    }
}
