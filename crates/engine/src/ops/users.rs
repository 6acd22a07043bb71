use sea_orm::{ActiveValue, TransactionTrait, prelude::*};

use crate::{
    EngineError, ResultEngine, users,
    users::{hash_password, verify_password},
};

use super::{Engine, with_tx};

impl Engine {
    /// Register a new account. The password is stored as an argon2 hash.
    pub async fn create_user(&self, username: &str, password: &str) -> ResultEngine<()> {
        let username = username.trim();
        if username.is_empty() {
            return Err(EngineError::InvalidName(
                "username must not be empty".to_string(),
            ));
        }
        if password.is_empty() {
            return Err(EngineError::InvalidCredentials(
                "password must not be empty".to_string(),
            ));
        }
        let password_hash = hash_password(password)?;

        with_tx!(self, |db_tx| {
            if users::Entity::find_by_id(username.to_string())
                .one(&db_tx)
                .await?
                .is_some()
            {
                return Err(EngineError::ExistingKey(username.to_string()));
            }
            users::ActiveModel {
                username: ActiveValue::Set(username.to_string()),
                password_hash: ActiveValue::Set(password_hash),
            }
            .insert(&db_tx)
            .await?;
            tracing::info!(user = username, "user created");
            Ok(())
        })
    }

    pub async fn user_exists(&self, username: &str) -> ResultEngine<bool> {
        Ok(users::Entity::find_by_id(username.to_string())
            .one(&self.database)
            .await?
            .is_some())
    }

    /// Check the credentials and return the user id on success.
    pub async fn authenticate(&self, username: &str, password: &str) -> ResultEngine<Option<String>> {
        let Some(user) = users::Entity::find_by_id(username.to_string())
            .one(&self.database)
            .await?
        else {
            return Ok(None);
        };
        if verify_password(password, &user.password_hash)? {
            Ok(Some(user.username))
        } else {
            Ok(None)
        }
    }
}
