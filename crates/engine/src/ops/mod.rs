use sea_orm::DatabaseConnection;

use crate::ResultEngine;

mod access;
mod daily_meals;
mod genres;
mod interchange;
mod memberships;
mod subscriptions;
mod summary;
mod users;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Returns the data of `user_id`.
    ///
    /// The user is expected to be authenticated already. No row of another
    /// user is ever read or written through the returned scope.
    pub fn for_user(&self, user_id: &str) -> UserScope<'_> {
        UserScope {
            database: &self.database,
            user_id: user_id.to_string(),
        }
    }
}

/// Access to the rows owned by one user.
#[derive(Debug)]
pub struct UserScope<'a> {
    database: &'a DatabaseConnection,
    user_id: String,
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
        })
    }
}
