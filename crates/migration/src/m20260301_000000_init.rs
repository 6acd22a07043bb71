//! Initial schema migration.
//!
//! Creates the complete schema of the tracker:
//!
//! - `users`: authentication, owner of every other row
//! - `genres`: user-defined labels grouping subscriptions
//! - `subscriptions`: recurring monthly expenses
//! - `subscription_genres`: many-to-many membership between the two above
//! - `daily_meals`: per-day meal usage, optionally attributed to a subscription

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Users {
    Table,
    Username,
    PasswordHash,
}

#[derive(Iden)]
enum Genres {
    Table,
    Id,
    UserId,
    Name,
    Color,
    IsCalendarTarget,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Subscriptions {
    Table,
    Id,
    UserId,
    Name,
    Price,
    Description,
    IsActive,
    MonthlyCount,
    DailyCount,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum SubscriptionGenres {
    Table,
    SubscriptionId,
    GenreId,
}

#[derive(Iden)]
enum DailyMeals {
    Table,
    Id,
    UserId,
    Date,
    MealType,
    SubscriptionId,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Users
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Username)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Genres
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Genres::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Genres::Id).blob().not_null().primary_key())
                    .col(ColumnDef::new(Genres::UserId).string().not_null())
                    .col(ColumnDef::new(Genres::Name).string().not_null())
                    .col(
                        ColumnDef::new(Genres::Color)
                            .string()
                            .not_null()
                            .default("amber"),
                    )
                    .col(
                        ColumnDef::new(Genres::IsCalendarTarget)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Genres::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Genres::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-genres-user_id")
                            .from(Genres::Table, Genres::UserId)
                            .to(Users::Table, Users::Username)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-genres-user_id-name-unique")
                    .table(Genres::Table)
                    .col(Genres::UserId)
                    .col(Genres::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Subscriptions
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Subscriptions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Subscriptions::Id)
                            .blob()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Subscriptions::UserId).string().not_null())
                    .col(ColumnDef::new(Subscriptions::Name).string().not_null())
                    .col(
                        ColumnDef::new(Subscriptions::Price)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Subscriptions::Description).string())
                    .col(
                        ColumnDef::new(Subscriptions::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Subscriptions::MonthlyCount).integer())
                    .col(ColumnDef::new(Subscriptions::DailyCount).integer())
                    .col(
                        ColumnDef::new(Subscriptions::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Subscriptions::UpdatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-subscriptions-user_id")
                            .from(Subscriptions::Table, Subscriptions::UserId)
                            .to(Users::Table, Users::Username)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-subscriptions-user_id-name-unique")
                    .table(Subscriptions::Table)
                    .col(Subscriptions::UserId)
                    .col(Subscriptions::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Subscription ↔ genre memberships
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(SubscriptionGenres::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SubscriptionGenres::SubscriptionId)
                            .blob()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SubscriptionGenres::GenreId)
                            .blob()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(SubscriptionGenres::SubscriptionId)
                            .col(SubscriptionGenres::GenreId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-subscription_genres-subscription_id")
                            .from(
                                SubscriptionGenres::Table,
                                SubscriptionGenres::SubscriptionId,
                            )
                            .to(Subscriptions::Table, Subscriptions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-subscription_genres-genre_id")
                            .from(SubscriptionGenres::Table, SubscriptionGenres::GenreId)
                            .to(Genres::Table, Genres::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-subscription_genres-genre_id")
                    .table(SubscriptionGenres::Table)
                    .col(SubscriptionGenres::GenreId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Daily meals
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(DailyMeals::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DailyMeals::Id)
                            .blob()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(DailyMeals::UserId).string().not_null())
                    .col(ColumnDef::new(DailyMeals::Date).date().not_null())
                    .col(ColumnDef::new(DailyMeals::MealType).string().not_null())
                    .col(ColumnDef::new(DailyMeals::SubscriptionId).blob())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-daily_meals-user_id")
                            .from(DailyMeals::Table, DailyMeals::UserId)
                            .to(Users::Table, Users::Username)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-daily_meals-subscription_id")
                            .from(DailyMeals::Table, DailyMeals::SubscriptionId)
                            .to(Subscriptions::Table, Subscriptions::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-daily_meals-user_id-date-meal_type-unique")
                    .table(DailyMeals::Table)
                    .col(DailyMeals::UserId)
                    .col(DailyMeals::Date)
                    .col(DailyMeals::MealType)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-daily_meals-date")
                    .table(DailyMeals::Table)
                    .col(DailyMeals::Date)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of creation (respecting FK dependencies)
        manager
            .drop_table(Table::drop().table(DailyMeals::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SubscriptionGenres::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Subscriptions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Genres::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
