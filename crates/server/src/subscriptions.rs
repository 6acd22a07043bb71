//! Subscription API endpoints, including genre memberships.

use api_types::{
    Success,
    subscription::{
        SetGenres, SubscriptionCreate, SubscriptionUpdate, SubscriptionView,
        SubscriptionWithGenresView,
    },
};
use axum::{
    Extension, Json,
    extract::{Path, State},
};
use engine::{NewSubscription, Subscription, SubscriptionPatch, SubscriptionWithGenres};
use uuid::Uuid;

use crate::{ServerError, genres::genre_view, server::ServerState, user::AuthUser};

pub(crate) fn subscription_view(subscription: Subscription) -> SubscriptionView {
    SubscriptionView {
        id: subscription.id,
        name: subscription.name,
        price: subscription.price,
        description: subscription.description,
        is_active: subscription.is_active,
        monthly_count: subscription.monthly_count,
        daily_count: subscription.daily_count,
        created_at: subscription.created_at,
        updated_at: subscription.updated_at,
    }
}

fn with_genres_view(item: SubscriptionWithGenres) -> SubscriptionWithGenresView {
    SubscriptionWithGenresView {
        subscription: subscription_view(item.subscription),
        genres: item.genres.into_iter().map(genre_view).collect(),
    }
}

pub async fn list(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<SubscriptionWithGenresView>>, ServerError> {
    let subscriptions = state
        .engine
        .for_user(&user.username)
        .subscriptions()
        .await?;
    Ok(Json(
        subscriptions.into_iter().map(with_genres_view).collect(),
    ))
}

/// Subscriptions linked to one genre.
pub async fn by_genre(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    Path(genre_id): Path<Uuid>,
) -> Result<Json<Vec<SubscriptionView>>, ServerError> {
    let subscriptions = state
        .engine
        .for_user(&user.username)
        .subscriptions_by_genre(genre_id)
        .await?;
    Ok(Json(
        subscriptions.into_iter().map(subscription_view).collect(),
    ))
}

pub async fn create(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    Json(payload): Json<SubscriptionCreate>,
) -> Result<Json<SubscriptionWithGenresView>, ServerError> {
    let created = state
        .engine
        .for_user(&user.username)
        .create_subscription(NewSubscription {
            name: payload.name,
            price: payload.price,
            description: payload.description,
            is_active: payload.is_active,
            genre_ids: payload.genre_ids.unwrap_or_default(),
            monthly_count: payload.monthly_count,
            daily_count: payload.daily_count,
        })
        .await?;
    Ok(Json(with_genres_view(created)))
}

pub async fn update(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SubscriptionUpdate>,
) -> Result<Json<SubscriptionWithGenresView>, ServerError> {
    let updated = state
        .engine
        .for_user(&user.username)
        .update_subscription(
            id,
            SubscriptionPatch {
                name: payload.name,
                price: payload.price,
                description: payload.description,
                is_active: payload.is_active,
                monthly_count: payload.monthly_count,
                daily_count: payload.daily_count,
            },
        )
        .await?;
    Ok(Json(with_genres_view(updated)))
}

pub async fn delete(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Success>, ServerError> {
    state
        .engine
        .for_user(&user.username)
        .delete_subscription(id)
        .await?;
    Ok(Json(Success::ok()))
}

pub async fn add_to_genre(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    Path((id, genre_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Success>, ServerError> {
    state
        .engine
        .for_user(&user.username)
        .add_to_genre(id, genre_id)
        .await?;
    Ok(Json(Success::ok()))
}

pub async fn remove_from_genre(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    Path((id, genre_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Success>, ServerError> {
    state
        .engine
        .for_user(&user.username)
        .remove_from_genre(id, genre_id)
        .await?;
    Ok(Json(Success::ok()))
}

/// Replace every membership of the subscription.
pub async fn set_genres(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SetGenres>,
) -> Result<Json<Success>, ServerError> {
    state
        .engine
        .for_user(&user.username)
        .set_genres(id, &payload.genre_ids)
        .await?;
    Ok(Json(Success::ok()))
}
