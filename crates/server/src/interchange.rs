//! Summary, export and import endpoints

use api_types::{
    snapshot::{ImportResponse, Snapshot},
    summary::{GenreSummaryView, SummaryView, UnassignedView},
};
use axum::{Extension, Json, extract::State};

use crate::{
    ServerError, genres::genre_view, server::ServerState, subscriptions::subscription_view,
    user::AuthUser,
};

pub async fn summary(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
) -> Result<Json<SummaryView>, ServerError> {
    let summary = state.engine.for_user(&user.username).summary().await?;

    Ok(Json(SummaryView {
        genre_summaries: summary
            .genre_summaries
            .into_iter()
            .map(|g| GenreSummaryView {
                genre: genre_view(g.genre),
                subscriptions: g.subscriptions.into_iter().map(subscription_view).collect(),
                subtotal: g.subtotal,
            })
            .collect(),
        unassigned: UnassignedView {
            subscriptions: summary
                .unassigned
                .subscriptions
                .into_iter()
                .map(subscription_view)
                .collect(),
            subtotal: summary.unassigned.subtotal,
        },
        total: summary.total,
        subscription_count: summary.subscription_count,
    }))
}

pub async fn export(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
) -> Result<Json<Snapshot>, ServerError> {
    let snapshot = state
        .engine
        .for_user(&user.username)
        .export_snapshot()
        .await?;
    Ok(Json(snapshot))
}

/// Merge a snapshot into the caller's data. All or nothing.
pub async fn import(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    Json(payload): Json<Snapshot>,
) -> Result<Json<ImportResponse>, ServerError> {
    let report = state
        .engine
        .for_user(&user.username)
        .import_snapshot(payload)
        .await?;
    Ok(Json(ImportResponse {
        success: true,
        genres_created: report.genres_created,
        subscriptions_created: report.subscriptions_created,
        memberships_created: report.memberships_created,
        daily_meals_created: report.daily_meals_created,
    }))
}
