//! Daily meal calendar endpoints

use api_types::{
    Success,
    meal::{DailyMealDelete, DailyMealRange, DailyMealUpsert, DailyMealView},
};
use axum::{
    Extension, Json,
    extract::{Query, State},
};
use engine::DailyMeal;

use crate::{ServerError, server::ServerState, user::AuthUser};

fn meal_view(meal: DailyMeal) -> DailyMealView {
    DailyMealView {
        id: meal.id,
        date: meal.date,
        meal_type: meal.meal_type,
        subscription_id: meal.subscription_id,
    }
}

/// `GET /meals?start=YYYY-MM-DD&end=YYYY-MM-DD`, both bounds included.
pub async fn list(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    Query(range): Query<DailyMealRange>,
) -> Result<Json<Vec<DailyMealView>>, ServerError> {
    let meals = state
        .engine
        .for_user(&user.username)
        .daily_meals(range.start, range.end)
        .await?;
    Ok(Json(meals.into_iter().map(meal_view).collect()))
}

pub async fn upsert(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    Json(payload): Json<DailyMealUpsert>,
) -> Result<Json<DailyMealView>, ServerError> {
    let meal = state
        .engine
        .for_user(&user.username)
        .upsert_daily_meal(payload.date, payload.meal_type, payload.subscription_id)
        .await?;
    Ok(Json(meal_view(meal)))
}

pub async fn delete(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    Json(payload): Json<DailyMealDelete>,
) -> Result<Json<Success>, ServerError> {
    state
        .engine
        .for_user(&user.username)
        .delete_daily_meal(payload.date, payload.meal_type)
        .await?;
    Ok(Json(Success::ok()))
}
