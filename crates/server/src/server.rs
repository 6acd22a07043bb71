use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, patch, post, put},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};
use tower_http::trace::TraceLayer;

use std::sync::Arc;

use crate::{daily_meals, genres, interchange, subscriptions, user::AuthUser};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

async fn auth(
    auth_header: Option<TypedHeader<Authorization<Basic>>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(TypedHeader(auth_header)) = auth_header else {
        return Err(StatusCode::UNAUTHORIZED);
    };
    if auth_header.username().is_empty() || auth_header.password().is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let username = state
        .engine
        .authenticate(auth_header.username(), auth_header.password())
        .await
        .map_err(|err| {
            tracing::error!("authentication failed: {err}");
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .ok_or(StatusCode::UNAUTHORIZED)?;

    request.extensions_mut().insert(AuthUser { username });
    Ok(next.run(request).await)
}

async fn health() -> &'static str {
    "OK"
}

fn router(state: ServerState) -> Router {
    let protected = Router::new()
        .route("/genres", get(genres::list).post(genres::create))
        .route(
            "/genres/{id}",
            patch(genres::rename).delete(genres::delete),
        )
        .route("/genres/{id}/color", patch(genres::update_color))
        .route("/genres/{id}/calendarTarget", post(genres::set_calendar_target))
        .route("/genres/{id}/subscriptions", get(subscriptions::by_genre))
        .route(
            "/subscriptions",
            get(subscriptions::list).post(subscriptions::create),
        )
        .route(
            "/subscriptions/{id}",
            patch(subscriptions::update).delete(subscriptions::delete),
        )
        .route("/subscriptions/{id}/genres", put(subscriptions::set_genres))
        .route(
            "/subscriptions/{id}/genres/{genre_id}",
            post(subscriptions::add_to_genre).delete(subscriptions::remove_from_genre),
        )
        .route("/summary", get(interchange::summary))
        .route("/export", get(interchange::export))
        .route("/import", post(interchange::import))
        .route(
            "/meals",
            get(daily_meals::list)
                .put(daily_meals::upsert)
                .delete(daily_meals::delete),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth));

    Router::new()
        .route("/health", get(health))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Build the HTTP application around `engine`.
pub fn app(engine: Engine) -> Router {
    router(ServerState {
        engine: Arc::new(engine),
    })
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app(engine)).await
}
