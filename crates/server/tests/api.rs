use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use base64::Engine as _;
use http_body_util::BodyExt;
use migration::MigratorTrait;
use sea_orm::{ConnectionTrait, Database, Statement};
use serde_json::{Value, json};
use tower::ServiceExt;

async fn test_app() -> Router {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = engine::Engine::builder()
        .database(db)
        .build()
        .await
        .unwrap();
    engine.create_user("alice", "alice-pw").await.unwrap();
    engine.create_user("bob", "bob-pw").await.unwrap();
    server::app(engine)
}

fn basic(user: &str, password: &str) -> String {
    let secret = format!("{user}:{password}");
    format!(
        "Basic {}",
        base64::prelude::BASE64_STANDARD.encode(secret)
    )
}

async fn call(
    app: &Router,
    method: &str,
    uri: &str,
    auth: Option<(&str, &str)>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some((user, password)) = auth {
        builder = builder.header(header::AUTHORIZATION, basic(user, password));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::String(
            String::from_utf8_lossy(&bytes).to_string(),
        ))
    };
    (status, value)
}

const ALICE: Option<(&str, &str)> = Some(("alice", "alice-pw"));
const BOB: Option<(&str, &str)> = Some(("bob", "bob-pw"));

#[tokio::test]
async fn health_is_public() {
    let app = test_app().await;
    let (status, body) = call(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("OK".to_string()));
}

#[tokio::test]
async fn requests_without_valid_credentials_are_rejected() {
    let app = test_app().await;
    let (status, _) = call(&app, "GET", "/genres", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = call(&app, "GET", "/genres", Some(("alice", "nope")), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = call(&app, "GET", "/summary", Some(("mallory", "x")), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unreadable_password_hash_is_a_server_error() {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    db.execute(Statement::from_sql_and_values(
        db.get_database_backend(),
        "INSERT INTO users (username, password_hash) VALUES (?, ?)",
        vec!["carol".into(), "not-a-phc-string".into()],
    ))
    .await
    .unwrap();
    let engine = engine::Engine::builder()
        .database(db)
        .build()
        .await
        .unwrap();
    let app = server::app(engine);

    let (status, _) = call(&app, "GET", "/genres", Some(("carol", "whatever")), None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let (status, _) = call(&app, "GET", "/genres", Some(("dave", "whatever")), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn summary_over_http() {
    let app = test_app().await;

    let (status, streaming) = call(
        &app,
        "POST",
        "/genres",
        ALICE,
        Some(json!({"name": "Streaming"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(streaming["color"], "amber");
    assert_eq!(streaming["isCalendarTarget"], false);

    let (_, music) = call(
        &app,
        "POST",
        "/genres",
        ALICE,
        Some(json!({"name": "Music", "color": "violet"})),
    )
    .await;

    for (name, price, genres) in [
        ("Netflix", 1490, json!([streaming["id"]])),
        ("Spotify", 980, json!([music["id"]])),
        ("Unknown", 500, json!([])),
    ] {
        let (status, created) = call(
            &app,
            "POST",
            "/subscriptions",
            ALICE,
            Some(json!({"name": name, "price": price, "genreIds": genres})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(created["isActive"], true);
    }

    let (status, summary) = call(&app, "GET", "/summary", ALICE, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["total"], 2970);
    assert_eq!(summary["subscriptionCount"], 3);
    assert_eq!(summary["unassigned"]["subtotal"], 500);
    let genre_summaries = summary["genreSummaries"].as_array().unwrap();
    assert_eq!(genre_summaries.len(), 2);
    for entry in genre_summaries {
        let expected = match entry["genre"]["name"].as_str().unwrap() {
            "Streaming" => 1490,
            "Music" => 980,
            other => panic!("unexpected genre {other}"),
        };
        assert_eq!(entry["subtotal"], expected);
    }

    // Bob sees none of it.
    let (_, summary) = call(&app, "GET", "/summary", BOB, None).await;
    assert_eq!(summary["total"], 0);
}

#[tokio::test]
async fn validation_and_ownership_errors() {
    let app = test_app().await;

    let (status, body) = call(
        &app,
        "POST",
        "/subscriptions",
        ALICE,
        Some(json!({"name": "Free", "price": 0})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("price"));

    let (status, _) = call(
        &app,
        "POST",
        "/genres",
        ALICE,
        Some(json!({"name": "Video", "color": "ultraviolet"})),
    )
    .await;
    assert!(status.is_client_error());

    let (_, genre) = call(&app, "POST", "/genres", ALICE, Some(json!({"name": "Video"}))).await;
    let (status, _) = call(&app, "POST", "/genres", ALICE, Some(json!({"name": "Video"}))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let id = genre["id"].as_str().unwrap();
    let (status, _) = call(
        &app,
        "PATCH",
        &format!("/genres/{id}"),
        BOB,
        Some(json!({"name": "Stolen"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = call(&app, "DELETE", &format!("/genres/{id}"), BOB, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = call(&app, "DELETE", &format!("/genres/{id}"), ALICE, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true}));
}

#[tokio::test]
async fn genres_memberships_and_calendar_target() {
    let app = test_app().await;
    let (_, food) = call(&app, "POST", "/genres", ALICE, Some(json!({"name": "Food"}))).await;
    let (_, snacks) = call(&app, "POST", "/genres", ALICE, Some(json!({"name": "Snacks"}))).await;
    let food_id = food["id"].as_str().unwrap();
    let snacks_id = snacks["id"].as_str().unwrap();

    let (status, target) = call(
        &app,
        "POST",
        &format!("/genres/{food_id}/calendarTarget"),
        ALICE,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(target["isCalendarTarget"], true);
    call(
        &app,
        "POST",
        &format!("/genres/{snacks_id}/calendarTarget"),
        ALICE,
        None,
    )
    .await;
    let (_, genres) = call(&app, "GET", "/genres", ALICE, None).await;
    let flagged: Vec<&str> = genres
        .as_array()
        .unwrap()
        .iter()
        .filter(|g| g["isCalendarTarget"] == true)
        .map(|g| g["name"].as_str().unwrap())
        .collect();
    assert_eq!(flagged, vec!["Snacks"]);

    let (status, colored) = call(
        &app,
        "PATCH",
        &format!("/genres/{food_id}/color"),
        ALICE,
        Some(json!({"color": "teal"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(colored["color"], "teal");

    let (_, lunchbox) = call(
        &app,
        "POST",
        "/subscriptions",
        ALICE,
        Some(json!({"name": "Lunchbox", "price": 3200, "monthlyCount": 20})),
    )
    .await;
    let sub_id = lunchbox["id"].as_str().unwrap();
    assert_eq!(lunchbox["genres"], json!([]));

    let uri = format!("/subscriptions/{sub_id}/genres/{food_id}");
    let (status, _) = call(&app, "POST", &uri, ALICE, None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = call(&app, "POST", &uri, ALICE, None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, in_food) = call(
        &app,
        "GET",
        &format!("/genres/{food_id}/subscriptions"),
        ALICE,
        None,
    )
    .await;
    assert_eq!(in_food.as_array().unwrap().len(), 1);
    assert_eq!(in_food[0]["name"], "Lunchbox");

    let (status, _) = call(
        &app,
        "PUT",
        &format!("/subscriptions/{sub_id}/genres"),
        ALICE,
        Some(json!({"genreIds": [snacks_id]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (_, subs) = call(&app, "GET", "/subscriptions", ALICE, None).await;
    assert_eq!(subs[0]["genres"].as_array().unwrap().len(), 1);
    assert_eq!(subs[0]["genres"][0]["name"], "Snacks");

    let (status, _) = call(
        &app,
        "DELETE",
        &format!("/subscriptions/{sub_id}/genres/{snacks_id}"),
        ALICE,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (_, subs) = call(&app, "GET", "/subscriptions", ALICE, None).await;
    assert_eq!(subs[0]["genres"], json!([]));
}

#[tokio::test]
async fn subscription_patch_and_delete() {
    let app = test_app().await;
    let (_, cloud) = call(
        &app,
        "POST",
        "/subscriptions",
        ALICE,
        Some(json!({"name": "Cloud", "price": 300, "description": "photos", "dailyCount": 2})),
    )
    .await;
    let id = cloud["id"].as_str().unwrap();

    let (status, patched) = call(
        &app,
        "PATCH",
        &format!("/subscriptions/{id}"),
        ALICE,
        Some(json!({"description": null, "isActive": false})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["description"], Value::Null);
    assert_eq!(patched["isActive"], false);
    assert_eq!(patched["dailyCount"], 2);
    assert_eq!(patched["price"], 300);

    let (status, _) = call(&app, "DELETE", &format!("/subscriptions/{id}"), ALICE, None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = call(&app, "DELETE", &format!("/subscriptions/{id}"), ALICE, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn meals_upsert_list_and_delete() {
    let app = test_app().await;
    let (_, sub) = call(
        &app,
        "POST",
        "/subscriptions",
        ALICE,
        Some(json!({"name": "Canteen", "price": 5000})),
    )
    .await;

    let (status, first) = call(
        &app,
        "PUT",
        "/meals",
        ALICE,
        Some(json!({"date": "2026-03-04", "mealType": "lunch", "subscriptionId": sub["id"]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (_, second) = call(
        &app,
        "PUT",
        "/meals",
        ALICE,
        Some(json!({"date": "2026-03-04", "mealType": "lunch"})),
    )
    .await;
    assert_eq!(first["id"], second["id"]);
    assert_eq!(second["subscriptionId"], Value::Null);

    call(
        &app,
        "PUT",
        "/meals",
        ALICE,
        Some(json!({"date": "2026-03-04", "mealType": "breakfast"})),
    )
    .await;

    let (status, meals) = call(
        &app,
        "GET",
        "/meals?start=2026-03-01&end=2026-03-04",
        ALICE,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let kinds: Vec<&str> = meals
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["mealType"].as_str().unwrap())
        .collect();
    assert_eq!(kinds, vec!["breakfast", "lunch"]);

    let (status, _) = call(
        &app,
        "GET",
        "/meals?start=2026-03-05&end=2026-03-01",
        ALICE,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = call(
        &app,
        "PUT",
        "/meals",
        ALICE,
        Some(json!({"date": "2026-03-04", "mealType": "brunch"})),
    )
    .await;
    assert!(status.is_client_error());

    let (status, body) = call(
        &app,
        "DELETE",
        "/meals",
        ALICE,
        Some(json!({"date": "2026-03-04", "mealType": "lunch"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let (_, meals) = call(
        &app,
        "GET",
        "/meals?start=2026-03-04&end=2026-03-04",
        ALICE,
        None,
    )
    .await;
    assert_eq!(meals.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn export_then_import_into_another_account() {
    let app = test_app().await;
    let (_, video) = call(&app, "POST", "/genres", ALICE, Some(json!({"name": "Video"}))).await;
    let (_, netflix) = call(
        &app,
        "POST",
        "/subscriptions",
        ALICE,
        Some(json!({"name": "Netflix", "price": 1490, "genreIds": [video["id"]]})),
    )
    .await;
    call(
        &app,
        "PUT",
        "/meals",
        ALICE,
        Some(json!({"date": "2026-03-01", "mealType": "dinner", "subscriptionId": netflix["id"]})),
    )
    .await;

    let (status, snapshot) = call(&app, "GET", "/export", ALICE, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(snapshot["version"], 1);
    assert_eq!(snapshot["subscriptions"][0]["genres"], json!(["Video"]));
    assert_eq!(snapshot["dailyMeals"][0]["subscriptionName"], "Netflix");

    let (status, report) = call(&app, "POST", "/import", BOB, Some(snapshot.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        report,
        json!({
            "success": true,
            "genresCreated": 1,
            "subscriptionsCreated": 1,
            "membershipsCreated": 1,
            "dailyMealsCreated": 1
        })
    );

    let (_, again) = call(&app, "POST", "/import", BOB, Some(snapshot)).await;
    assert_eq!(again["genresCreated"], 0);
    assert_eq!(again["dailyMealsCreated"], 0);

    let (_, summary) = call(&app, "GET", "/summary", BOB, None).await;
    assert_eq!(summary["total"], 1490);

    let (status, _) = call(
        &app,
        "POST",
        "/import",
        BOB,
        Some(json!({"version": 2, "genres": [], "subscriptions": [], "dailyMeals": []})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}
