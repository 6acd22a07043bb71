//! Building and checking the portable [`Snapshot`] document.
//!
//! A snapshot references genres and subscriptions by name only. Ids are
//! local to one database and never leave it.

use std::collections::{HashMap, HashSet};

use api_types::snapshot::{
    SNAPSHOT_VERSION, Snapshot, SnapshotGenre, SnapshotMeal, SnapshotSubscription,
};
use uuid::Uuid;

use crate::{
    DailyMeal, EngineError, Genre, ResultEngine, SubscriptionWithGenres,
    util::{normalize_name, normalize_optional_text, validate_count, validate_price},
};

/// Rows created by one import.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub genres_created: usize,
    pub subscriptions_created: usize,
    pub memberships_created: usize,
    pub daily_meals_created: usize,
}

pub(crate) fn build_snapshot(
    genres: &[Genre],
    subscriptions: &[SubscriptionWithGenres],
    daily_meals: &[DailyMeal],
) -> Snapshot {
    let names: HashMap<Uuid, &str> = subscriptions
        .iter()
        .map(|s| (s.subscription.id, s.subscription.name.as_str()))
        .collect();

    Snapshot {
        version: SNAPSHOT_VERSION,
        genres: genres
            .iter()
            .map(|g| SnapshotGenre {
                name: g.name.clone(),
                color: Some(g.color),
                is_calendar_target: Some(g.is_calendar_target),
            })
            .collect(),
        subscriptions: subscriptions
            .iter()
            .map(|s| SnapshotSubscription {
                name: s.subscription.name.clone(),
                price: s.subscription.price,
                description: s.subscription.description.clone(),
                is_active: Some(s.subscription.is_active),
                monthly_count: s.subscription.monthly_count,
                daily_count: s.subscription.daily_count,
                genres: s.genres.iter().map(|g| g.name.clone()).collect(),
            })
            .collect(),
        daily_meals: daily_meals
            .iter()
            .map(|m| SnapshotMeal {
                date: m.date,
                meal_type: m.meal_type,
                subscription_name: m
                    .subscription_id
                    .and_then(|id| names.get(&id))
                    .map(ToString::to_string),
            })
            .collect(),
    }
}

/// Checks a snapshot and returns it with every name normalized.
///
/// Genre names listed by a subscription and meal subscription names are not
/// checked here: references that do not resolve are dropped on import.
pub(crate) fn validate_snapshot(snapshot: Snapshot) -> ResultEngine<Snapshot> {
    if snapshot.version != SNAPSHOT_VERSION {
        return Err(EngineError::InvalidSnapshot(format!(
            "unsupported version {}",
            snapshot.version
        )));
    }

    let mut genre_names = HashSet::new();
    let mut calendar_targets = 0;
    let mut genres = Vec::with_capacity(snapshot.genres.len());
    for genre in snapshot.genres {
        let name = normalize_name(&genre.name, "genre")?;
        if !genre_names.insert(name.clone()) {
            return Err(EngineError::InvalidSnapshot(format!(
                "duplicate genre name: {name}"
            )));
        }
        if genre.is_calendar_target == Some(true) {
            calendar_targets += 1;
        }
        genres.push(SnapshotGenre { name, ..genre });
    }
    if calendar_targets > 1 {
        return Err(EngineError::InvalidSnapshot(
            "more than one calendar target genre".to_string(),
        ));
    }

    let mut subscription_names = HashSet::new();
    let mut subscriptions = Vec::with_capacity(snapshot.subscriptions.len());
    for subscription in snapshot.subscriptions {
        let name = normalize_name(&subscription.name, "subscription")?;
        if !subscription_names.insert(name.clone()) {
            return Err(EngineError::InvalidSnapshot(format!(
                "duplicate subscription name: {name}"
            )));
        }
        validate_price(subscription.price)?;
        validate_count(subscription.monthly_count, "monthlyCount")?;
        validate_count(subscription.daily_count, "dailyCount")?;
        subscriptions.push(SnapshotSubscription {
            name,
            description: normalize_optional_text(subscription.description.as_deref()),
            genres: subscription
                .genres
                .iter()
                .filter_map(|g| normalize_name(g, "genre").ok())
                .collect(),
            ..subscription
        });
    }

    let daily_meals = snapshot
        .daily_meals
        .into_iter()
        .map(|meal| SnapshotMeal {
            subscription_name: meal
                .subscription_name
                .as_deref()
                .and_then(|n| normalize_name(n, "subscription").ok()),
            ..meal
        })
        .collect();

    Ok(Snapshot {
        version: snapshot.version,
        genres,
        subscriptions,
        daily_meals,
    })
}

#[cfg(test)]
mod tests {
    use api_types::{GenreColor, MealType};
    use chrono::{NaiveDate, Utc};

    use super::*;
    use crate::Subscription;

    fn snapshot_genre(name: &str, target: Option<bool>) -> SnapshotGenre {
        SnapshotGenre {
            name: name.to_string(),
            color: None,
            is_calendar_target: target,
        }
    }

    fn snapshot_subscription(name: &str, price: i64) -> SnapshotSubscription {
        SnapshotSubscription {
            name: name.to_string(),
            price,
            description: None,
            is_active: None,
            monthly_count: None,
            daily_count: None,
            genres: Vec::new(),
        }
    }

    fn empty() -> Snapshot {
        Snapshot {
            version: SNAPSHOT_VERSION,
            genres: Vec::new(),
            subscriptions: Vec::new(),
            daily_meals: Vec::new(),
        }
    }

    #[test]
    fn export_rewrites_ids_as_names() {
        let now = Utc::now();
        let food = Genre {
            id: Uuid::new_v4(),
            name: "Food".to_string(),
            color: GenreColor::Teal,
            is_calendar_target: true,
            created_at: now,
            updated_at: now,
        };
        let lunchbox = Subscription {
            id: Uuid::new_v4(),
            name: "Lunchbox".to_string(),
            price: 3200,
            description: Some("weekdays".to_string()),
            is_active: true,
            monthly_count: Some(20),
            daily_count: Some(1),
            created_at: now,
            updated_at: now,
        };
        let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let meals = [
            DailyMeal {
                id: Uuid::new_v4(),
                date,
                meal_type: MealType::Lunch,
                subscription_id: Some(lunchbox.id),
            },
            DailyMeal {
                id: Uuid::new_v4(),
                date,
                meal_type: MealType::Dinner,
                subscription_id: None,
            },
        ];
        let subscriptions = [SubscriptionWithGenres {
            subscription: lunchbox,
            genres: vec![food.clone()],
        }];

        let snapshot = build_snapshot(&[food], &subscriptions, &meals);

        assert_eq!(snapshot.version, 1);
        assert_eq!(snapshot.genres[0].name, "Food");
        assert_eq!(snapshot.genres[0].color, Some(GenreColor::Teal));
        assert_eq!(snapshot.genres[0].is_calendar_target, Some(true));
        assert_eq!(snapshot.subscriptions[0].genres, vec!["Food".to_string()]);
        assert_eq!(snapshot.subscriptions[0].monthly_count, Some(20));
        assert_eq!(
            snapshot.daily_meals[0].subscription_name.as_deref(),
            Some("Lunchbox")
        );
        assert_eq!(snapshot.daily_meals[1].subscription_name, None);
    }

    #[test]
    fn validation_normalizes_names() {
        let mut snapshot = empty();
        snapshot.genres.push(snapshot_genre("  Streaming ", None));
        let mut netflix = snapshot_subscription(" Netflix", 1490);
        netflix.genres = vec!["Streaming  ".to_string(), "   ".to_string()];
        netflix.description = Some("  ".to_string());
        snapshot.subscriptions.push(netflix);

        let snapshot = validate_snapshot(snapshot).unwrap();

        assert_eq!(snapshot.genres[0].name, "Streaming");
        assert_eq!(snapshot.subscriptions[0].name, "Netflix");
        assert_eq!(snapshot.subscriptions[0].genres, vec!["Streaming".to_string()]);
        assert_eq!(snapshot.subscriptions[0].description, None);
    }

    #[test]
    fn wrong_version_is_rejected() {
        let mut snapshot = empty();
        snapshot.version = 2;
        assert_eq!(
            validate_snapshot(snapshot),
            Err(EngineError::InvalidSnapshot("unsupported version 2".to_string()))
        );
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut snapshot = empty();
        snapshot.genres.push(snapshot_genre("Music", None));
        snapshot.genres.push(snapshot_genre("Music ", None));
        assert!(matches!(
            validate_snapshot(snapshot),
            Err(EngineError::InvalidSnapshot(_))
        ));

        let mut snapshot = empty();
        snapshot.subscriptions.push(snapshot_subscription("Spotify", 980));
        snapshot.subscriptions.push(snapshot_subscription("Spotify", 980));
        assert!(matches!(
            validate_snapshot(snapshot),
            Err(EngineError::InvalidSnapshot(_))
        ));
    }

    #[test]
    fn two_calendar_targets_are_rejected() {
        let mut snapshot = empty();
        snapshot.genres.push(snapshot_genre("Food", Some(true)));
        snapshot.genres.push(snapshot_genre("Snacks", Some(true)));
        assert!(validate_snapshot(snapshot).is_err());
    }

    #[test]
    fn field_ranges_are_checked() {
        let mut snapshot = empty();
        snapshot.subscriptions.push(snapshot_subscription("Free", 0));
        assert!(matches!(
            validate_snapshot(snapshot),
            Err(EngineError::InvalidAmount(_))
        ));

        let mut snapshot = empty();
        let mut capped = snapshot_subscription("Capped", 100);
        capped.daily_count = Some(-2);
        snapshot.subscriptions.push(capped);
        assert!(matches!(
            validate_snapshot(snapshot),
            Err(EngineError::InvalidCount(_))
        ));

        let mut snapshot = empty();
        snapshot.genres.push(snapshot_genre(" ", None));
        assert!(matches!(
            validate_snapshot(snapshot),
            Err(EngineError::InvalidName(_))
        ));
    }
}
