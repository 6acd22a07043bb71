use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Deserializes a present field (including an explicit `null`) as `Some`.
///
/// Combined with `#[serde(default)]` this gives a tri-state patch field:
/// missing → `None`, `null` → `Some(None)`, value → `Some(Some(v))`.
fn present<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Palette a genre can be drawn with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenreColor {
    Red,
    Orange,
    #[default]
    Amber,
    Yellow,
    Lime,
    Green,
    Emerald,
    Teal,
    Cyan,
    Sky,
    Blue,
    Indigo,
    Violet,
    Purple,
    Fuchsia,
    Pink,
    Rose,
    Slate,
    Gray,
    Zinc,
    Neutral,
    Stone,
}

impl GenreColor {
    pub const ALL: [GenreColor; 22] = [
        Self::Red,
        Self::Orange,
        Self::Amber,
        Self::Yellow,
        Self::Lime,
        Self::Green,
        Self::Emerald,
        Self::Teal,
        Self::Cyan,
        Self::Sky,
        Self::Blue,
        Self::Indigo,
        Self::Violet,
        Self::Purple,
        Self::Fuchsia,
        Self::Pink,
        Self::Rose,
        Self::Slate,
        Self::Gray,
        Self::Zinc,
        Self::Neutral,
        Self::Stone,
    ];

    /// Returns the canonical name used in JSON and in the database.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Orange => "orange",
            Self::Amber => "amber",
            Self::Yellow => "yellow",
            Self::Lime => "lime",
            Self::Green => "green",
            Self::Emerald => "emerald",
            Self::Teal => "teal",
            Self::Cyan => "cyan",
            Self::Sky => "sky",
            Self::Blue => "blue",
            Self::Indigo => "indigo",
            Self::Violet => "violet",
            Self::Purple => "purple",
            Self::Fuchsia => "fuchsia",
            Self::Pink => "pink",
            Self::Rose => "rose",
            Self::Slate => "slate",
            Self::Gray => "gray",
            Self::Zinc => "zinc",
            Self::Neutral => "neutral",
            Self::Stone => "stone",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|color| color.as_str() == value)
    }
}

/// Slot of the day a meal record refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
}

impl MealType {
    pub const ALL: [MealType; 3] = [Self::Breakfast, Self::Lunch, Self::Dinner];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Breakfast => "breakfast",
            Self::Lunch => "lunch",
            Self::Dinner => "dinner",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == value)
    }
}

/// Generic acknowledgement body.
#[derive(Debug, Serialize, Deserialize)]
pub struct Success {
    pub success: bool,
}

impl Success {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

pub mod genre {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct GenreView {
        pub id: Uuid,
        pub name: String,
        pub color: GenreColor,
        pub is_calendar_target: bool,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GenreCreate {
        pub name: String,
        pub color: Option<GenreColor>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GenreRename {
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GenreColorUpdate {
        pub color: GenreColor,
    }
}

pub mod subscription {
    use super::*;
    use crate::genre::GenreView;

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct SubscriptionView {
        pub id: Uuid,
        pub name: String,
        /// Monthly price in minor currency units.
        pub price: i64,
        pub description: Option<String>,
        pub is_active: bool,
        pub monthly_count: Option<i32>,
        pub daily_count: Option<i32>,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    /// A subscription together with the genres it belongs to.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct SubscriptionWithGenresView {
        #[serde(flatten)]
        pub subscription: SubscriptionView,
        pub genres: Vec<GenreView>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct SubscriptionCreate {
        pub name: String,
        pub price: i64,
        pub description: Option<String>,
        pub is_active: Option<bool>,
        pub genre_ids: Option<Vec<Uuid>>,
        pub monthly_count: Option<i32>,
        pub daily_count: Option<i32>,
    }

    /// Partial update. Nullable fields distinguish "absent" from "set to null".
    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct SubscriptionUpdate {
        pub name: Option<String>,
        pub price: Option<i64>,
        #[serde(default, deserialize_with = "present")]
        pub description: Option<Option<String>>,
        pub is_active: Option<bool>,
        #[serde(default, deserialize_with = "present")]
        pub monthly_count: Option<Option<i32>>,
        #[serde(default, deserialize_with = "present")]
        pub daily_count: Option<Option<i32>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct SetGenres {
        pub genre_ids: Vec<Uuid>,
    }
}

pub mod summary {
    use super::*;
    use crate::{genre::GenreView, subscription::SubscriptionView};

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct GenreSummaryView {
        pub genre: GenreView,
        pub subscriptions: Vec<SubscriptionView>,
        pub subtotal: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct UnassignedView {
        pub subscriptions: Vec<SubscriptionView>,
        pub subtotal: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct SummaryView {
        pub genre_summaries: Vec<GenreSummaryView>,
        pub unassigned: UnassignedView,
        pub total: i64,
        pub subscription_count: usize,
    }
}

pub mod meal {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct DailyMealView {
        pub id: Uuid,
        pub date: NaiveDate,
        pub meal_type: MealType,
        pub subscription_id: Option<Uuid>,
    }

    /// Query string of `GET /meals`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct DailyMealRange {
        pub start: NaiveDate,
        pub end: NaiveDate,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct DailyMealUpsert {
        pub date: NaiveDate,
        pub meal_type: MealType,
        #[serde(default)]
        pub subscription_id: Option<Uuid>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct DailyMealDelete {
        pub date: NaiveDate,
        pub meal_type: MealType,
    }
}

/// The portable, name-keyed export/import document.
///
/// Every cross reference is a human-readable name, never an id, so a
/// snapshot can be imported into another account or instance.
pub mod snapshot {
    use super::*;

    pub const SNAPSHOT_VERSION: u32 = 1;

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Snapshot {
        pub version: u32,
        pub genres: Vec<SnapshotGenre>,
        pub subscriptions: Vec<SnapshotSubscription>,
        pub daily_meals: Vec<SnapshotMeal>,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct SnapshotGenre {
        pub name: String,
        #[serde(default)]
        pub color: Option<GenreColor>,
        #[serde(default)]
        pub is_calendar_target: Option<bool>,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct SnapshotSubscription {
        pub name: String,
        pub price: i64,
        #[serde(default)]
        pub description: Option<String>,
        #[serde(default)]
        pub is_active: Option<bool>,
        #[serde(default)]
        pub monthly_count: Option<i32>,
        #[serde(default)]
        pub daily_count: Option<i32>,
        /// Names of the genres the subscription belongs to.
        pub genres: Vec<String>,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct SnapshotMeal {
        pub date: NaiveDate,
        pub meal_type: MealType,
        pub subscription_name: Option<String>,
    }

    /// Response body of `POST /import`.
    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ImportResponse {
        pub success: bool,
        pub genres_created: usize,
        pub subscriptions_created: usize,
        pub memberships_created: usize,
        pub daily_meals_created: usize,
    }
}

#[cfg(test)]
mod tests {
    use super::{snapshot::Snapshot, subscription::SubscriptionUpdate, *};

    #[test]
    fn colors_parse_their_own_names() {
        for color in GenreColor::ALL {
            assert_eq!(GenreColor::parse(color.as_str()), Some(color));
        }
        assert_eq!(GenreColor::parse("magenta"), None);
        assert_eq!(GenreColor::default(), GenreColor::Amber);
    }

    #[test]
    fn meal_types_are_ordered_by_time_of_day() {
        let mut kinds = vec![MealType::Dinner, MealType::Breakfast, MealType::Lunch];
        kinds.sort();
        assert_eq!(kinds, MealType::ALL.to_vec());
    }

    #[test]
    fn patch_distinguishes_missing_from_null() {
        let patch: SubscriptionUpdate =
            serde_json::from_str(r#"{"description": null, "price": 990}"#).unwrap();
        assert_eq!(patch.description, Some(None));
        assert_eq!(patch.monthly_count, None);
        assert_eq!(patch.price, Some(990));
    }

    #[test]
    fn snapshot_uses_camel_case_keys() {
        let raw = r#"{
            "version": 1,
            "genres": [{"name": "Food", "color": "teal", "isCalendarTarget": true}],
            "subscriptions": [{
                "name": "Lunchbox", "price": 3200, "description": null,
                "isActive": true, "monthlyCount": 20, "dailyCount": 1,
                "genres": ["Food"]
            }],
            "dailyMeals": [{"date": "2025-01-02", "mealType": "lunch", "subscriptionName": "Lunchbox"}]
        }"#;
        let snapshot: Snapshot = serde_json::from_str(raw).unwrap();
        assert_eq!(snapshot.genres[0].color, Some(GenreColor::Teal));
        assert_eq!(snapshot.subscriptions[0].monthly_count, Some(20));
        assert_eq!(snapshot.daily_meals[0].meal_type, MealType::Lunch);

        let json = serde_json::to_value(&snapshot).unwrap();
        assert!(json["dailyMeals"][0].get("subscriptionName").is_some());
        assert_eq!(json["genres"][0]["isCalendarTarget"], true);
    }

    #[test]
    fn unknown_color_is_rejected() {
        let raw = r#"{"name": "Video", "color": "magenta"}"#;
        assert!(serde_json::from_str::<genre::GenreCreate>(raw).is_err());
    }
}
