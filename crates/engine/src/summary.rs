//! Cost aggregation over a user's subscriptions.
//!
//! [`summarize`] is pure: it takes already-loaded rows and never touches the
//! database, so it is deterministic for a given input.

use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use crate::{EngineError, Genre, ResultEngine, Subscription};

/// Active subscriptions of one genre and their summed price.
#[derive(Clone, Debug, PartialEq)]
pub struct GenreSummary {
    pub genre: Genre,
    pub subscriptions: Vec<Subscription>,
    pub subtotal: i64,
}

/// Active subscriptions without any genre membership.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Unassigned {
    pub subscriptions: Vec<Subscription>,
    pub subtotal: i64,
}

/// Monthly cost breakdown.
///
/// `total` counts each active subscription once, while a subscription with
/// several memberships contributes to every one of its genre subtotals. The
/// subtotals can therefore add up to more than `total`.
#[derive(Clone, Debug, PartialEq)]
pub struct Summary {
    pub genre_summaries: Vec<GenreSummary>,
    pub unassigned: Unassigned,
    pub total: i64,
    pub subscription_count: usize,
}

/// Builds the summary.
///
/// Inactive subscriptions are skipped, as are memberships pointing at them.
/// Genres keep the order they are given in, subscriptions inside a genre keep
/// the order of `subscriptions`. A sum that does not fit in `i64` is an
/// [`EngineError::InvalidAmount`].
pub(crate) fn summarize(
    genres: Vec<Genre>,
    subscriptions: Vec<Subscription>,
    memberships: &[(Uuid, Uuid)],
) -> ResultEngine<Summary> {
    let active: Vec<Subscription> = subscriptions.into_iter().filter(|s| s.is_active).collect();
    let active_ids: HashSet<Uuid> = active.iter().map(|s| s.id).collect();

    let mut by_genre: HashMap<Uuid, HashSet<Uuid>> = HashMap::new();
    let mut assigned: HashSet<Uuid> = HashSet::new();
    for (subscription_id, genre_id) in memberships {
        if !active_ids.contains(subscription_id) {
            continue;
        }
        assigned.insert(*subscription_id);
        by_genre
            .entry(*genre_id)
            .or_default()
            .insert(*subscription_id);
    }

    let genre_summaries = genres
        .into_iter()
        .map(|genre| {
            let members = by_genre.get(&genre.id);
            let subscriptions: Vec<Subscription> = active
                .iter()
                .filter(|s| members.is_some_and(|ids| ids.contains(&s.id)))
                .cloned()
                .collect();
            Ok(GenreSummary {
                subtotal: price_sum(&subscriptions)?,
                genre,
                subscriptions,
            })
        })
        .collect::<ResultEngine<Vec<_>>>()?;

    let unassigned_subscriptions: Vec<Subscription> = active
        .iter()
        .filter(|s| !assigned.contains(&s.id))
        .cloned()
        .collect();
    let unassigned = Unassigned {
        subtotal: price_sum(&unassigned_subscriptions)?,
        subscriptions: unassigned_subscriptions,
    };

    Ok(Summary {
        genre_summaries,
        unassigned,
        total: price_sum(&active)?,
        subscription_count: active.len(),
    })
}

fn price_sum(subscriptions: &[Subscription]) -> ResultEngine<i64> {
    subscriptions.iter().try_fold(0i64, |acc, s| {
        acc.checked_add(s.price)
            .ok_or_else(|| EngineError::InvalidAmount("price sum overflows".to_string()))
    })
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::GenreColor;

    fn genre(name: &str) -> Genre {
        let now = Utc::now();
        Genre {
            id: Uuid::new_v4(),
            name: name.to_string(),
            color: GenreColor::default(),
            is_calendar_target: false,
            created_at: now,
            updated_at: now,
        }
    }

    fn subscription(name: &str, price: i64, is_active: bool) -> Subscription {
        let now = Utc::now();
        Subscription {
            id: Uuid::new_v4(),
            name: name.to_string(),
            price,
            description: None,
            is_active,
            monthly_count: None,
            daily_count: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn streaming_music_and_unassigned() {
        let streaming = genre("Streaming");
        let music = genre("Music");
        let netflix = subscription("Netflix", 1490, true);
        let spotify = subscription("Spotify", 980, true);
        let unknown = subscription("Unknown", 500, true);
        let memberships = [(netflix.id, streaming.id), (spotify.id, music.id)];

        let summary = summarize(
            vec![streaming.clone(), music.clone()],
            vec![netflix.clone(), spotify, unknown.clone()],
            &memberships,
        )
        .unwrap();

        assert_eq!(summary.total, 2970);
        assert_eq!(summary.subscription_count, 3);
        assert_eq!(summary.unassigned.subtotal, 500);
        assert_eq!(summary.unassigned.subscriptions, vec![unknown]);
        assert_eq!(summary.genre_summaries.len(), 2);
        assert_eq!(summary.genre_summaries[0].genre, streaming);
        assert_eq!(summary.genre_summaries[0].subtotal, 1490);
        assert_eq!(summary.genre_summaries[0].subscriptions, vec![netflix]);
        assert_eq!(summary.genre_summaries[1].genre, music);
        assert_eq!(summary.genre_summaries[1].subtotal, 980);
    }

    #[test]
    fn inactive_subscriptions_are_excluded_everywhere() {
        let video = genre("Video");
        let paused = subscription("Paused", 700, false);
        let unlinked_paused = subscription("Old", 300, false);
        let memberships = [(paused.id, video.id)];

        let summary = summarize(vec![video], vec![paused, unlinked_paused], &memberships).unwrap();

        assert_eq!(summary.total, 0);
        assert_eq!(summary.subscription_count, 0);
        assert_eq!(summary.genre_summaries[0].subtotal, 0);
        assert!(summary.genre_summaries[0].subscriptions.is_empty());
        assert_eq!(summary.unassigned, Unassigned::default());
    }

    #[test]
    fn multi_genre_subscription_counts_once_in_total() {
        let work = genre("Work");
        let tools = genre("Tools");
        let editor = subscription("Editor", 1200, true);
        let memberships = [(editor.id, work.id), (editor.id, tools.id)];

        let summary = summarize(vec![work, tools], vec![editor], &memberships).unwrap();

        assert_eq!(summary.total, 1200);
        let subtotals: i64 = summary.genre_summaries.iter().map(|g| g.subtotal).sum();
        assert_eq!(subtotals, 2400);
        assert!(summary.unassigned.subscriptions.is_empty());
    }

    #[test]
    fn empty_input() {
        let summary = summarize(Vec::new(), Vec::new(), &[]).unwrap();
        assert_eq!(summary.total, 0);
        assert_eq!(summary.subscription_count, 0);
        assert!(summary.genre_summaries.is_empty());
    }

    #[test]
    fn overflowing_total_is_an_error() {
        let big = i64::MAX / 2 + 1;
        let subscriptions = vec![subscription("A", big, true), subscription("B", big, true)];

        assert!(matches!(
            summarize(Vec::new(), subscriptions, &[]),
            Err(EngineError::InvalidAmount(_))
        ));
    }

    #[test]
    fn overflowing_genre_subtotal_is_an_error() {
        let bulk = genre("Bulk");
        let a = subscription("A", i64::MAX, true);
        let b = subscription("B", 1, false);
        let c = subscription("C", 1, true);
        let memberships = [(a.id, bulk.id), (c.id, bulk.id)];

        assert!(matches!(
            summarize(vec![bulk], vec![a, b, c], &memberships),
            Err(EngineError::InvalidAmount(_))
        ));
    }
}
