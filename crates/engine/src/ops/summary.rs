use crate::{Genre, ResultEngine, Subscription, Summary, summary::summarize};

use super::UserScope;

impl UserScope<'_> {
    /// Monthly cost of the user's active subscriptions, grouped by genre.
    ///
    /// Read-only: nothing is written and no transaction is opened.
    pub async fn summary(&self) -> ResultEngine<Summary> {
        let subscriptions: Vec<Subscription> = self
            .subscription_models(self.database)
            .await?
            .into_iter()
            .map(Subscription::from)
            .collect();
        let genres = self
            .genre_models(self.database)
            .await?
            .into_iter()
            .map(Genre::try_from)
            .collect::<ResultEngine<Vec<_>>>()?;
        let memberships = self.membership_pairs(self.database).await?;

        let summary = summarize(genres, subscriptions, &memberships)?;
        tracing::debug!(
            user = %self.user_id,
            total = summary.total,
            subscriptions = summary.subscription_count,
            "summary computed"
        );
        Ok(summary)
    }
}
