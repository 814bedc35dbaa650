use std::time::{Duration, Instant};

use crate::drops::DropPost;

use super::{BotState, DropState};

pub struct ClaimedDrop {
    pub post: DropPost,
    pub claims: u64,
}

impl DropState {
    fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.registered) >= self.ttl
    }
}

impl BotState {
    pub async fn drop_register(&self, drop_id: String, post: DropPost, ttl: Duration) {
        self.0.write().await.drops.insert(
            drop_id,
            DropState {
                registered: Instant::now(),
                ttl,
                post,
                claims: 0,
            },
        );
    }

    /// Counts a claim and hands back the drop, or `None` once it is gone or past its window.
    /// Any number of users may claim the same drop.
    pub async fn drop_claim(&self, drop_id: &str, now: Instant) -> Option<ClaimedDrop> {
        let mut this = self.0.write().await;
        let value = this.drops.get_mut(drop_id)?;

        if value.is_expired(now) {
            this.drops.remove(drop_id);
            return None;
        }

        value.claims += 1;
        Some(ClaimedDrop {
            post: value.post.clone(),
            claims: value.claims,
        })
    }

    pub async fn drop_sweep(&self, now: Instant) -> usize {
        let mut this = self.0.write().await;

        let before = this.drops.len();
        this.drops.retain(|_, value| !value.is_expired(now));
        before - this.drops.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drops::DropKind;
    use crate::state::test_state;

    fn post() -> DropPost {
        DropPost {
            kind: DropKind::Text,
            title: "Free stuff".to_string(),
            description: "Grab it".to_string(),
            payload: "CODE-1234".to_string(),
            author: "host".to_string(),
        }
    }

    #[tokio::test]
    async fn many_users_can_claim() {
        let bot = test_state();
        bot.drop_register("d1".to_string(), post(), Duration::from_secs(60))
            .await;

        let now = Instant::now();
        for expected in 1..=3 {
            let claimed = bot.drop_claim("d1", now).await.unwrap();
            assert_eq!(claimed.post, post());
            assert_eq!(claimed.claims, expected);
        }
    }

    #[tokio::test]
    async fn unknown_drop_cannot_be_claimed() {
        let bot = test_state();

        assert!(bot.drop_claim("missing", Instant::now()).await.is_none());
    }

    #[tokio::test]
    async fn expired_drop_cannot_be_claimed() {
        let bot = test_state();
        bot.drop_register("d1".to_string(), post(), Duration::from_secs(60))
            .await;

        let later = Instant::now() + Duration::from_secs(61);
        assert!(bot.drop_claim("d1", later).await.is_none());
        /* The expired entry is gone, even for an earlier clock. */
        assert!(bot.drop_claim("d1", Instant::now()).await.is_none());
    }

    #[tokio::test]
    async fn sweep_removes_only_expired_drops() {
        let bot = test_state();
        bot.drop_register("short".to_string(), post(), Duration::from_secs(10))
            .await;
        bot.drop_register("long".to_string(), post(), Duration::from_secs(3600))
            .await;

        let removed = bot
            .drop_sweep(Instant::now() + Duration::from_secs(60))
            .await;

        assert_eq!(removed, 1);
        assert!(bot.drop_claim("long", Instant::now()).await.is_some());
        assert!(bot.drop_claim("short", Instant::now()).await.is_none());
    }

    #[tokio::test]
    async fn unbounded_ttl_never_expires() {
        let bot = test_state();
        bot.drop_register("forever".to_string(), post(), Duration::MAX)
            .await;

        let much_later = Instant::now() + Duration::from_secs(100 * 365 * 24 * 60 * 60);
        assert_eq!(bot.drop_sweep(much_later).await, 0);
        assert!(bot.drop_claim("forever", much_later).await.is_some());
    }
}
