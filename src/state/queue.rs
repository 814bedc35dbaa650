use tracing::{error, info};

use crate::error::QueueError;
use crate::queue::{CheckResponse, Listing, Request, ShowResponse};

use super::BotState;

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

impl BotState {
    pub async fn queue_enqueue(&self, prompt: &str) -> Result<Request, QueueError> {
        let request = self.0.write().await.queue.enqueue(prompt)?;
        info!("[{}] Queued request", request.request_number);

        Ok(request)
    }

    pub async fn queue_check(&self, request_number: &str) -> CheckResponse {
        self.0.read().await.queue.check(request_number)
    }

    /// Publishes and saves while holding the write lock, so overlapping publishes are applied
    /// and written one after the other.
    pub async fn queue_publish(
        &self,
        request_number: &str,
        author: &str,
        title: &str,
        description: &str,
    ) -> Result<Request, QueueError> {
        let mut this = self.0.write().await;

        let request = this
            .queue
            .publish(request_number, author, title, description, now_ms())?;
        info!("[{}] Published \"{}\"", request.request_number, request.title);

        /* A failed save keeps the in-memory state; the next publish rewrites both files anyway. */
        if let Err(why) = this.queue.persist() {
            error!("Failed to save published items: {}", why);
        }

        Ok(request)
    }

    pub async fn queue_show(&self) -> ShowResponse {
        self.0.read().await.queue.show(now_ms())
    }

    pub async fn queue_listing(&self) -> Listing {
        self.0.read().await.queue.listing()
    }

    pub async fn queue_counts(&self) -> (usize, usize) {
        let this = self.0.read().await;

        (this.queue.queue_len(), this.queue.published_count())
    }
}
