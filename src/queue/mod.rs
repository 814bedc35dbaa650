use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

use rand::Rng;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::error::{QueueError, StorageError};

pub mod storage;

use storage::Storage;

const REQUEST_NUMBER_RANGE: u64 = 1_000_000_000;
const MAX_PROMPT_LENGTH: usize = 500;
/* A fresh publish stays on display this long before rotation takes over. */
const SHOW_LATEST_FOR_MS: i64 = 120 * 1000;
const SHOW_ROTATION_MS: i64 = 20 * 1000;

static PROMPT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^[ a-zA-Z0-9'"\-:,|?.!_()]*$"#).expect("prompt pattern is valid")
});

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub enum RequestStatus {
    #[default]
    Waiting,
    Published,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Request {
    pub start_time: u64,
    pub prev_img_src: Option<String>,
    pub prompt: String,
    pub percentage: u32,
    pub job_id: String,
    pub img_src: String,
    pub request_number: String,
    pub status: RequestStatus,
    pub author: String,
    pub title: String,
    pub description: String,
    pub publish_time: Option<i64>,
    pub error: String,
}

impl Request {
    pub fn new(request_number: String, prompt: String) -> Self {
        Self {
            request_number,
            prompt,
            ..Default::default()
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CheckResponse {
    pub request: Option<Request>,
    pub queue_position: usize,
}

#[derive(Debug, Serialize)]
pub struct ShowResponse {
    pub image: Option<Request>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct Listing {
    pub requests: Vec<String>,
    pub request_map: BTreeMap<String, Request>,
}

pub fn is_valid_prompt(prompt: &str) -> bool {
    !prompt.is_empty() && prompt.len() <= MAX_PROMPT_LENGTH && PROMPT_PATTERN.is_match(prompt)
}

/// Pending requests, every known request by number, and the published list.
///
/// `published` holds request numbers; publishing the same request twice lists it twice.
/// Published requests are left in `requests`, so they keep counting towards queue positions.
pub struct Queue {
    requests: Vec<String>,
    request_map: HashMap<String, Request>,
    published: Vec<String>,
    storage: Storage,
}

impl Queue {
    pub fn new(storage: Storage) -> Self {
        Self {
            requests: Vec::new(),
            request_map: HashMap::new(),
            published: Vec::new(),
            storage,
        }
    }

    /// Builds the queue from the published items on disk. Pending requests are not persisted,
    /// so the queue always starts empty.
    pub fn load(storage: Storage) -> Self {
        let items = match storage.load() {
            Ok(items) => items,
            Err(why) => {
                error!("Failed to load published items: {}", why);
                Vec::new()
            }
        };

        let mut queue = Queue::new(storage);
        queue.restore(items);
        info!("Loaded {} published items", queue.published.len());
        queue
    }

    pub fn restore(&mut self, items: Vec<Request>) {
        for item in items {
            self.published.push(item.request_number.clone());
            self.request_map.insert(item.request_number.clone(), item);
        }
    }

    fn next_request_number(&self) -> String {
        let mut rng = rand::rng();
        loop {
            let candidate = rng.random_range(0..REQUEST_NUMBER_RANGE).to_string();
            if !self.request_map.contains_key(&candidate) {
                return candidate;
            }
        }
    }

    /// Registers a request without validating or queueing it.
    pub fn create(&mut self, prompt: &str) -> Request {
        let request = Request::new(self.next_request_number(), prompt.to_string());
        self.request_map
            .insert(request.request_number.clone(), request.clone());
        request
    }

    pub fn enqueue(&mut self, prompt: &str) -> Result<Request, QueueError> {
        if !is_valid_prompt(prompt) {
            return Err(QueueError::BadPrompt);
        }

        let request = self.create(prompt);
        self.requests.push(request.request_number.clone());
        Ok(request)
    }

    pub fn lookup(&self, request_number: &str) -> Option<&Request> {
        self.request_map.get(request_number)
    }

    /// 1-based position in the pending queue; 0 means "not queued".
    pub fn queue_position(&self, request_number: &str) -> usize {
        self.requests
            .iter()
            .position(|r| r == request_number)
            .map_or(0, |index| index + 1)
    }

    pub fn check(&self, request_number: &str) -> CheckResponse {
        CheckResponse {
            request: self.lookup(request_number).cloned(),
            queue_position: self.queue_position(request_number),
        }
    }

    pub fn publish(
        &mut self,
        request_number: &str,
        author: &str,
        title: &str,
        description: &str,
        now_ms: i64,
    ) -> Result<Request, QueueError> {
        let request = self
            .request_map
            .get_mut(request_number)
            .ok_or_else(|| QueueError::NotFound(request_number.to_string()))?;

        request.author = author.to_string();
        request.title = title.to_string();
        request.description = description.to_string();
        request.publish_time = Some(now_ms);
        request.status = RequestStatus::Published;

        let request = request.clone();
        self.published.push(request.request_number.clone());
        Ok(request)
    }

    pub fn published_items(&self) -> Vec<&Request> {
        self.published
            .iter()
            .filter_map(|number| self.request_map.get(number))
            .collect()
    }

    pub fn persist(&self) -> Result<(), StorageError> {
        self.storage.save(&self.published_items())
    }

    /// Shows the newest published item while it is fresh; after that, cycles through all
    /// published items on a wall-clock cadence.
    pub fn show(&self, now_ms: i64) -> ShowResponse {
        let items = self.published_items();
        let Some(&latest) = items.last() else {
            return ShowResponse {
                image: None,
                count: 0,
            };
        };

        let shown = if now_ms - latest.publish_time.unwrap_or(0) > SHOW_LATEST_FOR_MS {
            let slot = now_ms.div_euclid(SHOW_ROTATION_MS).rem_euclid(items.len() as i64);
            items[slot as usize]
        } else {
            latest
        };

        ShowResponse {
            image: Some(shown.clone()),
            count: items.len(),
        }
    }

    pub fn listing(&self) -> Listing {
        Listing {
            requests: self.requests.clone(),
            request_map: self
                .request_map
                .iter()
                .map(|(number, request)| (number.clone(), request.clone()))
                .collect(),
        }
    }

    pub fn queue_len(&self) -> usize {
        self.requests.len()
    }

    pub fn published_count(&self) -> usize {
        self.published.len()
    }
}

#[cfg(test)]
mod tests {
    use super::storage::temp_folder;
    use super::*;

    const NOW: i64 = 1_700_000_000_000;

    fn queue() -> Queue {
        Queue::new(Storage::new(&temp_folder()))
    }

    #[test]
    fn prompt_validation() {
        assert!(is_valid_prompt("a cat, sitting (quietly) on a mat!"));
        assert!(is_valid_prompt("it's \"fine\" - really? yes: a|b_c."));
        assert!(is_valid_prompt(&"a".repeat(500)));

        assert!(!is_valid_prompt(""));
        assert!(!is_valid_prompt(&"a".repeat(501)));
        assert!(!is_valid_prompt("semi;colon"));
        assert!(!is_valid_prompt("slash/"));
        assert!(!is_valid_prompt("ねこ"));
        assert!(!is_valid_prompt("new\nline"));
    }

    #[test]
    fn enqueue_appends_to_the_end() {
        let mut queue = queue();

        for expected in 1..=3 {
            let request = queue.enqueue("a cat").unwrap();
            assert!(request.request_number.chars().all(|c| c.is_ascii_digit()));
            assert_eq!(request.status, RequestStatus::Waiting);
            assert_eq!(queue.queue_position(&request.request_number), expected);
            assert_eq!(queue.queue_len(), expected);
        }
    }

    #[test]
    fn bad_prompt_leaves_queue_unchanged() {
        let mut queue = queue();
        queue.enqueue("fine").unwrap();

        assert_eq!(queue.enqueue("not;fine"), Err(QueueError::BadPrompt));
        assert_eq!(queue.enqueue(""), Err(QueueError::BadPrompt));
        assert_eq!(queue.queue_len(), 1);
        assert_eq!(queue.listing().request_map.len(), 1);
    }

    #[test]
    fn created_requests_are_known_but_not_queued() {
        let mut queue = queue();
        let request = queue.create("only registered");

        let check = queue.check(&request.request_number);
        assert_eq!(check.request, Some(request));
        assert_eq!(check.queue_position, 0);
    }

    #[test]
    fn request_numbers_are_unique() {
        let mut queue = queue();
        let mut seen = std::collections::HashSet::new();

        for _ in 0..1000 {
            assert!(seen.insert(queue.create("x").request_number));
        }
    }

    #[test]
    fn check_unknown_request() {
        let check = queue().check("404");

        assert_eq!(check.request, None);
        assert_eq!(check.queue_position, 0);
        assert_eq!(
            serde_json::to_value(&check).unwrap(),
            serde_json::json!({ "request": null, "queue_position": 0 })
        );
    }

    #[test]
    fn publish_unknown_request() {
        let mut queue = queue();

        assert_eq!(
            queue.publish("404", "me", "t", "d", NOW),
            Err(QueueError::NotFound("404".to_string()))
        );
        assert_eq!(queue.published_count(), 0);
    }

    #[test]
    fn publish_updates_request() {
        let mut queue = queue();
        let request = queue.enqueue("a cat").unwrap();

        let published = queue
            .publish(&request.request_number, "me", "Cat", "A cat.", NOW)
            .unwrap();

        assert_eq!(published.status, RequestStatus::Published);
        assert_eq!(published.author, "me");
        assert_eq!(published.title, "Cat");
        assert_eq!(published.description, "A cat.");
        assert_eq!(published.publish_time, Some(NOW));
        assert_eq!(queue.lookup(&request.request_number), Some(&published));
        /* Publishing does not take the request out of the pending queue. */
        assert_eq!(queue.queue_position(&request.request_number), 1);
    }

    #[test]
    fn publishing_twice_lists_the_request_twice() {
        let mut queue = queue();
        let request = queue.enqueue("a cat").unwrap();

        queue
            .publish(&request.request_number, "a", "first", "", NOW)
            .unwrap();
        queue
            .publish(&request.request_number, "b", "second", "", NOW + 1)
            .unwrap();

        let items = queue.published_items();
        assert_eq!(queue.published_count(), 2);
        assert_eq!(items[0], items[1]);
        assert_eq!(items[0].title, "second");
    }

    #[test]
    fn show_without_published_items() {
        let show = queue().show(NOW);

        assert_eq!(
            serde_json::to_value(&show).unwrap(),
            serde_json::json!({ "image": null, "count": 0 })
        );
    }

    #[test]
    fn show_prefers_fresh_publish() {
        let mut queue = queue();
        let first = queue.enqueue("first").unwrap();
        let second = queue.enqueue("second").unwrap();
        queue
            .publish(&first.request_number, "", "", "", NOW - 600_000)
            .unwrap();
        queue
            .publish(&second.request_number, "", "", "", NOW - 120_000)
            .unwrap();

        let show = queue.show(NOW);
        assert_eq!(show.count, 2);
        assert_eq!(show.image.unwrap().request_number, second.request_number);
    }

    #[test]
    fn show_single_stale_item() {
        let mut queue = queue();
        let request = queue.enqueue("only").unwrap();
        queue
            .publish(&request.request_number, "", "", "", NOW - 200_000)
            .unwrap();

        let show = queue.show(NOW);
        assert_eq!(show.count, 1);
        assert_eq!(show.image.unwrap().request_number, request.request_number);
    }

    #[test]
    fn show_rotates_through_stale_items() {
        let mut queue = queue();
        let mut numbers = Vec::new();
        for prompt in ["a", "b", "c"] {
            let request = queue.enqueue(prompt).unwrap();
            queue
                .publish(&request.request_number, "", "", "", 0)
                .unwrap();
            numbers.push(request.request_number);
        }

        /* 20 second slots: slot 60 maps to index 0, slot 61 to 1, slot 62 to 2. */
        for (now, expected) in [
            (1_200_000, 0),
            (1_219_999, 0),
            (1_220_000, 1),
            (1_240_000, 2),
            (1_260_000, 0),
        ] {
            let shown = queue.show(now).image.unwrap();
            assert_eq!(shown.request_number, numbers[expected], "at {now}");
        }
    }

    #[test]
    fn restart_keeps_published_and_drops_pending() {
        let folder = temp_folder();
        let mut queue = Queue::load(Storage::new(&folder));

        for prompt in ["one", "two", "three"] {
            let request = queue.enqueue(prompt).unwrap();
            queue
                .publish(&request.request_number, "me", prompt, "", NOW)
                .unwrap();
            queue.persist().unwrap();
        }
        queue.enqueue("pending one").unwrap();
        queue.enqueue("pending two").unwrap();
        assert_eq!(queue.queue_len(), 5);

        let restarted = Queue::load(Storage::new(&folder));
        assert_eq!(restarted.published_count(), 3);
        assert_eq!(restarted.queue_len(), 0);
        assert_eq!(restarted.listing().request_map.len(), 3);
        for item in restarted.published_items() {
            assert_eq!(item.status, RequestStatus::Published);
            assert_eq!(restarted.queue_position(&item.request_number), 0);
        }
    }

    #[test]
    fn load_survives_corrupt_file() {
        let folder = temp_folder();
        std::fs::write(folder.join(storage::PRIMARY_FILE), "not json").unwrap();

        let queue = Queue::load(Storage::new(&folder));
        assert_eq!(queue.published_count(), 0);
    }

    #[test]
    fn listing_contains_queue_order_and_map() {
        let mut queue = queue();
        let a = queue.enqueue("a").unwrap();
        let b = queue.enqueue("b").unwrap();
        queue.create("unqueued");

        let listing = queue.listing();
        assert_eq!(listing.requests, vec![a.request_number, b.request_number]);
        assert_eq!(listing.request_map.len(), 3);
    }
}
