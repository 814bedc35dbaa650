use std::collections::HashMap;
use std::sync::atomic::Ordering;
use std::sync::{atomic::AtomicBool, Arc};
use std::time::{Duration, Instant};

use serenity::all::Context;
use tokio::sync::RwLock;
use tracing::info;

use crate::config::Config;
use crate::drops::DropPost;
use crate::queue::storage::Storage;
use crate::queue::Queue;

mod discord;
mod drops;
mod queue;

const DROP_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

struct DropState {
    registered: Instant,
    ttl: Duration,
    post: DropPost,
    claims: u64,
}

struct BotStorage {
    startup: AtomicBool,
    started: Instant,
    config: Config,
    queue: Queue,
    drops: HashMap<String, DropState>,
    discord: Option<Context>,
}

pub struct BotState(Arc<RwLock<BotStorage>>);

impl Clone for BotState {
    fn clone(&self) -> Self {
        BotState(self.0.clone())
    }
}

impl BotState {
    pub fn new(config: Config) -> Self {
        let queue = Queue::load(Storage::new(&config.storage_folder));

        let store = BotState(Arc::new(RwLock::new(BotStorage {
            startup: AtomicBool::new(true),
            started: Instant::now(),
            config,
            queue,
            drops: HashMap::new(),
            discord: None,
        })));

        /* Forget drops whose claim window has passed. */
        let store_clone = store.clone();
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(DROP_SWEEP_INTERVAL).await;

                let removed = store_clone.drop_sweep(Instant::now()).await;
                if removed > 0 {
                    info!("Expired {} drops", removed);
                }
            }
        });

        store
    }

    pub async fn config(&self) -> Config {
        self.0.read().await.config.clone()
    }

    pub async fn uptime(&self) -> Duration {
        self.0.read().await.started.elapsed()
    }

    pub async fn set_discord(&self, ctx: Context) {
        let mut this = self.0.write().await;

        this.discord = Some(ctx);
    }

    pub async fn set_if_startup(&self) -> bool {
        let this = self.0.read().await;

        if !this.startup.load(Ordering::Relaxed) {
            return false;
        }
        this.startup.swap(false, Ordering::Relaxed);

        true
    }
}

#[cfg(test)]
pub(crate) fn test_state() -> BotState {
    let folder = crate::queue::storage::temp_folder();
    let folder = folder.to_string_lossy().to_string();
    let config = Config::from_lookup(|name| match name {
        "STORAGE_FOLDER" => Some(folder.clone()),
        _ => None,
    })
    .unwrap();

    BotState::new(config)
}
