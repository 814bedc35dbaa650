use std::time::Duration;

use serenity::all::{ApplicationId, GatewayIntents};
use serenity::Client;
use tracing::{error, info, warn};

mod channel_name;
mod config;
mod discord;
mod drops;
mod error;
mod queue;
mod state;
mod stats;
mod webserver;

const SELF_PING_INTERVAL: Duration = Duration::from_secs(5 * 60);

/* Keeps free-tier hosts from idling the process. */
async fn self_ping(url: String) {
    let client = reqwest::Client::new();
    let target = format!("{}/health", url);

    loop {
        tokio::time::sleep(SELF_PING_INTERVAL).await;

        match client.get(&target).send().await {
            Ok(response) if response.status().is_success() => {}
            Ok(response) => warn!("Self-ping to {} returned {}", target, response.status()),
            Err(why) => warn!("Self-ping to {} failed: {}", target, why),
        }
    }
}

#[tokio::main]
async fn main() {
    /* Load, if it exists, from the .env file. This mostly makes development easier. */
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt::init();

    /* Log panics instead of letting them vanish with their task; the process keeps serving. */
    std::panic::set_hook(Box::new(|panic| {
        error!("Uncaught panic: {}", panic);
    }));

    info!(
        "Process started. PID={}, argv={}, cwd={}",
        std::process::id(),
        std::env::args().collect::<Vec<_>>().join(" "),
        std::env::current_dir()
            .map(|dir| dir.display().to_string())
            .unwrap_or_default(),
    );
    info!("Startup timestamp: {}", chrono::Utc::now().to_rfc3339());

    let config = match config::Config::from_env() {
        Ok(config) => config,
        Err(why) => {
            error!("Invalid configuration: {}", why);
            return;
        }
    };

    let bot = state::BotState::new(config.clone());

    let web_app = webserver::create_app(bot.clone());
    let web_listener = match tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await {
        Ok(listener) => listener,
        Err(why) => {
            error!("Failed to bind port {}: {}", config.port, why);
            return;
        }
    };
    info!("Health & API server listening on port {}", config.port);
    let web_server = tokio::spawn(async move {
        if let Err(why) = axum::serve(web_listener, web_app).await {
            error!("Web server error: {why:?}");
        }
    });

    if let Some(url) = config.self_url.clone() {
        tokio::spawn(self_ping(url));
    }

    match config.bot_token.as_deref() {
        None => {
            error!("Environment variable BOT_TOKEN is required for Discord features.");
            info!("BOT_TOKEN not provided; Discord client will not login in this process.");
        }
        Some(token) => {
            let intents = GatewayIntents::GUILDS;

            let mut builder = Client::builder(token, intents).event_handler(bot.clone());
            if let Some(client_id) = config.client_id {
                builder = builder.application_id(ApplicationId::new(client_id));
            }

            match builder.await {
                Ok(mut discord_client) => {
                    info!("Attempting Discord login (PID={})", std::process::id());
                    if let Err(why) = discord_client.start().await {
                        error!("Client error: {why:?}");
                    }
                }
                Err(why) => error!("Error creating client: {why:?}"),
            }
        }
    }

    /* A failed login leaves the HTTP API running. */
    let _ = web_server.await;
}
