use serenity::all::{CreateEmbed, CreateEmbedFooter, Ready, Timestamp};

use crate::state::BotState;
use crate::stats;

pub async fn run(bot: &BotState, ready: &Ready) {
    let config = bot.config().await;
    let uptime = bot.uptime().await;
    let stats = stats::process_stats();
    let cpu_usage = stats::process_cpu_usage().await;

    let memory_percent = if stats.total_memory_bytes > 0 {
        stats.rss_bytes as f64 / stats.total_memory_bytes as f64 * 100.0
    } else {
        0.0
    };

    let embed = CreateEmbed::new()
        .title("Bot startup log")
        .field(
            "Bot",
            format!("{} ({})", ready.user.tag(), ready.user.id),
            false,
        )
        .field("Uptime", format!("{}s", uptime.as_secs()), true)
        .field(
            "Memory RSS",
            format!(
                "{:.2} MB ({:.2}%)",
                stats::to_mb(stats.rss_bytes),
                memory_percent
            ),
            true,
        )
        .field("CPU Model", stats.cpu_model, false)
        .field(
            "CPU usage (process)",
            format!("{:.2}%", cpu_usage),
            false,
        )
        .colour(0x3498db)
        .image(config.miku_gif_url)
        .footer(CreateEmbedFooter::new("bot-log"))
        .timestamp(Timestamp::now());

    bot.discord_send_log(embed).await;
}
