use std::time::UNIX_EPOCH;

use crate::{
    commands::get_bot_avatar,
    constants::{version::get_version, EMBED_COLOR, POISE_VERSION, STARTUP_TIME},
    Context, Error,
};
use poise::serenity_prelude as serenity;

/// get the bot's status.
#[poise::command(prefix_command, slash_command)]
#[tracing::instrument(skip_all)]
pub async fn status(ctx: Context<'_>) -> Result<(), Error> {
    let store = &ctx.data().favorites;
    let count = store.list().await.len();
    let backend = store.backend_name().await;
    let uptime = STARTUP_TIME
        .duration_since(UNIX_EPOCH)
        .map(|startup| format!("<t:{}:R>", startup.as_secs()))
        .unwrap_or_else(|_| String::from("unknown"));

    ctx.send(poise::CreateReply::default().embed(
        serenity::CreateEmbed::new()
        .color(EMBED_COLOR)
        .field(
            "about the bot",
            "moodquote hands out a quote for however you're feeling, and remembers the ones you love. written using the [poise](https://github.com/serenity-rs/poise) framework.".to_string(),
            false
        )
        .field("version", get_version(), false)
        .field("rust", format!("[{0}](https://releases.rs/docs/{0})", rustc_version_runtime::version()), true)
        .field("poise", format!("[{0}](https://docs.rs/crate/poise/{0})", POISE_VERSION), true)
        .field("favorites", format!("{} (stored in {})", count, backend), true)
        .field("device", format!("`{}`", ctx.data().device_id), true)
        .field("uptime", uptime, true)
        .thumbnail(get_bot_avatar(ctx))
    ))
    .await
    .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when sending reply"))?;

    Ok(())
}
