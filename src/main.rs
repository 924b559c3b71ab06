use constants::STARTUP_TIME;
use storage::{device::DeviceId, FavoritesStore};

#[derive(Clone)]
struct Data {
    favorites: FavoritesStore,
    device_id: DeviceId,
}

type Error = Box<dyn std::error::Error + Send + Sync>;
type Context<'a> = poise::Context<'a, Data, Error>;

mod commands;
mod constants;
mod init;
mod models;
mod moods;
mod storage;
mod telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let _ = &*STARTUP_TIME;

    let mut client = init::init().await?;

    client
        .start()
        .await
        .inspect_err(|e| tracing::error!(err = ?e, "the discord client stopped with an error"))?;

    Ok(())
}
