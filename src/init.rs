use std::sync::Arc;

use anyhow::Context as _;
use poise::serenity_prelude::{self as serenity, *};
use tracing::Instrument;

use crate::{
    commands,
    storage::{
        device::DeviceId,
        events::EventBus,
        local::{LocalFavorites, LocalStorage},
        remote::{RemoteConfig, RemoteFavorites},
        FavoritesProvider, FavoritesStore,
    },
    telemetry, Data,
};

async fn init_local_storage(events: EventBus) -> anyhow::Result<LocalStorage> {
    let db_url = std::env::var("DATABASE_URL").context("missing DATABASE_URL")?;

    tracing::info!("initializing local storage...");
    let storage = LocalStorage::connect(&db_url, events).await?;

    Ok(storage)
}

fn init_remote(device_id: &DeviceId) -> Option<Arc<dyn FavoritesProvider>> {
    let Some(config) = RemoteConfig::from_env() else {
        tracing::warn!("missing supabase credentials - favorites will only be stored locally");
        return None;
    };

    match RemoteFavorites::new(&config, device_id.clone()) {
        Ok(remote) => {
            tracing::info!(url = %config.url, "storing favorites in supabase, with local storage as fallback");
            Some(Arc::new(remote))
        }
        Err(e) => {
            tracing::warn!(err = ?e, "invalid supabase credentials - favorites will only be stored locally");
            None
        }
    }
}

async fn init_data() -> anyhow::Result<Data> {
    let events = EventBus::default();
    let storage = init_local_storage(events.clone()).await?;
    let device_id = DeviceId::load_or_create(&storage).await;
    tracing::info!(device_id = %device_id, "loaded device id");

    let remote = init_remote(&device_id);
    let local: Arc<dyn FavoritesProvider> = Arc::new(LocalFavorites::new(storage));
    let favorites = FavoritesStore::new(remote, local, events);

    Ok(Data {
        favorites,
        device_id,
    })
}

async fn init_discord_client(token: &str, data: Data) -> anyhow::Result<Client> {
    let intents =
        serenity::GatewayIntents::non_privileged() | serenity::GatewayIntents::MESSAGE_CONTENT;

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![
                commands::help::help(),
                commands::status::status(),
                commands::mood::mood(),
                commands::favorites::favorites(),
            ],
            prefix_options: poise::PrefixFrameworkOptions {
                prefix: Some("q>".into()),
                ..Default::default()
            },
            ..Default::default()
        })
        .setup(|ctx, _ready, framework| {
            Box::pin(async move {
                poise::builtins::register_globally(ctx, &framework.options().commands)
                    .await
                    .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when registering commands"))?;

                Ok(data)
            }.in_current_span())
        })
        .build();

    let client = ClientBuilder::new(token, intents)
        .framework(framework)
        .activity(serenity::ActivityData::custom("how are you feeling today?"))
        .await?;

    Ok(client)
}

pub async fn init() -> anyhow::Result<Client> {
    telemetry::init_telemetry()
        .map_err(|e| anyhow::anyhow!(e))
        .context("failed to initialize telemetry")?;

    tracing::info!("initializing... please wait warmly.");

    let token = std::env::var("DISCORD_TOKEN").context("missing DISCORD_TOKEN")?;

    let data = init_data().await?;
    let client = init_discord_client(&token, data).await?;

    tracing::info!("finished initializing!");
    Ok(client)
}
