use anyhow::Result;
use serenity::{http::Http, model::gateway::GatewayIntents, Client};
use songbird::{SerenityInit, Songbird};
use std::sync::Arc;
use tracing::{error, info};

mod audio;
mod bot;
mod config;
mod error;
mod events;
mod storage;
mod ui;

use crate::audio::{engine::SongbirdEngine, session::SessionManager};
use crate::bot::{messenger::SerenityMessenger, presence::SerenityPresence, PlaybackHandler};
use crate::config::Config;
use crate::events::{
    autoplay::{AutoplayProvider, HistoryAutoplay},
    bus::{spawn_event_logger, BroadcastBus},
    reactor::{Collaborators, EventReactor},
};
use crate::storage::JsonStorage;

#[tokio::main]
async fn main() -> Result<()> {
    // Inicializar logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("open_music_reactor=debug".parse()?)
                .add_directive("serenity=info".parse()?)
                .add_directive("songbird=info".parse()?),
        )
        .init();

    info!("🎵 Iniciando Open Music Reactor v{}", env!("CARGO_PKG_VERSION"));

    // Cargar configuración
    let config = Config::load()?;
    info!("⚙️ Configuración: {}", config.summary());

    // Inicializar almacenamiento JSON
    let storage = Arc::new(tokio::sync::Mutex::new(
        JsonStorage::new(config.data_dir.clone()).await?,
    ));

    let sessions = Arc::new(SessionManager::new(config.tuning()));

    let bus = Arc::new(BroadcastBus::new(config.event_bus_capacity));
    spawn_event_logger(bus.subscribe());

    let songbird = Songbird::serenity();
    let engine = Arc::new(SongbirdEngine::new(songbird.clone(), reqwest::Client::new()));
    let messenger = Arc::new(SerenityMessenger::new(Arc::new(Http::new(&config.discord_token))));
    let presence = Arc::new(SerenityPresence::new());
    let autoplay: Arc<dyn AutoplayProvider> = Arc::new(HistoryAutoplay);

    let reactor = Arc::new(EventReactor::new(
        sessions.clone(),
        Collaborators {
            settings: storage.clone(),
            equalizer: storage.clone(),
            engine,
            bus,
            messenger,
            autoplay: Some(autoplay),
            presence: presence.clone(),
        },
        config.tuning(),
    ));

    // Configurar intents mínimos necesarios
    let intents = GatewayIntents::GUILDS | GatewayIntents::GUILD_VOICE_STATES;

    let handler = PlaybackHandler::new(storage, sessions, reactor, presence, songbird.clone());

    // Construir cliente
    let mut client = Client::builder(&config.discord_token, intents)
        .event_handler(handler)
        .register_songbird_with(songbird)
        .await?;

    // Manejar shutdown graceful
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Error al registrar Ctrl+C: {:?}", e);
            return;
        }
        info!("⚠️ Señal de shutdown recibida, cerrando...");
        std::process::exit(0);
    });

    // Iniciar bot
    info!("🚀 Reactor iniciado exitosamente");
    if let Err(why) = client.start().await {
        error!("Error al ejecutar cliente: {:?}", why);
    }

    Ok(())
}
