//! # Bot Module
//!
//! Discord side of the player event reactor.
//!
//! ## Architecture
//!
//! [`PlaybackHandler`] implements Serenity's [`EventHandler`] and owns the
//! lifecycle of a guild's playback session:
//!
//! - When the bot itself joins a voice channel, a [`Session`] is opened and
//!   the Songbird call gets a [`events::TrackEventBridge`] per track event
//! - When the bot leaves, the session is closed and later events for that
//!   guild are ignored by the reactor
//!
//! Message delivery and presence updates go through
//! [`messenger::SerenityMessenger`] and [`presence::SerenityPresence`].
//!
//! [`Session`]: crate::audio::session::Session

use dashmap::DashMap;
use serenity::{
    all::{Context, EventHandler, GuildId, Ready, VoiceState},
    async_trait,
};
use songbird::{Call, Songbird};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

pub mod events;
pub mod messenger;
pub mod presence;

use crate::{
    audio::session::SessionManager,
    events::reactor::EventReactor,
    storage::{EqualizerStore, JsonStorage, SettingsProvider},
};

use self::presence::SerenityPresence;

/// Handler de eventos de Discord para el reactor de reproducción
pub struct PlaybackHandler {
    storage: Arc<Mutex<JsonStorage>>,
    sessions: Arc<SessionManager>,
    reactor: Arc<EventReactor>,
    presence: Arc<SerenityPresence>,
    songbird: Arc<Songbird>,
    /// Llamadas que ya tienen el puente de eventos registrado
    voice_handlers: DashMap<GuildId, Arc<Mutex<Call>>>,
}

impl PlaybackHandler {
    pub fn new(
        storage: Arc<Mutex<JsonStorage>>,
        sessions: Arc<SessionManager>,
        reactor: Arc<EventReactor>,
        presence: Arc<SerenityPresence>,
        songbird: Arc<Songbird>,
    ) -> Self {
        Self {
            storage,
            sessions,
            reactor,
            presence,
            songbird,
            voice_handlers: DashMap::new(),
        }
    }

    /// Abre la sesión del guild y conecta los eventos de la llamada
    async fn on_bot_joined(&self, guild_id: GuildId) {
        if self.sessions.get(guild_id).is_none() {
            let notify_channel = self.storage.notify_channel(guild_id).await;
            let handle = self.sessions.open(guild_id, notify_channel);

            if let Some(bands) = self.storage.equalizer_bands(guild_id).await {
                handle.lock().await.store.equalizer = Some(bands);
            }
        }

        let Some(call) = self.songbird.get(guild_id) else {
            warn!("⚠️ Sin llamada de Songbird para guild {}", guild_id);
            return;
        };

        let already_bridged = self
            .voice_handlers
            .get(&guild_id)
            .is_some_and(|existing| Arc::ptr_eq(existing.value(), &call));
        if already_bridged {
            return;
        }

        {
            let mut handler = call.lock().await;
            events::register_track_events(
                &mut handler,
                guild_id,
                self.reactor.clone(),
                call.clone(),
            );
        }
        self.voice_handlers.insert(guild_id, call);
        debug!("🎧 Eventos de track registrados para guild {}", guild_id);
    }

    async fn on_bot_left(&self, guild_id: GuildId) {
        if self.sessions.close(guild_id).await.is_none() {
            debug!("Guild {} sin sesión que cerrar", guild_id);
        }
    }
}

#[async_trait]
impl EventHandler for PlaybackHandler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("✅ {} conectado en {} servidores", ready.user.name, ready.guilds.len());
        self.presence.attach(ctx.shard.clone());
    }

    async fn voice_state_update(&self, ctx: Context, old: Option<VoiceState>, new: VoiceState) {
        if new.user_id != ctx.cache.current_user().id {
            return;
        }

        let Some(guild_id) = new.guild_id.or_else(|| old.as_ref().and_then(|o| o.guild_id)) else {
            return;
        };

        match new.channel_id {
            Some(channel_id) => {
                debug!("Bot en canal de voz {} (guild {})", channel_id, guild_id);
                self.on_bot_joined(guild_id).await;
            }
            None => self.on_bot_left(guild_id).await,
        }
    }
}
