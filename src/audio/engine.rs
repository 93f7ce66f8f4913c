use async_trait::async_trait;
use serenity::model::id::GuildId;
use songbird::{
    input::HttpRequest,
    tracks::{PlayMode, TrackHandle},
    Call, Songbird,
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::{
    audio::track::Track,
    error::{ReactorError, ReactorResult},
};

/// Operaciones de transporte sobre el motor de reproducción de un guild.
///
/// Todas fallan con [`ReactorError::EngineUnavailable`] cuando ya no hay
/// conexión de voz.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlaybackEngine: Send + Sync {
    /// Encola un track en el motor
    async fn play(&self, guild_id: GuildId, track: Track) -> ReactorResult<()>;

    /// Salta al siguiente track
    async fn skip(&self, guild_id: GuildId) -> ReactorResult<()>;

    /// Detiene la reproducción y vacía la cola del motor
    async fn stop(&self, guild_id: GuildId) -> ReactorResult<()>;

    /// Sale del canal de voz
    async fn disconnect(&self, guild_id: GuildId) -> ReactorResult<()>;

    /// Quita de la cola del motor las copias pendientes de `track`.
    /// La pista en curso no se toca; de ella se encarga `skip`.
    async fn remove(&self, guild_id: GuildId, track: &Track) -> ReactorResult<usize>;

    /// Tracks en espera detrás del actual
    async fn upcoming_len(&self, guild_id: GuildId) -> usize;

    /// ¿Sigue sonando algo?
    async fn is_playing(&self, guild_id: GuildId) -> bool;
}

/// Track adjunto a un handle de Songbird.
///
/// Todo lo que entra en la cola lo encola [`SongbirdEngine::play`], que
/// siempre adjunta un [`Track`]; `TrackHandle::data` entra en pánico si
/// el tipo adjunto es otro.
pub fn attached_track(handle: &TrackHandle) -> Arc<Track> {
    handle.data::<Track>()
}

/// Motor basado en la cola integrada de Songbird.
///
/// Cada track encolado lleva su [`Track`] como datos de usuario para que el
/// puente de eventos pueda reconstruir el envelope.
pub struct SongbirdEngine {
    manager: Arc<Songbird>,
    http: reqwest::Client,
}

impl SongbirdEngine {
    pub fn new(manager: Arc<Songbird>, http: reqwest::Client) -> Self {
        Self { manager, http }
    }

    fn call(&self, guild_id: GuildId) -> ReactorResult<Arc<Mutex<Call>>> {
        self.manager.get(guild_id).ok_or_else(|| {
            ReactorError::EngineUnavailable(format!("sin conexión de voz en guild {}", guild_id))
        })
    }
}

#[async_trait]
impl PlaybackEngine for SongbirdEngine {
    async fn play(&self, guild_id: GuildId, track: Track) -> ReactorResult<()> {
        let uri = track.uri.clone().ok_or_else(|| {
            ReactorError::DataUnavailable(format!("'{}' no tiene URI reproducible", track.title))
        })?;
        let call = self.call(guild_id)?;

        info!("➕ Encolando en Songbird: {}", track.title);
        let input = HttpRequest::new(self.http.clone(), uri);
        let song = songbird::tracks::Track::new_with_data(input.into(), Arc::new(track));

        let mut handler = call.lock().await;
        handler.enqueue(song).await;

        Ok(())
    }

    async fn skip(&self, guild_id: GuildId) -> ReactorResult<()> {
        let call = self.call(guild_id)?;
        let handler = call.lock().await;
        handler
            .queue()
            .skip()
            .map_err(|e| ReactorError::EngineUnavailable(e.to_string()))?;
        debug!("⏭️ Skip enviado en guild {}", guild_id);
        Ok(())
    }

    async fn stop(&self, guild_id: GuildId) -> ReactorResult<()> {
        let call = self.call(guild_id)?;
        let handler = call.lock().await;
        handler.queue().stop();
        info!("⏹️ Reproducción detenida en guild {}", guild_id);
        Ok(())
    }

    async fn disconnect(&self, guild_id: GuildId) -> ReactorResult<()> {
        self.manager
            .remove(guild_id)
            .await
            .map_err(|e| ReactorError::EngineUnavailable(e.to_string()))?;
        info!("🔌 Desconectado del canal de voz en guild {}", guild_id);
        Ok(())
    }

    async fn remove(&self, guild_id: GuildId, track: &Track) -> ReactorResult<usize> {
        let call = self.call(guild_id)?;
        let handler = call.lock().await;

        let removed = handler.queue().modify_queue(|queue| {
            let mut removed = Vec::new();
            // index 0 es la pista en curso
            let mut index = 1;
            while index < queue.len() {
                if attached_track(&queue[index].handle()).id == track.id {
                    removed.extend(queue.remove(index));
                } else {
                    index += 1;
                }
            }
            removed
        });

        for queued in &removed {
            if let Err(e) = queued.handle().stop() {
                debug!("Track quitado ya estaba detenido: {}", e);
            }
        }
        if !removed.is_empty() {
            info!(
                "❌ {} copias de '{}' quitadas de la cola en guild {}",
                removed.len(),
                track.title,
                guild_id
            );
        }
        Ok(removed.len())
    }

    async fn upcoming_len(&self, guild_id: GuildId) -> usize {
        match self.call(guild_id) {
            Ok(call) => call.lock().await.queue().len().saturating_sub(1),
            Err(_) => 0,
        }
    }

    async fn is_playing(&self, guild_id: GuildId) -> bool {
        let Ok(call) = self.call(guild_id) else {
            return false;
        };

        let current = call.lock().await.queue().current();
        match current {
            Some(handle) => matches!(
                handle.get_info().await,
                Ok(info) if matches!(info.playing, PlayMode::Play)
            ),
            None => false,
        }
    }
}
