use async_trait::async_trait;
use rand::seq::SliceRandom;
use serenity::model::id::GuildId;
use std::sync::Arc;
use tracing::info;

use crate::{
    audio::{engine::PlaybackEngine, session::Session, track::Track},
    error::{ReactorError, ReactorResult},
};

/// Subsistema que elige el siguiente track cuando la cola se vacía
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AutoplayProvider: Send + Sync {
    /// Falla con [`ReactorError::DataUnavailable`] si no hay candidato
    async fn select(&self, guild_id: GuildId, history: Vec<Track>) -> ReactorResult<Track>;
}

/// Elige al azar entre los tracks ya reproducidos en la sesión
pub struct HistoryAutoplay;

#[async_trait]
impl AutoplayProvider for HistoryAutoplay {
    async fn select(&self, guild_id: GuildId, history: Vec<Track>) -> ReactorResult<Track> {
        let playable: Vec<&Track> = history
            .iter()
            .filter(|track| !track.is_stream && track.uri.is_some())
            .collect();

        // Evitar repetir el último si hay alternativas
        let last_id = history.last().map(|track| track.id.as_str());
        let fresh: Vec<&Track> = playable
            .iter()
            .copied()
            .filter(|track| Some(track.id.as_str()) != last_id)
            .collect();
        let pool = if fresh.is_empty() { &playable } else { &fresh };

        let picked = pool
            .choose(&mut rand::thread_rng())
            .copied()
            .ok_or_else(|| {
                ReactorError::DataUnavailable(format!("sin historial útil en guild {}", guild_id))
            })?;

        let mut track = picked.clone();
        track.requester = None;
        Ok(track.with_autoplay())
    }
}

/// Dispara autoplay al terminar la cola
pub struct AutoplayTrigger {
    provider: Option<Arc<dyn AutoplayProvider>>,
    engine: Arc<dyn PlaybackEngine>,
}

impl AutoplayTrigger {
    pub fn new(
        provider: Option<Arc<dyn AutoplayProvider>>,
        engine: Arc<dyn PlaybackEngine>,
    ) -> Self {
        Self { provider, engine }
    }

    pub fn is_available(&self) -> bool {
        self.provider.is_some()
    }

    /// Resuelve un track, lo agrega a la cola y lo envía al motor
    pub async fn trigger(&self, session: &mut Session) -> ReactorResult<()> {
        let provider = self
            .provider
            .as_ref()
            .ok_or_else(|| ReactorError::DataUnavailable("autoplay no configurado".into()))?;

        let history = session.history().iter().cloned().collect();
        let track = provider.select(session.guild_id, history).await?;

        info!("🔄 Autoplay en guild {}: {}", session.guild_id, track.title);
        self.engine.play(session.guild_id, track.clone()).await?;
        session.queue.push_back(track);

        Ok(())
    }
}
