use async_trait::async_trait;
use serenity::model::id::{ChannelId, MessageId};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::{
    audio::{session::SessionStore, track::Track},
    error::ReactorResult,
};

/// Referencia a un mensaje enviado, suficiente para borrarlo después
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageRef {
    pub channel_id: ChannelId,
    pub message_id: MessageId,
}

/// Tono visual del embed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Music,
    Info,
    Warning,
    Error,
}

/// Contenido de un embed, independiente de cómo se entrega
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedSpec {
    pub title: String,
    pub description: Option<String>,
    pub footer: Option<String>,
    pub thumbnail: Option<String>,
    pub tone: Tone,
}

impl EmbedSpec {
    pub fn new(title: impl Into<String>, tone: Tone) -> Self {
        Self {
            title: title.into(),
            description: None,
            footer: None,
            thumbnail: None,
            tone,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }

    pub fn thumbnail(mut self, thumbnail: Option<String>) -> Self {
        self.thumbnail = thumbnail;
        self
    }
}

/// Canal de mensajería. Los fallos son [`crate::error::ReactorError::Delivery`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send_embed(
        &self,
        channel_id: ChannelId,
        embed: EmbedSpec,
    ) -> ReactorResult<MessageRef>;

    async fn delete_message(&self, message: MessageRef) -> ReactorResult<()>;
}

/// Envía los avisos de la sesión y mantiene un único "Now Playing" vivo
pub struct NotificationManager {
    messenger: Arc<dyn Messenger>,
}

impl NotificationManager {
    pub fn new(messenger: Arc<dyn Messenger>) -> Self {
        Self { messenger }
    }

    pub async fn send_embed(
        &self,
        channel_id: ChannelId,
        embed: EmbedSpec,
    ) -> ReactorResult<MessageRef> {
        self.messenger.send_embed(channel_id, embed).await
    }

    /// Envía un aviso puntual; los errores de entrega solo se registran
    pub async fn notify(&self, channel_id: Option<ChannelId>, embed: EmbedSpec) {
        let Some(channel_id) = channel_id else {
            debug!("Sin canal de avisos, se omite '{}'", embed.title);
            return;
        };

        let title = embed.title.clone();
        if let Err(e) = self.send_embed(channel_id, embed).await {
            warn!("📭 No se pudo enviar '{}' a {}: {}", title, channel_id, e);
        }
    }

    /// Borra el "Now Playing" anterior, si lo hay. Best-effort.
    pub async fn delete_previous(&self, store: &mut SessionStore) {
        let Some(previous) = store.notify_message.take() else {
            return;
        };

        if let Err(e) = self.messenger.delete_message(previous).await {
            debug!("No se pudo borrar el mensaje {}: {}", previous.message_id, e);
        }
    }

    /// Reemplaza el "Now Playing" de la sesión por uno nuevo
    pub async fn replace_now_playing(&self, store: &mut SessionStore, embed: EmbedSpec) {
        self.delete_previous(store).await;

        let Some(channel_id) = store.notify_channel else {
            return;
        };

        match self.send_embed(channel_id, embed).await {
            Ok(message) => store.notify_message = Some(message),
            Err(e) => warn!("📭 No se pudo enviar Now Playing a {}: {}", channel_id, e),
        }
    }
}

/// Embeds que emite el reactor
pub mod notices {
    use super::{EmbedSpec, Tone};
    use crate::audio::track::Track;

    pub fn now_playing(track: &Track, show_thumbnail: bool) -> EmbedSpec {
        let requester = track
            .requester
            .as_ref()
            .map_or_else(|| "Unknown".to_string(), |user| user.to_string());

        EmbedSpec::new("Now Playing", Tone::Music)
            .description(track.description())
            .footer(format!(
                "Track length: {} | Requested by: {}",
                track.display_length(),
                requester
            ))
            .thumbnail(track.thumbnail.clone().filter(|_| show_thumbnail))
    }

    pub fn autoplay_started() -> EmbedSpec {
        EmbedSpec::new("Auto Play started.", Tone::Info)
    }

    pub fn autoplay_failed() -> EmbedSpec {
        EmbedSpec::new("Couldn't get a valid track.", Tone::Warning)
    }

    pub fn queue_ended() -> EmbedSpec {
        EmbedSpec::new("Queue ended.", Tone::Info)
    }

    pub fn track_stuck(description: &str) -> EmbedSpec {
        EmbedSpec::new("Track Stuck", Tone::Warning).description(description)
    }

    pub fn track_error(detail: &str, description: &str) -> EmbedSpec {
        EmbedSpec::new("Track Error", Tone::Error)
            .description(format!("{}\n{}", detail.replace('\n', ""), description))
    }

    pub fn multiple_errors() -> EmbedSpec {
        EmbedSpec::new("Multiple Errors Detected", Tone::Error).description(
            "Closing the audio player due to multiple errors being detected. \
             If this persists, please inform the bot owner as the Audio cog \
             may be temporally unavailable.",
        )
    }
}

/// Descripción de un track opcional, vacía si no hay track
pub fn describe(track: Option<&Track>) -> String {
    track.map(Track::description).unwrap_or_default()
}
