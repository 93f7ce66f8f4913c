use serenity::model::id::GuildId;
use tokio::{sync::broadcast, task::JoinHandle};
use tracing::{info, warn};

use crate::audio::track::{Track, UserRef};

/// Eventos de dominio publicados por el reactor, cada uno con su payload fijo
#[derive(Debug, Clone, PartialEq)]
pub enum DomainEvent {
    TrackStarted {
        guild_id: GuildId,
        track: Option<Track>,
        requester: Option<UserRef>,
    },
    TrackEnded {
        guild_id: GuildId,
        track: Option<Track>,
        requester: Option<UserRef>,
    },
    QueueEnded {
        guild_id: GuildId,
        track: Option<Track>,
        requester: Option<UserRef>,
    },
    Disconnected {
        guild_id: GuildId,
    },
}

impl DomainEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::TrackStarted { .. } => "audio_track_start",
            Self::TrackEnded { .. } => "audio_track_end",
            Self::QueueEnded { .. } => "audio_queue_end",
            Self::Disconnected { .. } => "audio_disconnect",
        }
    }

    pub fn guild_id(&self) -> GuildId {
        match self {
            Self::TrackStarted { guild_id, .. }
            | Self::TrackEnded { guild_id, .. }
            | Self::QueueEnded { guild_id, .. }
            | Self::Disconnected { guild_id } => *guild_id,
        }
    }
}

/// Bus de eventos fire-and-forget
#[cfg_attr(test, mockall::automock)]
pub trait EventBus: Send + Sync {
    fn publish(&self, event: DomainEvent);
}

/// Bus sobre un canal broadcast de tokio
pub struct BroadcastBus {
    sender: broadcast::Sender<DomainEvent>,
}

impl BroadcastBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.sender.subscribe()
    }
}

impl EventBus for BroadcastBus {
    fn publish(&self, event: DomainEvent) {
        // Sin suscriptores no es un error
        let _ = self.sender.send(event);
    }
}

/// Registra en el log cada evento publicado
pub fn spawn_event_logger(mut receiver: broadcast::Receiver<DomainEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    let title = match &event {
                        DomainEvent::TrackStarted { track, .. }
                        | DomainEvent::TrackEnded { track, .. }
                        | DomainEvent::QueueEnded { track, .. } => {
                            track.as_ref().map(|t| t.title.clone())
                        }
                        DomainEvent::Disconnected { .. } => None,
                    };
                    info!(
                        "📣 {} en guild {} ({})",
                        event.name(),
                        event.guild_id(),
                        title.as_deref().unwrap_or("-")
                    );
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("📣 Logger de eventos atrasado, {} eventos perdidos", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_subscribers_receive_published_events() {
        let bus = BroadcastBus::new(8);
        let mut receiver = bus.subscribe();
        let event = DomainEvent::Disconnected {
            guild_id: GuildId::new(3),
        };

        bus.publish(event.clone());

        assert_eq!(receiver.recv().await.unwrap(), event);
    }

    #[test]
    fn test_publish_without_subscribers_is_silent() {
        let bus = BroadcastBus::new(8);
        bus.publish(DomainEvent::Disconnected {
            guild_id: GuildId::new(3),
        });
    }

    #[test]
    fn test_event_names() {
        let guild_id = GuildId::new(1);
        let started = DomainEvent::TrackStarted {
            guild_id,
            track: None,
            requester: None,
        };
        assert_eq!(started.name(), "audio_track_start");
        assert_eq!(started.guild_id(), guild_id);
    }
}
