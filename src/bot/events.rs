use serenity::{async_trait, model::id::GuildId};
use songbird::{
    tracks::{PlayMode, TrackHandle},
    Call, Event as VoiceEvent, EventContext, EventHandler as VoiceEventHandler, TrackEvent,
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

use crate::{
    audio::engine::attached_track,
    events::{
        envelope::{EventEnvelope, EventKind},
        reactor::EventReactor,
    },
};

/// Traduce los eventos de track de Songbird en envelopes para el reactor
pub struct TrackEventBridge {
    pub guild_id: GuildId,
    pub event: TrackEvent,
    pub reactor: Arc<EventReactor>,
    pub call: Arc<Mutex<Call>>,
}

impl TrackEventBridge {
    /// ¿Quedan tracks en la cola aparte de `ended`?
    async fn queue_drained(&self, ended: &TrackHandle) -> bool {
        let call = self.call.lock().await;
        call.queue()
            .current_queue()
            .iter()
            .all(|handle| handle.uuid() == ended.uuid())
    }
}

#[async_trait]
impl VoiceEventHandler for TrackEventBridge {
    async fn act(&self, ctx: &EventContext<'_>) -> Option<VoiceEvent> {
        let EventContext::Track(track_list) = ctx else {
            return None;
        };

        for (state, handle) in *track_list {
            let track = Some(attached_track(handle).as_ref().clone());

            let mut envelopes = Vec::with_capacity(2);
            match self.event {
                TrackEvent::Play => {
                    envelopes.push(EventEnvelope::new(EventKind::TrackStart, track));
                }
                TrackEvent::End => {
                    envelopes.push(EventEnvelope::new(EventKind::TrackEnd, track.clone()));
                    if self.queue_drained(handle).await {
                        envelopes.push(EventEnvelope::new(EventKind::QueueEnd, track));
                    }
                }
                TrackEvent::Error => {
                    let detail = match &state.playing {
                        PlayMode::Errored(e) => format!("{:?}", e),
                        other => format!("{:?}", other),
                    };
                    envelopes.push(
                        EventEnvelope::new(EventKind::TrackException, track).with_auxiliary(detail),
                    );
                }
                other => {
                    debug!("Evento de track no manejado: {:?}", other);
                }
            }

            // La espera de presencia no debe bloquear el hilo de eventos de Songbird
            let reactor = self.reactor.clone();
            let guild_id = self.guild_id;
            tokio::spawn(async move {
                for envelope in envelopes {
                    reactor.handle(guild_id, envelope).await;
                }
            });
        }

        None
    }
}

/// Registra el puente en la llamada de un guild
pub fn register_track_events(
    handler: &mut Call,
    guild_id: GuildId,
    reactor: Arc<EventReactor>,
    call: Arc<Mutex<Call>>,
) {
    for event in [TrackEvent::Play, TrackEvent::End, TrackEvent::Error] {
        handler.add_global_event(
            VoiceEvent::Track(event),
            TrackEventBridge {
                guild_id,
                event,
                reactor: reactor.clone(),
                call: call.clone(),
            },
        );
    }
}
