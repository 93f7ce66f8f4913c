use serenity::model::id::GuildId;
use std::sync::Arc;
use tokio::sync::MutexGuard;
use tracing::{debug, error, info, warn};

use crate::{
    audio::{
        engine::PlaybackEngine,
        session::{Session, SessionHandle, SessionManager},
    },
    config::ReactorTuning,
    events::{
        autoplay::{AutoplayProvider, AutoplayTrigger},
        bus::{DomainEvent, EventBus},
        envelope::{EventEnvelope, EventKind},
        notifier::{describe, notices, Messenger, NotificationManager},
        presence::{PresenceSink, PresenceUpdater},
    },
    storage::{EqualizerStore, GuildAudioSettings, SettingsProvider},
};

/// Colaboradores externos del reactor
pub struct Collaborators {
    pub settings: Arc<dyn SettingsProvider>,
    pub equalizer: Arc<dyn EqualizerStore>,
    pub engine: Arc<dyn PlaybackEngine>,
    pub bus: Arc<dyn EventBus>,
    pub messenger: Arc<dyn Messenger>,
    pub autoplay: Option<Arc<dyn AutoplayProvider>>,
    pub presence: Arc<dyn PresenceSink>,
}

/// Traduce los eventos del motor en transiciones de sesión, avisos,
/// recuperación de errores y refrescos de presencia.
///
/// Ningún error sale de [`EventReactor::handle`]: todo se registra o se
/// notifica en el canal de la sesión.
pub struct EventReactor {
    sessions: Arc<SessionManager>,
    settings: Arc<dyn SettingsProvider>,
    equalizer: Arc<dyn EqualizerStore>,
    engine: Arc<dyn PlaybackEngine>,
    bus: Arc<dyn EventBus>,
    notifier: NotificationManager,
    autoplay: AutoplayTrigger,
    presence: PresenceUpdater,
    tuning: ReactorTuning,
}

impl EventReactor {
    pub fn new(sessions: Arc<SessionManager>, parts: Collaborators, tuning: ReactorTuning) -> Self {
        Self {
            notifier: NotificationManager::new(parts.messenger),
            autoplay: AutoplayTrigger::new(parts.autoplay, parts.engine.clone()),
            presence: PresenceUpdater::new(sessions.clone(), parts.presence),
            sessions,
            settings: parts.settings,
            equalizer: parts.equalizer,
            engine: parts.engine,
            bus: parts.bus,
            tuning,
        }
    }

    /// Punto de entrada único para los eventos del motor
    pub async fn handle(&self, guild_id: GuildId, envelope: EventEnvelope) {
        let Some(session) = self.sessions.get(guild_id) else {
            debug!("Evento {} ignorado: guild {} sin sesión", envelope.kind, guild_id);
            return;
        };

        let settings = self.settings.guild_settings(guild_id).await;
        let status = self.settings.status_enabled().await;
        debug!(
            "Nuevo evento para guild {}: {}: {}",
            guild_id, envelope.kind, envelope.auxiliary
        );

        match envelope.kind {
            EventKind::TrackStart => {
                self.on_track_start(&session, envelope, &settings, status).await
            }
            EventKind::TrackEnd => self.on_track_end(&session, envelope, status).await,
            EventKind::QueueEnd => self.on_queue_end(&session, envelope, &settings, status).await,
            EventKind::TrackException | EventKind::TrackStuck => {
                self.on_track_failure(&session, envelope, &settings).await
            }
        }
    }

    /// Toma el lock de la sesión si sigue viva y aplica el reinicio de errores
    async fn lock_live<'a>(&self, session: &'a SessionHandle) -> Option<MutexGuard<'a, Session>> {
        let mut state = session.lock().await;
        if state.disconnected {
            debug!("Sesión de guild {} ya desconectada", state.guild_id);
            return None;
        }
        state.errors.maybe_reset();
        Some(state)
    }

    async fn on_track_start(
        &self,
        session: &SessionHandle,
        envelope: EventEnvelope,
        settings: &GuildAudioSettings,
        status: bool,
    ) {
        let Some(mut state) = self.lock_live(session).await else {
            return;
        };
        let guild_id = state.guild_id;

        state.skip_votes.clear();
        state.adopt_current(envelope.track.clone());
        state.store.swap_in(envelope.track.clone());

        self.bus.publish(DomainEvent::TrackStarted {
            guild_id,
            track: envelope.track.clone(),
            requester: state.store.requester.clone(),
        });

        if let Some(track) = envelope.track.as_ref().filter(|_| settings.notify) {
            self.notifier.delete_previous(&mut state.store).await;

            let prev_was_autoplay = state
                .store
                .prev_track
                .as_ref()
                .is_some_and(|prev| prev.is_autoplay());
            if settings.autoplay && track.is_autoplay() && !prev_was_autoplay {
                self.notifier
                    .notify(state.store.notify_channel, notices::autoplay_started())
                    .await;
            }

            self.notifier
                .replace_now_playing(
                    &mut state.store,
                    notices::now_playing(track, settings.show_thumbnail),
                )
                .await;
        }

        drop(state);
        if status {
            self.presence.refresh().await;
        }
    }

    async fn on_track_end(&self, session: &SessionHandle, envelope: EventEnvelope, status: bool) {
        let guild_id = {
            let Some(mut state) = self.lock_live(session).await else {
                return;
            };
            state.release_current(envelope.track.as_ref());

            self.bus.publish(DomainEvent::TrackEnded {
                guild_id: state.guild_id,
                track: state.store.prev_track.clone(),
                requester: state.store.prev_requester.clone(),
            });
            state.guild_id
        };

        if !status {
            return;
        }

        // Sin el lock: un TrackStart puede llegar durante la espera
        tokio::time::sleep(self.tuning.presence_grace).await;

        let still_open = self
            .sessions
            .get(guild_id)
            .is_some_and(|current| Arc::ptr_eq(&current, session));
        if !still_open || session.lock().await.disconnected {
            debug!("Sesión de guild {} cerrada durante la espera", guild_id);
            return;
        }

        if !self.engine.is_playing(guild_id).await {
            self.presence.refresh().await;
        }
    }

    async fn on_queue_end(
        &self,
        session: &SessionHandle,
        envelope: EventEnvelope,
        settings: &GuildAudioSettings,
        status: bool,
    ) {
        let Some(mut state) = self.lock_live(session).await else {
            return;
        };
        let guild_id = state.guild_id;
        state.release_current(envelope.track.as_ref());

        self.bus.publish(DomainEvent::QueueEnded {
            guild_id,
            track: state.store.prev_track.clone(),
            requester: state.store.prev_requester.clone(),
        });

        if settings.autoplay {
            if self.engine.upcoming_len(guild_id).await == 0
                && state.store.playing_track.is_some()
                && self.autoplay.is_available()
            {
                if let Err(e) = self.autoplay.trigger(&mut state).await {
                    warn!("🔄 Autoplay falló en guild {}: {}", guild_id, e);
                    self.notifier
                        .notify(state.store.notify_channel, notices::autoplay_failed())
                        .await;
                    return;
                }
            }
        } else {
            if settings.notify {
                self.notifier
                    .notify(state.store.notify_channel, notices::queue_ended())
                    .await;
            }

            if settings.disconnect_on_empty {
                info!("📭 Cola terminada, saliendo del canal en guild {}", guild_id);
                self.bus.publish(DomainEvent::Disconnected { guild_id });
                state.mark_torn_down();
                self.sessions.forget(guild_id, session);

                if let Err(e) = self.engine.disconnect(guild_id).await {
                    warn!("No se pudo desconectar en guild {}: {}", guild_id, e);
                }
            }
        }

        // active_player_count bloquea todas las sesiones, esta incluida
        drop(state);
        if status {
            self.presence.refresh().await;
        }
    }

    async fn on_track_failure(
        &self,
        session: &SessionHandle,
        envelope: EventEnvelope,
        settings: &GuildAudioSettings,
    ) {
        let Some(mut state) = self.lock_live(session).await else {
            return;
        };
        let guild_id = state.guild_id;
        let channel = state.store.notify_channel;

        if let Some(track) = &envelope.track {
            state.remove_from_queue(track);
            if let Err(e) = self.engine.remove(guild_id, track).await {
                warn!(
                    "No se pudo quitar '{}' de la cola en guild {}: {}",
                    track.title, guild_id, e
                );
            }
        }
        if settings.repeat {
            state.current = None;
        }

        if state.errors.increase() {
            error!(
                "🚨 Demasiados errores consecutivos en guild {}, cerrando el reproductor",
                guild_id
            );
            let equalizer = state.store.equalizer;
            state.mark_torn_down();

            if let Some(bands) = equalizer {
                if let Err(e) = self.equalizer.set_equalizer_bands(guild_id, bands).await {
                    warn!("No se pudo guardar el ecualizador de guild {}: {}", guild_id, e);
                }
            }
            if let Err(e) = self.engine.stop(guild_id).await {
                warn!("stop falló en guild {}: {}", guild_id, e);
            }
            if let Err(e) = self.engine.disconnect(guild_id).await {
                warn!("disconnect falló en guild {}: {}", guild_id, e);
            }
            self.bus.publish(DomainEvent::Disconnected { guild_id });

            drop(state);
            self.sessions.forget(guild_id, session);
            self.notifier.notify(channel, notices::multiple_errors()).await;
            return;
        }

        let description = describe(envelope.track.as_ref());
        let notice = match envelope.kind {
            EventKind::TrackStuck => notices::track_stuck(&description),
            _ => notices::track_error(&envelope.auxiliary, &description),
        };
        self.notifier.notify(channel, notice).await;

        if let Err(e) = self.engine.skip(guild_id).await {
            warn!("skip falló en guild {}: {}", guild_id, e);
        }
    }
}
