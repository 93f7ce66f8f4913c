use dashmap::DashMap;
use serenity::model::id::{ChannelId, GuildId, UserId};
use std::{
    collections::{HashSet, VecDeque},
    sync::Arc,
};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::{
    audio::{
        equalizer::EqualizerBands,
        error_counter::ErrorCounter,
        track::{Track, UserRef},
    },
    config::ReactorTuning,
    events::notifier::MessageRef,
};

/// Máximo de tracks recordados para autoplay
const MAX_HISTORY: usize = 50;

/// Estado auxiliar de una sesión, reemplazado en cada TrackStart
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    pub prev_track: Option<Track>,
    pub prev_requester: Option<UserRef>,
    pub playing_track: Option<Track>,
    pub requester: Option<UserRef>,
    pub notify_channel: Option<ChannelId>,
    pub notify_message: Option<MessageRef>,
    pub equalizer: Option<EqualizerBands>,
}

impl SessionStore {
    /// prev ← playing, playing ← track
    pub fn swap_in(&mut self, track: Option<Track>) {
        self.prev_track = self.playing_track.take();
        self.prev_requester = self.requester.take();
        self.requester = track.as_ref().and_then(|t| t.requester.clone());
        self.playing_track = track;
    }
}

/// Estado en vivo de la reproducción de un guild.
///
/// Todo lo mutable por guild vive aquí detrás de un único `Mutex`, de modo
/// que un swap de TrackStart nunca se intercala con un early-exit.
#[derive(Debug)]
pub struct Session {
    pub guild_id: GuildId,
    pub store: SessionStore,
    pub queue: VecDeque<Track>,
    pub current: Option<Track>,
    pub skip_votes: HashSet<UserId>,
    pub play_lock: bool,
    pub disconnected: bool,
    pub errors: ErrorCounter,
    history: VecDeque<Track>,
}

impl Session {
    pub fn new(
        guild_id: GuildId,
        notify_channel: Option<ChannelId>,
        tuning: &ReactorTuning,
    ) -> Self {
        Self {
            guild_id,
            store: SessionStore {
                notify_channel,
                ..SessionStore::default()
            },
            queue: VecDeque::new(),
            current: None,
            skip_votes: HashSet::new(),
            play_lock: false,
            disconnected: false,
            errors: ErrorCounter::new(tuning.error_threshold, tuning.error_reset_window),
            history: VecDeque::new(),
        }
    }

    /// El motor empezó `track`: pasa a ser el actual y sale de la cabeza de la cola
    pub fn adopt_current(&mut self, track: Option<Track>) {
        if let Some(track) = &track {
            if self.queue.front().is_some_and(|head| head.id == track.id) {
                self.queue.pop_front();
            }
            self.history.push_back(track.clone());
            if self.history.len() > MAX_HISTORY {
                self.history.pop_front();
            }
        }
        self.current = track;
    }

    /// Terminó `ended`: suelta `current` solo si es esa misma pista.
    /// Un TrackStart de la siguiente puede haber llegado antes.
    pub fn release_current(&mut self, ended: Option<&Track>) {
        match (ended, &self.current) {
            (Some(ended), Some(current)) if ended.id != current.id => {
                debug!(
                    "Fin de '{}' ignorado: ya suena '{}' en guild {}",
                    ended.title, current.title, self.guild_id
                );
            }
            _ => self.current = None,
        }
    }

    /// Elimina todas las copias de `track` de la cola
    pub fn remove_from_queue(&mut self, track: &Track) -> usize {
        let before = self.queue.len();
        self.queue.retain(|queued| queued.id != track.id);
        let removed = before - self.queue.len();
        if removed > 0 {
            debug!("❌ {} copias de '{}' eliminadas de la cola", removed, track.title);
        }
        removed
    }

    pub fn history(&self) -> &VecDeque<Track> {
        &self.history
    }

    pub fn is_active(&self) -> bool {
        !self.disconnected && self.current.is_some()
    }

    /// Deja la sesión marcada como cerrada y vacía
    pub fn mark_torn_down(&mut self) {
        self.disconnected = true;
        self.play_lock = false;
        self.queue.clear();
        self.current = None;
        self.store.playing_track = None;
        self.errors.reset();
    }
}

pub type SessionHandle = Arc<Mutex<Session>>;

/// Dueño de una [`Session`] por guild activo.
///
/// Cada sesión tiene su propio lock; no hay lock global.
pub struct SessionManager {
    sessions: DashMap<GuildId, SessionHandle>,
    tuning: ReactorTuning,
}

impl SessionManager {
    pub fn new(tuning: ReactorTuning) -> Self {
        Self {
            sessions: DashMap::new(),
            tuning,
        }
    }

    /// Abre la sesión del guild (o devuelve la existente)
    pub fn open(&self, guild_id: GuildId, notify_channel: Option<ChannelId>) -> SessionHandle {
        self.sessions
            .entry(guild_id)
            .or_insert_with(|| {
                info!("🎧 Sesión abierta para guild {}", guild_id);
                Arc::new(Mutex::new(Session::new(guild_id, notify_channel, &self.tuning)))
            })
            .clone()
    }

    pub fn get(&self, guild_id: GuildId) -> Option<SessionHandle> {
        self.sessions.get(&guild_id).map(|entry| entry.clone())
    }

    /// Cierra la sesión. Quien conserve el handle verá `disconnected`.
    pub async fn close(&self, guild_id: GuildId) -> Option<SessionHandle> {
        let (_, session) = self.sessions.remove(&guild_id)?;
        session.lock().await.mark_torn_down();
        info!("👋 Sesión cerrada para guild {}", guild_id);
        Some(session)
    }

    /// Elimina `handle` sin tocar su estado (ya desmontado por el llamador).
    /// Una sesión abierta después para el mismo guild no se toca.
    pub fn forget(&self, guild_id: GuildId, handle: &SessionHandle) {
        if self
            .sessions
            .remove_if(&guild_id, |_, current| Arc::ptr_eq(current, handle))
            .is_some()
        {
            info!("👋 Sesión descartada para guild {}", guild_id);
        }
    }

    /// (reproduciendo, total) entre todas las sesiones abiertas.
    ///
    /// No llamar con el lock de una sesión tomado.
    pub async fn active_player_count(&self) -> (usize, usize) {
        let handles: Vec<SessionHandle> =
            self.sessions.iter().map(|entry| entry.value().clone()).collect();

        let mut active = 0;
        for handle in &handles {
            if handle.lock().await.is_active() {
                active += 1;
            }
        }

        (active, handles.len())
    }
}
