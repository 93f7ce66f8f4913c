//! Fakes con un journal común para probar el reactor de punta a punta.

use anyhow::Result;
use async_trait::async_trait;
use parking_lot::Mutex;
use serenity::model::id::{ChannelId, GuildId, MessageId};
use std::{
    collections::HashSet,
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc,
    },
};

use crate::{
    audio::{
        engine::PlaybackEngine,
        equalizer::EqualizerBands,
        session::{SessionHandle, SessionManager},
        track::Track,
    },
    config::ReactorTuning,
    error::{ReactorError, ReactorResult},
    events::{
        autoplay::AutoplayProvider,
        bus::{DomainEvent, EventBus},
        notifier::{EmbedSpec, MessageRef, Messenger},
        presence::PresenceSink,
        reactor::{Collaborators, EventReactor},
    },
    storage::{EqualizerStore, GuildAudioSettings, SettingsProvider},
};

pub const GUILD: u64 = 42;
pub const CHANNEL: u64 = 500;

/// Registro ordenado de todas las llamadas a colaboradores
#[derive(Default, Clone)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().clone()
    }

    pub fn count(&self, entry: &str) -> usize {
        self.0.lock().iter().filter(|e| e.as_str() == entry).count()
    }

    pub fn position(&self, entry: &str) -> Option<usize> {
        self.0.lock().iter().position(|e| e == entry)
    }
}

pub struct FakeSettings {
    pub settings: Mutex<GuildAudioSettings>,
    pub status: AtomicBool,
}

#[async_trait]
impl SettingsProvider for FakeSettings {
    async fn guild_settings(&self, _guild_id: GuildId) -> GuildAudioSettings {
        *self.settings.lock()
    }

    async fn status_enabled(&self) -> bool {
        self.status.load(Ordering::SeqCst)
    }

    async fn notify_channel(&self, _guild_id: GuildId) -> Option<ChannelId> {
        Some(ChannelId::new(CHANNEL))
    }
}

pub struct FakeEqualizer {
    journal: Journal,
    pub saved: Mutex<Option<EqualizerBands>>,
}

#[async_trait]
impl EqualizerStore for FakeEqualizer {
    async fn set_equalizer_bands(&self, _guild_id: GuildId, bands: EqualizerBands) -> Result<()> {
        self.journal.push("eq.persist");
        *self.saved.lock() = Some(bands);
        Ok(())
    }

    async fn equalizer_bands(&self, _guild_id: GuildId) -> Option<EqualizerBands> {
        *self.saved.lock()
    }
}

pub struct FakeEngine {
    journal: Journal,
    pub playing: AtomicBool,
    pub connected: AtomicBool,
    /// Ids en espera detrás de la pista actual
    pub upcoming: Mutex<Vec<String>>,
}

impl FakeEngine {
    fn check(&self) -> ReactorResult<()> {
        if self.connected.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(ReactorError::EngineUnavailable("gone".into()))
        }
    }
}

#[async_trait]
impl PlaybackEngine for FakeEngine {
    async fn play(&self, _guild_id: GuildId, track: Track) -> ReactorResult<()> {
        self.journal.push(format!("engine.play:{}", track.id));
        self.check()?;
        self.upcoming.lock().push(track.id);
        Ok(())
    }

    async fn skip(&self, _guild_id: GuildId) -> ReactorResult<()> {
        self.journal.push("engine.skip");
        self.check()
    }

    async fn stop(&self, _guild_id: GuildId) -> ReactorResult<()> {
        self.journal.push("engine.stop");
        self.check()
    }

    async fn disconnect(&self, _guild_id: GuildId) -> ReactorResult<()> {
        self.journal.push("engine.disconnect");
        self.check()?;
        self.connected.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn remove(&self, _guild_id: GuildId, track: &Track) -> ReactorResult<usize> {
        self.journal.push(format!("engine.remove:{}", track.id));
        self.check()?;
        let mut upcoming = self.upcoming.lock();
        let before = upcoming.len();
        upcoming.retain(|id| *id != track.id);
        Ok(before - upcoming.len())
    }

    async fn upcoming_len(&self, _guild_id: GuildId) -> usize {
        self.upcoming.lock().len()
    }

    async fn is_playing(&self, _guild_id: GuildId) -> bool {
        self.playing.load(Ordering::SeqCst)
    }
}

pub struct RecordingBus {
    journal: Journal,
    pub events: Mutex<Vec<DomainEvent>>,
}

impl EventBus for RecordingBus {
    fn publish(&self, event: DomainEvent) {
        self.journal.push(format!("bus:{}", event.name()));
        self.events.lock().push(event);
    }
}

pub struct RecordingMessenger {
    journal: Journal,
    next_id: AtomicU64,
    pub sent: Mutex<Vec<EmbedSpec>>,
    pub live_now_playing: Mutex<HashSet<MessageRef>>,
    pub fail_deletes: AtomicBool,
}

impl RecordingMessenger {
    pub fn titles(&self) -> Vec<String> {
        self.sent.lock().iter().map(|embed| embed.title.clone()).collect()
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn send_embed(
        &self,
        channel_id: ChannelId,
        embed: EmbedSpec,
    ) -> ReactorResult<MessageRef> {
        self.journal.push(format!("send:{}", embed.title));
        let message = MessageRef {
            channel_id,
            message_id: MessageId::new(self.next_id.fetch_add(1, Ordering::SeqCst)),
        };
        if embed.title == "Now Playing" {
            self.live_now_playing.lock().insert(message);
        }
        self.sent.lock().push(embed);
        Ok(message)
    }

    async fn delete_message(&self, message: MessageRef) -> ReactorResult<()> {
        self.journal.push("delete");
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(ReactorError::Delivery("Missing Permissions".into()));
        }
        self.live_now_playing.lock().remove(&message);
        Ok(())
    }
}

pub struct FakeAutoplay {
    journal: Journal,
    pub result: Mutex<ReactorResult<Track>>,
}

#[async_trait]
impl AutoplayProvider for FakeAutoplay {
    async fn select(&self, _guild_id: GuildId, _history: Vec<Track>) -> ReactorResult<Track> {
        self.journal.push("autoplay.select");
        self.result.lock().clone()
    }
}

pub struct RecordingPresence {
    journal: Journal,
}

#[async_trait]
impl PresenceSink for RecordingPresence {
    async fn update_presence(&self, active: usize, total: usize) -> ReactorResult<()> {
        self.journal.push(format!("presence:{}/{}", active, total));
        Ok(())
    }
}

/// Reactor completo cableado con fakes
pub struct Harness {
    pub reactor: EventReactor,
    pub sessions: Arc<SessionManager>,
    pub session: SessionHandle,
    pub journal: Journal,
    pub settings: Arc<FakeSettings>,
    pub equalizer: Arc<FakeEqualizer>,
    pub engine: Arc<FakeEngine>,
    pub bus: Arc<RecordingBus>,
    pub messenger: Arc<RecordingMessenger>,
    pub autoplay: Arc<FakeAutoplay>,
}

impl Harness {
    pub fn new(settings: GuildAudioSettings) -> Self {
        Self::build(settings, true)
    }

    pub fn without_autoplay(settings: GuildAudioSettings) -> Self {
        Self::build(settings, false)
    }

    fn build(settings: GuildAudioSettings, with_autoplay: bool) -> Self {
        let tuning = ReactorTuning::default();
        let journal = Journal::default();
        let sessions = Arc::new(SessionManager::new(tuning));
        let session = sessions.open(guild(), Some(ChannelId::new(CHANNEL)));

        let settings = Arc::new(FakeSettings {
            settings: Mutex::new(settings),
            status: AtomicBool::new(false),
        });
        let equalizer = Arc::new(FakeEqualizer {
            journal: journal.clone(),
            saved: Mutex::new(None),
        });
        let engine = Arc::new(FakeEngine {
            journal: journal.clone(),
            playing: AtomicBool::new(false),
            connected: AtomicBool::new(true),
            upcoming: Mutex::new(Vec::new()),
        });
        let bus = Arc::new(RecordingBus {
            journal: journal.clone(),
            events: Mutex::new(Vec::new()),
        });
        let messenger = Arc::new(RecordingMessenger {
            journal: journal.clone(),
            next_id: AtomicU64::new(1),
            sent: Mutex::new(Vec::new()),
            live_now_playing: Mutex::new(HashSet::new()),
            fail_deletes: AtomicBool::new(false),
        });
        let autoplay = Arc::new(FakeAutoplay {
            journal: journal.clone(),
            result: Mutex::new(Err(ReactorError::DataUnavailable("empty".into()))),
        });
        let presence = Arc::new(RecordingPresence {
            journal: journal.clone(),
        });

        let reactor = EventReactor::new(
            sessions.clone(),
            Collaborators {
                settings: settings.clone(),
                equalizer: equalizer.clone(),
                engine: engine.clone(),
                bus: bus.clone(),
                messenger: messenger.clone(),
                autoplay: with_autoplay.then(|| autoplay.clone() as Arc<dyn AutoplayProvider>),
                presence,
            },
            tuning,
        );

        Self {
            reactor,
            sessions,
            session,
            journal,
            settings,
            equalizer,
            engine,
            bus,
            messenger,
            autoplay,
        }
    }

    pub fn set_status(&self, enabled: bool) {
        self.settings.status.store(enabled, Ordering::SeqCst);
    }
}

pub fn guild() -> GuildId {
    GuildId::new(GUILD)
}

pub fn track(id: &str) -> Track {
    Track::new(id, format!("Song {}", id), guild())
}
