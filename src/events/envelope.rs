use std::fmt;

use crate::audio::track::Track;

/// Tipo de evento de ciclo de vida entregado por el motor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    TrackStart,
    TrackEnd,
    QueueEnd,
    TrackException,
    TrackStuck,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::TrackStart => "TrackStart",
            Self::TrackEnd => "TrackEnd",
            Self::QueueEnd => "QueueEnd",
            Self::TrackException => "TrackException",
            Self::TrackStuck => "TrackStuck",
        };
        f.write_str(name)
    }
}

/// Un evento del motor: tipo, track afectado y detalle auxiliar
#[derive(Debug, Clone, PartialEq)]
pub struct EventEnvelope {
    pub kind: EventKind,
    pub track: Option<Track>,
    /// Detalle del error en TrackException
    pub auxiliary: String,
}

impl EventEnvelope {
    pub fn new(kind: EventKind, track: Option<Track>) -> Self {
        Self {
            kind,
            track,
            auxiliary: String::new(),
        }
    }

    pub fn with_auxiliary(mut self, auxiliary: impl Into<String>) -> Self {
        self.auxiliary = auxiliary.into();
        self
    }
}
