use serde::{Deserialize, Serialize};
use serenity::model::id::{GuildId, UserId};
use std::{collections::HashMap, time::Duration};

/// Metadatos extra que acompañan a un track.
///
/// `autoplay` se marca cuando el track fue elegido por el subsistema de
/// autoplay; el resto de claves se conserva tal cual.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackExtras {
    #[serde(default)]
    pub autoplay: bool,
    #[serde(flatten)]
    pub other: HashMap<String, serde_json::Value>,
}

/// Usuario que pidió un track
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserRef {
    pub id: UserId,
    pub name: String,
}

impl UserRef {
    pub fn new(id: UserId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

impl std::fmt::Display for UserRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// Representa un track tal como lo reporta el motor de reproducción
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub id: String,
    pub title: String,
    pub author: Option<String>,
    pub uri: Option<String>,
    pub length_ms: u64,
    pub is_stream: bool,
    pub thumbnail: Option<String>,
    pub requester: Option<UserRef>,
    pub extras: TrackExtras,
    pub guild_id: GuildId,
}

impl Track {
    pub fn new(id: impl Into<String>, title: impl Into<String>, guild_id: GuildId) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            author: None,
            uri: None,
            length_ms: 0,
            is_stream: false,
            thumbnail: None,
            requester: None,
            extras: TrackExtras::default(),
            guild_id,
        }
    }

    // Builders
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    pub fn with_length(mut self, length_ms: u64) -> Self {
        self.length_ms = length_ms;
        self
    }

    pub fn as_stream(mut self) -> Self {
        self.is_stream = true;
        self
    }

    pub fn with_thumbnail(mut self, thumbnail: impl Into<String>) -> Self {
        self.thumbnail = Some(thumbnail.into());
        self
    }

    pub fn with_requester(mut self, requester: UserRef) -> Self {
        self.requester = Some(requester);
        self
    }

    pub fn with_autoplay(mut self) -> Self {
        self.extras.autoplay = true;
        self
    }

    pub fn is_autoplay(&self) -> bool {
        self.extras.autoplay
    }

    /// Duración para mostrar: `LIVE` para streams, `m:ss` en otro caso
    pub fn display_length(&self) -> String {
        if self.is_stream {
            "LIVE".to_string()
        } else {
            format_duration(Duration::from_millis(self.length_ms))
        }
    }

    /// Descripción en markdown: `**[autor - título](uri)**`
    pub fn description(&self) -> String {
        let label = match &self.author {
            Some(author) if !author.is_empty() => format!("{} - {}", author, self.title),
            _ => self.title.clone(),
        };

        match &self.uri {
            Some(uri) => format!("**[{}]({})**", label, uri),
            None => format!("**{}**", label),
        }
    }
}

pub fn format_duration(duration: Duration) -> String {
    let total_seconds = duration.as_secs();
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}
