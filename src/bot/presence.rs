use async_trait::async_trait;
use parking_lot::RwLock;
use serenity::gateway::{ActivityData, ShardMessenger};

use crate::{
    error::{ReactorError, ReactorResult},
    events::presence::PresenceSink,
};

/// Presencia del bot publicada por el gateway
#[derive(Default)]
pub struct SerenityPresence {
    shard: RwLock<Option<ShardMessenger>>,
}

impl SerenityPresence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Se llama en `ready`, cuando ya hay shard disponible
    pub fn attach(&self, shard: ShardMessenger) {
        *self.shard.write() = Some(shard);
    }
}

/// Texto de la actividad para `active` reproductores
pub fn activity_text(active: usize) -> Option<String> {
    match active {
        0 => None,
        1 => Some("music in 1 server".to_string()),
        n => Some(format!("music in {} servers", n)),
    }
}

#[async_trait]
impl PresenceSink for SerenityPresence {
    async fn update_presence(&self, active: usize, _total: usize) -> ReactorResult<()> {
        let shard = self.shard.read().clone().ok_or_else(|| {
            ReactorError::Delivery("gateway todavía no está listo".to_string())
        })?;

        shard.set_activity(activity_text(active).map(ActivityData::listening));
        Ok(())
    }
}
