use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::{audio::session::SessionManager, error::ReactorResult};

/// Publica la presencia del bot
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PresenceSink: Send + Sync {
    async fn update_presence(&self, active: usize, total: usize) -> ReactorResult<()>;
}

/// Recalcula la presencia a partir de las sesiones abiertas
pub struct PresenceUpdater {
    sessions: Arc<SessionManager>,
    sink: Arc<dyn PresenceSink>,
}

impl PresenceUpdater {
    pub fn new(sessions: Arc<SessionManager>, sink: Arc<dyn PresenceSink>) -> Self {
        Self { sessions, sink }
    }

    /// Nunca falla: los errores del sink solo se registran
    pub async fn refresh(&self) {
        let (active, total) = self.sessions.active_player_count().await;
        debug!("🛰️ Presencia: {} de {} reproduciendo", active, total);

        if let Err(e) = self.sink.update_presence(active, total).await {
            warn!("No se pudo actualizar la presencia: {}", e);
        }
    }
}
