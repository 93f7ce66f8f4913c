use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Contador de errores consecutivos de una sesión.
///
/// Vive dentro de la [`Session`](super::session::Session) de cada guild,
/// así que nunca se comparte entre guilds. La entrada se crea al registrar
/// el primer error.
#[derive(Debug, Clone)]
pub struct ErrorCounter {
    threshold: u32,
    reset_window: Duration,
    entry: Option<ErrorEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ErrorEntry {
    consecutive: u32,
    last_error: Instant,
}

impl ErrorCounter {
    pub fn new(threshold: u32, reset_window: Duration) -> Self {
        Self {
            threshold,
            reset_window,
            entry: None,
        }
    }

    /// Reinicia el contador si pasó la ventana sin errores desde el último.
    pub fn maybe_reset(&mut self) {
        let Some(entry) = self.entry else {
            return;
        };

        if entry.consecutive > 0 && entry.last_error.elapsed() > self.reset_window {
            debug!(
                "🧹 Reiniciando contador de errores tras {} errores",
                entry.consecutive
            );
            self.reset();
        }
    }

    /// Registra un error. Devuelve `true` cuando se supera el umbral.
    pub fn increase(&mut self) -> bool {
        let now = Instant::now();
        let entry = self.entry.get_or_insert(ErrorEntry {
            consecutive: 0,
            last_error: now,
        });

        entry.consecutive += 1;
        entry.last_error = now;

        entry.consecutive > self.threshold
    }

    pub fn reset(&mut self) {
        if let Some(entry) = self.entry.as_mut() {
            entry.consecutive = 0;
        }
    }

    pub fn count(&self) -> u32 {
        self.entry.map_or(0, |entry| entry.consecutive)
    }
}
