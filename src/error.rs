use thiserror::Error;

/// Errores que los colaboradores del reactor pueden devolver.
///
/// Ninguno de ellos sale de [`crate::events::reactor::EventReactor`]: el
/// reactor los registra y sigue adelante.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReactorError {
    /// Autoplay no pudo resolver una pista válida
    #[error("No hay datos disponibles: {0}")]
    DataUnavailable(String),

    /// Falló el envío o borrado de un mensaje
    #[error("Error de entrega: {0}")]
    Delivery(String),

    /// La conexión con el motor de reproducción ya no existe
    #[error("Motor de reproducción no disponible: {0}")]
    EngineUnavailable(String),
}

pub type ReactorResult<T> = std::result::Result<T, ReactorError>;
