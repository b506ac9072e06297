// Archivo: errors.rs
// Propósito: definir los errores del motor de despacho y el alias Result<T>
// usado por las APIs del crate.
//
// Nota de taxonomía: "cola vacía" NO es un error — `dequeue_next` devuelve
// `Ok(None)` porque es un resultado normal y esperado. Los errores de este
// enum indican condiciones que el caller debe corregir, nunca se reintentan
// automáticamente.
use queue_domain::DomainError;
use thiserror::Error;

/// Errores comunes del motor de despacho de tickets.
///
/// - `NotFound`: ticket desconocido.
/// - `Conflict`: violación de unicidad (triple sucursal/día/token).
/// - `Domain`: transición o validación rechazada por el dominio.
/// - `Storage`: error interno del almacenamiento (índices inconsistentes).
/// - `SequencerExhausted`: contador agotado (teórico, nunca esperado).
/// - `Other`: cualquier otro error.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// Ticket no encontrado por id.
    #[error("No encontrado: {0}")]
    NotFound(String),
    /// Conflicto de unicidad o de concurrencia.
    #[error("Conflicto: {0}")]
    Conflict(String),
    /// Error originado por la máquina de estados o validaciones del dominio.
    #[error("Error de dominio: {0}")]
    Domain(#[from] DomainError),
    /// Error genérico de almacenamiento.
    #[error("Error de almacenamiento: {0}")]
    Storage(String),
    /// Contador de tokens agotado para una clave (sucursal, día).
    #[error("Secuenciador agotado para {0}")]
    SequencerExhausted(String),
    /// Otro tipo de error.
    #[error("Otro: {0}")]
    Other(String),
}

/// Alias de resultado usado por las APIs del crate.
pub type Result<T> = std::result::Result<T, DispatchError>;
