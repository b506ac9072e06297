use thiserror::Error;

// Errores comunes de la capa de recepción.
//
// Este enum centraliza los errores que pueden ocurrir al atender una
// operación de mostrador: errores del motor de despacho (`DispatchError`),
// errores del dominio (`DomainError`) y validaciones de la request.
#[derive(Error, Debug)]
pub enum ReceptionError {
  /// Errores originados por el motor de despacho/store de colas.
  #[error("Error de despacho: {0}")]
  Dispatch(#[from] dispatch::errors::DispatchError),

  /// Errores originados por la máquina de estados del dominio.
  #[error("Error de dominio: {0}")]
  Domain(#[from] queue_domain::DomainError),

  /// Errores de validación local de la request (campos vacíos, etc.),
  /// detectados antes de tocar el motor.
  #[error("Error de validación: {0}")]
  Validation(String),
}

/// Alias de resultado usado por las APIs del crate.
pub type Result<T> = std::result::Result<T, ReceptionError>;
