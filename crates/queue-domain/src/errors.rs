// error.rs
use crate::ticket::TicketStatus;
use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum DomainError {
  #[error("Error de validación: {0}")]
  ValidationError(String),
  /// Transición de estado rechazada por la máquina de estados del ticket.
  /// Identifica el estado actual y el estado solicitado; el ticket queda
  /// intacto cuando se devuelve este error.
  #[error("Transición inválida: {from} -> {requested}")]
  InvalidTransition { from: TicketStatus, requested: TicketStatus },
}
