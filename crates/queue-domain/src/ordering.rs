// Archivo: ordering.rs
// Propósito: la política pura de ordenamiento entre tickets en espera.
//
// La clave es `(rango de prioridad, created_at, token_number)` ascendente:
// primero emergencias, luego prioritarios, luego normales; dentro de cada
// rango FIFO estricto por `created_at`, y ante timestamps idénticos
// (posible a sub-resolución) desempata el `token_number`. El `id` cierra la
// clave para garantizar unicidad al usarla en conjuntos ordenados.
use crate::ticket::{Ticket, TicketPriority};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use uuid::Uuid;

/// Rango numérico de una prioridad: menor = más urgente.
pub fn priority_rank(priority: TicketPriority) -> u8 {
  priority.rank()
}

/// Clave de ordenamiento total para tickets en espera.
///
/// El derive de `Ord` compara lexicográficamente en el orden de los campos,
/// que es exactamente la política: rango, llegada, token, id.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OrderKey {
  rank: u8,
  created_at: DateTime<Utc>,
  token_number: i64,
  ticket_id: Uuid,
}

impl OrderKey {
  pub fn for_ticket(ticket: &Ticket) -> Self {
    Self { rank: ticket.priority().rank(),
           created_at: ticket.created_at(),
           token_number: ticket.token_number(),
           ticket_id: ticket.id() }
  }

  pub fn ticket_id(&self) -> Uuid {
    self.ticket_id
  }
}

/// Compara dos tickets en espera: `Ordering::Less` significa "más debido"
/// (debe ser atendido antes). Función pura, sin efectos.
pub fn compare_waiting(a: &Ticket, b: &Ticket) -> Ordering {
  OrderKey::for_ticket(a).cmp(&OrderKey::for_ticket(b))
}
