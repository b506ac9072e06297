//! Crate `queue-domain` — modelo de dominio de la cola de pacientes
//!
//! Define la entidad central `Ticket` (con su máquina de estados encapsulada
//! en métodos de ciclo de vida), los enums de tipo de visita, prioridad,
//! estado y evento, la política pura de ordenamiento entre tickets en espera
//! (`ordering`) y los errores de dominio.
//!
//! Invariantes que este crate garantiza por construcción:
//! - `status` sólo muta a través de la máquina de estados; no hay mutación
//!   externa posible (campos privados).
//! - Un ticket en `waiting` nunca tiene `started_at` ni `completed_at`; un
//!   ticket terminal siempre tiene `completed_at` y nunca vuelve a `waiting`.
//! - La prioridad es inmutable tras la emisión.
pub mod errors;
pub mod ordering;
pub mod ticket;

pub use errors::DomainError;
pub use ordering::{compare_waiting, priority_rank, OrderKey};
pub use ticket::{Ticket, TicketEvent, TicketPriority, TicketStatus, VisitType};
