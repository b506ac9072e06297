//! reception: operaciones de mostrador sobre la cola de pacientes
//!
//! Crate de composición que une `queue_domain` y `dispatch` en el servicio
//! que la capa HTTP consume: emitir tickets, llamar al siguiente paciente,
//! aplicar transiciones y servir snapshots de lectura para polling.

pub mod errors;
pub mod requests;
pub mod service;
pub mod snapshot;

pub use errors::ReceptionError;
pub use requests::IssueTicketRequest;
pub use service::ReceptionService;
pub use snapshot::{QueueSnapshot, QueueStats};
