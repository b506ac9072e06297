// Archivo: repository.rs
// Propósito: definir el trait `QueueRepository`, el contrato del store de
// colas que deben implementar las persistencias (in-memory, BD, etc.).
//
// Los invariantes del motor deben sostenerse con cualquier backend: en
// particular `dequeue_next` debe ser una única operación indivisible
// (remover la cabeza + transicionarla a in_progress), porque un
// "leer y luego actuar" permitiría que dos estaciones reclamen el mismo
// ticket creyendo cada una haber obtenido la cabeza.
use crate::errors::Result;
use chrono::{DateTime, NaiveDate, Utc};
use queue_domain::{Ticket, TicketEvent};
use uuid::Uuid;

/// Contrato del store de colas por sucursal.
///
/// Mantiene, por sucursal, el conjunto de tickets en `waiting` ordenado por
/// la política de prioridad, más un índice de todos los tickets (cualquier
/// estado) por id para transiciones directas. Las operaciones mutantes son
/// secciones críticas por sucursal; sucursales distintas nunca contienden.
pub trait QueueRepository: Send + Sync {
    /// Inserta un ticket recién emitido (estado `waiting`) en la línea
    /// ordenada de su sucursal. Rechaza con `Conflict` un triple
    /// (sucursal, día, token) ya ocupado.
    fn enqueue(&self, ticket: Ticket) -> Result<()>;

    /// Remueve y devuelve atómicamente el ticket en espera más prioritario
    /// de la sucursal, transicionado a `in_progress` con `started_at = now`.
    ///
    /// `Ok(None)` significa cola vacía: resultado normal, no un error.
    fn dequeue_next(&self, branch_id: &str, now: DateTime<Utc>) -> Result<Option<Ticket>>;

    /// Busca el ticket por id y aplica el evento según la máquina de
    /// estados. Para transiciones terminales retira el ticket de cualquier
    /// índice vivo (p. ej. la línea de espera al cancelar). Devuelve el
    /// ticket resultante.
    fn apply_event(&self,
                   ticket_id: &Uuid,
                   event: TicketEvent,
                   reason: Option<String>,
                   now: DateTime<Utc>)
                   -> Result<Ticket>;

    /// Lectura directa de un ticket por id (cualquier estado).
    fn get(&self, ticket_id: &Uuid) -> Result<Ticket>;

    /// Tickets en espera de la sucursal, en orden de atención.
    fn waiting_tickets(&self, branch_id: &str) -> Result<Vec<Ticket>>;

    /// Tickets actualmente en atención (`in_progress` o `with_doctor`).
    fn active_tickets(&self, branch_id: &str) -> Result<Vec<Ticket>>;

    /// Tickets completados cuyo `completed_at` cae en `date`.
    fn completed_on(&self, branch_id: &str, date: NaiveDate) -> Result<Vec<Ticket>>;

    /// Tickets cancelados cuyo `completed_at` cae en `date` (auditoría).
    fn cancelled_on(&self, branch_id: &str, date: NaiveDate) -> Result<Vec<Ticket>>;
}
