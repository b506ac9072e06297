// Archivo: service.rs
// Propósito: implementar `ReceptionService`, la capa orquestadora que expone
// las operaciones de mostrador (emitir ticket, llamar siguiente, aplicar
// transición, snapshot). Esta capa debe ser invocada desde handlers HTTP o
// desde herramientas de administración.
use crate::errors::{ReceptionError, Result};
use crate::requests::IssueTicketRequest;
use crate::snapshot::{QueueSnapshot, QueueStats};
use dispatch::engine::{DispatchEngine, DispatchEngineConfig};
use dispatch::repository::QueueRepository;
use queue_domain::{Ticket, TicketEvent};
use std::sync::Arc;
use uuid::Uuid;

/// Servicio de alto nivel de la recepción.
///
/// Orquesta el motor de despacho: valida requests, delega las operaciones y
/// arma los snapshots de lectura. No retiene locks propios: la consistencia
/// viene de las secciones críticas por sucursal del store.
pub struct ReceptionService<R> where R: QueueRepository
{
    engine: Arc<DispatchEngine<R>>,
}

impl<R> ReceptionService<R> where R: QueueRepository + 'static
{
    /// Crea el servicio inyectando el `QueueRepository` y la configuración
    /// del motor. El `DispatchEngine` se construye internamente y se reusa.
    pub fn new(repo: Arc<R>, engine_config: DispatchEngineConfig) -> Self {
        let engine = Arc::new(DispatchEngine::new(repo, engine_config));
        Self { engine }
    }

    /// Acceso al motor para capas que necesiten operaciones de bajo nivel
    /// (por ejemplo el archivado de días cerrados).
    pub fn engine(&self) -> &DispatchEngine<R> {
        &self.engine
    }

    /// Emite un ticket para la request dada. Valida los campos obligatorios
    /// y delega en el motor; devuelve el ticket en `waiting`.
    pub fn issue_ticket(&self, request: IssueTicketRequest) -> Result<Ticket> {
        request.validate()?;
        let ticket = self.engine.issue(&request.branch_id,
                                       &request.patient_ref,
                                       request.doctor_ref,
                                       request.visit_type,
                                       request.priority,
                                       request.metadata)?;
        Ok(ticket)
    }

    /// Llama al siguiente paciente de la sucursal. `Ok(None)` con la cola
    /// vacía (la capa HTTP lo mapea a 204).
    pub fn call_next(&self, branch_id: &str) -> Result<Option<Ticket>> {
        if branch_id.trim().is_empty() {
            return Err(ReceptionError::Validation("branch_id no puede estar vacío".to_string()));
        }
        Ok(self.engine.call_next(branch_id)?)
    }

    /// Aplica una transición directa (`advance`, `complete`, `cancel`) sobre
    /// un ticket por id. `reason` sólo tiene sentido al cancelar y es
    /// metadato opaco.
    pub fn transition(&self, ticket_id: &Uuid, event: TicketEvent, reason: Option<String>) -> Result<Ticket> {
        Ok(self.engine.apply(ticket_id, event, reason)?)
    }

    /// Lectura directa de un ticket por id.
    pub fn ticket(&self, ticket_id: &Uuid) -> Result<Ticket> {
        Ok(self.engine.ticket(ticket_id)?)
    }

    /// Snapshot punto-en-el-tiempo de la sucursal: listas de espera/atención/
    /// completados de hoy más el bloque de métricas. Pensado para clientes
    /// que hacen polling periódico; no bloquea a los escritores más allá de
    /// los guards cortos del store.
    pub fn snapshot(&self, branch_id: &str) -> Result<QueueSnapshot> {
        if branch_id.trim().is_empty() {
            return Err(ReceptionError::Validation("branch_id no puede estar vacío".to_string()));
        }
        let taken_at = self.engine.now();
        let waiting = self.engine.waiting_tickets(branch_id)?;
        let active = self.engine.active_tickets(branch_id)?;
        let completed_today = self.engine.completed_today(branch_id)?;
        let day = self.engine.stats_for(branch_id);
        let stats = QueueStats { waiting: day.waiting,
                                 active: day.active,
                                 completed_today: day.completed,
                                 cancelled_today: day.cancelled,
                                 average_wait_secs: day.average_wait_secs() };
        Ok(QueueSnapshot { branch_id: branch_id.to_string(),
                           taken_at,
                           waiting,
                           active,
                           completed_today,
                           stats })
    }
}
