// Archivo: engine.rs
// Propósito: implementar `DispatchEngine`, el motor que orquesta
// secuenciador, store de colas, máquina de estados y métricas.
//
// El motor es deliberadamente pequeño: no hace I/O ni conoce HTTP. Toda
// operación termina en tiempo acotado; los timeouts a nivel request son
// responsabilidad del caller. El estado compartido (colas y contadores) es
// un objeto inyectable construido al arrancar el servicio, no un singleton
// de proceso, para mantener el motor testeable en aislamiento.
use crate::clock::{Clock, SystemClock};
use crate::errors::Result;
use crate::repository::QueueRepository;
use crate::sequencer::TokenSequencer;
use crate::stats::{BranchDayStats, StatsAggregator};
use chrono::{DateTime, NaiveDate, Utc};
use queue_domain::{Ticket, TicketEvent, TicketPriority, VisitType};
use std::sync::Arc;
use uuid::Uuid;

/// Configuración del motor.
///
/// Hoy sólo transporta la fuente de tiempo inyectada; se deja como struct
/// para futuras opciones (por ejemplo políticas de archivado).
pub struct DispatchEngineConfig {
    /// Fuente de tiempo del motor; `SystemClock` en producción.
    pub clock: Arc<dyn Clock>,
}

impl Default for DispatchEngineConfig {
    fn default() -> Self {
        Self { clock: Arc::new(SystemClock) }
    }
}

/// Motor de despacho de tickets.
///
/// Responsabilidades principales:
/// - Emitir tickets: mintear número en el secuenciador, construir la entidad
///   y entregarla al store, que la inserta según la política de prioridad.
/// - Llamar al siguiente: delegar en el dequeue atómico del store.
/// - Aplicar transiciones directas por id (`advance`, `complete`, `cancel`).
/// - Alimentar el agregador de métricas tras cada operación exitosa: el
///   store reporta cada transición exactamente una vez, así que el delta se
///   aplica una única vez por ticket.
pub struct DispatchEngine<R>
    where R: QueueRepository
{
    repo: Arc<R>,
    sequencer: TokenSequencer,
    stats: StatsAggregator,
    clock: Arc<dyn Clock>,
}

impl<R> DispatchEngine<R> where R: QueueRepository
{
    /// Crea una nueva instancia del motor. `repo` es el store inyectado.
    pub fn new(repo: Arc<R>, config: DispatchEngineConfig) -> Self {
        Self { repo,
               sequencer: TokenSequencer::new(),
               stats: StatsAggregator::new(),
               clock: config.clock }
    }

    /// Instante actual según el reloj inyectado.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Día calendario actual según el reloj inyectado.
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Emite un ticket: mintea el siguiente número para (sucursal, hoy),
    /// construye la entidad en `waiting` y la encola. Devuelve el ticket
    /// emitido.
    #[allow(clippy::too_many_arguments)]
    pub fn issue(&self,
                 branch_id: &str,
                 patient_ref: &str,
                 doctor_ref: Option<String>,
                 visit_type: VisitType,
                 priority: TicketPriority,
                 metadata: serde_json::Value)
                 -> Result<Ticket> {
        let now = self.clock.now();
        let date = now.date_naive();
        let token_number = self.sequencer.next(branch_id, date)?;
        let ticket = Ticket::issue(branch_id,
                                   token_number,
                                   date,
                                   patient_ref,
                                   doctor_ref,
                                   visit_type,
                                   priority,
                                   metadata,
                                   now)?;
        self.repo.enqueue(ticket.clone())?;
        self.stats.on_issued(branch_id, date);
        Ok(ticket)
    }

    /// Pide al store la cabeza de la cola de la sucursal. `Ok(None)` es el
    /// resultado normal con la cola vacía. El ticket devuelto ya está en
    /// `in_progress` y pertenece a la estación que llamó hasta la próxima
    /// transición.
    pub fn call_next(&self, branch_id: &str) -> Result<Option<Ticket>> {
        let now = self.clock.now();
        let called = self.repo.dequeue_next(branch_id, now)?;
        if let Some(ticket) = &called {
            if let Some(started_at) = ticket.started_at() {
                let wait = started_at - ticket.created_at();
                self.stats.on_started(branch_id, ticket.issue_date(), wait);
            }
        }
        Ok(called)
    }

    /// Aplica un evento sobre un ticket existente por id y actualiza las
    /// métricas del día de emisión del ticket.
    pub fn apply(&self, ticket_id: &Uuid, event: TicketEvent, reason: Option<String>) -> Result<Ticket> {
        let now = self.clock.now();
        let ticket = self.repo.apply_event(ticket_id, event, reason, now)?;
        match event {
            TicketEvent::Advance => {}
            TicketEvent::Complete => self.stats.on_completed(ticket.branch_id(), ticket.issue_date()),
            TicketEvent::Cancel => {
                // started_at ausente => se canceló directamente desde la espera
                let from_waiting = ticket.started_at().is_none();
                self.stats.on_cancelled(ticket.branch_id(), ticket.issue_date(), from_waiting);
            }
        }
        Ok(ticket)
    }

    /// Lectura directa de un ticket por id.
    pub fn ticket(&self, ticket_id: &Uuid) -> Result<Ticket> {
        self.repo.get(ticket_id)
    }

    /// Tickets en espera de la sucursal, en orden de atención.
    pub fn waiting_tickets(&self, branch_id: &str) -> Result<Vec<Ticket>> {
        self.repo.waiting_tickets(branch_id)
    }

    /// Tickets actualmente en atención en la sucursal.
    pub fn active_tickets(&self, branch_id: &str) -> Result<Vec<Ticket>> {
        self.repo.active_tickets(branch_id)
    }

    /// Tickets completados hoy en la sucursal.
    pub fn completed_today(&self, branch_id: &str) -> Result<Vec<Ticket>> {
        self.repo.completed_on(branch_id, self.clock.today())
    }

    /// Tickets cancelados hoy en la sucursal (auditoría).
    pub fn cancelled_today(&self, branch_id: &str) -> Result<Vec<Ticket>> {
        self.repo.cancelled_on(branch_id, self.clock.today())
    }

    /// Métricas vivas de la sucursal para el día actual.
    pub fn stats_for(&self, branch_id: &str) -> BranchDayStats {
        self.stats.snapshot_for(branch_id, self.clock.today())
    }

    /// Último número emitido para (sucursal, hoy); 0 si no hubo emisión.
    pub fn last_token(&self, branch_id: &str) -> i64 {
        self.sequencer.current(branch_id, self.clock.today())
    }

    /// Archiva contadores y métricas de días ya cerrados.
    pub fn retire_before(&self, date: NaiveDate) {
        self.sequencer.retire_before(date);
        self.stats.retire_before(date);
    }
}
