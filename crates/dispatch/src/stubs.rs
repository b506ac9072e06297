// Archivo: stubs.rs
// Propósito: implementaciones en memoria para pruebas y wiring rápido.
//
// Incluye el repositorio de colas en memoria (`InMemoryQueueRepository`) y
// un reloj manual (`ManualClock`) para pruebas deterministas. El repositorio
// no es durable, pero sí respeta todos los invariantes del contrato: es la
// implementación de referencia del dequeue atómico por sucursal.
use crate::clock::Clock;
use crate::errors::{DispatchError, Result};
use crate::repository::QueueRepository;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use dashmap::DashMap;
use queue_domain::{OrderKey, Ticket, TicketEvent, TicketStatus};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Mutex;
use uuid::Uuid;

/// Estado de la cola de una sucursal.
///
/// `waiting` es un conjunto ordenado por `OrderKey` (la política de
/// prioridad): la cabeza de la cola es siempre su primer elemento. `issued`
/// registra los triples (día, token) ya ocupados para detectar duplicados.
#[derive(Debug, Default)]
struct BranchState {
    tickets: HashMap<Uuid, Ticket>,
    waiting: BTreeSet<OrderKey>,
    issued: HashSet<(NaiveDate, i64)>,
}

/// Repositorio de colas en memoria.
///
/// Cada sucursal vive en una entrada propia del `DashMap`: tomar la entrada
/// en exclusiva serializa las operaciones mutantes de esa sucursal sin
/// bloquear a las demás. El índice global `index` resuelve ticket -> sucursal
/// para las transiciones directas por id.
pub struct InMemoryQueueRepository {
    branches: DashMap<String, BranchState>,
    index: DashMap<Uuid, String>,
}

impl InMemoryQueueRepository {
    /// Crea un repositorio vacío.
    pub fn new() -> Self {
        Self { branches: DashMap::new(),
               index: DashMap::new() }
    }

    /// Resuelve la sucursal de un ticket sin retener el guard del índice
    /// (evita cruzar locks de los dos mapas en órdenes opuestos).
    fn branch_of(&self, ticket_id: &Uuid) -> Result<String> {
        self.index
            .get(ticket_id)
            .map(|entry| entry.value().clone())
            .ok_or(DispatchError::NotFound(format!("ticket {}", ticket_id)))
    }
}

impl Default for InMemoryQueueRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl QueueRepository for InMemoryQueueRepository {
    /// Inserta el ticket en la línea ordenada de su sucursal. Valida que
    /// llegue en estado `waiting`, sin timestamps de atención, y que el
    /// triple (sucursal, día, token) no esté ocupado.
    fn enqueue(&self, ticket: Ticket) -> Result<()> {
        if ticket.status() != TicketStatus::Waiting {
            return Err(DispatchError::Conflict(format!("sólo se encola en waiting, recibido {}", ticket.status())));
        }
        if ticket.started_at().is_some() || ticket.completed_at().is_some() {
            return Err(DispatchError::Conflict("un ticket en waiting no puede traer timestamps de atención".into()));
        }
        let id = ticket.id();
        let branch = ticket.branch_id().to_string();
        let mut state = self.branches.entry(branch.clone()).or_default();
        let slot = (ticket.issue_date(), ticket.token_number());
        if !state.issued.insert(slot) {
            return Err(DispatchError::Conflict(format!("token {} ya emitido para {}@{}",
                                                       ticket.token_number(),
                                                       branch,
                                                       ticket.issue_date())));
        }
        state.waiting.insert(OrderKey::for_ticket(&ticket));
        state.tickets.insert(id, ticket);
        // El índice se publica antes de soltar el guard de la sucursal: un
        // dequeue concurrente que reclame este ticket ya puede resolverlo
        // por id. (`branch_of` nunca retiene el guard del índice al tomar
        // `branches`, así que este orden de locks no forma ciclo.)
        self.index.insert(id, branch);
        Ok(())
    }

    /// Sección crítica por sucursal: remueve la cabeza de la línea y la
    /// transiciona a `in_progress` en un único paso indivisible. Dos
    /// llamadas concurrentes jamás obtienen el mismo ticket.
    fn dequeue_next(&self, branch_id: &str, now: DateTime<Utc>) -> Result<Option<Ticket>> {
        let Some(mut state) = self.branches.get_mut(branch_id) else {
            return Ok(None);
        };
        let Some(head) = state.waiting.iter().next().cloned() else {
            return Ok(None);
        };
        state.waiting.remove(&head);
        let ticket = state.tickets
                          .get_mut(&head.ticket_id())
                          .ok_or(DispatchError::Storage(format!("índice de espera sin ticket {}", head.ticket_id())))?;
        ticket.start_attention(now)?;
        Ok(Some(ticket.clone()))
    }

    /// Aplica el evento dentro de la sección crítica de la sucursal. Si la
    /// cancelación saca a un ticket de `waiting`, también lo retira de la
    /// línea ordenada.
    fn apply_event(&self,
                   ticket_id: &Uuid,
                   event: TicketEvent,
                   reason: Option<String>,
                   now: DateTime<Utc>)
                   -> Result<Ticket> {
        let branch = self.branch_of(ticket_id)?;
        let mut state = self.branches
                            .get_mut(&branch)
                            .ok_or(DispatchError::Storage(format!("sucursal {} sin estado", branch)))?;
        let waiting_key = {
            let ticket = state.tickets
                              .get(ticket_id)
                              .ok_or(DispatchError::NotFound(format!("ticket {}", ticket_id)))?;
            if ticket.status() == TicketStatus::Waiting {
                Some(OrderKey::for_ticket(ticket))
            } else {
                None
            }
        };
        let updated = {
            let ticket = state.tickets
                              .get_mut(ticket_id)
                              .ok_or(DispatchError::NotFound(format!("ticket {}", ticket_id)))?;
            ticket.apply(event, now, reason)?;
            ticket.clone()
        };
        if let Some(key) = waiting_key {
            // Sólo una cancelación puede haber sacado al ticket de waiting.
            state.waiting.remove(&key);
        }
        Ok(updated)
    }

    fn get(&self, ticket_id: &Uuid) -> Result<Ticket> {
        let branch = self.branch_of(ticket_id)?;
        let state = self.branches
                        .get(&branch)
                        .ok_or(DispatchError::Storage(format!("sucursal {} sin estado", branch)))?;
        state.tickets
             .get(ticket_id)
             .cloned()
             .ok_or(DispatchError::NotFound(format!("ticket {}", ticket_id)))
    }

    /// Lectura consistente-a-un-instante: clona bajo el guard corto de la
    /// entrada; los escritores se bloquean microsegundos, no el ciclo
    /// completo de poll del cliente.
    fn waiting_tickets(&self, branch_id: &str) -> Result<Vec<Ticket>> {
        let Some(state) = self.branches.get(branch_id) else {
            return Ok(Vec::new());
        };
        let mut out = Vec::with_capacity(state.waiting.len());
        for key in state.waiting.iter() {
            let ticket = state.tickets
                              .get(&key.ticket_id())
                              .ok_or(DispatchError::Storage(format!("índice de espera sin ticket {}", key.ticket_id())))?;
            out.push(ticket.clone());
        }
        Ok(out)
    }

    fn active_tickets(&self, branch_id: &str) -> Result<Vec<Ticket>> {
        let Some(state) = self.branches.get(branch_id) else {
            return Ok(Vec::new());
        };
        let mut out: Vec<Ticket> = state.tickets
                                        .values()
                                        .filter(|t| matches!(t.status(), TicketStatus::InProgress | TicketStatus::WithDoctor))
                                        .cloned()
                                        .collect();
        out.sort_by_key(|t| (t.started_at(), t.token_number()));
        Ok(out)
    }

    fn completed_on(&self, branch_id: &str, date: NaiveDate) -> Result<Vec<Ticket>> {
        let Some(state) = self.branches.get(branch_id) else {
            return Ok(Vec::new());
        };
        let mut out: Vec<Ticket> = state.tickets
                                        .values()
                                        .filter(|t| t.status() == TicketStatus::Completed)
                                        .filter(|t| t.completed_at().map(|c| c.date_naive()) == Some(date))
                                        .cloned()
                                        .collect();
        out.sort_by_key(|t| (t.completed_at(), t.token_number()));
        Ok(out)
    }

    fn cancelled_on(&self, branch_id: &str, date: NaiveDate) -> Result<Vec<Ticket>> {
        let Some(state) = self.branches.get(branch_id) else {
            return Ok(Vec::new());
        };
        let mut out: Vec<Ticket> = state.tickets
                                        .values()
                                        .filter(|t| t.status() == TicketStatus::Cancelled)
                                        .filter(|t| t.completed_at().map(|c| c.date_naive()) == Some(date))
                                        .cloned()
                                        .collect();
        out.sort_by_key(|t| (t.completed_at(), t.token_number()));
        Ok(out)
    }
}

/// Reloj manual para pruebas: arranca en un instante fijo y sólo avanza
/// cuando el test lo pide.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    /// Crea el reloj posicionado en `start`.
    pub fn new(start: DateTime<Utc>) -> Self {
        Self { now: Mutex::new(start) }
    }

    /// Avanza el reloj la duración dada.
    pub fn advance(&self, delta: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += delta;
    }

    /// Reposiciona el reloj en un instante exacto.
    pub fn set(&self, instant: DateTime<Utc>) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now = instant;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}
