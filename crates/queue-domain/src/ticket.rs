// ticket.rs
use crate::DomainError;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Tipo de visita que origina el ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisitType {
  WalkIn,
  Appointment,
}

impl fmt::Display for VisitType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      VisitType::WalkIn => write!(f, "walk_in"),
      VisitType::Appointment => write!(f, "appointment"),
    }
  }
}

/// Urgencia del ticket, fija al momento de la emisión.
///
/// Cambiar la urgencia de un paciente requiere cancelar y reemitir: así se
/// evita manipular la posición en la cola de un ticket ya emitido.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketPriority {
  Normal,
  Priority,
  Emergency,
}

impl TicketPriority {
  /// Rango numérico usado por la política de ordenamiento: menor = más
  /// urgente (emergency=0, priority=1, normal=2).
  pub fn rank(&self) -> u8 {
    match self {
      TicketPriority::Emergency => 0,
      TicketPriority::Priority => 1,
      TicketPriority::Normal => 2,
    }
  }
}

impl fmt::Display for TicketPriority {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      TicketPriority::Normal => write!(f, "normal"),
      TicketPriority::Priority => write!(f, "priority"),
      TicketPriority::Emergency => write!(f, "emergency"),
    }
  }
}

/// Estados del ciclo de vida de un ticket.
///
/// `Waiting` es el estado inicial; `Completed` y `Cancelled` son terminales
/// y no admiten transición alguna de salida.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
  Waiting,
  InProgress,
  WithDoctor,
  Completed,
  Cancelled,
}

impl TicketStatus {
  pub fn is_terminal(&self) -> bool {
    matches!(self, TicketStatus::Completed | TicketStatus::Cancelled)
  }
}

impl fmt::Display for TicketStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      TicketStatus::Waiting => write!(f, "waiting"),
      TicketStatus::InProgress => write!(f, "in_progress"),
      TicketStatus::WithDoctor => write!(f, "with_doctor"),
      TicketStatus::Completed => write!(f, "completed"),
      TicketStatus::Cancelled => write!(f, "cancelled"),
    }
  }
}

/// Eventos externos aplicables a un ticket ya emitido.
///
/// Nota: "llamar al siguiente" no es un evento de este enum a propósito. Ese
/// paso reclama la cabeza de la cola y sólo puede ejecutarse mediante el
/// dequeue atómico del store, nunca apuntando a un id arbitrario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketEvent {
  Advance,
  Complete,
  Cancel,
}

impl TicketEvent {
  /// Estado destino que el evento solicita.
  pub fn requested_status(&self) -> TicketStatus {
    match self {
      TicketEvent::Advance => TicketStatus::WithDoctor,
      TicketEvent::Complete => TicketStatus::Completed,
      TicketEvent::Cancel => TicketStatus::Cancelled,
    }
  }
}

impl fmt::Display for TicketEvent {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      TicketEvent::Advance => write!(f, "advance"),
      TicketEvent::Complete => write!(f, "complete"),
      TicketEvent::Cancel => write!(f, "cancel"),
    }
  }
}

/// Un lugar en la cola de una sucursal: la entidad central del dominio.
///
/// Todos los campos son privados; el `status` y los timestamps sólo pueden
/// mutar a través de los métodos de ciclo de vida, que validan la máquina de
/// estados y dejan el ticket intacto ante cualquier rechazo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
  id: Uuid,
  branch_id: String,
  token_number: i64,
  issue_date: NaiveDate,
  patient_ref: String,
  doctor_ref: Option<String>,
  visit_type: VisitType,
  priority: TicketPriority,
  status: TicketStatus,
  created_at: DateTime<Utc>,
  started_at: Option<DateTime<Utc>>,
  completed_at: Option<DateTime<Utc>>,
  cancel_reason: Option<String>,
  metadata: serde_json::Value,
}

impl Ticket {
  /// Emite un ticket nuevo en estado `Waiting`.
  ///
  /// Valida: sucursal y referencia de paciente no vacías, número de token
  /// positivo y coherencia entre `issue_date` y el día UTC de `created_at`.
  #[allow(clippy::too_many_arguments)]
  pub fn issue(branch_id: &str,
               token_number: i64,
               issue_date: NaiveDate,
               patient_ref: &str,
               doctor_ref: Option<String>,
               visit_type: VisitType,
               priority: TicketPriority,
               metadata: serde_json::Value,
               created_at: DateTime<Utc>)
               -> Result<Self, DomainError> {
    if branch_id.trim().is_empty() {
      return Err(DomainError::ValidationError("branch_id no puede estar vacío".to_string()));
    }
    if patient_ref.trim().is_empty() {
      return Err(DomainError::ValidationError("patient_ref no puede estar vacío".to_string()));
    }
    if token_number < 1 {
      return Err(DomainError::ValidationError(format!("token_number debe ser >= 1, recibido {}", token_number)));
    }
    if issue_date != created_at.date_naive() {
      return Err(DomainError::ValidationError(format!("issue_date {} no coincide con el día de created_at {}",
                                                      issue_date,
                                                      created_at.date_naive())));
    }
    Ok(Self { id: Uuid::new_v4(),
              branch_id: branch_id.to_string(),
              token_number,
              issue_date,
              patient_ref: patient_ref.to_string(),
              doctor_ref,
              visit_type,
              priority,
              status: TicketStatus::Waiting,
              created_at,
              started_at: None,
              completed_at: None,
              cancel_reason: None,
              metadata })
  }

  /// Transición `Waiting -> InProgress`, reservada al dequeue atómico del
  /// store: el único camino por el que un ticket abandona la línea de espera
  /// hacia una estación.
  pub fn start_attention(&mut self, now: DateTime<Utc>) -> Result<(), DomainError> {
    if self.status != TicketStatus::Waiting {
      return Err(DomainError::InvalidTransition { from: self.status,
                                                  requested: TicketStatus::InProgress });
    }
    self.status = TicketStatus::InProgress;
    self.started_at = Some(now);
    Ok(())
  }

  /// Aplica un evento externo según la tabla de transiciones:
  ///
  /// - `Advance`:  `InProgress -> WithDoctor`
  /// - `Complete`: `InProgress | WithDoctor -> Completed`
  /// - `Cancel`:   `Waiting | InProgress -> Cancelled`
  ///
  /// `reason` sólo se registra en cancelaciones y es metadato opaco. Ante un
  /// guard violado retorna `InvalidTransition` sin mutación parcial.
  pub fn apply(&mut self, event: TicketEvent, now: DateTime<Utc>, reason: Option<String>) -> Result<(), DomainError> {
    let rejected = DomainError::InvalidTransition { from: self.status,
                                                    requested: event.requested_status() };
    match event {
      TicketEvent::Advance => {
        if self.status != TicketStatus::InProgress {
          return Err(rejected);
        }
        self.status = TicketStatus::WithDoctor;
      }
      TicketEvent::Complete => {
        if !matches!(self.status, TicketStatus::InProgress | TicketStatus::WithDoctor) {
          return Err(rejected);
        }
        self.status = TicketStatus::Completed;
        self.completed_at = Some(now);
      }
      TicketEvent::Cancel => {
        if !matches!(self.status, TicketStatus::Waiting | TicketStatus::InProgress) {
          return Err(rejected);
        }
        self.status = TicketStatus::Cancelled;
        self.completed_at = Some(now);
        self.cancel_reason = reason;
      }
    }
    Ok(())
  }

  pub fn id(&self) -> Uuid {
    self.id
  }

  pub fn branch_id(&self) -> &str {
    &self.branch_id
  }

  pub fn token_number(&self) -> i64 {
    self.token_number
  }

  pub fn issue_date(&self) -> NaiveDate {
    self.issue_date
  }

  pub fn patient_ref(&self) -> &str {
    &self.patient_ref
  }

  pub fn doctor_ref(&self) -> Option<&str> {
    self.doctor_ref.as_deref()
  }

  pub fn visit_type(&self) -> VisitType {
    self.visit_type
  }

  pub fn priority(&self) -> TicketPriority {
    self.priority
  }

  pub fn status(&self) -> TicketStatus {
    self.status
  }

  pub fn created_at(&self) -> DateTime<Utc> {
    self.created_at
  }

  pub fn started_at(&self) -> Option<DateTime<Utc>> {
    self.started_at
  }

  pub fn completed_at(&self) -> Option<DateTime<Utc>> {
    self.completed_at
  }

  pub fn cancel_reason(&self) -> Option<&str> {
    self.cancel_reason.as_deref()
  }

  pub fn metadata(&self) -> &serde_json::Value {
    &self.metadata
  }

  pub fn is_terminal(&self) -> bool {
    self.status.is_terminal()
  }
}

impl fmt::Display for Ticket {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f,
           "Ticket(#{} {}@{}, {}, {}, {})",
           self.token_number, self.branch_id, self.issue_date, self.priority, self.visit_type, self.status)
  }
}
