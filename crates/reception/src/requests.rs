// Archivo: requests.rs
// Propósito: tipos de request que la capa HTTP (fuera de alcance) construye
// y entrega al servicio de recepción.
use crate::errors::{ReceptionError, Result};
use queue_domain::{TicketPriority, VisitType};
use serde::{Deserialize, Serialize};

/// Request de emisión de ticket ("issue token").
///
/// Las referencias de paciente y doctor son opacas: el motor no las
/// interpreta; validar que existan en el directorio es tarea del caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueTicketRequest {
  pub branch_id: String,
  pub patient_ref: String,
  pub doctor_ref: Option<String>,
  pub visit_type: VisitType,
  pub priority: TicketPriority,
  /// Anotaciones opacas del caller; viajan con el ticket sin interpretarse.
  #[serde(default = "default_metadata")]
  pub metadata: serde_json::Value,
}

fn default_metadata() -> serde_json::Value {
  serde_json::json!({})
}

impl IssueTicketRequest {
  /// Valida los campos obligatorios antes de tocar el motor.
  pub fn validate(&self) -> Result<()> {
    if self.branch_id.trim().is_empty() {
      return Err(ReceptionError::Validation("branch_id no puede estar vacío".to_string()));
    }
    if self.patient_ref.trim().is_empty() {
      return Err(ReceptionError::Validation("patient_ref no puede estar vacío".to_string()));
    }
    if let Some(doctor) = &self.doctor_ref {
      if doctor.trim().is_empty() {
        return Err(ReceptionError::Validation("doctor_ref, si se envía, no puede estar vacío".to_string()));
      }
    }
    Ok(())
  }
}
