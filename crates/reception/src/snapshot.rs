// Archivo: snapshot.rs
// Propósito: tipos de lectura que la fachada sirve a los clientes que hacen
// polling (la UI original refresca cada ~30 segundos).
//
// Un snapshot es una vista consistente-a-un-instante; puede quedar desfasado
// hasta un intervalo de poll y eso es una propiedad aceptada, no un bug. No
// se promete read-your-writes entre sesiones de cliente independientes.
use chrono::{DateTime, Utc};
use queue_domain::Ticket;
use serde::Serialize;

/// Bloque de métricas del día para una sucursal.
#[derive(Debug, Clone, Serialize)]
pub struct QueueStats {
  pub waiting: i64,
  pub active: i64,
  pub completed_today: i64,
  pub cancelled_today: i64,
  /// Promedio de `started_at - created_at` en segundos; `None` si nadie fue
  /// llamado todavía.
  pub average_wait_secs: Option<f64>,
}

/// Vista punto-en-el-tiempo de la cola de una sucursal.
#[derive(Debug, Clone, Serialize)]
pub struct QueueSnapshot {
  pub branch_id: String,
  pub taken_at: DateTime<Utc>,
  /// Tickets en espera, en orden de atención (la cabeza primero).
  pub waiting: Vec<Ticket>,
  /// Tickets en atención (`in_progress` y `with_doctor`).
  pub active: Vec<Ticket>,
  /// Tickets completados hoy.
  pub completed_today: Vec<Ticket>,
  pub stats: QueueStats,
}
