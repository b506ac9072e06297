// Archivo: stats.rs
// Propósito: agregador incremental de métricas por (sucursal, día).
//
// Cada transición exitosa aporta un delta; nunca se re-escanea el historial.
// Un ticket aporta a la espera promedio exactamente una vez, en el momento
// en que abandona `waiting` por primera vez. Los cancelados quedan fuera del
// promedio pero se cuentan aparte para auditoría.
use chrono::{Duration, NaiveDate};
use dashmap::DashMap;
use serde::Serialize;

/// Clave de un balde de métricas: una sucursal en un día calendario.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StatsKey {
    pub branch_id: String,
    pub date: NaiveDate,
}

/// Contadores vivos de una sucursal para un día.
///
/// El balde de un ticket es siempre el de su día de emisión: un ticket que
/// sigue en espera al cruzar la medianoche queda contado en el balde de ayer
/// y sus deltas posteriores caen ahí, aunque las vistas por lista lo sigan
/// mostrando. Los baldes de días cerrados se desalojan con `retire_before`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BranchDayStats {
    /// Tickets actualmente en `waiting`.
    pub waiting: i64,
    /// Tickets actualmente en atención (`in_progress` + `with_doctor`).
    pub active: i64,
    /// Tickets completados en el día.
    pub completed: i64,
    /// Tickets cancelados en el día (auditoría; fuera del promedio).
    pub cancelled: i64,
    /// Suma de esperas (`started_at - created_at`) en milisegundos.
    pub wait_total_ms: i64,
    /// Cantidad de esperas sumadas.
    pub wait_samples: i64,
}

impl BranchDayStats {
    /// Espera promedio en segundos; `None` si aún nadie fue llamado.
    pub fn average_wait_secs(&self) -> Option<f64> {
        if self.wait_samples == 0 {
            return None;
        }
        Some(self.wait_total_ms as f64 / 1000.0 / self.wait_samples as f64)
    }
}

/// Agregador de métricas en vivo.
///
/// Cada balde (sucursal, día) es una entrada propia del mapa: los deltas se
/// aplican bajo acceso exclusivo a la entrada, sin contención entre
/// sucursales ni entre días.
pub struct StatsAggregator {
    buckets: DashMap<StatsKey, BranchDayStats>,
}

impl StatsAggregator {
    pub fn new() -> Self {
        Self { buckets: DashMap::new() }
    }

    fn update<F>(&self, branch_id: &str, date: NaiveDate, apply: F)
        where F: FnOnce(&mut BranchDayStats)
    {
        let key = StatsKey { branch_id: branch_id.to_string(), date };
        let mut bucket = self.buckets.entry(key).or_default();
        apply(&mut bucket);
    }

    /// Un ticket nuevo entró a la línea de espera.
    pub fn on_issued(&self, branch_id: &str, date: NaiveDate) {
        self.update(branch_id, date, |b| b.waiting += 1);
    }

    /// Un ticket abandonó `waiting` hacia una estación: única contribución
    /// de ese ticket al promedio de espera.
    pub fn on_started(&self, branch_id: &str, date: NaiveDate, wait: Duration) {
        self.update(branch_id, date, |b| {
                b.waiting -= 1;
                b.active += 1;
                b.wait_total_ms += wait.num_milliseconds();
                b.wait_samples += 1;
            });
    }

    /// Un ticket en atención se completó.
    pub fn on_completed(&self, branch_id: &str, date: NaiveDate) {
        self.update(branch_id, date, |b| {
                b.active -= 1;
                b.completed += 1;
            });
    }

    /// Un ticket se canceló. `from_waiting` indica de qué contador vivo
    /// descontarlo; un cancelado desde la espera nunca aporta al promedio.
    pub fn on_cancelled(&self, branch_id: &str, date: NaiveDate, from_waiting: bool) {
        self.update(branch_id, date, |b| {
                if from_waiting {
                    b.waiting -= 1;
                } else {
                    b.active -= 1;
                }
                b.cancelled += 1;
            });
    }

    /// Copia del balde (sucursal, día); contadores en cero si no hubo
    /// actividad.
    pub fn snapshot_for(&self, branch_id: &str, date: NaiveDate) -> BranchDayStats {
        let key = StatsKey { branch_id: branch_id.to_string(), date };
        self.buckets.get(&key).map(|b| b.clone()).unwrap_or_default()
    }

    /// Desaloja baldes de días anteriores a `date` (archivado del rollover).
    pub fn retire_before(&self, date: NaiveDate) {
        self.buckets.retain(|key, _| key.date >= date);
    }
}

impl Default for StatsAggregator {
    fn default() -> Self {
        Self::new()
    }
}
