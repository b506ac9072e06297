// Archivo: clock.rs
// Propósito: fuente de tiempo inyectable. El motor nunca lee el reloj del
// sistema directamente; todo timestamp pasa por este trait para permitir
// pruebas deterministas.
use chrono::{DateTime, NaiveDate, Utc};

/// Fuente de tiempo del motor.
pub trait Clock: Send + Sync {
    /// Instante actual en UTC.
    fn now(&self) -> DateTime<Utc>;

    /// Día calendario actual en UTC (clave del secuenciador y las métricas).
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Reloj de producción: delega en el reloj del sistema.
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
