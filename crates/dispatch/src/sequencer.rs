// Archivo: sequencer.rs
// Propósito: emitir números de token únicos y estrictamente crecientes por
// clave (sucursal, día).
//
// Cada clave tiene su propio contador: la emisión en sucursales o días
// distintos nunca se bloquea mutuamente. El acceso exclusivo a la entrada
// del mapa hace que dos llamadas concurrentes sobre la misma clave jamás
// observen el mismo valor. Un número emitido no se reutiliza aunque el
// ticket que lo recibió se cancele después.
use crate::errors::{DispatchError, Result};
use chrono::NaiveDate;
use dashmap::DashMap;

/// Clave de un contador: una sucursal en un día calendario.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SequenceKey {
    pub branch_id: String,
    pub date: NaiveDate,
}

/// Secuenciador de números de token por (sucursal, día).
pub struct TokenSequencer {
    counters: DashMap<SequenceKey, i64>,
}

impl TokenSequencer {
    /// Crea un secuenciador vacío: todo contador arranca en 1 al primer uso.
    pub fn new() -> Self {
        Self { counters: DashMap::new() }
    }

    /// Devuelve el siguiente número para la clave: 1 en un día nuevo, y uno
    /// más que la llamada anterior en caso contrario.
    ///
    /// La entrada del mapa se toma en exclusiva, por lo que el incremento es
    /// atómico frente a llamadas concurrentes sobre la misma clave.
    pub fn next(&self, branch_id: &str, date: NaiveDate) -> Result<i64> {
        let key = SequenceKey { branch_id: branch_id.to_string(), date };
        let mut counter = self.counters.entry(key).or_insert(0);
        if *counter == i64::MAX {
            return Err(DispatchError::SequencerExhausted(format!("{}@{}", branch_id, date)));
        }
        *counter += 1;
        Ok(*counter)
    }

    /// Último número emitido para la clave (0 si nunca se emitió).
    pub fn current(&self, branch_id: &str, date: NaiveDate) -> i64 {
        let key = SequenceKey { branch_id: branch_id.to_string(), date };
        self.counters.get(&key).map(|c| *c).unwrap_or(0)
    }

    /// Desaloja los contadores de días anteriores a `date`. Los días ya
    /// cerrados no vuelven a emitir, así que sus contadores pueden
    /// archivarse sin riesgo de reutilizar números.
    pub fn retire_before(&self, date: NaiveDate) {
        self.counters.retain(|key, _| key.date >= date);
    }
}

impl Default for TokenSequencer {
    fn default() -> Self {
        Self::new()
    }
}
