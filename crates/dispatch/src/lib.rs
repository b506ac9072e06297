//! Crate `dispatch` — motor de colas y despacho de tickets
//!
//! Este crate define el secuenciador de números de token (`TokenSequencer`),
//! el contrato del store de colas (`QueueRepository`) con una implementación
//! en memoria útil para pruebas (`InMemoryQueueRepository`), el agregador
//! incremental de métricas (`StatsAggregator`), la fuente de tiempo
//! inyectable (`Clock`) y el motor `DispatchEngine` que los orquesta.
//!
//! Diseño resumido:
//! - Secciones críticas por sucursal: las operaciones mutantes de una
//!   sucursal se serializan; sucursales distintas nunca contienden.
//! - Dequeue atómico: remover la cabeza y transicionarla a `in_progress` es
//!   un único paso indivisible; ningún ticket se asigna dos veces.
//! - Cola vacía no es error: `dequeue_next`/`call_next` devuelven `None`.
//!
//! Ejemplo rápido:
//! ```rust
//! use dispatch::engine::{DispatchEngine, DispatchEngineConfig};
//! use dispatch::stubs::InMemoryQueueRepository;
//! use std::sync::Arc;
//! let repo = Arc::new(InMemoryQueueRepository::new());
//! let engine = DispatchEngine::new(repo, DispatchEngineConfig::default());
//! ```
pub mod clock;
pub mod engine;
pub mod errors;
pub mod repository;
pub mod sequencer;
pub mod stats;
pub mod stubs;

pub use clock::*;
pub use engine::*;
pub use errors::*;
pub use repository::*;
pub use sequencer::*;
pub use stats::*;
pub use stubs::*;
