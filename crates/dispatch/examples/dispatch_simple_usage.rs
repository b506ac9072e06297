use dispatch::engine::{DispatchEngine, DispatchEngineConfig};
use dispatch::errors::DispatchError;
use dispatch::stubs::InMemoryQueueRepository;
use queue_domain::{TicketEvent, TicketPriority, VisitType};
use serde_json::json;
use std::sync::Arc;

fn main() -> Result<(), DispatchError> {
    // Config y repo
    let repo = Arc::new(InMemoryQueueRepository::new());
    let engine = DispatchEngine::new(repo, DispatchEngineConfig::default());

    // Emitir 4 tickets con prioridades mezcladas en la sucursal B1
    let prioridades = [TicketPriority::Normal,
                       TicketPriority::Emergency,
                       TicketPriority::Priority,
                       TicketPriority::Emergency];
    for (i, priority) in prioridades.iter().enumerate() {
        let t = engine.issue("B1",
                             &format!("patient-{}", i + 1),
                             None,
                             VisitType::WalkIn,
                             *priority,
                             json!({"origen": "demo"}))?;
        println!("emitido {}", t);
    }

    // La línea de espera ya está ordenada por la política de prioridad
    let waiting = engine.waiting_tickets("B1")?;
    println!("\nen espera ({}):", waiting.len());
    for t in &waiting {
        println!("  #{} {}", t.token_number(), t.priority());
    }

    // Llamar al siguiente dos veces: salen las dos emergencias en orden FIFO
    let first = engine.call_next("B1")?.expect("había tickets en espera");
    println!("\nllamado primero: {}", first);
    let second = engine.call_next("B1")?.expect("había tickets en espera");
    println!("llamado segundo: {}", second);

    // El primero pasa con el doctor y se completa; el segundo se cancela
    engine.apply(&first.id(), TicketEvent::Advance, None)?;
    let done = engine.apply(&first.id(), TicketEvent::Complete, None)?;
    println!("\ncompletado: {}", done);
    let dropped = engine.apply(&second.id(), TicketEvent::Cancel, Some("derivado a guardia".into()))?;
    println!("cancelado: {} (motivo: {:?})", dropped, dropped.cancel_reason());

    // Una cola vacía no es un error: None señala "nadie para llamar"
    let _ = engine.call_next("B1")?; // priority
    let _ = engine.call_next("B1")?; // normal
    match engine.call_next("B1")? {
        Some(t) => println!("inesperado: {}", t),
        None => println!("\ncola vacía: nadie más para llamar"),
    }

    // Métricas vivas del día
    let stats = engine.stats_for("B1");
    println!("\nstats: waiting={} active={} completed={} cancelled={}",
             stats.waiting, stats.active, stats.completed, stats.cancelled);
    if let Some(avg) = stats.average_wait_secs() {
        println!("espera promedio: {:.3}s", avg);
    }

    Ok(())
}
