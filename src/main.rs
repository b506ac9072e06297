use std::error::Error;
use std::io::{self, Write};
use std::sync::Arc;
use dispatch::engine::DispatchEngineConfig;
use dispatch::stubs::InMemoryQueueRepository;
use queue_domain::{TicketEvent, TicketPriority, VisitType};
use reception::{IssueTicketRequest, ReceptionService};
use serde_json::json;
use uuid::Uuid;

/// Pequeño menú interactivo para operar la cola de una sucursal usando el
/// repositorio en memoria de `dispatch`.
///
/// Opciones soportadas:
/// 1) Emitir ticket
/// 2) Llamar al siguiente paciente
/// 3) Aplicar transición (advance/complete/cancel)
/// 4) Ver snapshot de una sucursal
/// 5) Salir
fn main() -> Result<(), Box<dyn Error>> {
    // Wiring en memoria: mismo contrato que usaría un backend durable
    let repo = Arc::new(InMemoryQueueRepository::new());
    let service = ReceptionService::new(repo, DispatchEngineConfig::default());

    loop {
        println!("\n== Queue CLI menu ==");
        println!("1) Emitir ticket");
        println!("2) Llamar al siguiente paciente");
        println!("3) Aplicar transición (advance/complete/cancel)");
        println!("4) Ver snapshot de una sucursal");
        println!("5) Salir");
        print!("Elige una opción: ");
        io::stdout().flush().ok();

        let mut choice = String::new();
        io::stdin().read_line(&mut choice)?;
        match choice.trim() {
            "1" => {
                let branch = prompt("Sucursal (branch id): ")?;
                let patient = prompt("Referencia de paciente: ")?;
                let doctor = prompt("Referencia de doctor (enter para ninguno): ")?;
                let visit_s = prompt("Tipo de visita [w=walk_in, a=appointment]: ")?;
                let visit_type = match visit_s.trim() {
                    "a" => VisitType::Appointment,
                    _ => VisitType::WalkIn,
                };
                let prio_s = prompt("Prioridad [n=normal, p=priority, e=emergency]: ")?;
                let priority = match prio_s.trim() {
                    "e" => TicketPriority::Emergency,
                    "p" => TicketPriority::Priority,
                    _ => TicketPriority::Normal,
                };
                let doctor_opt = if doctor.trim().is_empty() { None } else { Some(doctor.trim().to_string()) };
                let request = IssueTicketRequest { branch_id: branch.trim().to_string(),
                                                  patient_ref: patient.trim().to_string(),
                                                  doctor_ref: doctor_opt,
                                                  visit_type,
                                                  priority,
                                                  metadata: json!({}) };
                match service.issue_ticket(request) {
                    Ok(t) => println!("Ticket emitido: {} (id {})", t, t.id()),
                    Err(e) => eprintln!("Error emitiendo ticket: {}", e),
                }
            }
            "2" => {
                let branch = prompt("Sucursal (branch id): ")?;
                match service.call_next(branch.trim()) {
                    Ok(Some(t)) => println!("Llamado: {} (id {})", t, t.id()),
                    Ok(None) => println!("Cola vacía: nadie para llamar"),
                    Err(e) => eprintln!("Error llamando siguiente: {}", e),
                }
            }
            "3" => {
                let id_s = prompt("Ticket id (UUID): ")?;
                let id = match Uuid::parse_str(id_s.trim()) {
                    Ok(u) => u,
                    Err(_) => { eprintln!("UUID inválido"); continue; }
                };
                let ev_s = prompt("Evento [advance/complete/cancel]: ")?;
                let (event, reason) = match ev_s.trim() {
                    "advance" => (TicketEvent::Advance, None),
                    "complete" => (TicketEvent::Complete, None),
                    "cancel" => {
                        let r = prompt("Motivo de cancelación (enter para ninguno): ")?;
                        let r_opt = if r.trim().is_empty() { None } else { Some(r.trim().to_string()) };
                        (TicketEvent::Cancel, r_opt)
                    }
                    other => { eprintln!("Evento inválido: {}", other); continue; }
                };
                match service.transition(&id, event, reason) {
                    Ok(t) => println!("Transición aplicada: {}", t),
                    Err(e) => eprintln!("Error aplicando transición: {}", e),
                }
            }
            "4" => {
                let branch = prompt("Sucursal (branch id): ")?;
                match service.snapshot(branch.trim()) {
                    Ok(snap) => {
                        println!("\nSnapshot de {} @ {}", snap.branch_id, snap.taken_at);
                        println!("-- en espera ({}) --", snap.waiting.len());
                        for t in &snap.waiting {
                            println!("  #{} {} {} paciente={}", t.token_number(), t.priority(), t.status(), t.patient_ref());
                        }
                        println!("-- en atención ({}) --", snap.active.len());
                        for t in &snap.active {
                            println!("  #{} {} paciente={}", t.token_number(), t.status(), t.patient_ref());
                        }
                        println!("-- completados hoy ({}) --", snap.completed_today.len());
                        for t in &snap.completed_today {
                            println!("  #{} paciente={}", t.token_number(), t.patient_ref());
                        }
                        match snap.stats.average_wait_secs {
                            Some(avg) => println!("stats: waiting={} active={} completed={} cancelled={} espera_promedio={:.1}s",
                                                  snap.stats.waiting,
                                                  snap.stats.active,
                                                  snap.stats.completed_today,
                                                  snap.stats.cancelled_today,
                                                  avg),
                            None => println!("stats: waiting={} active={} completed={} cancelled={} sin llamados aún",
                                             snap.stats.waiting,
                                             snap.stats.active,
                                             snap.stats.completed_today,
                                             snap.stats.cancelled_today),
                        }
                    }
                    Err(e) => eprintln!("Error tomando snapshot: {}", e),
                }
            }
            "5" => {
                println!("Saliendo...");
                break;
            }
            other => {
                println!("Opción inválida: {}", other);
            }
        }
    }

    Ok(())
}

fn prompt(msg: &str) -> io::Result<String> {
    print!("{}", msg);
    io::stdout().flush()?;
    let mut s = String::new();
    io::stdin().read_line(&mut s)?;
    Ok(s)
}
