use chrono::{Duration, TimeZone, Utc};
use dispatch::engine::DispatchEngineConfig;
use dispatch::errors::DispatchError;
use dispatch::stubs::{InMemoryQueueRepository, ManualClock};
use queue_domain::{TicketEvent, TicketPriority, TicketStatus, VisitType};
use reception::{IssueTicketRequest, ReceptionError, ReceptionService};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

fn setup() -> (Arc<ManualClock>, ReceptionService<InMemoryQueueRepository>) {
  let start = Utc.with_ymd_and_hms(2024, 1, 10, 8, 0, 0).unwrap();
  let clock = Arc::new(ManualClock::new(start));
  let repo = Arc::new(InMemoryQueueRepository::new());
  let service = ReceptionService::new(repo, DispatchEngineConfig { clock: clock.clone() });
  (clock, service)
}

fn request(branch: &str, patient: &str, priority: TicketPriority) -> IssueTicketRequest {
  IssueTicketRequest { branch_id: branch.to_string(),
                       patient_ref: patient.to_string(),
                       doctor_ref: None,
                       visit_type: VisitType::WalkIn,
                       priority,
                       metadata: json!({}) }
}

#[test]
fn snapshot_roundtrip_issue_then_complete() {
  let (clock, service) = setup();

  let issued = service.issue_ticket(request("B1", "patient-1", TicketPriority::Normal)).expect("issue");
  // recién emitido: aparece en waiting
  let snap = service.snapshot("B1").expect("snapshot");
  assert_eq!(snap.waiting.len(), 1);
  assert_eq!(snap.waiting[0].id(), issued.id());
  assert!(snap.active.is_empty());
  assert!(snap.completed_today.is_empty());
  assert_eq!(snap.stats.waiting, 1);

  clock.advance(Duration::seconds(30));
  let called = service.call_next("B1").expect("call").expect("ticket");
  assert_eq!(called.id(), issued.id());
  service.transition(&called.id(), TicketEvent::Complete, None).expect("complete");

  // completado: aparece en completed_today y en ningún otro lado
  let snap = service.snapshot("B1").expect("snapshot 2");
  assert!(snap.waiting.is_empty());
  assert!(snap.active.is_empty());
  assert_eq!(snap.completed_today.len(), 1);
  assert_eq!(snap.completed_today[0].id(), issued.id());
  assert_eq!(snap.stats.completed_today, 1);
  assert_eq!(snap.stats.average_wait_secs, Some(30.0));
}

#[test]
fn emergency_beats_earlier_normal_on_b1() {
  // sucursal B1: ticket A (normal, t=0), ticket B (emergency, t=1)
  let (clock, service) = setup();
  let a = service.issue_ticket(request("B1", "patient-a", TicketPriority::Normal)).expect("issue a");
  clock.advance(Duration::seconds(1));
  let b = service.issue_ticket(request("B1", "patient-b", TicketPriority::Emergency)).expect("issue b");

  let first = service.call_next("B1").expect("call").expect("ticket");
  assert_eq!(first.id(), b.id(), "la emergencia debe salir antes que el normal");
  let second = service.call_next("B1").expect("call 2").expect("ticket 2");
  assert_eq!(second.id(), a.id());
}

#[test]
fn call_next_on_empty_branch_is_none() {
  let (_clock, service) = setup();
  assert!(service.call_next("B1").expect("call").is_none());
}

#[test]
fn requests_are_validated_before_the_engine() {
  let (_clock, service) = setup();

  let r = service.issue_ticket(request("B1", "   ", TicketPriority::Normal));
  assert!(matches!(r, Err(ReceptionError::Validation(_))));

  let r = service.issue_ticket(request("", "patient", TicketPriority::Normal));
  assert!(matches!(r, Err(ReceptionError::Validation(_))));

  let mut bad_doctor = request("B1", "patient", TicketPriority::Normal);
  bad_doctor.doctor_ref = Some("  ".into());
  assert!(matches!(service.issue_ticket(bad_doctor), Err(ReceptionError::Validation(_))));

  assert!(matches!(service.call_next(""), Err(ReceptionError::Validation(_))));
  assert!(matches!(service.snapshot(" "), Err(ReceptionError::Validation(_))));
}

#[test]
fn unknown_ticket_surfaces_not_found() {
  let (_clock, service) = setup();
  let random = Uuid::new_v4();
  let r = service.transition(&random, TicketEvent::Complete, None);
  assert!(matches!(r, Err(ReceptionError::Dispatch(DispatchError::NotFound(_)))));
}

#[test]
fn cancellation_reason_travels_with_the_ticket() {
  let (_clock, service) = setup();
  let t = service.issue_ticket(request("B1", "patient-1", TicketPriority::Priority)).expect("issue");
  let cancelled = service.transition(&t.id(), TicketEvent::Cancel, Some("reprogramado".into())).expect("cancel");
  assert_eq!(cancelled.status(), TicketStatus::Cancelled);
  assert_eq!(cancelled.cancel_reason(), Some("reprogramado"));

  let fetched = service.ticket(&t.id()).expect("get");
  assert_eq!(fetched.cancel_reason(), Some("reprogramado"));

  let snap = service.snapshot("B1").expect("snapshot");
  assert!(snap.waiting.is_empty());
  assert_eq!(snap.stats.cancelled_today, 1);
}

#[test]
fn priority_changes_require_cancel_and_reissue() {
  // no hay API para mutar la prioridad: el flujo es cancelar y reemitir,
  // y el número de token nunca se reutiliza
  let (_clock, service) = setup();
  let t = service.issue_ticket(request("B1", "patient-1", TicketPriority::Normal)).expect("issue");
  assert_eq!(t.token_number(), 1);
  service.transition(&t.id(), TicketEvent::Cancel, Some("escalado".into())).expect("cancel");
  let again = service.issue_ticket(request("B1", "patient-1", TicketPriority::Emergency)).expect("reissue");
  assert_eq!(again.token_number(), 2);
  assert_eq!(again.priority(), TicketPriority::Emergency);
}
