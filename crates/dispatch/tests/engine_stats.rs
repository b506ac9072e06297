use chrono::{Duration, TimeZone, Utc};
use dispatch::engine::{DispatchEngine, DispatchEngineConfig};
use dispatch::Clock;
use dispatch::stubs::{InMemoryQueueRepository, ManualClock};
use queue_domain::{TicketEvent, TicketPriority, TicketStatus, VisitType};
use serde_json::json;
use std::sync::Arc;

fn setup() -> (Arc<ManualClock>, DispatchEngine<InMemoryQueueRepository>) {
  let start = Utc.with_ymd_and_hms(2024, 1, 10, 8, 0, 0).unwrap();
  let clock = Arc::new(ManualClock::new(start));
  let repo = Arc::new(InMemoryQueueRepository::new());
  let engine = DispatchEngine::new(repo, DispatchEngineConfig { clock: clock.clone() });
  (clock, engine)
}

#[test]
fn five_issued_three_called_two_completed() {
  let (clock, engine) = setup();
  let start = clock.now();

  // emitir 5 tickets, uno por segundo (created_at = 0,1,2,3,4)
  for i in 0..5i64 {
    let t = engine.issue("B1", &format!("patient-{}", i), None, VisitType::WalkIn, TicketPriority::Normal, json!({}))
                  .expect("issue");
    assert_eq!(t.token_number(), i + 1);
    clock.advance(Duration::seconds(1));
  }

  // llamar a 3 con esperas de 10s, 15s y 20s respectivamente
  clock.set(start + Duration::seconds(10));
  let c1 = engine.call_next("B1").expect("call 1").expect("ticket 1");
  clock.set(start + Duration::seconds(16));
  let c2 = engine.call_next("B1").expect("call 2").expect("ticket 2");
  clock.set(start + Duration::seconds(22));
  let c3 = engine.call_next("B1").expect("call 3").expect("ticket 3");
  assert_eq!((c1.token_number(), c2.token_number(), c3.token_number()), (1, 2, 3));

  // completar los tickets con esperas 10s y 20s
  engine.apply(&c1.id(), TicketEvent::Complete, None).expect("complete 1");
  engine.apply(&c3.id(), TicketEvent::Complete, None).expect("complete 3");

  let stats = engine.stats_for("B1");
  assert_eq!(stats.waiting, 2);
  assert_eq!(stats.active, 1);
  assert_eq!(stats.completed, 2);
  assert_eq!(stats.cancelled, 0);
  // promedio de espera: media de (started_at - created_at) = (10+15+20)/3
  let avg = stats.average_wait_secs().expect("promedio");
  assert!((avg - 15.0).abs() < 1e-9, "promedio {} != 15.0", avg);

  // las vistas coinciden con los contadores
  assert_eq!(engine.waiting_tickets("B1").unwrap().len(), 2);
  assert_eq!(engine.active_tickets("B1").unwrap().len(), 1);
  assert_eq!(engine.completed_today("B1").unwrap().len(), 2);
}

#[test]
fn cancelled_tickets_stay_out_of_the_average() {
  let (clock, engine) = setup();
  let start = clock.now();

  let a = engine.issue("B1", "p-a", None, VisitType::WalkIn, TicketPriority::Normal, json!({})).expect("issue a");
  clock.advance(Duration::seconds(1));
  let b = engine.issue("B1", "p-b", None, VisitType::WalkIn, TicketPriority::Normal, json!({})).expect("issue b");

  // b se cancela desde la espera: nunca aporta al promedio
  let cancelled = engine.apply(&b.id(), TicketEvent::Cancel, Some("se retiró".into())).expect("cancel");
  assert_eq!(cancelled.status(), TicketStatus::Cancelled);

  // a es llamado a los 8 segundos de su emisión
  clock.set(start + Duration::seconds(8));
  let called = engine.call_next("B1").expect("call").expect("ticket");
  assert_eq!(called.id(), a.id());

  let stats = engine.stats_for("B1");
  assert_eq!(stats.waiting, 0);
  assert_eq!(stats.active, 1);
  assert_eq!(stats.cancelled, 1);
  let avg = stats.average_wait_secs().expect("promedio");
  assert!((avg - 8.0).abs() < 1e-9, "promedio {} != 8.0", avg);

  // el cancelado aparece en la vista de auditoría del día
  let audited = engine.cancelled_today("B1").unwrap();
  assert_eq!(audited.len(), 1);
  assert_eq!(audited[0].id(), b.id());
}

#[test]
fn average_is_none_until_someone_is_called() {
  let (_clock, engine) = setup();
  engine.issue("B1", "p", None, VisitType::Appointment, TicketPriority::Priority, json!({})).expect("issue");
  let stats = engine.stats_for("B1");
  assert_eq!(stats.waiting, 1);
  assert!(stats.average_wait_secs().is_none());
}

#[test]
fn tickets_stay_in_their_issue_day_bucket_across_midnight() {
  let (clock, engine) = setup();
  let issue_day = clock.now().date_naive();
  let t = engine.issue("B1", "p", None, VisitType::WalkIn, TicketPriority::Normal, json!({})).expect("issue");

  // rola el día con el ticket aún en espera
  clock.advance(Duration::hours(20));
  assert_ne!(clock.now().date_naive(), issue_day);

  // la lista lo sigue mostrando; sus contadores viven en el balde de ayer
  assert_eq!(engine.waiting_tickets("B1").unwrap().len(), 1);
  assert_eq!(engine.stats_for("B1").waiting, 0);

  // al llamarlo, el delta también cae en el balde de su día de emisión
  let called = engine.call_next("B1").expect("call").expect("ticket");
  assert_eq!(called.id(), t.id());
  assert_eq!(engine.stats_for("B1").active, 0);
  assert_eq!(engine.stats_for("B1").waiting, 0);
}

#[test]
fn retire_before_archives_sequencer_and_stats() {
  let (clock, engine) = setup();
  engine.issue("B1", "p", None, VisitType::WalkIn, TicketPriority::Normal, json!({})).expect("issue");
  assert_eq!(engine.last_token("B1"), 1);

  // al rolar el día, todo lo anterior a mañana puede archivarse
  let tomorrow = clock.now().date_naive().succ_opt().unwrap();
  engine.retire_before(tomorrow);
  assert_eq!(engine.last_token("B1"), 0);
  assert_eq!(engine.stats_for("B1").waiting, 0);
}
