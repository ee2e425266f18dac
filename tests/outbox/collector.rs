use serde::{Deserialize, Serialize};
use sourced_bus::bus::{handler_fn, LocalBus, Subscriber};
use sourced_bus::{Bitcode, Error, ErrorKind, Event, EventCollector, Publishable};
use std::sync::{Arc, Mutex};

#[derive(Debug, PartialEq, Serialize, Deserialize)]
enum AccountEvent {
    Opened { account_id: String, owner: String },
    Deposited { account_id: String, amount: u64 },
}

impl Publishable for AccountEvent {
    fn entity_id(&self) -> &str {
        match self {
            AccountEvent::Opened { account_id, .. } => account_id,
            AccountEvent::Deposited { account_id, .. } => account_id,
        }
    }

    fn topic(&self) -> &str {
        match self {
            AccountEvent::Opened { .. } => "accounts.opened",
            AccountEvent::Deposited { .. } => "accounts.deposited",
        }
    }
}

fn opened(account_id: &str) -> AccountEvent {
    AccountEvent::Opened {
        account_id: account_id.to_string(),
        owner: "grace".to_string(),
    }
}

fn deposited(account_id: &str, amount: u64) -> AccountEvent {
    AccountEvent::Deposited {
        account_id: account_id.to_string(),
        amount,
    }
}

#[test]
fn drain_returns_events_once_in_record_order() {
    let mut collector = EventCollector::new();
    collector.record(&opened("acct#1")).unwrap();
    collector.record(&deposited("acct#1", 50)).unwrap();

    let topics: Vec<_> = collector.all().iter().map(|e| e.topic().to_string()).collect();
    assert_eq!(topics, vec!["accounts.opened", "accounts.deposited"]);

    let drained = collector.drain();
    assert_eq!(drained.len(), 2);
    assert_eq!(
        drained[1].unmarshal_payload::<AccountEvent>().unwrap(),
        deposited("acct#1", 50)
    );

    assert!(collector.drain().is_empty());
    assert!(collector.all().is_empty());
}

#[test]
fn flush_delivers_to_subscribers_after_the_work_is_done() {
    let bus = LocalBus::new();
    let balances = Arc::new(Mutex::new(Vec::new()));

    let sink = balances.clone();
    bus.subscribe(
        "accounts.deposited",
        handler_fn(move |event| {
            if let AccountEvent::Deposited { amount, .. } = event.unmarshal_payload::<AccountEvent>()? {
                sink.lock().unwrap().push(amount);
            }
            Ok(())
        }),
    )
    .unwrap();

    let mut collector = EventCollector::new();
    collector.record(&opened("acct#1")).unwrap();
    collector.record(&deposited("acct#1", 10)).unwrap();
    collector.record(&deposited("acct#1", 15)).unwrap();
    assert!(balances.lock().unwrap().is_empty());

    let result = collector.flush(&bus).unwrap();
    assert_eq!(result.published, 3);
    assert_eq!(*balances.lock().unwrap(), vec![10, 15]);
}

#[test]
fn handler_failure_keeps_remaining_events() {
    let bus = LocalBus::new();
    bus.subscribe(
        "accounts.deposited",
        handler_fn(|_event| Err(Error::handler("ledger locked"))),
    )
    .unwrap();

    let mut collector = EventCollector::new();
    collector.record(&opened("acct#1")).unwrap();
    collector.record(&deposited("acct#1", 10)).unwrap();
    collector.record(&opened("acct#2")).unwrap();

    let err = collector.flush(&bus).unwrap_err();
    assert!(err.is(ErrorKind::Handler));
    assert_eq!(err.metadata().get("published"), Some(&serde_json::json!(1)));

    let remaining: Vec<_> = collector.all().iter().map(|e| e.entity_id().to_string()).collect();
    assert_eq!(remaining, vec!["acct#1", "acct#2"]);
}

#[test]
fn relayed_failure_requeues_only_the_failing_suffix() {
    let bus = LocalBus::new();
    let delivered = Arc::new(Mutex::new(Vec::new()));
    let audit = Event::create("audit#9", "audit.recorded", &opened("acct#2")).unwrap();

    let sink = delivered.clone();
    bus.subscribe(
        "accounts.*",
        handler_fn(move |event| {
            if event.entity_id() == "acct#2" {
                // A relay whose own downstream publish failed.
                return Err(Error::new(ErrorKind::Publish, "audit broker down")
                    .with_event(audit.clone()));
            }
            sink.lock().unwrap().push(event.entity_id().to_string());
            Ok(())
        }),
    )
    .unwrap();

    let mut collector = EventCollector::new();
    collector.record(&opened("acct#1")).unwrap();
    collector.record(&opened("acct#2")).unwrap();
    collector.record(&opened("acct#3")).unwrap();

    let err = collector.flush(&bus).unwrap_err();
    assert_eq!(err.event().map(Event::entity_id), Some("acct#2"));
    assert_eq!(err.metadata().get("published"), Some(&serde_json::json!(1)));

    let remaining: Vec<_> = collector.all().iter().map(|e| e.entity_id().to_string()).collect();
    assert_eq!(remaining, vec!["acct#2", "acct#3"]);
    assert_eq!(*delivered.lock().unwrap(), vec!["acct#1"]);
}

#[test]
fn pre_built_events_with_another_codec() {
    let event = Event::create_with::<Bitcode, _>("acct#1", "accounts.opened", &opened("acct#1"))
        .unwrap();
    let collector = EventCollector::with_events(vec![event]);

    let events = collector.all();
    assert_eq!(
        events[0].unmarshal_payload_with::<Bitcode, AccountEvent>().unwrap(),
        opened("acct#1")
    );
    assert!(events[0]
        .unmarshal_payload::<AccountEvent>()
        .unwrap_err()
        .is(ErrorKind::PayloadDeserialization));
}
