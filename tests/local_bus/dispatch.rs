use super::orders::{event_on, CallLog};
use sourced_bus::bus::{handler_fn, EventBus, LocalBus, Publisher, Subscriber};
use sourced_bus::{Error, ErrorKind};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

#[test]
fn fan_out_follows_registration_order() {
    let bus = LocalBus::new();
    let log = CallLog::new();

    bus.subscribe("a.*", log.handler("first")).unwrap();
    bus.subscribe("a.b", log.handler("second")).unwrap();
    bus.subscribe("c.d", log.handler("third")).unwrap();

    bus.publish(&[event_on("a.b", "entity#1")]).unwrap();

    assert_eq!(log.entries(), vec!["first:a.b", "second:a.b"]);
}

#[test]
fn single_segment_wildcard() {
    let bus = LocalBus::new();
    let log = CallLog::new();
    bus.subscribe("orders.*", log.handler("orders")).unwrap();

    bus.publish(&[
        event_on("orders.created", "order#1"),
        event_on("orders.cancelled", "order#1"),
        event_on("orders.created.v2", "order#1"),
        event_on("billing.created", "invoice#1"),
    ])
    .unwrap();

    assert_eq!(
        log.entries(),
        vec!["orders:orders.created", "orders:orders.cancelled"]
    );
}

#[test]
fn tail_wildcard_matches_remaining_segments() {
    let bus = LocalBus::new();
    let log = CallLog::new();
    bus.subscribe("orders.>", log.handler("all")).unwrap();

    bus.publish(&[
        event_on("orders.created", "order#1"),
        event_on("orders.created.v2", "order#1"),
        event_on("billing.created", "invoice#1"),
    ])
    .unwrap();

    assert_eq!(
        log.entries(),
        vec!["all:orders.created", "all:orders.created.v2"]
    );
}

#[test]
fn failing_handler_stops_the_batch() {
    let bus = LocalBus::new();
    let log = CallLog::new();

    bus.subscribe("orders.*", log.handler("first")).unwrap();
    bus.subscribe(
        "orders.*",
        handler_fn(|_event| Err(Error::handler("inventory unavailable"))),
    )
    .unwrap();
    bus.subscribe("orders.*", log.handler("third")).unwrap();

    let events = vec![
        event_on("orders.created", "order#1"),
        event_on("orders.created", "order#2"),
    ];
    let err = bus.publish(&events).unwrap_err();

    assert!(err.is(ErrorKind::Handler));
    assert_eq!(err.message(), "inventory unavailable");
    assert_eq!(err.event(), Some(&events[0]));
    assert_eq!(log.entries(), vec!["first:orders.created"]);
}

#[test]
fn unmatched_publish_succeeds() {
    let bus = LocalBus::new();
    bus.publish(&[event_on("orders.created", "order#1")]).unwrap();
    bus.publish(&[]).unwrap();
}

#[test]
fn unsubscribed_handler_is_skipped() {
    let bus = LocalBus::new();
    let log = CallLog::new();

    let id = bus.subscribe("orders.*", log.handler("gone")).unwrap();
    bus.subscribe("orders.*", log.handler("kept")).unwrap();
    assert!(bus.unsubscribe(id).unwrap());

    bus.publish(&[event_on("orders.created", "order#1")]).unwrap();
    assert_eq!(log.entries(), vec!["kept:orders.created"]);
}

#[test]
fn shared_as_trait_object_across_threads() {
    let bus: Arc<dyn EventBus> = Arc::new(LocalBus::new());
    let count = Arc::new(AtomicUsize::new(0));

    let seen = count.clone();
    bus.subscribe(
        "orders.*",
        handler_fn(move |_event| {
            seen.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }),
    )
    .unwrap();

    let producers: Vec<_> = (0..4)
        .map(|n| {
            let bus = bus.clone();
            thread::spawn(move || {
                for i in 0..10 {
                    bus.publish(&[event_on("orders.created", &format!("order#{}-{}", n, i))])
                        .unwrap();
                }
            })
        })
        .collect();

    // Registrations racing with publishers.
    let log = CallLog::new();
    for _ in 0..5 {
        bus.subscribe("billing.*", log.handler("billing")).unwrap();
    }

    for producer in producers {
        producer.join().unwrap();
    }

    assert_eq!(count.load(Ordering::SeqCst), 40);
    assert!(log.entries().is_empty());
}
