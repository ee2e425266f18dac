use super::services::{order, Service};
use sourced_bus::bus::{DistributedBus, InMemoryTransport};
use sourced_bus::{ErrorKind, EventCollector};

#[test]
fn same_group_shares_work_other_groups_see_everything() {
    let transport = InMemoryTransport::new();
    let billing_a = Service::start(&transport, "billing", "orders.*");
    let billing_b = Service::start(&transport, "billing", "orders.*");
    let shipping = Service::start(&transport, "shipping", "orders.*");

    let producer = DistributedBus::new(transport.clone(), "orders");
    let mut collector = EventCollector::new();
    for n in 1..=6 {
        collector.record(&order(n)).unwrap();
    }
    let result = collector.flush(&producer).unwrap();
    assert_eq!(result.published, 6);

    let mut billed = billing_a.handled();
    billed.extend(billing_b.handled());
    billed.sort();

    let mut expected: Vec<_> = (1..=6).map(|n| format!("order#{}", n)).collect();
    expected.sort();

    assert_eq!(billed, expected);
    assert!(!billing_a.handled().is_empty());
    assert!(!billing_b.handled().is_empty());
    assert_eq!(shipping.handled().len(), 6);
    assert_eq!(transport.published_on("orders.placed").len(), 6);
}

#[test]
fn failed_flush_is_retried_after_reconnect() {
    let transport = InMemoryTransport::new();
    let producer = DistributedBus::new(transport.clone(), "orders");

    let mut collector = EventCollector::new();
    collector.record(&order(1)).unwrap();
    collector.record(&order(2)).unwrap();

    transport.close();
    let err = collector.flush(&producer).unwrap_err();
    assert!(err.is(ErrorKind::Publish));
    assert_eq!(collector.len(), 2);

    // A fresh connection to the same broker.
    let reconnected = InMemoryTransport::new();
    let billing = Service::start(&reconnected, "billing", "orders.>");
    let producer = DistributedBus::new(reconnected, "orders");

    collector.flush(&producer).unwrap();
    assert_eq!(billing.handled(), vec!["order#1", "order#2"]);
}
