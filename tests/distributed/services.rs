#![allow(dead_code)]

use serde::{Deserialize, Serialize};
use sourced_bus::bus::{typed_handler, DistributedBus, InMemoryTransport, Subscriber};
use sourced_bus::{Event, Publishable};
use std::sync::{Arc, Mutex};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderPlaced {
    pub order_id: String,
    pub total_cents: u64,
}

impl Publishable for OrderPlaced {
    fn entity_id(&self) -> &str {
        &self.order_id
    }

    fn topic(&self) -> &str {
        "orders.placed"
    }
}

pub fn order(n: u64) -> OrderPlaced {
    OrderPlaced {
        order_id: format!("order#{}", n),
        total_cents: n * 100,
    }
}

/// A consumer service: one bus instance plus what it has handled.
pub struct Service {
    pub bus: DistributedBus<InMemoryTransport>,
    handled: Arc<Mutex<Vec<String>>>,
}

impl Service {
    pub fn start(transport: &InMemoryTransport, queue_group: &str, subject: &str) -> Self {
        let bus = DistributedBus::new(transport.clone(), queue_group);
        let handled = Arc::new(Mutex::new(Vec::new()));

        let sink = handled.clone();
        bus.subscribe(
            subject,
            typed_handler(move |_event: &Event, order: OrderPlaced| {
                sink.lock().unwrap().push(order.order_id);
                Ok(())
            }),
        )
        .unwrap();

        Self { bus, handled }
    }

    pub fn handled(&self) -> Vec<String> {
        self.handled.lock().unwrap().clone()
    }
}
