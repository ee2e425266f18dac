#![allow(dead_code)]

use serde::{Deserialize, Serialize};
use sourced_bus::bus::{handler_fn, Handler};
use sourced_bus::{Event, Publishable};
use std::sync::{Arc, Mutex};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderCreated {
    pub order_id: String,
    pub customer: String,
    pub total_cents: u64,
}

impl Publishable for OrderCreated {
    fn entity_id(&self) -> &str {
        &self.order_id
    }

    fn topic(&self) -> &str {
        "orders.created"
    }
}

pub fn order_created(order_id: &str, total_cents: u64) -> OrderCreated {
    OrderCreated {
        order_id: order_id.to_string(),
        customer: "ada".to_string(),
        total_cents,
    }
}

pub fn event_on(topic: &str, entity_id: &str) -> Event {
    Event::create(entity_id, topic, &serde_json::json!({ "entity": entity_id })).unwrap()
}

/// Shared log of `"<name>:<topic>"` entries, in invocation order.
#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handler(&self, name: &'static str) -> Box<dyn Handler> {
        let log = self.0.clone();
        handler_fn(move |event| {
            log.lock().unwrap().push(format!("{}:{}", name, event.topic()));
            Ok(())
        })
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn push(&self, entry: String) {
        self.0.lock().unwrap().push(entry);
    }
}
