use serde::Serialize;

/// A domain payload that knows where it should be published.
///
/// Recording a `Publishable` in an [`EventCollector`](super::EventCollector)
/// serializes the value itself as the event payload.
///
/// ```
/// use serde::Serialize;
/// use sourced_bus::Publishable;
///
/// #[derive(Serialize)]
/// struct OrderPlaced {
///     order_id: String,
///     total: u64,
/// }
///
/// impl Publishable for OrderPlaced {
///     fn entity_id(&self) -> &str {
///         &self.order_id
///     }
///
///     fn topic(&self) -> &str {
///         "orders.placed"
///     }
/// }
/// ```
pub trait Publishable: Serialize {
    fn entity_id(&self) -> &str;
    fn topic(&self) -> &str;
}

impl<P: Publishable + ?Sized> Publishable for &P {
    fn entity_id(&self) -> &str {
        (**self).entity_id()
    }

    fn topic(&self) -> &str {
        (**self).topic()
    }
}

impl<P: Publishable + ?Sized> Publishable for Box<P> {
    fn entity_id(&self) -> &str {
        (**self).entity_id()
    }

    fn topic(&self) -> &str {
        (**self).topic()
    }
}
