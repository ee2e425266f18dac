use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Utc};

static LAST_NANOS: AtomicI64 = AtomicI64::new(i64::MIN);

/// Wall-clock time that never goes backwards within this process.
///
/// Two calls never return the same instant; if the wall clock stalls or
/// steps back, the previous instant plus one nanosecond is returned.
pub(crate) fn now() -> DateTime<Utc> {
    let wall = Utc::now().timestamp_nanos_opt().unwrap_or(i64::MAX);
    let mut last = LAST_NANOS.load(Ordering::Relaxed);

    loop {
        let next = if wall > last {
            wall
        } else {
            last.saturating_add(1)
        };

        match LAST_NANOS.compare_exchange_weak(last, next, Ordering::AcqRel, Ordering::Relaxed) {
            Ok(_) => return DateTime::from_timestamp_nanos(next),
            Err(actual) => last = actual,
        }
    }
}
