use sourced_bus::bus::{handler_fn, LocalBus, Subscriber};
use sourced_bus::{Event, SharedCollector};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

#[test]
fn concurrent_writers_then_one_flush() {
    let bus = LocalBus::new();
    let delivered = Arc::new(AtomicUsize::new(0));

    let count = delivered.clone();
    bus.subscribe(
        "jobs.>",
        handler_fn(move |_event| {
            count.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }),
    )
    .unwrap();

    let collector = SharedCollector::new();
    let writers: Vec<_> = (0..8)
        .map(|worker| {
            let collector = collector.clone();
            thread::spawn(move || {
                for job in 0..10 {
                    let event = Event::create(
                        format!("job#{}-{}", worker, job),
                        "jobs.finished",
                        &job,
                    )
                    .unwrap();
                    collector.record_event(event);
                }
            })
        })
        .collect();
    for writer in writers {
        writer.join().unwrap();
    }

    assert_eq!(collector.len(), 80);
    let result = collector.flush(&bus).unwrap();

    assert_eq!(result.published, 80);
    assert_eq!(delivered.load(Ordering::SeqCst), 80);
    assert!(collector.is_empty());
}
