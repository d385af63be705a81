//! Integration tests for bounded links and backpressure.
//!
//! These tests verify that:
//! - A producer stops once its link is full and resumes when drained
//! - Tiny capacities still deliver every item in order
//! - End-of-stream never overtakes data

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use tristage::element::Source;
use tristage::elements::{ResidueScale, Sum, collect, map};
use tristage::error::Result;
use tristage::link::{LocalLink, Message};
use tristage::pipeline::{Pipeline, PipelineConfig, SourceStage};

/// A source that counts how often it was polled.
struct CountingSource {
    next: i64,
    max: i64,
    polled: Arc<AtomicU64>,
}

impl Source for CountingSource {
    type Output = i64;

    fn produce(&mut self) -> Result<Option<i64>> {
        self.polled.fetch_add(1, Ordering::SeqCst);
        if self.next > self.max {
            return Ok(None);
        }
        self.next += 1;
        Ok(Some(self.next - 1))
    }
}

#[test]
fn test_producer_blocks_on_full_link() {
    let polled = Arc::new(AtomicU64::new(0));
    let source = CountingSource {
        next: 1,
        max: 100,
        polled: Arc::clone(&polled),
    };

    let (tx, rx) = LocalLink::bounded(2);
    let stage = SourceStage::new(source, tx, Arc::from("backpressure"));
    let producer = thread::spawn(move || stage.run());

    // Two items queued, the third is held in a blocked send.
    let deadline = Instant::now() + Duration::from_secs(5);
    while polled.load(Ordering::SeqCst) < 3 {
        assert!(Instant::now() < deadline, "producer never filled the link");
        thread::sleep(Duration::from_millis(1));
    }
    thread::sleep(Duration::from_millis(50));
    assert_eq!(polled.load(Ordering::SeqCst), 3);
    assert!(!producer.is_finished());

    let received: Vec<i64> = rx.iter().collect();
    assert_eq!(received, (1..=100).collect::<Vec<_>>());
    assert_eq!(producer.join().unwrap().unwrap(), 100);
}

#[test]
fn test_capacity_one_end_to_end() {
    let config = PipelineConfig::new()
        .with_limit(100_000)
        .with_capacity(1);

    let report = Pipeline::standard(config).run_with_report().unwrap();
    assert_eq!(report.produced, 1001);
    assert!(report.is_lossless());
}

#[test]
fn test_slow_transform_preserves_order() {
    let pipeline = Pipeline::new(
        PipelineConfig::new().with_capacity(3),
        tristage::elements::from_iter(0i64..200),
        map(|x: i64| {
            if x % 50 == 0 {
                thread::sleep(Duration::from_millis(5));
            }
            x
        }),
        collect(),
    );

    assert_eq!(pipeline.run().unwrap(), (0..200).collect::<Vec<_>>());
}

#[test]
fn test_eos_follows_last_item() {
    let (tx, rx) = LocalLink::bounded(1);

    let producer = thread::spawn(move || {
        for i in 0..1000i64 {
            tx.send(i).unwrap();
        }
        tx.finish().unwrap();
    });

    let mut seen = 0i64;
    loop {
        match rx.recv().unwrap() {
            Message::Item(item) => {
                assert_eq!(item, seen);
                seen += 1;
            }
            Message::Eos => break,
        }
    }

    assert_eq!(seen, 1000);
    producer.join().unwrap();
}

#[test]
fn test_unbalanced_capacities_same_total() {
    let totals: Vec<i64> = [1usize, 2, 17, 1024]
        .into_iter()
        .map(|capacity| {
            let config = PipelineConfig::new()
                .with_limit(50_000)
                .with_skip(9)
                .with_capacity(capacity);
            Pipeline::new(
                config.clone(),
                tristage::elements::Generator::new(config.limit, config.skip),
                ResidueScale::new(),
                Sum::new(),
            )
            .run()
            .unwrap()
        })
        .collect();

    assert!(totals.windows(2).all(|w| w[0] == w[1]));
}
