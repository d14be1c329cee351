//! Starvation scenarios: waiters with disjoint predicates sharing one
//! channel must all make progress, because every state change wakes every
//! waiter and each re-checks its own predicate.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use waitpoint::test_utils::init_test_logging;
use waitpoint::{BoundedChannel, CancelToken};

fn init_test(name: &str) {
    init_test_logging();
    waitpoint::test_phase!(name);
}

#[test]
fn disjoint_predicate_consumers_both_progress() {
    init_test("disjoint_predicate_consumers_both_progress");

    const PER_CLASS: usize = 50;
    let channel = Arc::new(BoundedChannel::new(2).expect("channel"));
    let cancel = CancelToken::new();

    let spawn_consumer = |parity: u64| {
        let channel = Arc::clone(&channel);
        let cancel = cancel.clone();
        thread::spawn(move || {
            let mut got = Vec::new();
            for _ in 0..PER_CLASS {
                let item = channel
                    .take_matching(&cancel, |item: &u64| item % 2 == parity)
                    .expect("take_matching failed");
                got.push(item);
            }
            got
        })
    };
    let evens = spawn_consumer(0);
    let odds = spawn_consumer(1);

    let producer = {
        let channel = Arc::clone(&channel);
        let cancel = cancel.clone();
        thread::spawn(move || {
            // Alternating classes through a tiny buffer.
            for item in 0..(2 * PER_CLASS as u64) {
                channel.put(&cancel, item).expect("put failed");
            }
        })
    };

    producer.join().expect("producer failed");
    let evens = evens.join().expect("even consumer starved or failed");
    let odds = odds.join().expect("odd consumer starved or failed");

    assert_eq!(evens.len(), PER_CLASS);
    assert_eq!(odds.len(), PER_CLASS);
    assert!(evens.iter().all(|item| item % 2 == 0));
    assert!(odds.iter().all(|item| item % 2 == 1));
    assert!(channel.is_empty());
    waitpoint::test_complete!("disjoint_predicate_consumers_both_progress");
}

#[test]
fn selective_waiter_survives_unrelated_traffic() {
    init_test("selective_waiter_survives_unrelated_traffic");

    const SENTINEL: u64 = 999;
    let channel = Arc::new(BoundedChannel::new(2).expect("channel"));
    let cancel = CancelToken::new();

    // Waits for one specific item while a stream of unrelated items flows
    // past; each unrelated insertion wakes it and it must re-block.
    let selective = {
        let channel = Arc::clone(&channel);
        let cancel = cancel.clone();
        thread::spawn(move || {
            channel
                .take_matching(&cancel, |item| *item == SENTINEL)
                .expect("selective waiter failed")
        })
    };

    let drain = {
        let channel = Arc::clone(&channel);
        let cancel = cancel.clone();
        thread::spawn(move || {
            let mut drained = 0usize;
            while drained < 50 {
                let item = channel
                    .take_matching(&cancel, |item| *item != SENTINEL)
                    .expect("drain failed");
                assert_ne!(item, SENTINEL);
                drained += 1;
            }
            drained
        })
    };

    for item in 0..50u64 {
        channel.put(&cancel, item).expect("put failed");
    }
    channel.put(&cancel, SENTINEL).expect("put sentinel failed");

    let got = selective.join().expect("selective waiter stuck");
    assert_eq!(got, SENTINEL);
    assert_eq!(drain.join().expect("drain stuck"), 50);
    assert!(channel.is_empty());
    waitpoint::test_complete!("selective_waiter_survives_unrelated_traffic");
}

#[test]
fn producer_not_starved_behind_consumer_waiters() {
    init_test("producer_not_starved_behind_consumer_waiters");

    let channel = Arc::new(BoundedChannel::new(1).expect("channel"));
    let cancel = CancelToken::new();
    channel.try_put(0u64).expect("fill");

    // A blocked producer shares the wake channel with a blocked selective
    // consumer; the take below must wake the producer even though the
    // consumer is woken too (and re-blocks).
    let producer = {
        let channel = Arc::clone(&channel);
        let cancel = cancel.clone();
        thread::spawn(move || channel.put(&cancel, 1).expect("producer starved"))
    };
    let selective = {
        let channel = Arc::clone(&channel);
        let cancel = cancel.clone();
        thread::spawn(move || {
            channel
                .take_matching(&cancel, |item| *item == 1)
                .expect("selective consumer starved")
        })
    };

    thread::sleep(Duration::from_millis(30));
    let head = channel.take(&cancel).expect("take head");
    assert_eq!(head, 0);

    producer.join().expect("producer stuck");
    let got = selective.join().expect("consumer stuck");
    assert_eq!(got, 1);
    assert!(channel.is_empty());
    waitpoint::test_complete!("producer_not_starved_behind_consumer_waiters");
}
