//! Multi-threaded behavior of the cursors and the bounded layer.
#![cfg(not(loom))]

use std::collections::BTreeSet;
use std::sync::Barrier;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use ph_circular::{BoundedQueue, CircularQueue, QueueConfig};

fn init_tracing() {
    #[cfg(feature = "tracing")]
    {
        use tracing_subscriber::EnvFilter;
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }
}

#[test]
fn concurrent_advances_are_not_lost() {
    init_tracing();
    const N: usize = 7;
    const THREADS: usize = 6;
    const STEPS: usize = 10_001;

    let cfg = QueueConfig::new().reader_at(3);
    let q = CircularQueue::<u64, N>::with_config(Default::default(), cfg).unwrap();
    let barrier = Barrier::new(THREADS);

    thread::scope(|s| {
        for _ in 0..THREADS {
            s.spawn(|| {
                let reader = q.reader();
                barrier.wait();
                for _ in 0..STEPS {
                    reader.advance();
                }
            });
        }
    });

    assert_eq!(q.reader().position(), (3 + THREADS * STEPS) % N);
}

#[test]
fn competing_consumers_each_get_distinct_slots() {
    init_tracing();
    const N: usize = 64;
    const THREADS: usize = 4;

    let values: [u32; N] = core::array::from_fn(|i| i as u32);
    let q = CircularQueue::from_array(values).unwrap();

    let seen: Vec<Vec<u32>> = thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                s.spawn(|| {
                    let reader = q.reader();
                    // SAFETY: every slot was written before the threads started and nothing
                    // writes while they run.
                    (0..N / THREADS)
                        .map(|_| unsafe { reader.consume() })
                        .collect::<Vec<u32>>()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let all: BTreeSet<u32> = seen.iter().flatten().copied().collect();
    assert_eq!(all.len(), N);
    assert_eq!(all, (0..N as u32).collect());
    for per_thread in &seen {
        assert!(per_thread.windows(2).all(|w| w[0] < w[1]));
    }
    assert!(q.reader() == q.writer());
}

#[test]
fn write_is_visible_after_join() {
    init_tracing();
    let q = CircularQueue::<u64, 4>::new().unwrap();

    thread::scope(|s| {
        s.spawn(|| {
            // SAFETY: no reader touches the queue until this thread is joined.
            unsafe { q.writer().write(0xfeed).advance() };
        });
    });

    // SAFETY: the writing thread was joined by the end of the scope.
    assert_eq!(unsafe { q.reader().read() }, 0xfeed);
    assert_eq!(q.writer().position(), 1);
}

#[test]
fn opposite_role_comparisons_do_not_deadlock() {
    init_tracing();
    const ROUNDS: usize = 20_000;
    let q = CircularQueue::<u8, 5>::new().unwrap();

    thread::scope(|s| {
        s.spawn(|| {
            for _ in 0..ROUNDS {
                let _ = q.reader() == q.writer();
            }
        });
        s.spawn(|| {
            for _ in 0..ROUNDS {
                let _ = q.writer() != q.reader();
            }
        });
        s.spawn(|| {
            for _ in 0..ROUNDS {
                q.reader().advance();
                q.writer().advance();
            }
        });
    });

    assert_eq!(q.reader().position(), ROUNDS % 5);
    assert!(q.reader() == q.writer());
}

#[test]
fn bounded_many_producers_many_consumers() {
    init_tracing();
    const PRODUCERS: u64 = 3;
    const CONSUMERS: usize = 3;
    const PER_PRODUCER: u64 = 5_000;

    let queue = BoundedQueue::new(CircularQueue::<u64, 8>::new().unwrap()).unwrap();
    let total = (PRODUCERS * PER_PRODUCER) as usize;

    let taken = AtomicUsize::new(0);

    let received: Vec<Vec<u64>> = thread::scope(|s| {
        for p in 0..PRODUCERS {
            let queue = &queue;
            s.spawn(move || {
                for i in 0..PER_PRODUCER {
                    let mut value = p * PER_PRODUCER + i;
                    while let Err(back) = queue.try_push(value) {
                        value = back;
                        thread::yield_now();
                    }
                }
            });
        }

        let taken = &taken;
        let queue = &queue;
        let handles: Vec<_> = (0..CONSUMERS)
            .map(|_| {
                s.spawn(move || {
                    let mut mine = Vec::new();
                    while taken.load(Ordering::Relaxed) < total {
                        match queue.try_pop() {
                            Some(v) => {
                                mine.push(v);
                                taken.fetch_add(1, Ordering::Relaxed);
                            }
                            None => thread::yield_now(),
                        }
                    }
                    mine
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let mut all: Vec<u64> = received.into_iter().flatten().collect();
    all.sort_unstable();
    assert_eq!(all, (0..PRODUCERS * PER_PRODUCER).collect::<Vec<_>>());
    assert!(queue.is_empty());
}

#[test]
fn bounded_single_producer_preserves_order() {
    init_tracing();
    const COUNT: u32 = 20_000;
    let queue = BoundedQueue::new(CircularQueue::<u32, 16>::new().unwrap()).unwrap();

    thread::scope(|s| {
        s.spawn(|| {
            for v in 0..COUNT {
                while queue.try_push(v).is_err() {
                    std::hint::spin_loop();
                }
            }
        });

        let mut expected = 0;
        while expected < COUNT {
            if let Some(v) = queue.try_pop() {
                assert_eq!(v, expected);
                expected += 1;
            }
        }
    });
}
