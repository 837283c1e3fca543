//! Integration tests: element lifetime, sharing and growth of buffers.
//!
//! Uses the counting fixtures from `contig-test-utils` to check that
//! every element is destroyed exactly once, whichever handle, slice or
//! thread releases the block last.

use std::thread;

use contig_buffer::{Buffer, GrowthPolicy};
use contig_test_utils::{DropCounter, Tracked};

fn tracked(counter: &DropCounter, n: u64) -> Buffer<Tracked> {
    Buffer::from_fn(n as usize, 0, |i| counter.track(i as u64))
}

// ── Destruction ─────────────────────────────────────────────────────

#[test]
fn sole_owner_destroys_each_element_once() {
    let counter = DropCounter::new();
    let buffer = tracked(&counter, 16);
    assert_eq!(counter.drops(), 0);
    drop(buffer);
    assert_eq!(counter.drops(), 16);
    assert_eq!(counter.clones(), 0);
}

#[test]
fn last_of_many_handles_destroys() {
    let counter = DropCounter::new();
    let buffer = tracked(&counter, 4);
    let handles: Vec<_> = (0..8).map(|_| buffer.clone()).collect();
    drop(buffer);
    assert_eq!(counter.drops(), 0);
    drop(handles);
    assert_eq!(counter.drops(), 4);
}

#[test]
fn unique_growth_moves_without_cloning() {
    let counter = DropCounter::new();
    let mut buffer = Buffer::new();
    for i in 0..100 {
        buffer.push(counter.track(i));
    }
    assert_eq!(counter.clones(), 0);
    assert_eq!(counter.drops(), 0);
    drop(buffer);
    assert_eq!(counter.drops(), 100);
}

#[test]
fn shared_growth_clones_and_keeps_original() {
    let counter = DropCounter::new();
    let mut a = tracked(&counter, 3);
    let b = a.clone();
    a.push(counter.track(3));
    assert_eq!(counter.clones(), 3);
    assert_eq!(b.len(), 3);
    assert_eq!(a.len(), 4);
    drop(a);
    assert_eq!(counter.drops(), 4);
    drop(b);
    assert_eq!(counter.drops(), 7);
    assert_eq!(counter.live(4), 0);
}

#[test]
fn replace_range_destroys_removed_elements_once() {
    let counter = DropCounter::new();
    let mut buffer = tracked(&counter, 6);
    buffer
        .replace_range(1..4, [counter.track(10), counter.track(11)])
        .unwrap();
    assert_eq!(counter.drops(), 3);
    let values: Vec<u64> = buffer.iter().map(|t| t.value).collect();
    assert_eq!(values, [0, 10, 11, 4, 5]);
    buffer
        .replace_range(0..5, (20..30).map(|v| counter.track(v)))
        .unwrap();
    assert_eq!(counter.drops(), 8);
    drop(buffer);
    assert_eq!(counter.live(18), 0);
}

#[test]
fn slice_keeps_block_alive() {
    let counter = DropCounter::new();
    let slice = {
        let buffer = tracked(&counter, 5);
        buffer.slice(1..3)
    };
    assert_eq!(counter.drops(), 0);
    assert_eq!(slice.len(), 2);
    assert_eq!(slice[0].value, 1);
    assert_eq!(slice[1].value, 2);
    drop(slice);
    assert_eq!(counter.drops(), 5);
}

// ── Identity and growth ─────────────────────────────────────────────

#[test]
fn append_one_two_three_then_four() {
    let mut buffer = Buffer::new();
    buffer.append([1, 2, 3]);
    assert_eq!(buffer.len(), 3);
    assert!(buffer.capacity() >= 3);
    assert_eq!(buffer.capacity(), 3);

    let before = buffer.clone();
    buffer.append([4]);
    assert_eq!(buffer.len(), 4);
    assert_ne!(buffer.identity(), before.identity());
    assert_eq!(before.as_slice(), &[1, 2, 3]);
    assert_eq!(buffer.as_slice(), &[1, 2, 3, 4]);
}

#[test]
fn single_pushes_reallocate_logarithmically() {
    const N: usize = 1 << 14;
    let mut buffer = Buffer::new();
    let mut reallocations = 0;
    let mut identity = buffer.identity();
    for i in 0..N {
        buffer.push(i);
        if buffer.identity() != identity {
            reallocations += 1;
            identity = buffer.identity();
        }
    }
    assert_eq!(buffer.len(), N);
    // Doubling from 1: capacities 1, 2, 4, ..., N.
    assert_eq!(reallocations, N.trailing_zeros() as usize + 1);
}

#[test]
fn slower_policy_still_logarithmic() {
    const N: usize = 10_000;
    let policy = GrowthPolicy::new(3, 2);
    let mut buffer = Buffer::new();
    let mut reallocations = 0;
    for i in 0..N {
        let identity = buffer.identity();
        buffer.append_with(&policy, [i]);
        if buffer.identity() != identity {
            reallocations += 1;
        }
    }
    assert!(reallocations < 40, "{reallocations} reallocations");
}

#[test]
fn empty_handles_share_identity_across_types() {
    let a = Buffer::<u8>::new();
    let b = Buffer::<String>::default();
    let c: Buffer<u64> = std::iter::empty().collect();
    assert_eq!(a.identity(), b.identity());
    assert_eq!(a.identity(), c.identity());
    assert_eq!((a.len(), b.len(), c.len()), (0, 0, 0));
}

// ── Threads ─────────────────────────────────────────────────────────

#[test]
fn handles_cross_threads_and_drop_once() {
    let counter = DropCounter::new();
    let buffer = tracked(&counter, 32);
    let (tx, rx) = crossbeam_channel::unbounded::<Buffer<Tracked>>();

    let workers: Vec<_> = (0..4)
        .map(|_| {
            let rx = rx.clone();
            thread::spawn(move || {
                let mut sum = 0;
                while let Ok(handle) = rx.recv() {
                    sum += handle.iter().map(|t| t.value).sum::<u64>();
                }
                sum
            })
        })
        .collect();
    drop(rx);

    for _ in 0..64 {
        tx.send(buffer.clone()).unwrap();
    }
    drop(tx);

    let total: u64 = workers.into_iter().map(|w| w.join().unwrap()).sum();
    assert_eq!(total, 64 * (0..32).sum::<u64>());
    assert_eq!(counter.drops(), 0);
    assert!(buffer.is_uniquely_owned());
    drop(buffer);
    assert_eq!(counter.drops(), 32);
}

#[test]
fn concurrent_copy_on_write_leaves_source_intact() {
    let source = Buffer::from_fn(64, 0, |i| i as u32);
    let (tx, rx) = crossbeam_channel::bounded::<Buffer<u32>>(8);

    let writers: Vec<_> = (0..4u32)
        .map(|w| {
            let mut local = source.clone();
            let tx = tx.clone();
            thread::spawn(move || {
                for i in 0..local.len() {
                    local.set(i, w).unwrap();
                }
                local.push(w);
                tx.send(local).unwrap();
            })
        })
        .collect();
    drop(tx);

    let results: Vec<_> = rx.iter().collect();
    for w in writers {
        w.join().unwrap();
    }
    assert_eq!(results.len(), 4);
    for result in &results {
        let w = result[0];
        assert!(result.iter().all(|&v| v == w));
        assert_eq!(result.len(), 65);
    }
    assert!(source.iter().enumerate().all(|(i, &v)| v == i as u32));
    assert!(source.is_uniquely_owned());
}
