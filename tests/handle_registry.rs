use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use proptest::prelude::*;
use xian_native_renderer::engine::{Handle, HandleRegistry, RegistryError};

#[derive(Debug, Clone)]
enum Op {
    Create,
    Destroy(usize),
    Resolve(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => Just(Op::Create),
        2 => any::<usize>().prop_map(Op::Destroy),
        2 => any::<usize>().prop_map(Op::Resolve),
    ]
}

const CAPACITY: u32 = 8;

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]
    #[test]
    fn handles_never_alias(ops in prop::collection::vec(op_strategy(), 1..200)) {
        let registry = HandleRegistry::<u64>::with_capacity(CAPACITY);
        let mut issued: Vec<(Handle, u64)> = Vec::new();
        let mut live: HashSet<Handle> = HashSet::new();
        let mut next_value = 0u64;

        for op in ops {
            match op {
                Op::Create => {
                    let created = registry.create(Arc::new(next_value));
                    if live.len() == CAPACITY as usize {
                        prop_assert_eq!(
                            created,
                            Err(RegistryError::CapacityExceeded { max_slots: CAPACITY })
                        );
                        continue;
                    }
                    let handle = created.unwrap();
                    prop_assert!(!handle.is_null());
                    prop_assert!(issued.iter().all(|(old, _)| *old != handle));
                    issued.push((handle, next_value));
                    live.insert(handle);
                    next_value += 1;
                }
                Op::Destroy(index) if !issued.is_empty() => {
                    let (handle, value) = issued[index % issued.len()];
                    let destroyed = registry.destroy(handle);
                    if live.remove(&handle) {
                        prop_assert_eq!(destroyed.as_deref(), Some(&value));
                    } else {
                        prop_assert!(destroyed.is_none());
                    }
                }
                Op::Resolve(index) if !issued.is_empty() => {
                    let (handle, value) = issued[index % issued.len()];
                    let resolved = registry.resolve(handle);
                    if live.contains(&handle) {
                        prop_assert_eq!(resolved.as_deref(), Some(&value));
                    } else {
                        prop_assert!(resolved.is_none());
                    }
                }
                _ => {}
            }

            prop_assert_eq!(registry.len(), live.len());
            prop_assert!(registry.slot_count() <= CAPACITY as usize);
            prop_assert_eq!(registry.free_len() + registry.len(), registry.slot_count());
        }

        for (handle, value) in &issued {
            let resolved = registry.resolve(*handle);
            if live.contains(handle) {
                prop_assert_eq!(resolved.as_deref(), Some(value));
            } else {
                prop_assert!(resolved.is_none());
            }
        }
    }
}

#[test]
fn null_and_forged_raw_handles_resolve_to_nothing() {
    let registry = HandleRegistry::<u64>::with_capacity(4);
    let handle = registry.create(Arc::new(7)).unwrap();

    assert!(registry.resolve(Handle::from_raw(0)).is_none());
    assert!(registry.resolve(Handle::from_raw(handle.to_raw() + (1 << 32))).is_none());
    assert!(registry.resolve(Handle::from_raw((1 << 32) | 3)).is_none());
    assert_eq!(registry.resolve(Handle::from_raw(handle.to_raw())).as_deref(), Some(&7));
}

#[test]
fn concurrent_create_destroy_resolve_stress() {
    const WORKERS: usize = 4;
    const ROUNDS: usize = 2_000;

    let registry = HandleRegistry::<usize>::with_capacity(64);
    let finished = AtomicUsize::new(0);

    thread::scope(|scope| {
        for worker in 0..WORKERS {
            let registry = &registry;
            let finished = &finished;
            scope.spawn(move || {
                let mut mine = Vec::new();
                for round in 0..ROUNDS {
                    let value = worker * ROUNDS + round;
                    match registry.create(Arc::new(value)) {
                        Ok(handle) => mine.push((handle, value)),
                        Err(RegistryError::CapacityExceeded { .. }) => {}
                    }
                    if round % 3 == 0 {
                        if let Some((handle, value)) = mine.pop() {
                            assert_eq!(registry.destroy(handle).as_deref(), Some(&value));
                            assert!(registry.resolve(handle).is_none());
                        }
                    }
                    for (handle, value) in &mine {
                        assert_eq!(registry.resolve(*handle).as_deref(), Some(value));
                    }
                    if mine.len() > 8 {
                        for (handle, _) in mine.drain(..) {
                            assert!(registry.destroy(handle).is_some());
                        }
                    }
                }
                for (handle, _) in mine {
                    assert!(registry.destroy(handle).is_some());
                }
                finished.fetch_add(1, Ordering::AcqRel);
            });
        }

        let registry = &registry;
        let finished = &finished;
        scope.spawn(move || {
            while finished.load(Ordering::Acquire) < WORKERS {
                let handles: Vec<Handle> = (0..64u64)
                    .map(|slot| Handle::from_raw((1 << 32) | slot))
                    .collect();
                let resolved = registry.resolve_many(&handles);
                assert_eq!(resolved.len(), handles.len());
                thread::yield_now();
            }
        });
    });

    assert!(registry.is_empty());
    assert_eq!(registry.free_len(), registry.slot_count());
    assert!(registry.slot_count() <= registry.max_slots() as usize);
}
