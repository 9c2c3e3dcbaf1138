use lattice_views_core::prelude::*;
use lattice_views_storage::prelude::*;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use utilities::data_sets::{noisy_array3, random_array2};
use utilities::test::test_print;

const HIGH: FlagBits = FIRST_USER_FLAG;
const LOW: FlagBits = FIRST_USER_FLAG << 1;

fn policies() -> Vec<Parallelism> {
    let pool = Arc::new(
        rayon::ThreadPoolBuilder::new()
            .num_threads(2)
            .build()
            .unwrap(),
    );

    vec![
        Parallelism::sequential(),
        Parallelism::sequential().chunks(13),
        Parallelism::with_threads(2),
        Parallelism::with_threads(8),
        // One index per chunk.
        Parallelism::with_threads(4).chunks(usize::MAX),
        Parallelism::with_pool(pool),
    ]
}

#[test]
fn counts_agree_across_partitions() {
    let cube = noisy_array3(PointN([17, 9, 5]), 42, 0.1);
    let valid = cube.count_valid(&cube.full_extent());

    let mut counts = Vec::new();
    for policy in policies() {
        let mut flagged = Flagged::new(&cube).unwrap();
        flagged.set_parallelism(policy.clone());

        flagged.flag_all(LOW).unwrap();
        assert_eq!(flagged.count_flags(LOW).unwrap(), valid);

        let high = flagged.flag_where(HIGH, |_p, value| value > 0.5).unwrap();
        assert_eq!(flagged.count_flags(HIGH).unwrap(), high);

        flagged.unflag_all(LOW).unwrap();
        assert_eq!(flagged.count_flags(LOW).unwrap(), 0);
        assert_eq!(flagged.count_flags(ALL_FLAGS).unwrap(), high);

        counts.push(high);
    }

    test_print(&format!("high counts per policy: {:?}", counts));
    assert!(counts.windows(2).all(|w| w[0] == w[1]));
}

#[test]
fn every_valid_index_is_visited_exactly_once() {
    let image = random_array2(PointN([31, 23]), 7, 100);

    for policy in policies() {
        let mut flagged = Flagged::new(&image).unwrap();
        flagged.set_parallelism(policy);
        let visits = AtomicUsize::new(0);

        flagged
            .try_update_flags(|_p, _value, bits| {
                visits.fetch_add(1, Ordering::Relaxed);
                *bits += 1;
                Ok(())
            })
            .unwrap();

        assert_eq!(visits.load(Ordering::Relaxed), 31 * 23);
        assert!(flagged.flag_array().values_slice().iter().all(|b| *b == 1));
    }
}

#[test]
fn bulk_operations_respect_viewport_basis() {
    let image = random_array2(PointN([20, 20]), 3, 10);
    let window = Viewport::new(&image, PointN([5, 5]), PointN([15, 12]));

    let mut flagged = Flagged::new(&window).unwrap();
    assert_eq!(flagged.flag_array().shape(), PointN([10, 7]));

    let small = flagged.flag_where(LOW, |_p, value| value < 3).unwrap();
    let expected = window
        .full_extent()
        .iter_points()
        .filter(|p| window.get(*p) < 3)
        .count();
    assert_eq!(small, expected);
}

#[test]
fn worker_panic_is_collected_after_the_join() {
    let image = random_array2(PointN([64, 64]), 11, 100);

    for policy in policies() {
        let mut flagged = Flagged::new(&image).unwrap();
        flagged.set_parallelism(policy.clone());

        let result = flagged.try_update_flags(|p, _value, bits| {
            if p == PointN([10, 10]) {
                panic!("corrupt index");
            }
            *bits |= HIGH;
            Ok(())
        });

        match result {
            Err(OverlayError::Parallel {
                failures,
                interrupted,
            }) => {
                assert_eq!(failures.len(), 1);
                assert_eq!(failures[0].reason, "corrupt index");
                assert_eq!(failures[0].stride, 10 * 64 + 10);
                assert!(interrupted < policy.num_chunks(64 * 64));
            }
            other => panic!("expected a parallel failure, got {:?}", other),
        }

        // Work finished before the failure stays applied.
        if policy.is_sequential() && policy.num_chunks(64 * 64) > 1 {
            assert!(flagged.is_flagged(PointN([0, 0]), HIGH));
        }
    }
}

#[test]
fn task_errors_carry_their_stride() {
    let image = random_array2(PointN([8, 8]), 5, 100);
    let mut flagged = Flagged::new(&image).unwrap();
    flagged.set_parallelism(Parallelism::with_threads(4).chunks(4));

    let result = flagged.try_update_flags(|p, _value, _bits| {
        if p.y() == 5 && p.x() % 4 == 1 {
            Err(format!("rejected {:?}", p))
        } else {
            Ok(())
        }
    });

    match result {
        Err(OverlayError::Parallel { failures, .. }) => {
            // Rows 4 and 5 form one chunk, which stops at its first failure.
            assert_eq!(failures.len(), 1);
            assert_eq!(failures[0].chunk, 2);
            assert_eq!(failures[0].stride, 5 * 8 + 1);
        }
        other => panic!("expected a parallel failure, got {:?}", other),
    }
}
