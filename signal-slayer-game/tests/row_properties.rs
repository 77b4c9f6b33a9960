use std::collections::BTreeSet;

use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use signal_slayer_game::{RowGenerator, SignalCatalog, StaticCatalog, validate_line};

const SEEDS: u64 = 64;

fn bundled() -> StaticCatalog {
    StaticCatalog::bundled().expect("bundled catalog parses")
}

#[test]
fn every_generated_row_is_fair() {
    let catalog = bundled();
    for lane_count in [2_usize, 3, 4] {
        let generator = RowGenerator::new(lane_count, -60.0);
        for line in catalog.lines() {
            let len = validate_line(&catalog, &line, lane_count).unwrap();
            for seed in 0..SEEDS {
                let mut rng = ChaCha20Rng::seed_from_u64(seed);
                for index in 0..len {
                    let row = generator.generate(&catalog, &line, index, &mut rng).unwrap();
                    let signals = row.signals();

                    assert_eq!(signals.iter().filter(|s| s.is_correct).count(), 1);

                    let names: BTreeSet<&str> = signals.iter().map(|s| s.name.as_str()).collect();
                    assert_eq!(names.len(), lane_count, "duplicate name in {row:?}");

                    let lanes: Vec<usize> = signals.iter().map(|s| s.lane).collect();
                    assert_eq!(lanes, (0..lane_count).collect::<Vec<_>>());

                    assert!(row.is_well_formed(lane_count));
                }
            }
        }
    }
}

#[test]
fn correct_signal_follows_the_line_order() {
    let catalog = bundled();
    let generator = RowGenerator::new(3, -60.0);
    for line in catalog.lines() {
        let sequence = catalog.correct_sequence(&line).unwrap().to_vec();
        for seed in 0..SEEDS {
            let mut rng = ChaCha20Rng::seed_from_u64(seed);
            for (index, expected) in sequence.iter().enumerate() {
                let row = generator.generate(&catalog, &line, index, &mut rng).unwrap();
                assert_eq!(&row.correct_signal().unwrap().name, expected);
            }
        }
    }
}

#[test]
fn decoys_come_from_the_line_pool() {
    let catalog = bundled();
    let generator = RowGenerator::new(3, -60.0);
    for line in catalog.lines() {
        let pool: BTreeSet<&str> = catalog
            .incorrect_pool(&line)
            .unwrap()
            .iter()
            .map(String::as_str)
            .collect();
        let mut rng = ChaCha20Rng::seed_from_u64(0xD3C0);
        for _ in 0..SEEDS {
            let row = generator.generate(&catalog, &line, 0, &mut rng).unwrap();
            for signal in row.signals().iter().filter(|s| !s.is_correct) {
                assert!(pool.contains(signal.name.as_str()));
            }
        }
    }
}

#[test]
fn correct_lane_is_spread_across_lanes() {
    let catalog = bundled();
    let generator = RowGenerator::new(3, -60.0);
    let line = catalog.lines().into_iter().next().unwrap();
    let mut rng = ChaCha20Rng::seed_from_u64(0x1A4E);
    let mut counts = [0_u32; 3];
    for _ in 0..900 {
        let row = generator.generate(&catalog, &line, 0, &mut rng).unwrap();
        counts[row.correct_lane().unwrap()] += 1;
    }
    for count in counts {
        assert!((200..400).contains(&count), "lane bias: {counts:?}");
    }
}

#[test]
fn generation_past_the_sequence_is_rejected() {
    let catalog = bundled();
    let generator = RowGenerator::new(3, -60.0);
    let mut rng = ChaCha20Rng::seed_from_u64(1);
    for line in catalog.lines() {
        let len = catalog.sequence_len(&line).unwrap();
        assert!(generator.generate(&catalog, &line, len, &mut rng).is_err());
    }
}
