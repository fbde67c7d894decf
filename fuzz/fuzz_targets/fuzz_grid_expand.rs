#![no_main]

use libfuzzer_sys::fuzz_target;

use courtside_core::grid::{expand_dimension, expand_grid_with_limit};
use courtside_core::{Dimension, SearchJob};

const LIMIT: usize = 10_000;

fuzz_target!(|data: &[u8]| {
    // Each pair of bytes is one integer range dimension; at most 4 dimensions.
    let dimensions: Vec<Dimension> = data
        .chunks_exact(2)
        .take(4)
        .map(|pair| Dimension::Range {
            min: f64::from(pair[0] as i8),
            max: f64::from(pair[1] as i8),
        })
        .collect();
    if dimensions.is_empty() {
        return;
    }
    let job = SearchJob {
        model: "fuzz".into(),
        params: (0..dimensions.len()).map(|i| format!("p{i}")).collect(),
        dimensions,
    };

    let expected: usize = job
        .dimensions
        .iter()
        .map(|d| expand_dimension(d).len())
        .product();
    match expand_grid_with_limit(&job, LIMIT) {
        Ok(grid) => {
            assert_eq!(grid.len(), expected);
            // The last dimension varies fastest.
            if let [first, second, ..] = grid.as_slice() {
                let last = job.dimensions.len() - 1;
                if expand_dimension(&job.dimensions[last]).len() > 1 {
                    assert_ne!(first.values[last], second.values[last]);
                }
            }
        }
        Err(_) => assert!(expected > LIMIT),
    }
});
