#![no_main]

use libfuzzer_sys::fuzz_target;

use courtside_core::grid::expand_grid_with_limit;
use courtside_core::Job;

fuzz_target!(|data: &[u8]| {
    let Ok(line) = std::str::from_utf8(data) else {
        return;
    };

    // Should not panic; decoded searches must expand within a small budget.
    if let Ok(Job::Search(search)) = Job::decode(line) {
        assert_eq!(search.params.len(), search.dimensions.len());
        if let Ok(grid) = expand_grid_with_limit(&search, 4096) {
            for (ordinal, candidate) in grid.iter().enumerate() {
                assert_eq!(candidate.ordinal, ordinal);
                assert_eq!(candidate.values.len(), search.params.len());
            }
        }
    }
});
