#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Parser must not panic on any input, and whatever parses must aggregate.
    if let Ok(profiles) = covdelta::parsers::gocover::parse(data) {
        if let Ok(cov) = covdelta::coverage::Coverage::build(profiles) {
            assert_eq!(cov.total_stmt(), cov.covered_stmt() + cov.missed_stmt());
            let _ = cov.by_package();
        }
    }
});
