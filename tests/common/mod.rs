#![allow(dead_code)]

pub mod fake_sdk;

use log::LevelFilter;

/// Logs appear only with `-- --nocapture` or when the test fails.
pub fn init_test_logging() {
    let _ = env_logger::Builder::from_default_env()
        .filter_level(LevelFilter::Debug)
        .is_test(true)
        .try_init();
}
