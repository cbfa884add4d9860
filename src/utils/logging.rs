use env_logger::Env;

/// Initialize logging using env_logger.
/// Filtering follows the RUST_LOG environment variable and defaults to `info`,
/// e.g. `RUST_LOG=search_bridge=debug search-bridge search demo rust`
pub fn init_logging() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
}
