//! Logging initialization

/// Initialize the logging system
///
/// Uses env_logger with default filter level of `info`.
/// Override with RUST_LOG environment variable, e.g. `RUST_LOG=bonsai=trace`
/// to see one line per generator evaluation.
///
/// # Example
/// ```
/// bonsai::core::logging::init();
/// log::info!("Nursery open");
/// ```
pub fn init() {
    // try_init so doc tests and repeated CLI setup don't panic
    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info")
    ).try_init();
}
