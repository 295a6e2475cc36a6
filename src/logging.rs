use flexi_logger::Logger;

/// Stdout carries the referee protocol, so all diagnostics go to stderr.
pub fn setup_logging() {
    Logger::try_with_env_or_str("info")
        .unwrap()
        .log_to_stderr()
        .start()
        .unwrap();
}
