use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    init_tracing();
    leadgate_cli::run()
}

// Payloads go to stdout, diagnostics to stderr. RUST_LOG wins over the
// LEADGATE_LOG_LEVEL shorthand.
fn init_tracing() {
    let fallback = std::env::var("LEADGATE_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}
