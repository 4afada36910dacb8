use tracing_subscriber::EnvFilter;

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Subscriber for the Lambda runtime; CloudWatch stamps every line already.
pub fn init_lambda() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_target(false)
        .without_time()
        .init();
}

/// Subscriber for the local CLI. Logs go to stderr so stdout carries only
/// the response document.
pub fn init_cli() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .init();
}
