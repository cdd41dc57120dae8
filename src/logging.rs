use tracing_subscriber::EnvFilter;

/// Installs the global stderr subscriber.
///
/// `RUST_LOG` wins when set; otherwise only warnings are shown, or debug
/// output with `verbose`.
pub fn init(verbose: bool) {
    let default = if verbose { "dwinit=debug" } else { "dwinit=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    // A second call (e.g. from tests) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .try_init();
}
