use tracing_subscriber::{fmt, EnvFilter};

/// Install the global fmt subscriber. `RUST_LOG` wins over `default_filter`.
///
/// The fmt subscriber writes to stdout, which is where per-file diagnostics
/// are expected to show up.
pub fn init(default_filter: &str) {
    let env =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
pub(crate) fn init_test_logging() {
    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,ascconv=debug")),
        )
        .with_test_writer()
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}
