use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Installs the global subscriber, writing to stderr so stdout stays for the conversation.
///
/// `RUST_LOG` wins when set; otherwise `verbose` picks between `debug` and `warn`.
pub fn init_logging(verbose: bool) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;
    Ok(())
}

fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "geminiz=debug"
    } else {
        "warn"
    }
}
