use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global subscriber, writing to stderr.
///
/// `RUST_LOG` wins when set; otherwise `--verbose` selects debug for the
/// reelmatch crates and the default is info.
pub fn init_tracing(verbose: bool, log_json: bool) -> anyhow::Result<()> {
    let level = if verbose { "reelmatch=debug" } else { "reelmatch=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let registry = tracing_subscriber::registry().with(filter);

    if log_json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr).with_ansi(false))
            .try_init()?;
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr).with_target(verbose))
            .try_init()?;
    }
    Ok(())
}
