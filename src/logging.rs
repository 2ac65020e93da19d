use anyhow::Context as _;

/// Default filter for a `-v` count: warn, then info, then debug. Only this crate is raised;
/// dependencies stay at warn.
pub fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "warn,ao3scrape=info",
        _ => "warn,ao3scrape=debug",
    }
}

/// Install the stderr subscriber. `RUST_LOG` wins over the verbosity default.
pub fn init(verbosity: u8) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(default_directive(verbosity)))
        .context("build log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow::anyhow!("initialize tracing subscriber: {err}"))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_raises_crate_level() {
        assert_eq!(default_directive(0), "warn");
        assert_eq!(default_directive(1), "warn,ao3scrape=info");
        assert_eq!(default_directive(2), "warn,ao3scrape=debug");
        assert_eq!(default_directive(7), "warn,ao3scrape=debug");
    }

    #[test]
    fn directives_are_valid_filters() {
        for v in 0..3 {
            assert!(tracing_subscriber::EnvFilter::try_new(default_directive(v)).is_ok());
        }
    }
}
