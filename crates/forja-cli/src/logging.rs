//! Log subscriber setup

use crate::config::{ColorChoice, Verbosity};
use tracing_subscriber::EnvFilter;

/// Install the stderr subscriber.
///
/// `RUST_LOG` wins over the verbosity flags. Calling this twice is harmless.
pub fn init_logging(verbosity: Verbosity, color: ColorChoice) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter(verbosity))
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(color.should_color())
        .try_init();
}

fn filter(verbosity: Verbosity) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(verbosity.log_filter()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_twice() {
        init_logging(Verbosity::Quiet, ColorChoice::Never);
        init_logging(Verbosity::Debug, ColorChoice::Never);
    }
}
