use env_logger::{Builder, Env};

const LOG_ENV: &str = "REPERTOIRE_LOG";
const DEFAULT_FILTER: &str = "warn";

/// Stderr logger; `REPERTOIRE_LOG` takes env_logger filter syntax
/// (`debug`, `repertoire=trace`, ...) and defaults to `warn`.
fn builder() -> Builder {
    let mut builder = Builder::from_env(Env::new().filter_or(LOG_ENV, DEFAULT_FILTER));
    builder.format_timestamp(None);
    builder
}

/// Install the logger. Calling it more than once is harmless.
pub fn init() {
    if let Err(err) = builder().try_init() {
        log::debug!("Logger already installed: {}", err);
    }
}
