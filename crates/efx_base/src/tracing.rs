pub use tracing::instrument;
pub use tracing::{debug, error, info, trace, warn};

use tracing_error::ErrorLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::EfxResult;

/// Install the process-wide tracing subscriber.
///
/// The filter is read from `RUST_LOG` and defaults to `info`. The `ErrorLayer`
/// lets [`crate::EfxError`] capture span traces.
pub fn init_tracing() -> EfxResult<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(ErrorLayer::default())
        .try_init()
        .map_err(|e| crate::err!("Failed to install tracing subscriber: {}", e))
}
