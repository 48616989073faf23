// FusedLocation Core — platform-independent geolocation plugin
//
// A uniform interface over device geolocation (current position, continuous
// watch, permission query). Platform crates supply a `GeolocationHost`; the
// `HostAdapter` does the option merging and callback plumbing on top of it.

pub mod config;
pub mod error;
pub mod host;
pub mod options;
pub mod permission;
pub mod plugin;
pub mod position;
pub mod registry;

pub use config::{ConfigError, PluginConfig};
pub use error::{HostError, HostErrorCode, LocationError, Result};
pub use host::{GeolocationHost, OneShotCallback, PositionResult, WatchEventCallback};
pub use options::{clamp_unsigned_long, PositionOptions, ResolvedPositionOptions};
pub use permission::{PermissionState, PermissionStatus};
pub use plugin::{HostAdapter, LocationPlugin, WatchCallback};
pub use position::{CallbackId, Coordinates, Position};
pub use registry::{PluginRegistration, PluginRegistry};

#[cfg(any(test, feature = "test-utils"))]
pub use host::MockHost;

/// Name the plugin registers under
pub const PLUGIN_NAME: &str = "FusedLocation";

/// Platform tag of the browser implementation
pub const WEB_PLATFORM: &str = "web";

/// Install a `tracing` subscriber for native consumers (idempotent).
///
/// Honors `RUST_LOG`; falls back to `info`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init();
}
