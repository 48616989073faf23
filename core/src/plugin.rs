//! The location plugin interface and its host-delegating adapter

use crate::config::PluginConfig;
use crate::error::{
    HostError, HostErrorCode, LocationError, Result, GEOLOCATION_UNAVAILABLE, PERMISSIONS_UNAVAILABLE, REQUEST_DROPPED,
};
use crate::host::GeolocationHost;
use crate::options::{PositionOptions, ResolvedPositionOptions};
use crate::permission::{PermissionState, PermissionStatus};
use crate::position::{CallbackId, Position};
use async_trait::async_trait;
use futures::channel::oneshot;

/// Receives every delivery of a watch: `(Some(position), None)` on success,
/// `(None, Some(error))` on failure.
pub type WatchCallback = Box<dyn FnMut(Option<Position>, Option<LocationError>)>;

/// Capability set every platform implementation provides.
#[async_trait(?Send)]
pub trait LocationPlugin {
    /// Resolve once with the current position, or the host's error.
    async fn get_current_position(&self, options: Option<PositionOptions>) -> Result<Position>;

    /// Start a continuous watch. Resolves as soon as the watch is registered;
    /// deliveries arrive through `callback`.
    async fn watch_position(
        &self,
        options: PositionOptions,
        callback: WatchCallback,
    ) -> Result<CallbackId>;

    /// Cancel the watch named by `id`.
    async fn clear_watch(&self, id: &CallbackId) -> Result<()>;

    async fn check_permissions(&self) -> Result<PermissionStatus>;

    async fn request_permissions(&self) -> Result<PermissionStatus>;
}

/// [`LocationPlugin`] implemented by direct delegation to a
/// [`GeolocationHost`].
pub struct HostAdapter<H> {
    host: H,
    platform: String,
    defaults: ResolvedPositionOptions,
}

impl<H: GeolocationHost> HostAdapter<H> {
    pub fn new(host: H, platform: impl Into<String>) -> Self {
        Self {
            host,
            platform: platform.into(),
            defaults: ResolvedPositionOptions::default(),
        }
    }

    pub fn from_config(host: H, config: &PluginConfig) -> Self {
        Self {
            host,
            platform: config.platform.clone(),
            defaults: config.defaults,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn platform(&self) -> &str {
        &self.platform
    }

    pub fn defaults(&self) -> ResolvedPositionOptions {
        self.defaults
    }

    fn ensure_geolocation(&self) -> Result<()> {
        if self.host.has_geolocation() {
            Ok(())
        } else {
            Err(LocationError::Unavailable(GEOLOCATION_UNAVAILABLE.to_string()))
        }
    }
}

#[async_trait(?Send)]
impl<H: GeolocationHost> LocationPlugin for HostAdapter<H> {
    async fn get_current_position(&self, options: Option<PositionOptions>) -> Result<Position> {
        self.ensure_geolocation()?;
        let resolved = self.defaults.merge_optional(options.as_ref());
        tracing::debug!("getCurrentPosition with {:?}", resolved);

        let (tx, rx) = oneshot::channel();
        self.host.get_current_position(
            resolved,
            Box::new(move |result| {
                // Receiver gone means the caller stopped waiting; nothing to do.
                let _ = tx.send(result);
            }),
        )?;

        match rx.await {
            Ok(Ok(position)) => Ok(position),
            Ok(Err(e)) => {
                tracing::debug!("getCurrentPosition failed: {} ({})", e.message, e.code);
                Err(e.into())
            }
            Err(_) => {
                tracing::warn!("Host dropped a position request without answering");
                Err(LocationError::Unavailable(REQUEST_DROPPED.to_string()))
            }
        }
    }

    async fn watch_position(
        &self,
        options: PositionOptions,
        mut callback: WatchCallback,
    ) -> Result<CallbackId> {
        self.ensure_geolocation()?;
        let resolved = self.defaults.merge(&options);

        let handle = self.host.watch_position(
            resolved,
            Box::new(move |result| match result {
                Ok(position) => callback(Some(position), None),
                Err(e) => callback(None, Some(LocationError::Host(e))),
            }),
        )?;

        let id = CallbackId::from_handle(handle);
        tracing::debug!("watchPosition registered {} with {:?}", id, resolved);
        Ok(id)
    }

    async fn clear_watch(&self, id: &CallbackId) -> Result<()> {
        let handle = id.handle();
        tracing::debug!("clearWatch {} -> handle {}", id, handle);
        self.host.clear_watch(handle);
        Ok(())
    }

    async fn check_permissions(&self) -> Result<PermissionStatus> {
        if !self.host.has_permissions() {
            return Err(LocationError::Unavailable(PERMISSIONS_UNAVAILABLE.to_string()));
        }

        let state = self.host.query_geolocation_permission().await?;
        let location = state.parse::<PermissionState>().map_err(|e| {
            tracing::warn!("{}", e);
            LocationError::Host(HostError::new(HostErrorCode::Unknown(0), e.to_string()))
        })?;
        Ok(PermissionStatus { location })
    }

    async fn request_permissions(&self) -> Result<PermissionStatus> {
        Err(LocationError::not_implemented_on(&self.platform))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MockHost;
    use crate::position::Coordinates;
    use futures::executor::block_on;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn adapter(host: MockHost) -> HostAdapter<MockHost> {
        HostAdapter::new(host, "web")
    }

    fn fix() -> Position {
        Position::new(Coordinates::new(51.5, -0.12, 8.0), 1_700_000_000_000.0)
    }

    #[test]
    fn test_no_options_uses_default_triple() {
        let plugin = adapter(MockHost::new().with_auto_reply(Ok(fix())));
        let position = block_on(plugin.get_current_position(None)).unwrap();
        assert_eq!(position, fix());
        assert_eq!(
            plugin.host().requested_options(),
            vec![ResolvedPositionOptions {
                enable_high_accuracy: false,
                timeout: 10_000,
                maximum_age: 0,
            }]
        );
    }

    #[test]
    fn test_host_error_passes_through() {
        let err = HostError::new(HostErrorCode::Timeout, "Timeout expired");
        let plugin = adapter(MockHost::new().with_auto_reply(Err(err.clone())));
        let result = block_on(plugin.get_current_position(None));
        assert_eq!(result, Err(LocationError::Host(err)));
    }

    #[test]
    fn test_missing_geolocation_fails_without_request() {
        let plugin = adapter(MockHost::new().without_geolocation());
        let result = block_on(plugin.get_current_position(None));
        assert_eq!(
            result,
            Err(LocationError::Unavailable(GEOLOCATION_UNAVAILABLE.to_string()))
        );
        assert!(plugin.host().requested_options().is_empty());
    }

    #[test]
    fn test_dropped_request_is_reported() {
        let plugin = adapter(MockHost::new());
        let result = block_on(async {
            let fut = plugin.get_current_position(None);
            futures::pin_mut!(fut);
            assert!(futures::poll!(fut.as_mut()).is_pending());
            plugin.host().drop_pending();
            fut.await
        });
        assert_eq!(
            result,
            Err(LocationError::Unavailable(REQUEST_DROPPED.to_string()))
        );
    }

    #[test]
    fn test_watch_null_slot_convention() {
        let plugin = adapter(MockHost::new());
        let seen: Rc<RefCell<Vec<(Option<Position>, Option<LocationError>)>>> =
            Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);

        let id = block_on(plugin.watch_position(
            PositionOptions::default(),
            Box::new(move |p, e| sink.borrow_mut().push((p, e))),
        ))
        .unwrap();
        assert_eq!(id.as_str(), "1");

        let err = HostError::new(HostErrorCode::PositionUnavailable, "no fix");
        assert!(plugin.host().emit(1, Ok(fix())));
        assert!(plugin.host().emit(1, Err(err.clone())));

        let seen = seen.borrow();
        assert_eq!(seen[0], (Some(fix()), None));
        assert_eq!(seen[1], (None, Some(LocationError::Host(err))));
    }

    #[test]
    fn test_request_permissions_always_fails() {
        let plugin = adapter(MockHost::new().with_permission_state("granted"));
        let err = block_on(plugin.request_permissions()).unwrap_err();
        assert_eq!(err.to_string(), "Not implemented on web.");
        assert!(block_on(plugin.check_permissions()).is_ok());
        let err = block_on(plugin.request_permissions()).unwrap_err();
        assert_eq!(err.to_string(), "Not implemented on web.");
    }

    #[test]
    fn test_unknown_permission_state_is_an_error() {
        let plugin = adapter(MockHost::new().with_permission_state("maybe"));
        let err = block_on(plugin.check_permissions()).unwrap_err();
        assert_eq!(err.to_string(), "Unknown permission state: maybe");
        assert!(matches!(err, LocationError::Host(_)));
        assert_eq!(err.host_code(), Some(HostErrorCode::Unknown(0)));
    }

    #[test]
    fn test_shared_host_stays_drivable() {
        let host = Rc::new(MockHost::new());
        let plugin = HostAdapter::new(Rc::clone(&host), "web");
        let result = block_on(async {
            let fut = plugin.get_current_position(None);
            futures::pin_mut!(fut);
            assert!(futures::poll!(fut.as_mut()).is_pending());
            assert!(host.complete_next(Ok(fix())));
            fut.await
        });
        assert_eq!(result, Ok(fix()));
    }
}
