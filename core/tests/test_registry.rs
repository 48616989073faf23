// Integration test for platform-keyed plugin registration
//
// Platform implementations register under a plugin name; calls made through
// the registry must land on the implementation for the running platform.

use async_trait::async_trait;
use fused_location_core::{
    CallbackId, HostAdapter, LocationError, LocationPlugin, MockHost, PermissionState,
    PermissionStatus, PluginRegistration, PluginRegistry, Position, PositionOptions, Result,
    WatchCallback, PLUGIN_NAME, WEB_PLATFORM,
};
use std::sync::Arc;

/// Stand-in for a native implementation that reports a fixed permission.
struct GrantedEverywhere;

#[async_trait(?Send)]
impl LocationPlugin for GrantedEverywhere {
    async fn get_current_position(&self, _options: Option<PositionOptions>) -> Result<Position> {
        Err(LocationError::NotImplemented("stub".to_string()))
    }

    async fn watch_position(
        &self,
        _options: PositionOptions,
        _callback: WatchCallback,
    ) -> Result<CallbackId> {
        Ok(CallbackId::from_handle(7))
    }

    async fn clear_watch(&self, _id: &CallbackId) -> Result<()> {
        Ok(())
    }

    async fn check_permissions(&self) -> Result<PermissionStatus> {
        Ok(PermissionStatus {
            location: PermissionState::Granted,
        })
    }

    async fn request_permissions(&self) -> Result<PermissionStatus> {
        self.check_permissions().await
    }
}

#[tokio::test]
async fn test_resolve_routes_by_platform() {
    let registry = PluginRegistry::new();
    registry.register(
        &PluginRegistration::new(PLUGIN_NAME, &[WEB_PLATFORM]),
        Arc::new(HostAdapter::new(MockHost::new(), WEB_PLATFORM)),
    );
    registry.register(
        &PluginRegistration::new(PLUGIN_NAME, &["android", "ios"]),
        Arc::new(GrantedEverywhere),
    );

    let web = registry.resolve(PLUGIN_NAME, WEB_PLATFORM).expect("web plugin");
    let err = web.request_permissions().await.unwrap_err();
    assert_eq!(err.to_string(), "Not implemented on web.");

    let android = registry.resolve(PLUGIN_NAME, "android").expect("android plugin");
    assert_eq!(
        android.request_permissions().await.unwrap().location,
        PermissionState::Granted
    );

    assert_eq!(
        registry.platforms(PLUGIN_NAME),
        vec!["android".to_string(), "ios".to_string(), "web".to_string()]
    );
}

#[test]
fn test_resolve_unknown_returns_none() {
    let registry = PluginRegistry::new();
    assert!(registry.is_empty());
    assert!(registry.resolve(PLUGIN_NAME, WEB_PLATFORM).is_none());

    registry.register(
        &PluginRegistration::new(PLUGIN_NAME, &[WEB_PLATFORM]),
        Arc::new(GrantedEverywhere),
    );
    assert!(registry.resolve("OtherPlugin", WEB_PLATFORM).is_none());
    assert!(registry.resolve(PLUGIN_NAME, "electron").is_none());
}

#[tokio::test]
async fn test_reregistration_replaces_previous() {
    let registry = PluginRegistry::new();
    let registration = PluginRegistration::new(PLUGIN_NAME, &[WEB_PLATFORM]);

    registry.register(&registration, Arc::new(GrantedEverywhere));
    registry.register(
        &registration,
        Arc::new(HostAdapter::new(MockHost::new(), WEB_PLATFORM)),
    );

    assert_eq!(registry.len(), 1);
    let plugin = registry.resolve(PLUGIN_NAME, WEB_PLATFORM).unwrap();
    assert!(plugin.request_permissions().await.is_err());
}

#[test]
fn test_unregister() {
    let registry = PluginRegistry::new();
    registry.register(
        &PluginRegistration::new(PLUGIN_NAME, &[WEB_PLATFORM, "android"]),
        Arc::new(GrantedEverywhere),
    );

    assert!(registry.unregister(PLUGIN_NAME, WEB_PLATFORM));
    assert!(!registry.unregister(PLUGIN_NAME, WEB_PLATFORM));
    assert_eq!(registry.platforms(PLUGIN_NAME), vec!["android".to_string()]);
}
