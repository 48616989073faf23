// fused-location-wasm — browser implementation of the FusedLocation plugin

pub mod browser;
pub mod convert;

use crate::browser::BrowserGeolocation;
use fused_location_core::{
    CallbackId, HostAdapter, LocationPlugin, PluginConfig, PluginRegistration, PluginRegistry,
    PLUGIN_NAME, WEB_PLATFORM,
};
use std::sync::Arc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

thread_local! {
    static REGISTRY: PluginRegistry = PluginRegistry::new();
}

#[wasm_bindgen]
pub fn init_logging() {
    console_error_panic_hook::set_once();
    // A subscriber may already be installed by an earlier call.
    let _ = tracing_wasm::try_set_as_global_default();
}

/// Runs on module load: install logging and register the web plugin.
#[wasm_bindgen(start)]
pub fn start() {
    init_logging();
    register_web_plugin(&PluginConfig::default());
}

/// Build a browser-backed adapter from `config` and register it under the
/// configured name and platform.
pub fn register_web_plugin(config: &PluginConfig) -> Arc<dyn LocationPlugin> {
    let plugin: Arc<dyn LocationPlugin> =
        Arc::new(HostAdapter::from_config(BrowserGeolocation::new(), config));
    let registration = PluginRegistration::new(config.name.clone(), &[config.platform.as_str()]);
    REGISTRY.with(|registry| registry.register(&registration, Arc::clone(&plugin)));
    plugin
}

/// Look up a registered implementation by plugin name and platform.
pub fn resolve_plugin(name: &str, platform: &str) -> Option<Arc<dyn LocationPlugin>> {
    REGISTRY.with(|registry| registry.resolve(name, platform))
}

/// JS-facing plugin object. Every method returns a Promise.
#[wasm_bindgen]
pub struct FusedLocation {
    plugin: Arc<dyn LocationPlugin>,
}

impl FusedLocation {
    /// Wrap an already built implementation without touching the registry.
    pub fn from_plugin(plugin: Arc<dyn LocationPlugin>) -> Self {
        Self { plugin }
    }
}

#[wasm_bindgen]
impl FusedLocation {
    /// The registered web plugin, registering it first if needed.
    #[wasm_bindgen(constructor)]
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        init_logging();
        let plugin = resolve_plugin(PLUGIN_NAME, WEB_PLATFORM)
            .unwrap_or_else(|| register_web_plugin(&PluginConfig::default()));
        Self { plugin }
    }

    /// Build and register a plugin from a JSON `PluginConfig`.
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(config_json: &str) -> Result<FusedLocation, JsValue> {
        init_logging();
        let config = PluginConfig::from_json(config_json)
            .map_err(|e| JsValue::from(js_sys::Error::new(&e.to_string())))?;
        Ok(Self {
            plugin: register_web_plugin(&config),
        })
    }

    #[wasm_bindgen(js_name = getCurrentPosition)]
    pub fn get_current_position(&self, options: JsValue) -> js_sys::Promise {
        let plugin = Arc::clone(&self.plugin);
        future_to_promise(async move {
            let options = convert::options_from_js(options)?;
            let position = plugin
                .get_current_position(options)
                .await
                .map_err(convert::error_to_js)?;
            convert::to_js(&position)
        })
    }

    /// `callback(position, null)` per fix, `callback(null, error)` per failure.
    /// Resolves with the watch id as soon as the watch is registered.
    #[wasm_bindgen(js_name = watchPosition)]
    pub fn watch_position(&self, options: JsValue, callback: js_sys::Function) -> js_sys::Promise {
        let plugin = Arc::clone(&self.plugin);
        future_to_promise(async move {
            let options = convert::options_from_js(options)?.unwrap_or_default();
            let id = plugin
                .watch_position(
                    options,
                    Box::new(move |position, error| {
                        let (position, error) = convert::watch_args(position, error);
                        if let Err(e) = callback.call2(&JsValue::NULL, &position, &error) {
                            tracing::warn!(
                                "watchPosition callback threw: {}",
                                convert::describe_js_error(&e)
                            );
                        }
                    }),
                )
                .await
                .map_err(convert::error_to_js)?;
            Ok(JsValue::from_str(id.as_str()))
        })
    }

    /// Takes `{ id }` as returned by `watchPosition`.
    #[wasm_bindgen(js_name = clearWatch)]
    pub fn clear_watch(&self, options: JsValue) -> js_sys::Promise {
        let plugin = Arc::clone(&self.plugin);
        future_to_promise(async move {
            let options = convert::clear_watch_options_from_js(options)?;
            plugin
                .clear_watch(&CallbackId::from(options.id))
                .await
                .map_err(convert::error_to_js)?;
            Ok(JsValue::UNDEFINED)
        })
    }

    #[wasm_bindgen(js_name = checkPermissions)]
    pub fn check_permissions(&self) -> js_sys::Promise {
        let plugin = Arc::clone(&self.plugin);
        future_to_promise(async move {
            let status = plugin
                .check_permissions()
                .await
                .map_err(convert::error_to_js)?;
            convert::to_js(&status)
        })
    }

    #[wasm_bindgen(js_name = requestPermissions)]
    pub fn request_permissions(&self) -> js_sys::Promise {
        let plugin = Arc::clone(&self.plugin);
        future_to_promise(async move {
            let status = plugin
                .request_permissions()
                .await
                .map_err(convert::error_to_js)?;
            convert::to_js(&status)
        })
    }
}
