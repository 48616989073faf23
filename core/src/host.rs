//! Host geolocation capability
//!
//! [`GeolocationHost`] is the seam between the adapter and whatever the
//! platform provides (the browser's `navigator.geolocation` on web). Hosts own
//! watch numbering and watch lifetime; the adapter only forwards.

use crate::error::{HostError, Result};
use crate::options::ResolvedPositionOptions;
use crate::position::Position;
use async_trait::async_trait;

/// Outcome of a single host position delivery
pub type PositionResult = std::result::Result<Position, HostError>;

/// Success/failure pair of a one-shot request, collapsed into one callback
pub type OneShotCallback = Box<dyn FnOnce(PositionResult)>;

/// Called once per delivery for the lifetime of a watch
pub type WatchEventCallback = Box<dyn FnMut(PositionResult)>;

#[async_trait(?Send)]
pub trait GeolocationHost {
    /// Whether the geolocation capability exists in this environment
    fn has_geolocation(&self) -> bool;

    /// Whether the permission-query capability exists in this environment
    fn has_permissions(&self) -> bool;

    /// Issue one position request. `on_result` is called at most once.
    fn get_current_position(
        &self,
        options: ResolvedPositionOptions,
        on_result: OneShotCallback,
    ) -> Result<()>;

    /// Register a continuous watch and return the host's handle for it.
    fn watch_position(
        &self,
        options: ResolvedPositionOptions,
        on_event: WatchEventCallback,
    ) -> Result<i32>;

    /// Cancel a watch. Unknown handles are the host's business.
    fn clear_watch(&self, handle: i32);

    /// Query the `geolocation` permission and return the host's state string.
    async fn query_geolocation_permission(&self) -> Result<String>;
}

/// A shared host, so the caller can keep driving it after handing it to an
/// adapter.
#[async_trait(?Send)]
impl<H: GeolocationHost + ?Sized> GeolocationHost for std::rc::Rc<H> {
    fn has_geolocation(&self) -> bool {
        (**self).has_geolocation()
    }

    fn has_permissions(&self) -> bool {
        (**self).has_permissions()
    }

    fn get_current_position(
        &self,
        options: ResolvedPositionOptions,
        on_result: OneShotCallback,
    ) -> Result<()> {
        (**self).get_current_position(options, on_result)
    }

    fn watch_position(
        &self,
        options: ResolvedPositionOptions,
        on_event: WatchEventCallback,
    ) -> Result<i32> {
        (**self).watch_position(options, on_event)
    }

    fn clear_watch(&self, handle: i32) {
        (**self).clear_watch(handle)
    }

    async fn query_geolocation_permission(&self) -> Result<String> {
        (**self).query_geolocation_permission().await
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub use mock::MockHost;

#[cfg(any(test, feature = "test-utils"))]
mod mock {
    use super::*;
    use crate::error::LocationError;
    use parking_lot::Mutex;
    use std::cell::RefCell;
    use std::collections::{BTreeMap, VecDeque};
    use std::rc::Rc;

    type SharedWatch = Rc<RefCell<WatchEventCallback>>;

    struct MockState {
        geolocation: bool,
        permissions: bool,
        permission_state: String,
        auto_reply: Option<PositionResult>,
        pending: VecDeque<OneShotCallback>,
        watches: BTreeMap<i32, SharedWatch>,
        next_handle: i32,
        requested: Vec<ResolvedPositionOptions>,
        cleared: Vec<i32>,
    }

    /// Scriptable in-memory host.
    ///
    /// One-shot requests queue until [`MockHost::complete_next`] (or answer
    /// immediately when an auto-reply is set); watch events are pushed with
    /// [`MockHost::emit`]. Handles start at 1, like browsers number them.
    pub struct MockHost {
        state: Mutex<MockState>,
    }

    impl Default for MockHost {
        fn default() -> Self {
            Self::new()
        }
    }

    impl MockHost {
        pub fn new() -> Self {
            Self {
                state: Mutex::new(MockState {
                    geolocation: true,
                    permissions: true,
                    permission_state: "prompt".to_string(),
                    auto_reply: None,
                    pending: VecDeque::new(),
                    watches: BTreeMap::new(),
                    next_handle: 1,
                    requested: Vec::new(),
                    cleared: Vec::new(),
                }),
            }
        }

        pub fn without_geolocation(self) -> Self {
            self.state.lock().geolocation = false;
            self
        }

        pub fn without_permissions(self) -> Self {
            self.state.lock().permissions = false;
            self
        }

        pub fn with_permission_state(self, state: &str) -> Self {
            self.set_permission_state(state);
            self
        }

        pub fn set_permission_state(&self, state: &str) {
            self.state.lock().permission_state = state.to_string();
        }

        /// Answer every later one-shot request immediately with `result`.
        pub fn with_auto_reply(self, result: PositionResult) -> Self {
            self.state.lock().auto_reply = Some(result);
            self
        }

        /// Complete the oldest pending one-shot request. Returns false if none.
        pub fn complete_next(&self, result: PositionResult) -> bool {
            let callback = self.state.lock().pending.pop_front();
            match callback {
                Some(cb) => {
                    cb(result);
                    true
                }
                None => false,
            }
        }

        /// Drop every pending one-shot request without answering it.
        pub fn drop_pending(&self) {
            self.state.lock().pending.clear();
        }

        pub fn pending_requests(&self) -> usize {
            self.state.lock().pending.len()
        }

        /// Deliver one event to an active watch. Returns false if the handle
        /// is not active.
        pub fn emit(&self, handle: i32, result: PositionResult) -> bool {
            // Cloned out so the callback may call back into the host.
            let watch = self.state.lock().watches.get(&handle).cloned();
            match watch {
                Some(cb) => {
                    let mut callback = cb.borrow_mut();
                    (*callback)(result);
                    true
                }
                None => false,
            }
        }

        pub fn active_watches(&self) -> Vec<i32> {
            self.state.lock().watches.keys().copied().collect()
        }

        /// Handles passed to `clear_watch`, in call order, known or not.
        pub fn cleared_handles(&self) -> Vec<i32> {
            self.state.lock().cleared.clone()
        }

        /// Options received by every request and watch, in call order.
        pub fn requested_options(&self) -> Vec<ResolvedPositionOptions> {
            self.state.lock().requested.clone()
        }
    }

    #[async_trait(?Send)]
    impl GeolocationHost for MockHost {
        fn has_geolocation(&self) -> bool {
            self.state.lock().geolocation
        }

        fn has_permissions(&self) -> bool {
            self.state.lock().permissions
        }

        fn get_current_position(
            &self,
            options: ResolvedPositionOptions,
            on_result: OneShotCallback,
        ) -> Result<()> {
            let auto_reply = {
                let mut state = self.state.lock();
                state.requested.push(options);
                state.auto_reply.clone()
            };
            match auto_reply {
                Some(reply) => on_result(reply),
                None => self.state.lock().pending.push_back(on_result),
            }
            Ok(())
        }

        fn watch_position(
            &self,
            options: ResolvedPositionOptions,
            on_event: WatchEventCallback,
        ) -> Result<i32> {
            let mut state = self.state.lock();
            if !state.geolocation {
                return Err(LocationError::Unavailable(
                    "mock host has no geolocation".to_string(),
                ));
            }
            state.requested.push(options);
            let handle = state.next_handle;
            state.next_handle += 1;
            state.watches.insert(handle, Rc::new(RefCell::new(on_event)));
            Ok(handle)
        }

        fn clear_watch(&self, handle: i32) {
            let mut state = self.state.lock();
            state.cleared.push(handle);
            state.watches.remove(&handle);
        }

        async fn query_geolocation_permission(&self) -> Result<String> {
            Ok(self.state.lock().permission_state.clone())
        }
    }
}
