//! Shared application state for axum handlers.

use std::sync::Arc;

use homelink_app::broadcast::StateBroadcaster;
use homelink_app::dispatch::CommandDispatcher;
use homelink_app::ports::{CommandPublisher, UserRepository};
use homelink_app::services::auth_service::AuthService;
use homelink_app::services::user_service::UserService;
use homelink_app::state_store::StateStore;

/// Application state shared across all axum handlers.
///
/// Generic over the user repository and command publisher to avoid dynamic
/// dispatch. `Clone` is implemented manually so the underlying types
/// themselves do not need to be `Clone` — only the `Arc` wrappers are
/// cloned.
pub struct AppState<UR, CP> {
    /// The single device-state snapshot holder.
    pub store: Arc<StateStore>,
    /// Fan-out channel feeding the SSE stream.
    pub fanout: Arc<StateBroadcaster>,
    /// Validated actuator command dispatch.
    pub dispatcher: Arc<CommandDispatcher<CP>>,
    /// Token issue/verify collaborator.
    pub auth_service: Arc<AuthService<UR>>,
    /// User management service.
    pub user_service: Arc<UserService<UR>>,
}

impl<UR, CP> Clone for AppState<UR, CP> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            fanout: Arc::clone(&self.fanout),
            dispatcher: Arc::clone(&self.dispatcher),
            auth_service: Arc::clone(&self.auth_service),
            user_service: Arc::clone(&self.user_service),
        }
    }
}

impl<UR, CP> AppState<UR, CP>
where
    UR: UserRepository + Send + Sync + 'static,
    CP: CommandPublisher + Send + Sync + 'static,
{
    /// Create the state from the shared core handles and service instances.
    pub fn new(
        store: Arc<StateStore>,
        fanout: Arc<StateBroadcaster>,
        dispatcher: CommandDispatcher<CP>,
        auth_service: AuthService<UR>,
        user_service: UserService<UR>,
    ) -> Self {
        Self {
            store,
            fanout,
            dispatcher: Arc::new(dispatcher),
            auth_service: Arc::new(auth_service),
            user_service: Arc::new(user_service),
        }
    }
}
