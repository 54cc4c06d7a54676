//! Application state
//!
//! Holds the shared state for the Axum application: the service context,
//! the reset scheduler and the optional command token.

use std::sync::Arc;

use rankup_service::{ResetScheduler, ServiceContext};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Service context containing all dependencies
    service_context: Arc<ServiceContext>,
    /// Periodic reset timer
    scheduler: Arc<ResetScheduler>,
    /// Shared secret for command routes
    command_token: Option<Arc<str>>,
}

impl AppState {
    /// Create a new AppState
    pub fn new(service_context: ServiceContext, scheduler: Arc<ResetScheduler>) -> Self {
        Self {
            service_context: Arc::new(service_context),
            scheduler,
            command_token: None,
        }
    }

    /// Require a bearer token on command routes
    pub fn with_command_token(mut self, token: Option<String>) -> Self {
        self.command_token = token.filter(|t| !t.is_empty()).map(Arc::from);
        self
    }

    /// Get the service context
    pub fn service_context(&self) -> &ServiceContext {
        &self.service_context
    }

    pub fn scheduler(&self) -> &Arc<ResetScheduler> {
        &self.scheduler
    }

    pub fn command_token(&self) -> Option<&str> {
        self.command_token.as_deref()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("service_context", &"ServiceContext")
            .field("scheduler_armed", &self.scheduler.is_armed())
            .field("command_token", &self.command_token.as_ref().map(|_| "***"))
            .finish()
    }
}
