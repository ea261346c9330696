// ABOUTME: Connector seam - turns configured endpoints into live channels.
// ABOUTME: WorkspaceConnector binds every channel to the ambient workspace identity.

use std::sync::Arc;

use super::{Channel, ChannelKind, CustomChannel, ManagedChannel, ServerEndpoint};
use crate::auth::{CredentialProvider, WorkspaceIdentity};
use crate::mcp::HttpOptions;

/// Builds the channel for an endpoint.
pub trait Connector: Send + Sync {
    fn open(&self, endpoint: &ServerEndpoint) -> Arc<dyn Channel>;
}

/// Connector backed by the shared workspace identity.
#[derive(Clone)]
pub struct WorkspaceConnector {
    identity: Arc<WorkspaceIdentity>,
    options: HttpOptions,
}

impl WorkspaceConnector {
    pub fn new(identity: Arc<WorkspaceIdentity>) -> Self {
        Self {
            identity,
            options: HttpOptions::default(),
        }
    }

    /// Override HTTP client options (timeouts, user agent).
    pub fn with_options(mut self, options: HttpOptions) -> Self {
        self.options = options;
        self
    }

    pub fn identity(&self) -> &Arc<WorkspaceIdentity> {
        &self.identity
    }
}

impl Connector for WorkspaceConnector {
    fn open(&self, endpoint: &ServerEndpoint) -> Arc<dyn Channel> {
        let credentials: Arc<dyn CredentialProvider> = self.identity.clone();
        match endpoint.kind() {
            ChannelKind::Managed => Arc::new(ManagedChannel::new(
                endpoint.clone(),
                credentials,
                self.options.clone(),
            )),
            ChannelKind::Custom => Arc::new(CustomChannel::new(
                endpoint.clone(),
                credentials,
                self.options.clone(),
            )),
        }
    }
}
