// ABOUTME: McpRegistry - one discovery pass lists every configured server
// ABOUTME: concurrently and wraps each listed tool in an McpTool.

use std::collections::HashSet;
use std::sync::Arc;

use futures::future::join_all;

use crate::bridge;
use crate::channel::{Connector, ServerEndpoint};
use crate::error::{McpError, ToolError};
use crate::tool::McpTool;

/// What to do when two servers expose the same tool name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NamePolicy {
    /// Later duplicates are exposed as `<server_slug>__<name>`.
    #[default]
    QualifyDuplicates,
    /// Keep duplicates as-is; name-based dispatch becomes ambiguous.
    Keep,
}

/// A server whose tools could not be listed.
#[derive(Debug)]
pub struct EndpointFailure {
    pub endpoint: ServerEndpoint,
    pub error: McpError,
}

/// A tool whose name was already taken earlier in the pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameCollision {
    pub endpoint: ServerEndpoint,
    pub name: String,
    pub exposed_as: String,
}

/// Outcome of one discovery pass.
///
/// Tools are ordered managed endpoints first, then custom endpoints, each in
/// configuration order, and within one endpoint in the server's listing order.
#[derive(Debug, Default)]
pub struct Discovery {
    tools: Vec<McpTool>,
    failures: Vec<EndpointFailure>,
    collisions: Vec<NameCollision>,
}

impl Discovery {
    pub fn tools(&self) -> &[McpTool] {
        &self.tools
    }

    pub fn into_tools(self) -> Vec<McpTool> {
        self.tools
    }

    pub fn failures(&self) -> &[EndpointFailure] {
        &self.failures
    }

    pub fn collisions(&self) -> &[NameCollision] {
        &self.collisions
    }

    /// Look up a tool by its exposed name.
    pub fn get(&self, name: &str) -> Option<&McpTool> {
        self.tools.iter().find(|t| t.name() == name)
    }
}

/// Discovers tools across managed and custom MCP servers.
///
/// Stateless between passes: every call re-queries every endpoint and
/// builds fresh adapters.
#[derive(Clone)]
pub struct McpRegistry {
    connector: Arc<dyn Connector>,
    name_policy: NamePolicy,
}

impl McpRegistry {
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        Self {
            connector,
            name_policy: NamePolicy::default(),
        }
    }

    pub fn with_name_policy(mut self, policy: NamePolicy) -> Self {
        self.name_policy = policy;
        self
    }

    /// Run a discovery pass over managed and custom server URLs.
    pub async fn discover(&self, managed: &[String], custom: &[String]) -> Discovery {
        let endpoints: Vec<ServerEndpoint> = managed
            .iter()
            .map(|url| ServerEndpoint::managed(url.as_str()))
            .chain(custom.iter().map(|url| ServerEndpoint::custom(url.as_str())))
            .collect();

        self.discover_endpoints(&endpoints).await
    }

    /// Run a discovery pass over explicit endpoints, in the given order.
    pub async fn discover_endpoints(&self, endpoints: &[ServerEndpoint]) -> Discovery {
        // join_all yields in submission order regardless of completion order.
        let listings = join_all(endpoints.iter().map(|endpoint| async move {
            let channel = self.connector.open(endpoint);
            let outcome = channel.list_tools().await;
            (channel, outcome)
        }))
        .await;

        let mut discovery = Discovery::default();
        let mut taken = HashSet::new();

        for (channel, outcome) in listings {
            let endpoint = channel.endpoint().clone();
            match outcome {
                Ok(infos) => {
                    tracing::info!(endpoint = %endpoint.url(), kind = %endpoint.kind(), tools = infos.len(), "Listed MCP tools");
                    for info in infos {
                        if info.name.trim().is_empty() {
                            tracing::warn!(endpoint = %endpoint.url(), "Skipping tool with empty name");
                            continue;
                        }
                        let tool = McpTool::new(&info, Arc::clone(&channel));
                        self.admit(tool, &mut taken, &mut discovery);
                    }
                }
                Err(error) => {
                    tracing::error!(endpoint = %endpoint.url(), kind = %endpoint.kind(), error = %error, "Failed to list MCP tools");
                    discovery.failures.push(EndpointFailure { endpoint, error });
                }
            }
        }

        tracing::info!(
            tools = discovery.tools.len(),
            failures = discovery.failures.len(),
            collisions = discovery.collisions.len(),
            "Discovery pass complete"
        );
        discovery
    }

    /// Blocking form of [`McpRegistry::discover`] for synchronous callers.
    pub fn discover_blocking(
        &self,
        managed: &[String],
        custom: &[String],
    ) -> Result<Discovery, ToolError> {
        let registry = self.clone();
        let managed = managed.to_vec();
        let custom = custom.to_vec();
        bridge::block_on(async move { registry.discover(&managed, &custom).await })
    }

    fn admit(&self, tool: McpTool, taken: &mut HashSet<String>, discovery: &mut Discovery) {
        if taken.insert(tool.name().to_string()) {
            discovery.tools.push(tool);
            return;
        }

        let exposed_as = match self.name_policy {
            NamePolicy::Keep => tool.name().to_string(),
            NamePolicy::QualifyDuplicates => {
                let base = format!("{}__{}", tool.endpoint().slug(), tool.name());
                let mut candidate = base.clone();
                let mut n = 2;
                while taken.contains(&candidate) {
                    candidate = format!("{}_{}", base, n);
                    n += 1;
                }
                taken.insert(candidate.clone());
                candidate
            }
        };

        tracing::warn!(
            tool = %tool.name(),
            endpoint = %tool.endpoint().url(),
            exposed_as = %exposed_as,
            "Duplicate MCP tool name"
        );
        discovery.collisions.push(NameCollision {
            endpoint: tool.endpoint().clone(),
            name: tool.name().to_string(),
            exposed_as: exposed_as.clone(),
        });
        discovery.tools.push(tool.renamed(exposed_as));
    }
}
