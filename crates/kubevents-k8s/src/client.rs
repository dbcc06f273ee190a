use anyhow::{Context, Result, bail};
use kube::config::{KubeConfigOptions, Kubeconfig};

/// Kubernetes client wrapper
pub struct KubeClient {
    kubeconfig: Kubeconfig,
    current_context: Option<String>,
}

impl KubeClient {
    /// Create a new KubeClient by loading the kubeconfig
    pub fn new() -> Result<Self> {
        let kubeconfig =
            Kubeconfig::read().context("Failed to read kubeconfig. Is kubectl configured?")?;

        let current_context = kubeconfig.current_context.clone();

        Ok(Self {
            kubeconfig,
            current_context,
        })
    }

    /// Get all available context names from kubeconfig
    pub fn contexts(&self) -> Vec<String> {
        self.kubeconfig
            .contexts
            .iter()
            .map(|ctx| ctx.name.clone())
            .collect()
    }

    /// Get the current context name
    pub fn current_context(&self) -> Option<&str> {
        self.current_context.as_deref()
    }

    /// Create a kube::Client for the named context, falling back to the
    /// kubeconfig's current context
    pub async fn connect(&self, context: Option<&str>) -> Result<kube::Client> {
        let Some(context_name) = context.or_else(|| self.current_context()) else {
            bail!("No context selected; pass --context or set a current context in kubeconfig");
        };

        if !self.kubeconfig.contexts.iter().any(|c| c.name == context_name) {
            bail!(
                "Context '{}' not found in kubeconfig (available: {})",
                context_name,
                self.contexts().join(", ")
            );
        }

        let config = kube::Config::from_custom_kubeconfig(
            self.kubeconfig.clone(),
            &KubeConfigOptions {
                context: Some(context_name.to_string()),
                ..Default::default()
            },
        )
        .await
        .context(format!(
            "Failed to create config for context: {}",
            context_name
        ))?;

        let client = kube::Client::try_from(config).context(format!(
            "Failed to create client for context: {}",
            context_name
        ))?;

        tracing::debug!(context = context_name, "connected to cluster");
        Ok(client)
    }
}
