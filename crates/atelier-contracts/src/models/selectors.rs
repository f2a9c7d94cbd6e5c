use super::registry::{ModelRegistry, ModelSpec};

/// Outcome of picking a model for one capability (`text` or `image`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSelection {
    pub model: ModelSpec,
    pub requested: Option<String>,
    /// Set whenever the chosen model is not the one the user asked for.
    pub fallback_reason: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ModelSelector {
    pub registry: ModelRegistry,
}

impl ModelSelector {
    pub fn new(registry: Option<ModelRegistry>) -> Self {
        Self {
            registry: registry.unwrap_or_else(|| ModelRegistry::new(None)),
        }
    }

    /// Resolves `requested` for `capability`, falling back to the first
    /// registered model that has it. Blank names and `auto` count as no
    /// request.
    pub fn select(
        &self,
        requested: Option<&str>,
        capability: &str,
    ) -> Result<ModelSelection, String> {
        let requested = requested
            .map(str::trim)
            .filter(|name| !name.is_empty() && !name.eq_ignore_ascii_case("auto"));

        if let Some(name) = requested {
            if let Some(model) = self.registry.ensure(name, capability) {
                return Ok(ModelSelection {
                    model,
                    requested: Some(name.to_string()),
                    fallback_reason: None,
                });
            }
        }

        let model = self
            .registry
            .by_capability(capability)
            .into_iter()
            .next()
            .ok_or_else(|| format!("No models available for capability '{capability}'."))?;
        let fallback_reason = match requested {
            Some(name) => {
                format!("Requested model '{name}' unavailable for capability '{capability}'.")
            }
            None => "No model specified; using default.".to_string(),
        };
        Ok(ModelSelection {
            model,
            requested: requested.map(str::to_string),
            fallback_reason: Some(fallback_reason),
        })
    }
}
