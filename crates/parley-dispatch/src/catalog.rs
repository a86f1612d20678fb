use parley_llm::{ModelFamily, RequestShape};
use parley_persist::{AccessTier, CatalogStore, ModelProfile, PersistError, UserModelSelection};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Most suggestions returned for a name fragment
pub const MAX_SUGGESTIONS: usize = 25;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Model '{name}' not found")]
    NotFound {
        name: String,
        /// Enabled model names, for the "did you mean" reply.
        /// Filled by `select` only.
        available: Vec<String>,
    },

    #[error("Catalog store error: {0}")]
    Store(#[from] PersistError),
}

/// Outcome of an access check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allowed,
    Denied,
}

/// Listing entry for an enabled model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelSummary {
    pub name: String,
    pub provider_id: String,
    pub access_tier: AccessTier,
    pub family: ModelFamily,
}

/// One row of the family table: any pattern found in a provider id selects `family`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeRule {
    pub family: ModelFamily,
    pub patterns: Vec<String>,
}

impl ShapeRule {
    pub fn new(family: ModelFamily, patterns: &[&str]) -> Self {
        Self {
            family,
            patterns: patterns.iter().map(|p| p.to_lowercase()).collect(),
        }
    }

    fn matches(&self, provider_id: &str) -> bool {
        self.patterns
            .iter()
            .any(|p| provider_id.contains(&p.to_lowercase()))
    }
}

/// Ordered family lookup; first matching rule wins, no match means default
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeTable {
    rules: Vec<ShapeRule>,
}

impl ShapeTable {
    pub fn new(rules: Vec<ShapeRule>) -> Self {
        Self { rules }
    }

    pub fn family(&self, provider_id: &str) -> ModelFamily {
        let id = provider_id.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.matches(&id))
            .map(|rule| rule.family)
            .unwrap_or(ModelFamily::Default)
    }

    pub fn shape(&self, provider_id: &str) -> RequestShape {
        RequestShape::for_family(self.family(provider_id))
    }
}

impl Default for ShapeTable {
    fn default() -> Self {
        // Reasoning first: ids like "qwen/qvq-vision-thinking" want the reasoning budget
        Self::new(vec![
            ShapeRule::new(
                ModelFamily::Reasoning,
                &["deepseek-r1", "/o1", "/o3", "/o4", "qwq", "thinking", "reasoner"],
            ),
            ShapeRule::new(
                ModelFamily::Vision,
                &["vision", "gpt-4o", "claude-3", "gemini", "pixtral", "llava", "-vl"],
            ),
        ])
    }
}

/// Model lookup, access checks and per-user selection.
///
/// Holds no cache: every call reads the store.
#[derive(Clone)]
pub struct ModelCatalog {
    store: Arc<dyn CatalogStore>,
    shapes: ShapeTable,
}

impl ModelCatalog {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self {
            store,
            shapes: ShapeTable::default(),
        }
    }

    pub fn with_shapes(mut self, shapes: ShapeTable) -> Self {
        self.shapes = shapes;
        self
    }

    /// Profile by display name, enabled or not
    pub async fn resolve(&self, model_name: &str) -> Result<ModelProfile, CatalogError> {
        match self.store.model_by_name(model_name).await? {
            Some(profile) => Ok(profile),
            None => Err(CatalogError::NotFound {
                name: model_name.to_string(),
                available: Vec::new(),
            }),
        }
    }

    pub async fn authorize(
        &self,
        profile: &ModelProfile,
        requester: &str,
    ) -> Result<Access, CatalogError> {
        match profile.access_tier {
            AccessTier::Public => Ok(Access::Allowed),
            AccessTier::Restricted => {
                if self.store.is_allowlisted(requester).await? {
                    Ok(Access::Allowed)
                } else {
                    tracing::debug!(
                        model = %profile.name,
                        requester = %requester,
                        "Requester not on allow-list for restricted model"
                    );
                    Ok(Access::Denied)
                }
            }
        }
    }

    pub fn request_shape(&self, profile: &ModelProfile) -> RequestShape {
        self.shapes.shape(&profile.provider_id)
    }

    pub async fn available(&self) -> Result<Vec<ModelSummary>, CatalogError> {
        let models = self.store.enabled_models().await?;
        Ok(models
            .into_iter()
            .map(|m| ModelSummary {
                family: self.shapes.family(&m.provider_id),
                name: m.name,
                provider_id: m.provider_id,
                access_tier: m.access_tier,
            })
            .collect())
    }

    /// Point a user at an enabled model
    pub async fn select(
        &self,
        user_id: &str,
        model_name: &str,
    ) -> Result<ModelProfile, CatalogError> {
        let profile = match self.store.model_by_name(model_name).await? {
            Some(profile) if profile.is_enabled => profile,
            _ => return Err(self.not_found_with_choices(model_name).await),
        };

        self.store.save_selection(user_id, &profile.name).await?;
        tracing::info!(user_id = %user_id, model = %profile.name, "Model selection changed");

        Ok(profile)
    }

    /// Enabled names containing `fragment`, case-insensitive, capped at [`MAX_SUGGESTIONS`]
    pub async fn suggest(&self, fragment: &str) -> Result<Vec<String>, CatalogError> {
        let needle = fragment.to_lowercase();
        let models = self.store.enabled_models().await?;
        Ok(models
            .into_iter()
            .map(|m| m.name)
            .filter(|name| name.to_lowercase().contains(&needle))
            .take(MAX_SUGGESTIONS)
            .collect())
    }

    pub async fn current_selection(
        &self,
        user_id: &str,
    ) -> Result<Option<UserModelSelection>, CatalogError> {
        Ok(self.store.selection(user_id).await?)
    }

    async fn not_found_with_choices(&self, name: &str) -> CatalogError {
        let available = match self.store.enabled_models().await {
            Ok(models) => models.into_iter().map(|m| m.name).collect(),
            Err(_) => Vec::new(),
        };
        CatalogError::NotFound {
            name: name.to_string(),
            available,
        }
    }
}
