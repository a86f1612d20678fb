use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Broad model families that get distinct generation defaults
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelFamily {
    Reasoning,
    Vision,
    Default,
}

/// Per-model generation parameters sent with every completion request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestShape {
    pub family: ModelFamily,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub supports_images: bool,
    /// Family-specific body fields, merged into the top level of the request
    #[serde(default)]
    pub extra: Map<String, Value>,
}

impl RequestShape {
    /// Built-in defaults for a family
    pub fn for_family(family: ModelFamily) -> Self {
        match family {
            ModelFamily::Reasoning => {
                let mut extra = Map::new();
                extra.insert(
                    "reasoning".to_string(),
                    serde_json::json!({ "effort": "medium" }),
                );
                Self {
                    family,
                    max_tokens: 4000,
                    temperature: 1.0,
                    top_p: 1.0,
                    supports_images: false,
                    extra,
                }
            }
            ModelFamily::Vision => Self {
                family,
                max_tokens: 1500,
                temperature: 0.7,
                top_p: 0.9,
                supports_images: true,
                extra: Map::new(),
            },
            ModelFamily::Default => Self {
                family,
                max_tokens: 1000,
                temperature: 0.7,
                top_p: 1.0,
                supports_images: false,
                extra: Map::new(),
            },
        }
    }

    pub fn max_tokens(mut self, tokens: u32) -> Self {
        self.max_tokens = tokens;
        self
    }

    pub fn temperature(mut self, temp: f32) -> Self {
        self.temperature = temp;
        self
    }

    pub fn top_p(mut self, top_p: f32) -> Self {
        self.top_p = top_p;
        self
    }

    pub fn extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

impl Default for RequestShape {
    fn default() -> Self {
        Self::for_family(ModelFamily::Default)
    }
}
