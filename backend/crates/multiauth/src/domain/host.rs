//! Host application view
//!
//! What the composite reads from the host: the hub base URL, the settings
//! mapping handlers consult, and the template variables pages render with.

use platform::url_path::url_path_join;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Hub-level facts exposed to handlers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HubInfo {
    /// Application root, e.g. `/hub/`
    pub base_url: String,
}

/// Settings mapping shared by request handlers.
///
/// Cloning yields a shallow copy; handler views override single entries on
/// the copy and never touch the host's instance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settings {
    pub hub: HubInfo,
    /// Where pages send users who need to sign in
    pub login_url: String,
    /// Host-specific entries the composite passes through untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Settings {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            login_url: url_path_join(&[base_url.as_str(), "login"]),
            hub: HubInfo { base_url },
            extra: Map::new(),
        }
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    pub fn hub_base_url(&self) -> &str {
        &self.hub.base_url
    }
}

/// Variables handed to template rendering
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateNamespace(Map<String, Value>);

impl TemplateNamespace {
    pub const BASE_URL: &'static str = "base_url";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// `base_url` entry, if it is a string
    pub fn base_url(&self) -> Option<&str> {
        self.get(Self::BASE_URL).and_then(Value::as_str)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for TemplateNamespace {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Host application handle passed to backends when they build routes
#[derive(Debug, Clone, PartialEq)]
pub struct HostApp {
    pub settings: Settings,
    pub template_namespace: TemplateNamespace,
}

impl HostApp {
    /// Host rooted at `base_url` with default settings and template variables
    pub fn new(base_url: impl Into<String>) -> Self {
        let settings = Settings::new(base_url);
        let template_namespace =
            TemplateNamespace::new().with(TemplateNamespace::BASE_URL, settings.hub_base_url());
        Self {
            settings,
            template_namespace,
        }
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_template_namespace(mut self, namespace: TemplateNamespace) -> Self {
        self.template_namespace = namespace;
        self
    }

    pub fn base_url(&self) -> &str {
        self.settings.hub_base_url()
    }
}
