//! Application Configuration
//!
//! Configuration for the composite authenticator. Parsing is done with
//! serde; discovery of the file is left to the host.

use std::path::Path;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::application::catalog::BackendReference;
use crate::domain::value_object::scope::Scope;
use crate::error::{MultiAuthError, MultiAuthResult};

/// One configured backend
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "BackendSpecRepr")]
pub struct BackendSpec {
    pub backend: BackendReference,
    pub scope: Scope,
    /// Inline options, layered over the backend's parent config section
    pub options: Map<String, Value>,
}

impl BackendSpec {
    pub fn new(backend: impl Into<BackendReference>, scope: Scope) -> Self {
        Self {
            backend: backend.into(),
            scope,
            options: Map::new(),
        }
    }

    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }
}

/// Accepts either `["name", "scope"]` or `{"backend": .., "scope": .., "options": ..}`
#[derive(Deserialize)]
#[serde(untagged)]
enum BackendSpecRepr {
    Pair(String, String),
    Full {
        backend: String,
        #[serde(default)]
        scope: String,
        #[serde(default)]
        options: Map<String, Value>,
    },
}

impl TryFrom<BackendSpecRepr> for BackendSpec {
    type Error = MultiAuthError;

    fn try_from(repr: BackendSpecRepr) -> Result<Self, Self::Error> {
        let (backend, scope, options) = match repr {
            BackendSpecRepr::Pair(backend, scope) => (backend, scope, Map::new()),
            BackendSpecRepr::Full {
                backend,
                scope,
                options,
            } => (backend, scope, options),
        };
        Ok(Self {
            backend: BackendReference::Named(backend),
            scope: Scope::parse(&scope)?,
            options,
        })
    }
}

/// Parent configuration shared by all backends, keyed by catalog name
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct ParentConfig(Map<String, Value>);

impl ParentConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_section(mut self, name: impl Into<String>, section: Map<String, Value>) -> Self {
        self.0.insert(name.into(), Value::Object(section));
        self
    }

    /// Section for `name`; empty when missing or not an object
    pub fn section(&self, name: &str) -> Map<String, Value> {
        match self.0.get(name) {
            Some(Value::Object(section)) => section.clone(),
            _ => Map::new(),
        }
    }

    /// `name`'s section with `inline` entries overriding it
    pub fn merged(&self, name: &str, inline: &Map<String, Value>) -> Map<String, Value> {
        let mut options = self.section(name);
        for (key, value) in inline {
            options.insert(key.clone(), value.clone());
        }
        options
    }
}

/// Composite authenticator configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MultiAuthConfig {
    /// Application root; fallback redirects land here
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Aggregate login page, relative to the application root
    #[serde(default = "default_login_page_path")]
    pub login_page_path: String,
    /// Ordered backends; order is the login page order
    #[serde(default)]
    pub authenticators: Vec<BackendSpec>,
    #[serde(default)]
    pub backend_config: ParentConfig,
}

fn default_base_url() -> String {
    "/hub/".to_string()
}

fn default_login_page_path() -> String {
    "/login".to_string()
}

impl Default for MultiAuthConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            login_page_path: default_login_page_path(),
            authenticators: Vec::new(),
            backend_config: ParentConfig::default(),
        }
    }
}

impl MultiAuthConfig {
    pub fn from_json_str(json: &str) -> MultiAuthResult<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| MultiAuthError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> MultiAuthResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            MultiAuthError::InvalidConfig(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&json)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_authenticator(mut self, spec: BackendSpec) -> Self {
        self.authenticators.push(spec);
        self
    }

    pub fn with_backend_config(mut self, parent: ParentConfig) -> Self {
        self.backend_config = parent;
        self
    }

    pub fn validate(&self) -> MultiAuthResult<()> {
        if !self.base_url.starts_with('/') {
            return Err(MultiAuthError::InvalidConfig(format!(
                "base_url must be an absolute path, got '{}'",
                self.base_url
            )));
        }
        if !self.login_page_path.starts_with('/') {
            return Err(MultiAuthError::InvalidConfig(format!(
                "login_page_path must start with '/', got '{}'",
                self.login_page_path
            )));
        }
        Ok(())
    }
}
