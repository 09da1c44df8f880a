//! Authenticator catalog
//!
//! Explicit registry of backend types, populated by the host at startup.
//! References are resolved against it once, at construction time.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::domain::authenticator::{
    Authenticator, BackendError, BackendInit, ConfigurableAuthenticator,
};
use crate::error::{MultiAuthError, MultiAuthResult};

/// Builds one backend instance from its init record
pub type BackendFactory =
    Arc<dyn Fn(&BackendInit) -> Result<Box<dyn Authenticator>, BackendError> + Send + Sync>;

/// How a configured backend names its type
#[derive(Clone)]
pub enum BackendReference {
    /// Catalog key or registered alias
    Named(String),
    /// Factory supplied directly, bypassing the catalog
    Direct { name: String, factory: BackendFactory },
}

impl BackendReference {
    /// Direct reference to a concrete backend type
    pub fn of<A: ConfigurableAuthenticator>() -> Self {
        Self::Direct {
            name: std::any::type_name::<A>().to_string(),
            factory: factory_for::<A>(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Named(name) | Self::Direct { name, .. } => name,
        }
    }
}

impl fmt::Debug for BackendReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => f.debug_tuple("Named").field(name).finish(),
            Self::Direct { name, .. } => f.debug_struct("Direct").field("name", name).finish(),
        }
    }
}

impl From<&str> for BackendReference {
    fn from(name: &str) -> Self {
        Self::Named(name.to_string())
    }
}

impl From<String> for BackendReference {
    fn from(name: String) -> Self {
        Self::Named(name)
    }
}

/// A reference after resolution: canonical name plus factory
#[derive(Clone)]
pub struct ResolvedBackend {
    pub name: String,
    factory: BackendFactory,
}

impl ResolvedBackend {
    pub fn instantiate(&self, init: &BackendInit) -> Result<Box<dyn Authenticator>, BackendError> {
        (self.factory)(init)
    }
}

impl fmt::Debug for ResolvedBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedBackend")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

fn factory_for<A: ConfigurableAuthenticator>() -> BackendFactory {
    Arc::new(
        |init: &BackendInit| -> Result<Box<dyn Authenticator>, BackendError> {
            let backend = A::from_init(init)?;
            Ok(Box::new(backend))
        },
    )
}

#[derive(Clone, Default)]
pub struct AuthenticatorCatalog {
    factories: HashMap<String, BackendFactory>,
    aliases: HashMap<String, String>,
}

impl AuthenticatorCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory under `name`, replacing any previous one
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(&BackendInit) -> Result<Box<dyn Authenticator>, BackendError>
            + Send
            + Sync
            + 'static,
    {
        self.factories.insert(name.into(), Arc::new(factory));
        self
    }

    /// Register a backend type under `name`
    pub fn register_type<A: ConfigurableAuthenticator>(
        &mut self,
        name: impl Into<String>,
    ) -> &mut Self {
        self.factories.insert(name.into(), factory_for::<A>());
        self
    }

    /// Make `alias` (e.g. a fully qualified type path) resolve to `target`
    pub fn alias(&mut self, alias: impl Into<String>, target: impl Into<String>) -> &mut Self {
        self.aliases.insert(alias.into(), target.into());
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name) || self.aliases.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Resolve a reference: catalog name, then alias, then direct factory
    pub fn resolve(&self, reference: &BackendReference) -> MultiAuthResult<ResolvedBackend> {
        match reference {
            BackendReference::Named(name) => {
                if let Some(factory) = self.factories.get(name) {
                    return Ok(ResolvedBackend {
                        name: name.clone(),
                        factory: factory.clone(),
                    });
                }
                let target = self.aliases.get(name).ok_or_else(|| {
                    tracing::error!(reference = %name, known = ?self.names(), "Unknown authenticator");
                    MultiAuthError::Resolution {
                        reference: name.clone(),
                    }
                })?;
                let factory = self
                    .factories
                    .get(target)
                    .ok_or_else(|| MultiAuthError::Resolution {
                        reference: name.clone(),
                    })?;
                Ok(ResolvedBackend {
                    name: target.clone(),
                    factory: factory.clone(),
                })
            }
            BackendReference::Direct { name, factory } => Ok(ResolvedBackend {
                name: name.clone(),
                factory: factory.clone(),
            }),
        }
    }
}

impl fmt::Debug for AuthenticatorCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthenticatorCatalog")
            .field("names", &self.names())
            .field("aliases", &self.aliases)
            .finish()
    }
}
