//! Bind Backends Use Case
//!
//! Resolves and constructs every configured backend, in order, and wraps
//! each in a [`BackendBinding`].

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::application::catalog::{AuthenticatorCatalog, BackendReference, ResolvedBackend};
use crate::application::config::MultiAuthConfig;
use crate::domain::authenticator::BackendInit;
use crate::domain::binding::BackendBinding;
use crate::error::{MultiAuthError, MultiAuthResult};

pub struct BindBackendsUseCase<'a> {
    catalog: &'a AuthenticatorCatalog,
}

impl<'a> BindBackendsUseCase<'a> {
    pub fn new(catalog: &'a AuthenticatorCatalog) -> Self {
        Self { catalog }
    }

    /// Build one binding per configured backend, preserving config order.
    ///
    /// Scopes are checked before anything is constructed. Backend
    /// construction errors are returned as the backend produced them.
    pub fn execute(&self, config: &MultiAuthConfig) -> MultiAuthResult<Vec<Arc<BackendBinding>>> {
        let mut seen = HashSet::new();
        for spec in &config.authenticators {
            if !seen.insert(spec.scope.as_str()) {
                return Err(MultiAuthError::DuplicateScope(spec.scope.to_string()));
            }
        }

        let mut resolved: HashMap<String, ResolvedBackend> = HashMap::new();
        let mut bindings = Vec::with_capacity(config.authenticators.len());

        for spec in &config.authenticators {
            let backend = match &spec.backend {
                BackendReference::Named(name) => match resolved.get(name) {
                    Some(hit) => hit.clone(),
                    None => {
                        let hit = self.catalog.resolve(&spec.backend)?;
                        resolved.insert(name.clone(), hit.clone());
                        hit
                    }
                },
                direct @ BackendReference::Direct { .. } => self.catalog.resolve(direct)?,
            };

            let options = config.backend_config.merged(&backend.name, &spec.options);
            let init = BackendInit::new(backend.name.clone(), spec.scope.clone(), options);

            let instance = backend.instantiate(&init).map_err(|e| {
                tracing::error!(
                    authenticator = %backend.name,
                    scope = %spec.scope,
                    error = %e,
                    "Authenticator construction failed"
                );
                MultiAuthError::Backend(e)
            })?;

            bindings.push(Arc::new(BackendBinding::new(
                backend.name,
                instance,
                spec.scope.clone(),
            )));
        }

        Ok(bindings)
    }
}
