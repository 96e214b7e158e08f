use std::collections::HashMap;
use std::sync::Arc;

use tracing::warn;

use super::{Middleware, Pipeline};
use crate::error::ValidationError;

/// Named middleware that routes refer to by name (`"auth|cors"`).
#[derive(Clone, Default)]
pub struct MiddlewareRegistry {
    units: HashMap<String, Arc<dyn Middleware>>,
}

impl MiddlewareRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `unit` under `name`, replacing any previous unit.
    pub fn register(&mut self, name: impl Into<String>, unit: Arc<dyn Middleware>) {
        let name = name.into();
        if self.units.insert(name.clone(), unit).is_some() {
            warn!(middleware = %name, "Replaced existing route middleware");
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn Middleware>> {
        self.units.get(name).map(Arc::clone)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.units.contains_key(name)
    }

    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.units.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Fail on the first name that is not registered.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] naming the unknown middleware.
    pub fn validate<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> Result<(), ValidationError> {
        for name in names {
            if !self.contains(name) {
                return Err(ValidationError::new(format!("unknown route middleware '{name}'")));
            }
        }
        Ok(())
    }

    /// Build a pipeline from route middleware names, in order.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when a name is not registered.
    pub fn pipeline(&self, names: &[String]) -> Result<Pipeline, ValidationError> {
        let units = names
            .iter()
            .map(|name| {
                self.get(name)
                    .ok_or_else(|| ValidationError::new(format!("unknown route middleware '{name}'")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Pipeline::new(units))
    }
}
