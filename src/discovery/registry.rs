use super::DiscoveryError;
use crate::autoconfigure::ModuleDescriptor;
use crate::module::AutoModule;
use std::collections::{HashMap, HashSet};
use std::fmt;

type Factory<T> = Box<dyn Fn() -> T + Send + Sync>;

/// Maps discovered identities to constructors
///
/// Discovery only yields names; the registry turns them into values, in the
/// order they were discovered.
pub struct FactoryRegistry<T> {
    factories: HashMap<String, Factory<T>>,
}

impl<T> Default for FactoryRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FactoryRegistry<T> {
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register a constructor; a later registration under the same name wins
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Box::new(factory));
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Construct one value per distinct name, keeping the first occurrence
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::UnknownFactory`] for the first name with no
    /// registered constructor.
    pub fn instantiate(&self, key: &str, names: &[String]) -> Result<Vec<T>, DiscoveryError> {
        let mut seen = HashSet::new();
        let mut instances = Vec::with_capacity(names.len());

        for name in names {
            if !seen.insert(name.as_str()) {
                continue;
            }
            let factory = self
                .factories
                .get(name)
                .ok_or_else(|| DiscoveryError::unknown_factory(key, name))?;
            instances.push(factory());
        }

        Ok(instances)
    }
}

impl FactoryRegistry<ModuleDescriptor> {
    /// Register an auto module under its own name
    pub fn register_module<M: AutoModule + 'static>(&mut self) -> &mut Self {
        self.register(M::NAME, M::descriptor)
    }
}

impl<T> fmt::Debug for FactoryRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.factories.keys().collect();
        names.sort();
        f.debug_struct("FactoryRegistry")
            .field("factories", &names)
            .finish()
    }
}
