use super::{ConfigurationError, ModuleDescriptor};

/// Ordered candidate descriptors, aggregated from one or more discovery sources
///
/// The catalog keeps every descriptor it is given, duplicates included;
/// deduplication by identity happens during resolution so that the first
/// occurrence across sources wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleCatalog {
    descriptors: Vec<ModuleDescriptor>,
}

impl ModuleCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a catalog from a JSON array of descriptors
    pub fn from_json(json: &str) -> Result<Self, ConfigurationError> {
        let descriptors: Vec<ModuleDescriptor> = serde_json::from_str(json)?;
        Ok(Self { descriptors })
    }

    pub fn push(&mut self, descriptor: ModuleDescriptor) -> &mut Self {
        self.descriptors.push(descriptor);
        self
    }

    /// Append the descriptors of another source after the current ones
    pub fn aggregate(&mut self, source: impl IntoIterator<Item = ModuleDescriptor>) -> &mut Self {
        self.descriptors.extend(source);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.descriptors.iter().any(|d| d.name() == name)
    }

    pub fn descriptors(&self) -> &[ModuleDescriptor] {
        &self.descriptors
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ModuleDescriptor> {
        self.descriptors.iter()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

impl FromIterator<ModuleDescriptor> for ModuleCatalog {
    fn from_iter<I: IntoIterator<Item = ModuleDescriptor>>(iter: I) -> Self {
        Self {
            descriptors: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ModuleCatalog {
    type Item = &'a ModuleDescriptor;
    type IntoIter = std::slice::Iter<'a, ModuleDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
