//! Factories files
//!
//! A factories file maps well-known keys to ordered lists of identities:
//!
//! ```text
//! # Auto modules
//! meshestra.boot.AutoModule=\
//!   app::DataSourceModule,\
//!   app::JdbcModule
//! meshestra.boot.RunListener=app::StartupMetrics
//! ```
//!
//! Lines starting with `#` or `!` are comments, `=` or `:` separates the key
//! from its comma-separated values, and a trailing `\` continues the entry on
//! the next line. A key that appears twice appends to its earlier values.

use super::DiscoveryError;
use std::collections::BTreeMap;
use std::path::Path;

/// One parsed factories file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FactoriesFile {
    origin: String,
    entries: BTreeMap<String, Vec<String>>,
}

impl FactoriesFile {
    /// Parse factories text; `origin` names the source in errors and logs
    pub fn parse(origin: impl Into<String>, text: &str) -> Result<Self, DiscoveryError> {
        let mut file = Self {
            origin: origin.into(),
            entries: BTreeMap::new(),
        };

        let mut logical = String::new();
        let mut first_line = 0;

        for (index, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if logical.is_empty() {
                if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                    continue;
                }
                first_line = index + 1;
            }

            match line.strip_suffix('\\') {
                Some(continued) => logical.push_str(continued),
                None => {
                    logical.push_str(line);
                    file.insert(&logical, first_line)?;
                    logical.clear();
                }
            }
        }

        // continuation on the last line
        if !logical.is_empty() {
            file.insert(&logical, first_line)?;
        }

        Ok(file)
    }

    /// Read and parse a factories file from disk
    pub fn read(path: impl AsRef<Path>) -> Result<Self, DiscoveryError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| DiscoveryError::io(path, e))?;
        Self::parse(path.display().to_string(), &text)
    }

    fn insert(&mut self, entry: &str, line: usize) -> Result<(), DiscoveryError> {
        let (key, values) = match entry.find(['=', ':']) {
            Some(at) => (&entry[..at], &entry[at + 1..]),
            None => (entry, ""),
        };

        let key = key.trim();
        if key.is_empty() {
            return Err(DiscoveryError::parse(&self.origin, line, "entry has no key"));
        }

        self.entries.entry(key.to_string()).or_default().extend(
            values
                .split(',')
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string),
        );
        Ok(())
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Values listed under `key`, in file order
    pub fn values(&self, key: &str) -> &[String] {
        self.entries.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

/// Aggregates factories files in source order
#[derive(Debug, Clone, Default)]
pub struct FactoriesLoader {
    sources: Vec<FactoriesFile>,
}

impl FactoriesLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read every path in order; the first unreadable file aborts loading
    pub fn from_paths<I, P>(paths: I) -> Result<Self, DiscoveryError>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut loader = Self::new();
        for path in paths {
            loader.add_source(FactoriesFile::read(path)?);
        }
        Ok(loader)
    }

    pub fn add_source(&mut self, file: FactoriesFile) -> &mut Self {
        tracing::debug!("Registered factories source: {}", file.origin());
        self.sources.push(file);
        self
    }

    pub fn parse_source(&mut self, origin: &str, text: &str) -> Result<&mut Self, DiscoveryError> {
        let file = FactoriesFile::parse(origin, text)?;
        Ok(self.add_source(file))
    }

    /// Concatenate the values for `key` across all sources, duplicates kept
    pub fn load_names(&self, key: &str) -> Vec<String> {
        let names: Vec<String> = self
            .sources
            .iter()
            .flat_map(|source| source.values(key).iter().cloned())
            .collect();

        tracing::debug!(
            "Loaded {} names for {} from {} sources",
            names.len(),
            key,
            self.sources.len()
        );
        names
    }

    pub fn sources(&self) -> &[FactoriesFile] {
        &self.sources
    }
}
