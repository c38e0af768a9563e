//! Activation resolver
//!
//! Turns a catalog of candidate modules into the ordered list of modules that
//! should be materialized for this run.

use super::condition::{Condition, EvaluationContext, first_unmatched};
use super::{ConfigurationError, ExclusionRequest, ModuleCatalog, ModuleDescriptor};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};

/// A module dropped because one of its conditions did not hold
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionOutcome {
    pub module: String,
    /// The first condition that failed; later ones were not evaluated
    pub condition: Condition,
}

/// Why candidates did not make it into the result
///
/// Each identity appears at most once, and never in both lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivationReport {
    pub excluded: Vec<String>,
    pub unmatched: Vec<ConditionOutcome>,
}

impl ActivationReport {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Ordered identities of the modules to activate
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivationResult {
    modules: Vec<String>,
    report: ActivationReport,
}

impl ActivationResult {
    pub fn modules(&self) -> &[String] {
        &self.modules
    }

    pub fn into_modules(self) -> Vec<String> {
        self.modules
    }

    pub fn report(&self) -> &ActivationReport {
        &self.report
    }

    pub fn contains(&self, name: &str) -> bool {
        self.modules.iter().any(|m| m == name)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

/// Filters and orders auto modules
///
/// Resolution is a pure function of its inputs: the same catalog, exclusions
/// and environment always give the same result.
///
/// # Example
///
/// ```
/// use meshestra_boot::autoconfigure::{
///     ActivationResolver, ExclusionRequest, ModuleCatalog, ModuleDescriptor, StaticEnvironment,
/// };
///
/// let catalog: ModuleCatalog = vec![
///     ModuleDescriptor::new("A").order(0),
///     ModuleDescriptor::new("B").order(10).after("A"),
///     ModuleDescriptor::new("C").order(5),
/// ]
/// .into_iter()
/// .collect();
///
/// let result = ActivationResolver::new()
///     .resolve(&catalog, &ExclusionRequest::new(), &StaticEnvironment::new())
///     .unwrap();
///
/// assert_eq!(result.modules(), ["A", "C", "B"]);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ActivationResolver;

impl ActivationResolver {
    pub fn new() -> Self {
        Self
    }

    /// Resolve the catalog into an ordered activation list
    ///
    /// # Errors
    ///
    /// Fails with [`ConfigurationError::ExcludedIdentityNotFound`] when a
    /// strong exclusion matches nothing, and with
    /// [`ConfigurationError::CyclicOrderingConstraint`] when the surviving
    /// modules cannot be ordered.
    pub fn resolve(
        &self,
        catalog: &ModuleCatalog,
        exclusions: &ExclusionRequest,
        environment: &dyn EvaluationContext,
    ) -> Result<ActivationResult, ConfigurationError> {
        Self::check_exclusions(catalog, exclusions)?;

        let mut report = ActivationReport::default();
        let mut reported: HashSet<&str> = HashSet::new();
        let mut survivors: Vec<&ModuleDescriptor> = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();

        for descriptor in catalog {
            let name = descriptor.name();

            if exclusions.is_excluded(name) {
                if reported.insert(name) {
                    tracing::debug!("Excluded auto module: {}", name);
                    report.excluded.push(name.to_string());
                }
                continue;
            }

            if let Some(condition) = first_unmatched(descriptor.conditions(), environment) {
                if reported.insert(name) {
                    tracing::debug!("Auto module {} skipped: {} did not match", name, condition);
                    report.unmatched.push(ConditionOutcome {
                        module: name.to_string(),
                        condition: condition.clone(),
                    });
                }
                continue;
            }

            if seen.insert(name) {
                survivors.push(descriptor);
            }
        }

        // A later duplicate may have matched after the first was reported.
        report.unmatched.retain(|o| !seen.contains(o.module.as_str()));

        let modules = Self::sort(&survivors)?;

        tracing::info!(
            "Resolved {} of {} auto modules ({} excluded, {} unmatched)",
            modules.len(),
            catalog.len(),
            report.excluded.len(),
            report.unmatched.len()
        );

        Ok(ActivationResult { modules, report })
    }

    fn check_exclusions(
        catalog: &ModuleCatalog,
        exclusions: &ExclusionRequest,
    ) -> Result<(), ConfigurationError> {
        let missing: Vec<&String> = exclusions
            .strong_references()
            .iter()
            .filter(|name| !catalog.contains(name))
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            tracing::error!("Invalid auto module exclusions: {:?}", missing);
            Err(ConfigurationError::excluded_not_found(missing.into_iter().cloned()))
        }
    }

    /// Kahn's algorithm over the surviving modules
    ///
    /// Among ready modules the lowest `(order, position)` goes next, so
    /// unconstrained modules with equal order keep their catalog order.
    fn sort(survivors: &[&ModuleDescriptor]) -> Result<Vec<String>, ConfigurationError> {
        let position: HashMap<&str, usize> = survivors
            .iter()
            .enumerate()
            .map(|(i, d)| (d.name(), i))
            .collect();

        // successors[i] must come after i
        let mut successors: Vec<BTreeSet<usize>> = vec![BTreeSet::new(); survivors.len()];
        for (i, descriptor) in survivors.iter().enumerate() {
            for name in descriptor.after_names() {
                if let Some(&j) = position.get(name.as_str()) {
                    successors[j].insert(i);
                }
            }
            for name in descriptor.before_names() {
                if let Some(&j) = position.get(name.as_str()) {
                    successors[i].insert(j);
                }
            }
        }

        let mut in_degree = vec![0usize; survivors.len()];
        for edges in &successors {
            for &j in edges {
                in_degree[j] += 1;
            }
        }

        let mut ready: BTreeSet<(i32, usize)> = in_degree
            .iter()
            .enumerate()
            .filter(|(_, degree)| **degree == 0)
            .map(|(i, _)| (survivors[i].ordering(), i))
            .collect();

        let mut sorted = Vec::with_capacity(survivors.len());
        let mut placed = vec![false; survivors.len()];

        while let Some((_, i)) = ready.pop_first() {
            sorted.push(i);
            placed[i] = true;
            for &j in &successors[i] {
                in_degree[j] -= 1;
                if in_degree[j] == 0 {
                    ready.insert((survivors[j].ordering(), j));
                }
            }
        }

        if sorted.len() != survivors.len() {
            let cycle = Self::find_cycle(&successors, &placed)
                .into_iter()
                .map(|i| survivors[i].name().to_string())
                .collect::<Vec<_>>();
            tracing::error!("Cyclic auto module ordering: {:?}", cycle);
            return Err(ConfigurationError::CyclicOrderingConstraint(cycle));
        }

        Ok(sorted
            .into_iter()
            .map(|i| survivors[i].name().to_string())
            .collect())
    }

    /// Walk predecessors among unplaced nodes until one repeats
    ///
    /// Every unplaced node still has an unplaced predecessor, so the walk
    /// always closes a cycle. The cycle is returned in constraint order,
    /// starting from its lowest position.
    fn find_cycle(successors: &[BTreeSet<usize>], placed: &[bool]) -> Vec<usize> {
        let mut predecessors: Vec<Vec<usize>> = vec![Vec::new(); successors.len()];
        for (i, edges) in successors.iter().enumerate() {
            for &j in edges {
                predecessors[j].push(i);
            }
        }

        let Some(start) = placed.iter().position(|p| !p) else {
            return Vec::new();
        };

        let mut visited: HashMap<usize, usize> = HashMap::new();
        let mut path = Vec::new();
        let mut current = start;

        loop {
            if let Some(&at) = visited.get(&current) {
                let mut cycle = path.split_off(at);
                cycle.reverse();
                let lowest = cycle
                    .iter()
                    .enumerate()
                    .min_by_key(|(_, n)| **n)
                    .map_or(0, |(k, _)| k);
                cycle.rotate_left(lowest);
                return cycle;
            }
            visited.insert(current, path.len());
            path.push(current);

            match predecessors[current].iter().copied().find(|&p| !placed[p]) {
                Some(next) => current = next,
                None => return path,
            }
        }
    }
}
