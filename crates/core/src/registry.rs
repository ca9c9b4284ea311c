//! Registry of usable dynamic-subset chunks.
//!
//! Built after every job has reported. The artifact store is the source of truth:
//! a slice is registered only if its chunk exists with a non-zero size, whatever
//! the job reported.

use indexmap::IndexMap;
use log::warn;

use crate::{
    config::BuildConfig,
    jobs::{JobKey, JobReport},
    io::ArtifactStore,
    plan::FamilyPlan,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryEntry {
    pub slice: usize,
    pub unicode_range: String,
}

/// family slug → weight name → surviving slices in index order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    families: IndexMap<&'static str, IndexMap<&'static str, Vec<RegistryEntry>>>,
}

impl Registry {
    /// Filters every planned slice against the store.
    ///
    /// `report` only feeds diagnostics: a job that claimed success but left no
    /// usable artifact is logged as a write mismatch.
    pub fn build(
        config: &BuildConfig,
        plans: &[FamilyPlan],
        store: &dyn ArtifactStore,
        report: Option<&JobReport>,
    ) -> Self {
        let outcomes = report.map(JobReport::outcomes).unwrap_or_default();
        let mut registry = Registry::default();

        for plan in plans {
            let family = &plan.family;
            let weights = registry.families.entry(family.slug).or_default();

            for weight in &config.weights {
                let mut entries = Vec::new();
                for slice in &plan.slices {
                    let path = config.subset_artifact(family, weight, slice.index);
                    if store.size(&path).is_some_and(|size| size > 0) {
                        entries.push(RegistryEntry {
                            slice: slice.index,
                            unicode_range: slice.unicode_range.clone(),
                        });
                        continue;
                    }

                    let key =
                        JobKey { family: family.slug, weight: weight.name, slice: slice.index };
                    if outcomes.get(&key).is_some_and(|o| o.is_success()) {
                        warn!(
                            "Artifact write mismatch for {key}: {} is missing or empty",
                            path.display()
                        );
                    }
                }
                weights.insert(weight.name, entries);
            }
        }

        registry
    }

    pub fn entries(&self, family: &str, weight: &str) -> &[RegistryEntry] {
        self.families
            .get(family)
            .and_then(|weights| weights.get(weight))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn contains(&self, family: &str, weight: &str, slice: usize) -> bool {
        self.entries(family, weight).iter().any(|e| e.slice == slice)
    }

    /// Registered slices across all families and weights.
    pub fn len(&self) -> usize {
        self.families.values().flat_map(|weights| weights.values()).map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
