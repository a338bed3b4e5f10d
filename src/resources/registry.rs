use super::{RawResource, Resource, ResourceContext};
use crate::core::{ResourceKind, StitchError};
use anyhow::Result;
use std::collections::HashSet;
use tracing::warn;

/// The resources of one project, in `.yyp` order.
#[derive(Debug, Default)]
pub struct ResourceRegistry {
    resources: Vec<Resource>,
}

impl ResourceRegistry {
    /// Hydrate raw `.yyp` entries.
    ///
    /// Entries repeating an earlier name are dropped with a warning. An entry
    /// whose kind is unknown, or whose descriptor cannot be read, fails the
    /// whole load.
    pub fn hydrate(raw: Vec<RawResource>, ctx: &ResourceContext) -> Result<Self> {
        let total = raw.len();
        let mut seen = HashSet::new();
        let mut resources = Vec::with_capacity(total);
        for entry in raw {
            if !seen.insert(entry.id.name.clone()) {
                continue;
            }
            resources.push(Resource::load(entry, ctx)?);
        }
        let removed = total - resources.len();
        if removed > 0 {
            warn!("Duplicate resources found: {} duplicates removed", removed);
        }
        Ok(Self { resources })
    }

    /// Raw entries for the `.yyp`, in registry order.
    #[must_use]
    pub fn dehydrate(&self) -> Vec<RawResource> {
        self.resources.iter().map(Resource::to_raw).collect()
    }

    fn position(&self, name: &str, kind: Option<ResourceKind>) -> Result<Option<usize>> {
        for (i, resource) in self.resources.iter().enumerate() {
            if kind.is_some_and(|k| k != resource.kind()) {
                continue;
            }
            match resource.is_named(name) {
                Some(m) if m.exact => return Ok(Some(i)),
                Some(_) => {
                    return Err(StitchError::NameCaseMismatch {
                        found: resource.name().to_string(),
                        expected: name.to_string(),
                    }
                    .into());
                }
                None => {}
            }
        }
        Ok(None)
    }

    /// Find a resource by exact name, optionally restricted to one kind.
    ///
    /// A resource whose name differs only by case is an error, never a match.
    pub fn find_by_name(&self, name: &str, kind: Option<ResourceKind>) -> Result<Option<&Resource>> {
        Ok(self.position(name, kind)?.map(|i| &self.resources[i]))
    }

    /// Mutable variant of [`ResourceRegistry::find_by_name`].
    pub fn find_by_name_mut(
        &mut self,
        name: &str,
        kind: Option<ResourceKind>,
    ) -> Result<Option<&mut Resource>> {
        Ok(self.position(name, kind)?.map(|i| &mut self.resources[i]))
    }

    /// Resources in `folder`, or anywhere below it when `recursive`.
    pub fn filter_by_folder<'a>(
        &'a self,
        folder: &'a str,
        recursive: bool,
    ) -> impl Iterator<Item = &'a Resource> + 'a {
        self.resources.iter().filter(move |r| r.is_in_folder(folder, recursive))
    }

    /// Resources of one kind.
    pub fn filter_by_kind(&self, kind: ResourceKind) -> impl Iterator<Item = &Resource> {
        self.resources.iter().filter(move |r| r.kind() == kind)
    }

    /// Every resource.
    pub fn iter(&self) -> std::slice::Iter<'_, Resource> {
        self.resources.iter()
    }

    /// Every resource, mutably.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Resource> {
        self.resources.iter_mut()
    }

    /// Add a resource. An existing resource with the same name is replaced.
    pub fn push(&mut self, resource: Resource) {
        match self.resources.iter().position(|r| r.name() == resource.name()) {
            Some(i) => self.resources[i] = resource,
            None => self.resources.push(resource),
        }
    }

    /// Remove a resource by exact name and return it.
    pub fn remove(&mut self, name: &str) -> Result<Option<Resource>> {
        Ok(self.position(name, None)?.map(|i| self.resources.remove(i)))
    }

    /// Number of resources.
    #[must_use]
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Whether there are no resources.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

impl<'a> IntoIterator for &'a ResourceRegistry {
    type Item = &'a Resource;
    type IntoIter = std::slice::Iter<'a, Resource>;

    fn into_iter(self) -> Self::IntoIter {
        self.resources.iter()
    }
}
