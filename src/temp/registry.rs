//! This module provides a registry that owns a heterogeneous set of temporary resources
//! (files and directories) and removes whatever it still owns when it is dropped.
//!
//! ### Key Features:
//! - **Exclusive ownership**: resources are created by the registry and addressed by `ElementId`.
//! - **Relocation and deletion**: members can be moved or destroyed through the registry.
//! - **Sweep**: entries destroyed directly through their own handle are dropped from the
//!   bookkeeping by `remove_destroyed()`.
//! - **Best-effort teardown**: `dispose()` tries every member, keeps going past failures and
//!   reports them instead of failing.
//! - **Auto‑cleanup**: on Drop the registry disposes its members (when is_auto_clean = true).

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::core::{DEFAULT_PREFIX, Location, Result, TempError, TempResource};
use crate::temp::{CleanupFailure, CleanupReport, ElementId, Resource, ResourceKind};

struct Element {
    id: ElementId,
    resource: Resource,
}

/// An owning collection of temporary files and directories.
///
/// Every member is created through `add_element()` and belongs to the registry until it is
/// deleted, forgotten or disposed. Members may also be destroyed directly via `get_mut()`;
/// `remove_destroyed()` reconciles the bookkeeping afterwards.
///
/// ### Usage notes:
/// - Not thread‑safe: share it behind a single `Mutex` guarding all operations.
/// - A resource must never be owned by two registries at once.
/// - Errors are returned as `TempError`; only `dispose()` never fails, it reports instead.
///
/// ### Example:
/// ```
/// use temp_kit::{Registry, ResourceKind, Location, TempResource};
///
/// let mut registry = Registry::new();
/// let log = registry.add_element(ResourceKind::File, Location::Generated).unwrap();
/// let work = registry.add_dir().unwrap();
///
/// let file = registry.get_mut(log).unwrap().as_file_mut().unwrap();
/// file.append_text("started").unwrap();
///
/// let target = registry.get(work).unwrap().path().join("run.log");
/// registry.move_element_to(log, &target).unwrap();
/// assert!(target.exists());
///
/// let report = registry.dispose();
/// assert!(report.is_clean());
/// assert!(registry.is_empty());
/// ```
pub struct Registry {
    entries: Vec<Element>,
    next_id: u64,
    temp_root: PathBuf, // host-related directory for generated locations
    prefix: String,
    is_auto_clean: bool,
}

impl Registry {
    /// Creates an empty registry that generates paths in the system temporary directory.
    /// By default, the `is_auto_clean` flag is set to `true`.
    pub fn new() -> Self {
        Self::in_dir(std::env::temp_dir())
    }

    /// Creates an empty registry that generates paths inside `root`.
    /// `root` is not created; it must exist by the time resources are added.
    pub fn in_dir<P: AsRef<Path>>(root: P) -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
            temp_root: root.as_ref().to_path_buf(),
            prefix: DEFAULT_PREFIX.to_string(),
            is_auto_clean: true,
        }
    }

    /// Directory used for `Location::Generated`.
    pub fn temp_root(&self) -> &Path {
        &self.temp_root
    }

    /// Changes the file name prefix of generated paths.
    pub fn set_prefix<S: Into<String>>(&mut self, prefix: S) {
        self.prefix = prefix.into();
    }

    /// Changes auto-clean flag.
    /// If auto-clean flag is true all owned resources will be removed on drop.
    pub fn set_auto_clean(&mut self, clean: bool) {
        self.is_auto_clean = clean;
    }

    /// Creates a resource of `kind` at `location` and takes ownership of it.
    ///
    /// # Returns
    /// * `Ok(ElementId)` - id of the new member.
    /// * `Err(TempError)` - `AlreadyExists`, `ParentNotFound` or an I/O failure.
    ///   The registry is left unchanged.
    pub fn add_element(&mut self, kind: ResourceKind, location: Location) -> Result<ElementId> {
        let path = location.resolve(&self.temp_root, &self.prefix);
        let resource = Resource::create_at(kind, path)?;

        let id = ElementId(self.next_id);
        self.next_id += 1;
        debug!(%id, ?kind, path = %resource.path().display(), "tracking temp resource");
        self.entries.push(Element { id, resource });

        Ok(id)
    }

    /// Creates a file with a generated name.
    pub fn add_file(&mut self) -> Result<ElementId> {
        self.add_element(ResourceKind::File, Location::Generated)
    }

    /// Creates a directory with a generated name.
    pub fn add_dir(&mut self) -> Result<ElementId> {
        self.add_element(ResourceKind::Directory, Location::Generated)
    }

    pub fn get(&self, id: ElementId) -> Option<&Resource> {
        self.entries
            .iter()
            .find(|e| e.id == id)
            .map(|e| &e.resource)
    }

    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut Resource> {
        self.entries
            .iter_mut()
            .find(|e| e.id == id)
            .map(|e| &mut e.resource)
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.position(id).is_some()
    }

    /// Moves a member to `new_path`.
    /// * `id` must be tracked by this registry, otherwise `NotTracked` returns.
    pub fn move_element_to<P: AsRef<Path>>(&mut self, id: ElementId, new_path: P) -> Result<()> {
        self.get_mut(id)
            .ok_or(TempError::NotTracked(id))?
            .relocate(new_path)
    }

    /// Destroys a member and stops tracking it.
    ///
    /// If the removal fails the member stays tracked and live, so the failure is
    /// visible and the call can be retried.
    pub fn delete_element(&mut self, id: ElementId) -> Result<()> {
        let index = self.position(id).ok_or(TempError::NotTracked(id))?;
        self.entries[index].resource.destroy()?;
        self.entries.remove(index);
        debug!(%id, "deleted temp resource");
        Ok(())
    }

    /// Stops tracking every member that was already destroyed outside the registry.
    /// Live members are untouched. Returns the number of removed entries.
    pub fn remove_destroyed(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| !e.resource.is_destroyed());
        let removed = before - self.entries.len();
        if removed > 0 {
            debug!(removed, "swept destroyed temp resources");
        }
        removed
    }

    /// Hands a member over to the caller without destroying it.
    ///
    /// The returned resource keeps its own auto-clean behaviour.
    pub fn forget(&mut self, id: ElementId) -> Result<Resource> {
        let index = self.position(id).ok_or(TempError::NotTracked(id))?;
        Ok(self.entries.remove(index).resource)
    }

    /// Destroys every member, continuing past individual failures.
    ///
    /// Members are removed in reverse path order, so a member placed inside another member's
    /// directory goes before that directory. Members already destroyed through their own
    /// handle are only swept, not reported.
    ///
    /// Members removed successfully are no longer tracked; members that failed stay
    /// tracked (and live) for a later retry. Never fails: inspect the report instead.
    pub fn dispose(&mut self) -> CleanupReport {
        let mut report = CleanupReport::default();

        // children before parents
        let mut order: Vec<usize> = (0..self.entries.len())
            .filter(|&i| !self.entries[i].resource.is_destroyed())
            .collect();
        order.sort_by(|&a, &b| {
            self.entries[b]
                .resource
                .path()
                .cmp(self.entries[a].resource.path())
        });

        for index in order {
            let element = &mut self.entries[index];
            let path = element.resource.path().to_path_buf();
            match element.resource.destroy() {
                Ok(()) => report.destroyed.push(path),
                Err(error) => report.failures.push(CleanupFailure {
                    id: element.id,
                    path,
                    error,
                }),
            }
        }
        self.remove_destroyed();

        report
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over members in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (ElementId, &Resource)> + '_ {
        self.entries.iter().map(|e| (e.id, &e.resource))
    }

    pub fn ids(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.entries.iter().map(|e| e.id)
    }

    fn position(&self, id: ElementId) -> Option<usize> {
        self.entries.iter().position(|e| e.id == id)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Registry {
    fn drop(&mut self) {
        if self.is_auto_clean {
            let report = self.dispose();
            for failure in &report.failures {
                warn!(
                    id = %failure.id,
                    path = %failure.path.display(),
                    error = %failure.error,
                    "failed to clean up temp resource"
                );
            }
        }

        // Whatever is left was either reported above or must stay on disk.
        for element in &mut self.entries {
            element.resource.set_auto_clean(false);
        }
    }
}
