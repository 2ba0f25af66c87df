/// Content catalog: the read-only source of content sets.
///
/// Content sets are authored as RON files and held in a `CatalogRegistry`.
/// `ContentSet::validate` catches the configuration defects that would
/// otherwise only surface as draw-time errors.

use rustc_hash::{FxHashMap, FxHashSet};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

use crate::schema::content::{ContentSet, Tier};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("catalog unavailable: {0}")]
    Unavailable(String),
}

/// Read interface over content sets.
///
/// `Ok(None)` means the set does not exist; callers treat that the same as
/// a set with nothing in it.
pub trait Catalog: Send + Sync {
    fn fetch(&self, set_id: &str) -> Result<Option<ContentSet>, CatalogError>;
}

impl<T: Catalog + ?Sized> Catalog for std::sync::Arc<T> {
    fn fetch(&self, set_id: &str) -> Result<Option<ContentSet>, CatalogError> {
        (**self).fetch(set_id)
    }
}

/// In-memory catalog keyed by content set id.
#[derive(Debug, Clone, Default)]
pub struct CatalogRegistry {
    sets: FxHashMap<String, ContentSet>,
}

impl CatalogRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a content set, replacing any set with the same id.
    pub fn insert(&mut self, set: ContentSet) {
        self.sets.insert(set.id.clone(), set);
    }

    pub fn get(&self, set_id: &str) -> Option<&ContentSet> {
        self.sets.get(set_id)
    }

    /// All registered sets, sorted by id.
    pub fn sets(&self) -> Vec<&ContentSet> {
        let mut sets: Vec<&ContentSet> = self.sets.values().collect();
        sets.sort_by(|a, b| a.id.cmp(&b.id));
        sets
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Merge another registry into this one. Sets from `other` override
    /// sets in `self` with the same id.
    pub fn merge(&mut self, other: CatalogRegistry) {
        for (id, set) in other.sets {
            self.sets.insert(id, set);
        }
    }

    /// Parse a single content set from a RON string.
    pub fn parse_ron(input: &str) -> Result<ContentSet, CatalogError> {
        let set: ContentSet = ron::from_str(input)?;
        for issue in set.validate() {
            warn!(set = %set.id, severity = ?issue.severity(), "{}", issue);
        }
        Ok(set)
    }

    /// Load a content set from a RON file and register it.
    pub fn load_from_ron(&mut self, path: &Path) -> Result<(), CatalogError> {
        let contents = std::fs::read_to_string(path)?;
        let set = Self::parse_ron(&contents)?;
        debug!(
            path = %path.display(),
            set = %set.id,
            items = set.items.len(),
            layouts = set.layouts.len(),
            "loaded content set"
        );
        self.insert(set);
        Ok(())
    }

    /// Load every `.ron` file in a directory, in file name order.
    pub fn load_dir(&mut self, dir: &Path) -> Result<(), CatalogError> {
        let mut paths: Vec<PathBuf> = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|s| s.to_str()) == Some("ron") {
                paths.push(path);
            }
        }
        paths.sort();
        for path in paths {
            self.load_from_ron(&path)?;
        }
        Ok(())
    }

    /// Load a file or a directory of files.
    pub fn load_path(&mut self, path: &Path) -> Result<(), CatalogError> {
        if path.is_dir() {
            self.load_dir(path)
        } else {
            self.load_from_ron(path)
        }
    }
}

impl Catalog for CatalogRegistry {
    fn fetch(&self, set_id: &str) -> Result<Option<ContentSet>, CatalogError> {
        Ok(self.sets.get(set_id).cloned())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
}

/// A problem found by `ContentSet::validate`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogIssue {
    DuplicateItem(String),
    DuplicateLayout(String),
    SlotCountMismatch {
        layout: String,
        slots: usize,
        required: usize,
    },
    NonContiguousSlots(String),
    /// Fewer items exist at or below the layout's tier than it requires.
    Unsatisfiable {
        layout: String,
        tier: Tier,
        available: usize,
        required: usize,
    },
    EmptyDescription(String),
    MissingImage(String),
}

impl CatalogIssue {
    pub fn severity(&self) -> Severity {
        match self {
            Self::EmptyDescription(_) | Self::MissingImage(_) => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for CatalogIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateItem(id) => write!(f, "item '{}' is defined more than once", id),
            Self::DuplicateLayout(id) => write!(f, "layout '{}' is defined more than once", id),
            Self::SlotCountMismatch {
                layout,
                slots,
                required,
            } => write!(
                f,
                "layout '{}' declares {} slots but requires {} items",
                layout, slots, required
            ),
            Self::NonContiguousSlots(layout) => write!(
                f,
                "layout '{}' slot positions are not 0..n without gaps or duplicates",
                layout
            ),
            Self::Unsatisfiable {
                layout,
                tier,
                available,
                required,
            } => write!(
                f,
                "layout '{}' requires {} items but only {} are available at {}",
                layout,
                required,
                available,
                tier.tag()
            ),
            Self::EmptyDescription(layout) => {
                write!(f, "layout '{}' has no description", layout)
            }
            Self::MissingImage(item) => write!(f, "item '{}' has no image reference", item),
        }
    }
}

impl ContentSet {
    /// Static checks over items and layouts.
    pub fn validate(&self) -> Vec<CatalogIssue> {
        let mut issues = Vec::new();

        let mut seen_items = FxHashSet::default();
        for item in &self.items {
            if !seen_items.insert(item.id.as_str()) {
                issues.push(CatalogIssue::DuplicateItem(item.id.0.clone()));
            }
            if item.image.is_empty() {
                issues.push(CatalogIssue::MissingImage(item.id.0.clone()));
            }
        }

        let mut seen_layouts = FxHashSet::default();
        for layout in &self.layouts {
            let id = layout.id.0.clone();
            if !seen_layouts.insert(layout.id.as_str()) {
                issues.push(CatalogIssue::DuplicateLayout(id.clone()));
            }
            if layout.slots.len() != layout.required_count {
                issues.push(CatalogIssue::SlotCountMismatch {
                    layout: id.clone(),
                    slots: layout.slots.len(),
                    required: layout.required_count,
                });
            }

            let positions: Vec<u32> = layout.ordered_slots().iter().map(|s| s.position).collect();
            let contiguous = positions
                .iter()
                .enumerate()
                .all(|(i, &position)| position as usize == i);
            if !contiguous {
                issues.push(CatalogIssue::NonContiguousSlots(id.clone()));
            }

            let available = self.available_count(layout.tier);
            if available < layout.required_count {
                issues.push(CatalogIssue::Unsatisfiable {
                    layout: id.clone(),
                    tier: layout.tier,
                    available,
                    required: layout.required_count,
                });
            }

            if layout.description.is_empty() {
                issues.push(CatalogIssue::EmptyDescription(id));
            }
        }

        issues
    }

    /// True if `validate` reports no error-severity issues.
    pub fn is_valid(&self) -> bool {
        self.validate()
            .iter()
            .all(|issue| issue.severity() < Severity::Error)
    }
}
