//! Child-part reference reconciliation
//!
//! Child entries are embedded in their parent and are created before the
//! parts they point at have final identifiers, so linking them is a second
//! pass over data that is already stored. Given a pool of canonical parts,
//! each child entry is rebuilt from the entry it selects: identifying data
//! comes from the canonical part, `quantity` and `supplier` are carried over
//! from the original, and `mainPartId` points at the canonical part.
//!
//! A parent's child list is always replaced as a whole. Parents whose
//! rebuilt list equals the stored one are left alone, which makes
//! [`SelectionMode::ByCode`] idempotent. A child left without a resolved
//! reference does not by itself mark its parent for update.
//! [`SelectionMode::Random`] picks a new canonical entry on every run and is
//! a repair tool, not a reconciler.

use std::collections::{HashMap, HashSet};

use rand::seq::IndexedRandom;
use rand::Rng;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::core::identity::PartId;
use crate::core::store::PartStore;
use crate::entities::part::{ChildPartRef, Part};

/// The identifying projection of a canonical part
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalEntry {
    pub id: PartId,
    pub part_number: String,
    pub part_name: String,
    pub description: String,
}

impl From<&Part> for CanonicalEntry {
    fn from(part: &Part) -> Self {
        Self {
            id: part.id,
            part_number: part.part_number.clone(),
            part_name: part.part_name.clone(),
            description: part.description.clone(),
        }
    }
}

/// Canonical parts available for linking, indexed by part number
#[derive(Debug, Clone, Default)]
pub struct CanonicalPool {
    entries: Vec<CanonicalEntry>,
    by_code: HashMap<String, usize>,
    ids: HashSet<PartId>,
}

impl CanonicalPool {
    /// Build a pool; the first entry wins when part numbers repeat
    pub fn new(entries: Vec<CanonicalEntry>) -> Self {
        let mut by_code = HashMap::with_capacity(entries.len());
        let mut ids = HashSet::with_capacity(entries.len());
        for (i, entry) in entries.iter().enumerate() {
            by_code.entry(entry.part_number.clone()).or_insert(i);
            ids.insert(entry.id);
        }
        Self {
            entries,
            by_code,
            ids,
        }
    }

    pub fn from_parts<'a>(parts: impl IntoIterator<Item = &'a Part>) -> Self {
        Self::new(parts.into_iter().map(CanonicalEntry::from).collect())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn by_code(&self, part_number: &str) -> Option<&CanonicalEntry> {
        self.by_code.get(part_number).map(|&i| &self.entries[i])
    }

    pub fn contains_id(&self, id: &PartId) -> bool {
        self.ids.contains(id)
    }

    /// Uniform pick; `None` for an empty pool
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&CanonicalEntry> {
        self.entries.choose(rng)
    }
}

/// How a child entry selects its canonical part
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionMode {
    /// The pool entry with the child's part number
    #[default]
    ByCode,
    /// Any pool entry, uniformly at random
    Random,
}

/// Rebuild one child entry from the selected canonical entry
///
/// Without a selection the original fields are kept. The reference becomes
/// the pool entry with the child's part number, else the existing reference
/// if it still names a pool entry, else `None`.
pub fn rewrite_child(
    child: &ChildPartRef,
    selected: Option<&CanonicalEntry>,
    pool: &CanonicalPool,
) -> ChildPartRef {
    match selected {
        Some(entry) => ChildPartRef {
            part_number: entry.part_number.clone(),
            part_name: entry.part_name.clone(),
            description: (!entry.description.is_empty()).then(|| entry.description.clone()),
            supplier: child.supplier.clone(),
            quantity: child.quantity,
            main_part_id: Some(entry.id),
        },
        None => ChildPartRef {
            main_part_id: pool
                .by_code(&child.part_number)
                .map(|e| e.id)
                .or(child.main_part_id.filter(|id| pool.contains_id(id))),
            ..child.clone()
        },
    }
}

/// Compute the replacement child list for a parent
///
/// Returns `None` when the parent has no children or when nothing would
/// change.
pub fn plan_parent<R: Rng + ?Sized>(
    parent: &Part,
    pool: &CanonicalPool,
    mode: SelectionMode,
    rng: &mut R,
) -> Option<Vec<ChildPartRef>> {
    if parent.child_parts.is_empty() {
        return None;
    }

    let replacements: Vec<ChildPartRef> = parent
        .child_parts
        .iter()
        .map(|child| {
            let selected = match mode {
                SelectionMode::ByCode => pool.by_code(&child.part_number),
                SelectionMode::Random => pool.pick(rng),
            };
            rewrite_child(child, selected, pool)
        })
        .collect();

    (replacements != parent.child_parts).then_some(replacements)
}

/// Outcome of a reconciliation pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileReport {
    /// Parents looked at
    pub examined: usize,
    /// Parents whose child list needed replacing
    pub planned: usize,
    /// Parents saved successfully
    pub updated: usize,
    /// Parents whose save failed
    pub failed: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failed_ids: Vec<PartId>,
}

impl ReconcileReport {
    pub fn merge(&mut self, other: ReconcileReport) {
        self.examined += other.examined;
        self.planned += other.planned;
        self.updated += other.updated;
        self.failed += other.failed;
        self.failed_ids.extend(other.failed_ids);
    }
}

/// Reconcile a set of parents against the pool and persist changed ones
///
/// Each parent is saved on its own. A failed save is logged and counted,
/// never retried, and does not undo saves that already went through.
pub fn reconcile<S, R>(
    store: &mut S,
    parents: &[Part],
    pool: &CanonicalPool,
    mode: SelectionMode,
    rng: &mut R,
) -> ReconcileReport
where
    S: PartStore + ?Sized,
    R: Rng + ?Sized,
{
    let mut report = ReconcileReport {
        examined: parents.len(),
        ..Default::default()
    };

    let plans: Vec<(PartId, Vec<ChildPartRef>)> = parents
        .iter()
        .filter_map(|p| plan_parent(p, pool, mode, rng).map(|children| (p.id, children)))
        .collect();
    report.planned = plans.len();
    debug!(planned = plans.len(), pool = pool.len(), ?mode, "reconciliation planned");

    for (id, children) in plans {
        match store.replace_child_parts(&id, &children) {
            Ok(_) => report.updated += 1,
            Err(e) => {
                warn!(part = %id, error = %e, "failed to save reconciled child parts");
                report.failed += 1;
                report.failed_ids.push(id);
            }
        }
    }

    info!(
        examined = report.examined,
        updated = report.updated,
        failed = report.failed,
        "reconciliation finished"
    );
    report
}
