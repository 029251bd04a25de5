//! Bulk generation of synthetic catalog parts
//!
//! A batch is synthesized with child placeholders that name sibling parts by
//! part number only. After the batch is inserted the reconciler links every
//! placeholder to the sibling it names, then a sample is read back.

use chrono::{Duration, Utc};
use rand::seq::IndexedRandom;
use rand::Rng;
use serde_json::json;
use tracing::info;
use ulid::Ulid;

use crate::core::reconcile::{reconcile, CanonicalPool, ReconcileReport, SelectionMode};
use crate::core::store::{PartStore, StoreError};
use crate::entities::part::{
    ChildPartRef, Contact, DocumentationRecord, DocumentationType, Part, MAX_DOCUMENT_FILES,
};

const CATEGORIES: &[&str] = &[
    "Mechanical",
    "Electrical",
    "Electronic",
    "Pneumatic",
    "Hydraulic",
    "Fastener",
    "Structural",
    "Thermal",
];

const SUB_CATEGORIES: &[&str] = &[
    "Bearing",
    "Bracket",
    "Connector",
    "Gear",
    "Motor",
    "Sensor",
    "Seal",
    "Spring",
    "Valve",
    "Housing",
];

const SUPPLIERS: &[&str] = &[
    "Acme Industrial",
    "Bolt & Nut Co",
    "Delta Components",
    "Northwind Supply",
    "Orion Electronics",
    "Summit Metals",
];

const ADJECTIVES: &[&str] = &[
    "Compact", "Heavy-Duty", "Precision", "Sealed", "Low-Profile", "Reinforced", "Miniature",
];

const MATERIALS: &[&str] = &["Aluminum 6061", "Stainless 304", "Brass", "Nylon", "ABS", "Steel 1045"];

const CONTACT_NAMES: &[&str] = &["Dana Ortiz", "Sam Lee", "Alex Moreau", "Kim Novak"];

/// Most child placeholders a generated part gets
const MAX_CHILDREN: usize = 10;

/// Most documentation records a generated part gets
const MAX_DOCUMENTS: usize = 3;

/// Result of a generate run
#[derive(Debug)]
pub struct GenerateOutcome {
    /// Parts inserted
    pub created: usize,
    /// Back-fill of child references across the batch
    pub report: ReconcileReport,
    /// Freshly read copies of the first few created parts
    pub sample: Vec<Part>,
}

/// Batch marker shared by every part number in one run
///
/// A whole ULID minted now. Its random half keeps batches made in the same
/// millisecond apart, even when the RNG is seeded.
fn batch_tag() -> String {
    Ulid::new().to_string()
}

fn pick_tags<R: Rng + ?Sized>(vocabulary: &[&str], rng: &mut R) -> Vec<String> {
    let n = rng.random_range(1..=3);
    vocabulary
        .choose_multiple(rng, n)
        .map(|s| s.to_string())
        .collect()
}

fn pick<'a, R: Rng + ?Sized>(vocabulary: &[&'a str], rng: &mut R) -> &'a str {
    vocabulary.choose(rng).copied().unwrap_or_default()
}

fn specifications<R: Rng + ?Sized>(
    rng: &mut R,
) -> std::collections::BTreeMap<String, serde_json::Value> {
    let mut specs = std::collections::BTreeMap::new();
    let weight = (rng.random_range(0.01..25.0_f64) * 1000.0).round() / 1000.0;
    specs.insert("weightKg".to_string(), json!(weight));
    specs.insert("material".to_string(), json!(pick(MATERIALS, rng)));
    if rng.random_bool(0.5) {
        specs.insert(
            "ratedVoltage".to_string(),
            json!(*[5, 12, 24, 48, 230].choose(rng).unwrap_or(&24)),
        );
    }
    if rng.random_bool(0.5) {
        specs.insert(
            "dimensionsMm".to_string(),
            json!({
                "length": rng.random_range(5..500),
                "width": rng.random_range(5..300),
                "height": rng.random_range(1..200),
            }),
        );
    }
    specs
}

fn documentation<R: Rng + ?Sized>(part_number: &str, rng: &mut R) -> Vec<DocumentationRecord> {
    let count = rng.random_range(0..=MAX_DOCUMENTS);
    (0..count)
        .filter_map(|_| {
            let doc_type = *DocumentationType::all().choose(rng)?;
            let files = (0..rng.random_range(0..=MAX_DOCUMENT_FILES))
                .map(|n| format!("docs/{}/{}-{}.pdf", part_number, doc_type, n + 1))
                .collect();
            Some(DocumentationRecord {
                doc_type,
                value: format!("REF-{:06}", rng.random_range(0..1_000_000)),
                date_added: Utc::now(),
                files,
                answered_by: rng
                    .random_bool(0.3)
                    .then(|| pick(CONTACT_NAMES, rng).to_string()),
            })
        })
        .collect()
}

/// Synthesize `count` parts whose child placeholders name sibling parts
///
/// Part numbers are `GEN-<batch>-<sequence>`. Placeholders carry only a
/// sibling's part number, a quantity, and sometimes a supplier; their
/// `mainPartId` is unset. Creation timestamps are distinct and increase
/// with the sequence.
pub fn synthesize<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<Part> {
    let tag = batch_tag();
    let codes: Vec<String> = (0..count)
        .map(|i| format!("GEN-{}-{:05}", tag, i + 1))
        .collect();
    let base = Utc::now() - Duration::microseconds(count as i64);

    codes
        .iter()
        .enumerate()
        .map(|(i, code)| {
            let sub_category = pick_tags(SUB_CATEGORIES, rng);
            let noun = sub_category.first().cloned().unwrap_or_default();
            let mut part = Part::new(code.clone(), format!("{} {}", pick(ADJECTIVES, rng), noun));

            part.description = format!(
                "{} {} for general assembly use",
                pick(MATERIALS, rng),
                noun.to_lowercase()
            );
            part.category = pick_tags(CATEGORIES, rng);
            part.sub_category = sub_category;
            part.supplier = pick_tags(SUPPLIERS, rng);
            part.alternative_part_numbers = (0..rng.random_range(0..=2))
                .map(|n| format!("ALT-{}-{:05}-{}", tag, i + 1, n + 1))
                .collect();
            if rng.random_bool(0.5) {
                part.contact = Some(Contact {
                    name: Some(pick(CONTACT_NAMES, rng).to_string()),
                    email: Some(format!("sales{}@example.com", rng.random_range(1..100))),
                    phone: None,
                });
            }
            part.specifications = specifications(rng);
            part.documentation = documentation(code, rng);

            let siblings: Vec<&String> = codes.iter().filter(|c| *c != code).collect();
            let n_children = rng.random_range(0..=MAX_CHILDREN).min(siblings.len());
            part.child_parts = siblings
                .choose_multiple(rng, n_children)
                .map(|sibling| ChildPartRef {
                    supplier: rng
                        .random_bool(0.5)
                        .then(|| pick(SUPPLIERS, rng).to_string()),
                    quantity: rng.random_range(1..=20),
                    ..ChildPartRef::placeholder(sibling.as_str(), "Pending link")
                })
                .collect();

            part.created_at = base + Duration::microseconds(i as i64);
            part.updated_at = part.created_at;
            part
        })
        .collect()
}

/// Insert a synthetic batch, link its child references, and read back a sample
pub fn generate_and_link<S, R>(
    store: &mut S,
    count: usize,
    sample_size: usize,
    rng: &mut R,
) -> Result<GenerateOutcome, StoreError>
where
    S: PartStore + ?Sized,
    R: Rng + ?Sized,
{
    let batch = synthesize(count, rng);
    store.insert_many(&batch)?;

    let pool = CanonicalPool::from_parts(&batch);
    let report = reconcile(store, &batch, &pool, SelectionMode::ByCode, rng);

    let mut sample = Vec::with_capacity(sample_size.min(batch.len()));
    for part in batch.iter().take(sample_size) {
        if let Some(fresh) = store.get(&part.id)? {
            sample.push(fresh);
        }
    }

    info!(
        created = batch.len(),
        linked = report.updated,
        failed = report.failed,
        "generated parts"
    );
    Ok(GenerateOutcome {
        created: batch.len(),
        report,
        sample,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::filter::CompiledFilter;
    use crate::core::store::{CatalogStore, FindOptions};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn test_synthesize_shapes() {
        let mut rng = StdRng::seed_from_u64(7);
        let parts = synthesize(40, &mut rng);
        assert_eq!(parts.len(), 40);

        let codes: HashSet<&str> = parts.iter().map(|p| p.part_number.as_str()).collect();
        assert_eq!(codes.len(), 40);

        for part in &parts {
            assert!(part.part_number.starts_with("GEN-"));
            assert!((1..=3).contains(&part.category.len()));
            assert!((1..=3).contains(&part.sub_category.len()));
            assert!((1..=3).contains(&part.supplier.len()));
            assert!(part.child_parts.len() <= MAX_CHILDREN);
            assert!(part.documentation.len() <= MAX_DOCUMENTS);
            assert!(part.validate().is_ok());

            let mut deduped = part.clone();
            deduped.dedup_tags();
            assert_eq!(&deduped, part);

            for child in &part.child_parts {
                assert!(child.main_part_id.is_none());
                assert!((1..=20).contains(&child.quantity));
                assert_ne!(child.part_number, part.part_number);
                assert!(codes.contains(child.part_number.as_str()));
            }
        }
    }

    #[test]
    fn test_created_at_is_distinct_and_ordered() {
        let mut rng = StdRng::seed_from_u64(1);
        let parts = synthesize(20, &mut rng);
        assert!(parts.windows(2).all(|w| w[0].created_at < w[1].created_at));
    }

    #[test]
    fn test_single_part_has_no_children() {
        let mut rng = StdRng::seed_from_u64(3);
        let parts = synthesize(1, &mut rng);
        assert!(parts[0].child_parts.is_empty());
        assert!(synthesize(0, &mut rng).is_empty());
    }

    #[test]
    fn test_generated_children_resolve_within_batch() {
        let mut store = CatalogStore::open_in_memory().unwrap();
        let mut rng = StdRng::seed_from_u64(11);
        let outcome = generate_and_link(&mut store, 60, 5, &mut rng).unwrap();

        assert_eq!(outcome.created, 60);
        assert_eq!(outcome.sample.len(), 5);
        assert_eq!(outcome.report.failed, 0);

        let stored = store
            .find(&CompiledFilter::None, &FindOptions::newest_first())
            .unwrap();
        assert_eq!(stored.len(), 60);
        let ids: HashSet<_> = stored.iter().map(|p| p.id).collect();

        for parent in &stored {
            for child in &parent.child_parts {
                let target = child.main_part_id.expect("child linked");
                assert!(ids.contains(&target));
                let canonical = stored.iter().find(|p| p.id == target).unwrap();
                assert_eq!(canonical.part_number, child.part_number);
                assert_eq!(canonical.part_name, child.part_name);
            }
        }
    }

    #[test]
    fn test_sample_reflects_linked_children() {
        let mut store = CatalogStore::open_in_memory().unwrap();
        let mut rng = StdRng::seed_from_u64(5);
        let outcome = generate_and_link(&mut store, 15, 15, &mut rng).unwrap();
        for part in &outcome.sample {
            assert!(part.child_parts.iter().all(|c| c.main_part_id.is_some()));
        }
    }

    #[test]
    fn test_back_to_back_batch_tags_differ() {
        let tags: std::collections::HashSet<String> = (0..100).map(|_| batch_tag()).collect();
        assert_eq!(tags.len(), 100);
    }

    #[test]
    fn test_batches_do_not_collide() {
        let mut store = CatalogStore::open_in_memory().unwrap();
        let mut rng = StdRng::seed_from_u64(9);
        generate_and_link(&mut store, 5, 1, &mut rng).unwrap();
        generate_and_link(&mut store, 5, 1, &mut rng).unwrap();
        assert_eq!(store.count(&CompiledFilter::None).unwrap(), 10);
    }
}
