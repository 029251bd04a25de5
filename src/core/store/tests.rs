use chrono::{Duration, TimeZone, Utc};

use super::*;
use crate::core::filter::{compile, Field, ListParams, Predicate};

fn part(code: &str, name: &str, categories: &[&str]) -> Part {
    let mut p = Part::new(code, name);
    p.category = categories.iter().map(|s| s.to_string()).collect();
    p
}

fn store_with(parts: &[Part]) -> CatalogStore {
    let mut store = CatalogStore::open_in_memory().unwrap();
    store.insert_many(parts).unwrap();
    store
}

fn codes(parts: &[Part]) -> Vec<String> {
    parts.iter().map(|p| p.part_number.clone()).collect()
}

#[test]
fn test_insert_and_get_round_trips_document() {
    let mut p = part("PN-1", "Bracket", &["Mechanical"]);
    p.specifications
        .insert("weightKg".into(), serde_json::json!(1.25));
    p.child_parts
        .push(ChildPartRef::placeholder("PN-2", "Screw"));
    let store = store_with(&[p.clone()]);

    assert_eq!(store.get(&p.id).unwrap(), Some(p));
    assert_eq!(store.get(&PartId::new()).unwrap(), None);
}

#[test]
fn test_duplicate_part_number_rejected_atomically() {
    let mut store = store_with(&[part("PN-1", "Bracket", &[])]);
    let batch = [part("PN-2", "Plate", &[]), part("PN-1", "Clone", &[])];

    let err = store.insert_many(&batch).unwrap_err();
    assert!(matches!(err, StoreError::DuplicatePartNumber(ref pn) if pn == "PN-1"));
    // PN-2 was rolled back with the rest of the batch
    assert_eq!(store.count(&CompiledFilter::None).unwrap(), 1);
}

#[test]
fn test_category_filters_against_sql() {
    let parts = [
        part("A-ONLY", "a", &["A"]),
        part("AB", "ab", &["A", "B"]),
        part("ABC", "abc", &["C", "B", "A"]),
        part("B-ONLY", "b", &["B"]),
    ];
    let store = store_with(&parts);

    let all_of = compile(&ListParams::from_pairs([("category", r#"["A","B"]"#)]));
    let mut found = codes(&store.find(&all_of, &FindOptions::default()).unwrap());
    found.sort();
    assert_eq!(found, vec!["AB", "ABC"]);

    let one = compile(&ListParams::from_pairs([("category", "A")]));
    assert_eq!(store.count(&one).unwrap(), 3);
}

#[test]
fn test_sql_agrees_with_in_memory_evaluation() {
    let mut a = part("BOLT-M3", "Hex Bolt", &["Fastener"]);
    a.supplier = vec!["Acme Industrial".into()];
    a.alternative_part_numbers = vec!["ALT-77".into()];
    let mut b = part("MTR-24", "Motor", &["Electrical"]);
    b.description = "Brushless motor with hex shaft".into();
    let c = part("[A,B", "Odd", &["[A,B"]);
    let parts = [a, b, c];
    let store = store_with(&parts);

    let queries = [
        vec![("globalSearch", "hex")],
        vec![("globalSearch", "alt-7")],
        vec![("partNumber", "m3"), ("category", "Fastener")],
        vec![("supplier", r#"["Acme Industrial"]"#)],
        vec![("category", "[A,B")],
        vec![("alternativePartNumber", "77")],
        vec![("description", "BRUSHLESS")],
        vec![("globalSearch", "(")],
    ];

    for q in queries {
        let filter = compile(&ListParams::from_pairs(q.clone()));
        let mut expected: Vec<String> = parts
            .iter()
            .filter(|p| filter.matches(p))
            .map(|p| p.part_number.clone())
            .collect();
        expected.sort();
        let mut actual = codes(&store.find(&filter, &FindOptions::default()).unwrap());
        actual.sort();
        assert_eq!(actual, expected, "query {:?}", q);
    }
}

#[test]
fn test_created_range_is_inclusive() {
    let base = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
    let parts: Vec<Part> = (0..5)
        .map(|i| {
            let mut p = part(&format!("D-{i}"), "dated", &[]);
            p.created_at = base + Duration::days(i);
            p
        })
        .collect();
    let store = store_with(&parts);

    let filter = compile(&ListParams::from_pairs([
        ("startDate", "2024-03-02"),
        ("endDate", "2024-03-04"),
    ]));
    let found = store.find(&filter, &FindOptions::default()).unwrap();
    assert_eq!(codes(&found), vec!["D-3", "D-2", "D-1"]);
}

#[test]
fn test_newest_first_breaks_ties_by_id() {
    let stamp = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
    let parts: Vec<Part> = (0..4)
        .map(|i| {
            let mut p = part(&format!("T-{i}"), "tied", &[]);
            p.created_at = stamp;
            p
        })
        .collect();
    let store = store_with(&parts);

    let found = store
        .find(&CompiledFilter::None, &FindOptions::newest_first())
        .unwrap();
    let ids: Vec<PartId> = found.iter().map(|p| p.id).collect();
    let mut expected: Vec<PartId> = parts.iter().map(|p| p.id).collect();
    expected.sort();
    expected.reverse();
    assert_eq!(ids, expected);
}

#[test]
fn test_replace_child_parts_swaps_whole_list() {
    let mut parent = part("ASM-1", "Assembly", &[]);
    parent.child_parts = vec![
        ChildPartRef::placeholder("X", "x"),
        ChildPartRef::placeholder("Y", "y"),
    ];
    let mut store = store_with(&[parent.clone()]);

    let target = PartId::new();
    let mut replacement = ChildPartRef::placeholder("Z", "z");
    replacement.main_part_id = Some(target);
    let updated = store
        .replace_child_parts(&parent.id, &[replacement.clone()])
        .unwrap();

    assert_eq!(updated.child_parts, vec![replacement]);
    assert!(updated.updated_at >= parent.updated_at);
    assert_eq!(store.get(&parent.id).unwrap().unwrap(), updated);

    let missing = store.replace_child_parts(&PartId::new(), &[]);
    assert!(matches!(missing, Err(StoreError::NotFound(_))));
}

#[test]
fn test_find_by_child_reference() {
    let motor = part("MTR-1", "Motor", &[]);
    let mut fan = part("FAN-1", "Fan", &[]);
    let mut linked = ChildPartRef::placeholder("MTR-1", "Motor");
    linked.main_part_id = Some(motor.id);
    fan.child_parts = vec![linked];
    let pump = part("PMP-1", "Pump", &[]);
    let store = store_with(&[motor.clone(), fan.clone(), pump]);

    let filter = CompiledFilter::Predicate(Predicate::Equals {
        field: Field::ChildMainPartId,
        value: motor.id.to_string(),
    });
    let found = store.find(&filter, &FindOptions::default()).unwrap();
    assert_eq!(codes(&found), vec!["FAN-1"]);

    let by_id = CompiledFilter::Predicate(Predicate::Equals {
        field: Field::Id,
        value: motor.id.to_string(),
    });
    assert_eq!(store.find_one(&by_id).unwrap().map(|p| p.id), Some(motor.id));
}

#[test]
fn test_save_upserts() {
    let mut store = CatalogStore::open_in_memory().unwrap();
    let mut p = part("PN-9", "Spring", &[]);
    store.save(&p).unwrap();
    p.part_name = "Compression Spring".into();
    store.save(&p).unwrap();

    assert_eq!(store.count(&CompiledFilter::None).unwrap(), 1);
    let name = compile(&ListParams::from_pairs([("partName", "compression")]));
    assert_eq!(store.count(&name).unwrap(), 1);
}

#[test]
fn test_canonical_pool_caps_newest() {
    let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let parts: Vec<Part> = (0..10)
        .map(|i| {
            let mut p = part(&format!("C-{i}"), "pooled", &[]);
            p.created_at = base + Duration::minutes(i);
            p
        })
        .collect();
    let store = store_with(&parts);

    let pool = store.canonical_pool(Some(3)).unwrap();
    let pool_codes: Vec<&str> = pool.iter().map(|e| e.part_number.as_str()).collect();
    assert_eq!(pool_codes, vec!["C-9", "C-8", "C-7"]);
    assert_eq!(store.canonical_pool(None).unwrap().len(), 10);
}

#[test]
fn test_file_catalog_reopens() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("nested/catalog.db");
    let p = part("PN-1", "Bracket", &[]);
    {
        let mut store = CatalogStore::open(&path).unwrap();
        store.insert_many(&[p.clone()]).unwrap();
    }
    let store = CatalogStore::open(&path).unwrap();
    assert_eq!(store.get(&p.id).unwrap(), Some(p));
}
