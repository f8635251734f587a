//! Property tests for collision-safe naming and shard resolution

use std::collections::{HashMap, HashSet};

use ios_backup_extract::copier::{disambiguate, CollisionTable};
use ios_backup_extract::resolver::resolve;
use proptest::prelude::*;

fn file_name() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-cA-C]{1,3}\\.(jpg|JPG|mov)",
        "[a-c]{1,2}-[1-3]\\.jpg",
        "[a-c]{1,3}",
    ]
}

proptest! {
    #[test]
    fn assigned_names_never_collide(names in prop::collection::vec(file_name(), 0..60)) {
        let mut table = CollisionTable::new();
        let mut seen = HashSet::new();

        for name in &names {
            let (assigned, _) = table.assign(name);
            prop_assert!(seen.insert(assigned.to_uppercase()), "{} assigned twice", assigned);
        }
        prop_assert_eq!(table.len(), names.len());
    }

    #[test]
    fn first_use_keeps_name_and_repeats_count_up(names in prop::collection::vec("[ab]\\.(jpg|JPG)", 1..20)) {
        let mut table = CollisionTable::new();
        let mut counts: HashMap<String, u32> = HashMap::new();

        for name in &names {
            let count = counts.entry(name.to_uppercase()).or_insert(0);
            let (assigned, renamed) = table.assign(name);
            if *count == 0 {
                prop_assert_eq!(&assigned, name);
                prop_assert!(!renamed);
            } else {
                prop_assert_eq!(assigned, disambiguate(name, *count));
                prop_assert!(renamed);
            }
            *count += 1;
        }
    }

    #[test]
    fn disambiguate_keeps_extension(stem in "[a-z]{1,8}", ext in "[a-z]{1,4}", n in 1u32..1000) {
        let name = format!("{stem}.{ext}");
        prop_assert_eq!(disambiguate(&name, n), format!("{stem}-{n}.{ext}"));
    }

    #[test]
    fn resolve_is_pure(file_id in "[0-9a-f]{2,40}") {
        let first = resolve(&file_id).unwrap();
        prop_assert_eq!(&first, &resolve(&file_id).unwrap());
        prop_assert!(first.starts_with(&file_id[..2]));
        prop_assert!(first.ends_with(&file_id));
    }
}

#[test]
fn test_resolve_rejects_short_ids() {
    assert!(resolve("").is_err());
    assert!(resolve("a").is_err());
}
