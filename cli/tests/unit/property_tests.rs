//! Property-based tests for version ordering, port allocation and the
//! address grammar.
//!
//! Uses `proptest` to verify invariants across many random inputs.

#![allow(clippy::expect_used)]

use std::collections::BTreeSet;

use proptest::prelude::*;

use geneosctl_cli::domain::{
    PortRange, Registry, parse_version, pick_latest, split_name, valid_instance_name,
};

proptest! {
    /// Parsing never panics, whatever the directory was named.
    #[test]
    fn prop_parse_version_total(name in "\\PC{0,40}") {
        let _ = parse_version(&name);
    }

    /// A three-part numeric name round-trips through the parser.
    #[test]
    fn prop_numeric_names_parse_exactly(
        major in 0u32..10_000,
        minor in 0u32..10_000,
        patch in 0u32..10_000,
    ) {
        let v = parse_version(&format!("{major}.{minor}.{patch}"));
        prop_assert_eq!((v.major, v.minor, v.patch), (major, minor, patch));
    }

    /// `pick_latest` returns one of its candidates and is order-insensitive.
    #[test]
    fn prop_pick_latest_is_a_candidate(names in prop::collection::vec("[0-9]{1,3}(\\.[0-9]{1,3}){0,2}", 1..8)) {
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let winner = pick_latest(refs.clone());
        prop_assert!(names.iter().any(|n| n == &winner));

        let mut reversed = refs.clone();
        reversed.reverse();
        prop_assert_eq!(pick_latest(reversed), winner);
    }

    /// The allocated port is inside the range and not in the used set.
    #[test]
    fn prop_next_port_is_free_and_in_range(
        lo in 7000u16..8000,
        width in 0u16..50,
        used in prop::collection::btree_set(7000u16..8100, 0..40),
    ) {
        let hi = lo + width;
        let range = PortRange::parse(&format!("{lo}-{hi}")).expect("parse");
        let port = range.next_port(&used);
        if port != 0 {
            prop_assert!((lo..=hi).contains(&port));
            prop_assert!(!used.contains(&port));
        } else {
            // Exhausted: every port in the span really is taken.
            prop_assert!((lo..=hi).all(|p| used.contains(&p)));
        }
    }

    /// Splitting on the last `@` keeps any earlier `@` in the name part.
    #[test]
    fn prop_split_name_keeps_earlier_ats(
        name in "[a-z][a-z0-9@]{0,10}",
        host in "[a-z][a-z0-9]{0,8}",
    ) {
        let registry = Registry::builtin();
        let address = split_name(&registry, &format!("{name}@{host}"), "localhost");
        prop_assert_eq!(address.name, name);
        prop_assert_eq!(address.host, host);
    }

    /// Accepted names always start with an alphanumeric and contain only
    /// the documented characters.
    #[test]
    fn prop_valid_names_are_well_formed(name in "\\PC{0,20}") {
        if valid_instance_name(&name) {
            let first = name.chars().next().expect("non-empty");
            prop_assert!(first.is_ascii_alphanumeric());
            prop_assert!(name.chars().all(|c| c.is_ascii_alphanumeric() || "-_.".contains(c)));
        }
    }
}

#[test]
fn test_next_port_deterministic_batch() {
    // Same inputs, same port, across repeated calls.
    let range = PortRange::parse("7100-7110").expect("parse");
    let used = BTreeSet::from([7100]);
    let ports: BTreeSet<u16> = (0..100).map(|_| range.next_port(&used)).collect();
    assert_eq!(ports, BTreeSet::from([7101]));
}
