//! Property-Based Tests for winstrap
//!
//! These tests verify:
//! - Hostname and IPv4 predicates over generated inputs
//! - Selection parsing invariants (ordering, dedup, catalog membership)
//! - Enum string round-trips

use proptest::prelude::*;
use winstrap::catalog::{AppCatalog, AppEntry, Selection};
use winstrap::menu::{apply_item_choice, parse_category_choice, parse_item_choice, ItemChoice};
use winstrap::validate::{is_valid_hostname, is_valid_ipv4, subnet_prefix_length};

// =============================================================================
// Hostname Property Tests
// =============================================================================

proptest! {
    /// Every name built from the allowed alphabet with inner hyphens is valid
    #[test]
    fn hostname_valid_shapes(name in "[A-Za-z0-9]([A-Za-z0-9-]{0,13}[A-Za-z0-9])?") {
        prop_assert!(is_valid_hostname(&name));
    }

    /// Names longer than 15 characters are always rejected
    #[test]
    fn hostname_too_long(name in "[a-z0-9]{16,40}") {
        prop_assert!(!is_valid_hostname(&name));
    }

    /// A leading or trailing hyphen is always rejected
    #[test]
    fn hostname_hyphen_edges(core in "[a-z0-9]{0,13}") {
        let leading = format!("-{}", core);
        let trailing = format!("{}-", core);
        prop_assert!(!is_valid_hostname(&leading));
        prop_assert!(!is_valid_hostname(&trailing));
    }

    /// Any character outside letters, digits and hyphen is rejected
    #[test]
    fn hostname_bad_character(
        prefix in "[a-z]{1,5}",
        bad in "[ _.!@#$%/\\\\]",
        suffix in "[a-z]{1,5}",
    ) {
        let name = format!("{}{}{}", prefix, bad, suffix);
        prop_assert!(!is_valid_hostname(&name));
    }

    /// The predicate never panics
    #[test]
    fn hostname_total(s in ".*") {
        let _ = is_valid_hostname(&s);
    }
}

// =============================================================================
// IPv4 Property Tests
// =============================================================================

proptest! {
    /// Any four octets in 0..=255 form a valid address
    #[test]
    fn ipv4_all_octets_valid(a in 0u8..=255, b in 0u8..=255, c in 0u8..=255, d in 0u8..=255) {
        let addr = format!("{}.{}.{}.{}", a, b, c, d);
        prop_assert!(is_valid_ipv4(&addr));
    }

    /// An octet above 255 makes the address invalid
    #[test]
    fn ipv4_octet_out_of_range(big in 256u32..100_000, pos in 0usize..4) {
        let mut octets = vec!["1".to_string(); 4];
        octets[pos] = big.to_string();
        prop_assert!(!is_valid_ipv4(&octets.join(".")));
    }

    /// Fewer or more than four octets is invalid
    #[test]
    fn ipv4_wrong_octet_count(octets in prop::collection::vec(0u8..=255, 0..8)) {
        prop_assume!(octets.len() != 4);
        let addr: Vec<String> = octets.iter().map(|o| o.to_string()).collect();
        prop_assert!(!is_valid_ipv4(&addr.join(".")));
    }

    /// Surrounding whitespace is never accepted
    #[test]
    fn ipv4_whitespace(a in 0u8..=255, b in 0u8..=255) {
        let padded = format!(" {}.{}.0.1 ", a, b);
        prop_assert!(!is_valid_ipv4(&padded));
    }

    /// Contiguous masks map back to their prefix length
    #[test]
    fn subnet_prefix_matches_mask(prefix in 0u32..=32) {
        let bits: u32 = if prefix == 0 { 0 } else { u32::MAX << (32 - prefix) };
        let mask = std::net::Ipv4Addr::from(bits).to_string();
        prop_assert_eq!(subnet_prefix_length(&mask), Some(prefix as u8));
    }
}

#[test]
fn ipv4_examples() {
    assert!(is_valid_ipv4("192.168.1.50"));
    assert!(!is_valid_ipv4("256.1.1.1"));
    assert!(!is_valid_ipv4("1.2.3"));
    assert!(!is_valid_ipv4("abc.1.1.1"));
    assert!(!is_valid_ipv4("1..2.3"));
}

// =============================================================================
// Selection Property Tests
// =============================================================================

proptest! {
    /// Accepted category choices are sorted, distinct and in range
    #[test]
    fn category_choice_sorted_distinct(
        count in 1usize..10,
        picks in prop::collection::vec(1usize..10, 1..8),
    ) {
        let input: Vec<String> = picks.iter().map(|p| p.to_string()).collect();
        let result = parse_category_choice(&input.join(","), count);
        if picks.iter().all(|p| *p <= count) {
            let chosen = result.unwrap();
            prop_assert!(chosen.windows(2).all(|w| w[0] < w[1]));
            prop_assert!(chosen.iter().all(|i| *i < count));
            for p in &picks {
                prop_assert!(chosen.contains(&(p - 1)));
            }
        } else {
            prop_assert!(result.is_err());
        }
    }

    /// Exclusion keeps the remaining entries in original order
    #[test]
    fn exclusion_preserves_order(
        count in 1usize..12,
        excluded in prop::collection::vec(1usize..12, 1..6),
    ) {
        prop_assume!(excluded.iter().all(|e| *e <= count));
        let entries: Vec<AppEntry> = (0..count).map(|i| AppEntry::simple(format!("app{}", i))).collect();
        let input: Vec<String> = excluded.iter().map(|e| e.to_string()).collect();
        let choice = parse_item_choice(&input.join(","), count).unwrap();
        let kept = apply_item_choice(&entries, &choice);

        let expected: Vec<AppEntry> = entries
            .iter()
            .enumerate()
            .filter(|(i, _)| !excluded.contains(&(i + 1)))
            .map(|(_, e)| e.clone())
            .collect();
        prop_assert_eq!(kept, expected);
    }

    /// Override selections only ever contain catalog entries
    #[test]
    fn overrides_never_fabricate(names in prop::collection::vec("[a-z]{1,8}", 0..6)) {
        let catalog = AppCatalog::from_iter([
            ("essential", vec![AppEntry::simple("git")]),
            ("dev", vec![AppEntry::simple("go"), AppEntry::simple("node")]),
        ]);
        let (selection, unknown) = Selection::from_overrides(&catalog, &names);
        for (category, entry) in selection.iter() {
            let source = catalog.get(category).unwrap();
            prop_assert!(source.entries.contains(entry));
        }
        for name in unknown {
            prop_assert!(catalog.find_ignore_case(&name).is_none());
        }
    }
}

#[test]
fn item_choice_empty_keeps_all() {
    assert_eq!(parse_item_choice("", 5).unwrap(), ItemChoice::KeepAll);
}

// =============================================================================
// Enum Round-Trip Tests
// =============================================================================

use strum::IntoEnumIterator;
use winstrap::network::NetworkField;
use winstrap::package_manager::ManagerKind;

#[test]
fn network_field_roundtrip() {
    for field in NetworkField::iter() {
        let parsed: NetworkField = field.to_string().parse().expect("Should parse");
        assert_eq!(field, parsed);
    }
}

#[test]
fn manager_kind_roundtrip() {
    for kind in ManagerKind::iter() {
        let parsed: ManagerKind = kind.to_string().parse().expect("Should parse");
        assert_eq!(kind, parsed);
    }
}
