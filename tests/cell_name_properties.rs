//! Property-based tests for the internal-name predicate.
//!
//! The predicate must be total over arbitrary strings and accept exactly the
//! two recognized spellings.

use cellcore::is_internal_cell_name;
use proptest::prelude::*;

proptest! {
    /// Property: the predicate accepts exactly "_" and "__"
    #[test]
    fn prop_predicate_matches_exact_spellings(s in "\\PC*") {
        let expected = s == "_" || s == "__";
        prop_assert_eq!(is_internal_cell_name(&s), expected);
    }

    /// Property: the predicate is deterministic across calls
    #[test]
    fn prop_predicate_is_deterministic(s in "\\PC*") {
        prop_assert_eq!(is_internal_cell_name(&s), is_internal_cell_name(&s));
    }

    /// Property: extending an internal or reserved name makes it
    /// user-visible (suffixes exclude underscores, so "_" never extends
    /// to the legacy "__" spelling here)
    #[test]
    fn prop_extended_names_are_not_internal(suffix in "[a-z0-9]{1,8}") {
        let underscored = format!("_{suffix}");
        let double_underscored = format!("__{suffix}");
        let reserved_extended = format!("setup{suffix}");
        prop_assert!(!is_internal_cell_name(&underscored));
        prop_assert!(!is_internal_cell_name(&double_underscored));
        prop_assert!(!is_internal_cell_name(&reserved_extended));
    }
}
