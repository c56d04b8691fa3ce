//! Property-based tests for the path helpers used when building snapshots.
//!
//! These tests use proptest to generate random inputs and verify that
//! invariants hold for all possible inputs.

#[cfg(test)]
mod proptest_tests {
    use crate::discover::{parse_dependency_names, workspace_root};
    use crate::manifest::{strip_prefix, to_slash};
    use crate::probe::parse_current_branch;
    use proptest::prelude::*;

    // ============================================================================
    // strip_prefix property tests
    // ============================================================================

    proptest! {
        /// Property: the result never starts with a separator
        #[test]
        fn strip_prefix_never_leaves_leading_separator(
            path in "[a-z/\\\\.]{0,40}",
            prefix in "[a-z/]{0,10}",
        ) {
            let result = strip_prefix(&[path], &prefix);
            prop_assert!(!result[0].starts_with('/'));
            prop_assert!(!result[0].starts_with('\\'));
        }

        /// Property: root + "/" + relative strips back to relative
        #[test]
        fn strip_prefix_recovers_relative_path(
            root in "/[a-z]{1,8}(/[a-z]{1,8}){0,3}",
            relative in "[a-z]{1,8}(/[a-z.]{1,8}){0,4}",
        ) {
            let joined = format!("{}/{}", root, relative);
            prop_assert_eq!(strip_prefix(&[joined], &root), vec![relative]);
        }

        /// Property: one output per input, in order
        #[test]
        fn strip_prefix_preserves_length(paths in prop::collection::vec("[a-z/]{0,12}", 0..8)) {
            prop_assert_eq!(strip_prefix(&paths, "/x").len(), paths.len());
        }

        /// Property: an empty prefix only trims leading separators
        #[test]
        fn strip_prefix_empty_prefix(path in "[a-z]{1,8}(/[a-z]{1,8}){0,3}") {
            prop_assert_eq!(strip_prefix(&[path.clone()], ""), vec![path]);
        }
    }

    // ============================================================================
    // workspace_root property tests
    // ============================================================================

    proptest! {
        /// Property: package dir = root + "/" + import path gives back root
        #[test]
        fn workspace_root_inverts_join(
            root in "/[a-z]{1,8}(/[a-z]{1,8}){0,3}",
            import in "[a-z]{1,8}(\\.[a-z]{2,3})?(/[a-z]{1,8}){0,3}",
        ) {
            let package_dir = format!("{}/{}", root, import);
            prop_assert_eq!(workspace_root(&package_dir, &import), root);
        }

        /// Property: the root never ends with a separator
        #[test]
        fn workspace_root_has_no_trailing_separator(
            package_dir in "[a-z/]{0,30}",
            import in "[a-z/]{0,10}",
        ) {
            let root = workspace_root(&package_dir, &import);
            prop_assert!(!root.ends_with('/'));
        }
    }

    // ============================================================================
    // parsing property tests
    // ============================================================================

    proptest! {
        /// Property: names round-trip through the bracketed list format
        #[test]
        fn dependency_names_roundtrip(names in prop::collection::vec("[a-z][a-z0-9./_-]{0,20}", 0..10)) {
            let raw = format!("[{}]", names.join(" "));
            prop_assert_eq!(parse_dependency_names(&raw), names);
        }

        /// Property: the marked line wins regardless of surrounding lines
        #[test]
        fn current_branch_is_marked_line(
            before in prop::collection::vec("[a-z]{1,10}", 0..4),
            current in "[a-z][a-z/_-]{0,15}",
            after in prop::collection::vec("[a-z]{1,10}", 0..4),
        ) {
            let mut lines: Vec<String> = before.iter().map(|b| format!("  {}", b)).collect();
            lines.push(format!("* {}", current));
            lines.extend(after.iter().map(|a| format!("  {}", a)));
            prop_assert_eq!(parse_current_branch(&lines.join("\n")), current);
        }

        /// Property: to_slash is idempotent
        #[test]
        fn to_slash_is_idempotent(path in ".*") {
            let once = to_slash(&path);
            prop_assert_eq!(to_slash(&once), once);
        }
    }
}
