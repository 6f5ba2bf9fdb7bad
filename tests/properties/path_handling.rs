//! Property tests for target path normalization.

use proptest::prelude::*;

use kiln::domain::value_objects::{add_leading_dot_slash, glob_base, is_glob, ProjectPaths};

fn relative_path() -> impl Strategy<Value = String> {
    let segment = proptest::string::string_regex("[A-Za-z0-9_-][A-Za-z0-9._-]{0,12}").unwrap();
    proptest::collection::vec(segment, 1..=4).prop_map(|segments| segments.join("/"))
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: adding the leading `./` is idempotent.
    #[test]
    fn property_leading_dot_slash_idempotent(path in relative_path()) {
        let once = add_leading_dot_slash(&path);
        prop_assert_eq!(add_leading_dot_slash(&once), once.clone());
        prop_assert!(once.starts_with("./"));
    }

    /// PROPERTY: absolute then target form returns the normalized input.
    #[test]
    fn property_target_round_trip(path in relative_path()) {
        let paths = ProjectPaths::new("/site");
        let target = add_leading_dot_slash(&path);
        prop_assert_eq!(paths.to_target(&paths.absolute(&target)), target);
    }

    /// PROPERTY: the base of a glob never contains glob metacharacters.
    #[test]
    fn property_glob_base_is_literal(path in relative_path(), tail in "(\\*\\*|\\*\\.js|\\?\\.md)") {
        let glob = format!("./{path}/{tail}");
        prop_assert!(is_glob(&glob));
        let base = glob_base(&glob);
        prop_assert!(!is_glob(base));
        prop_assert!(glob.starts_with(base));
    }
}
