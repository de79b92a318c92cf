use super::*;

#[test]
fn test_numeric_runs_compare_as_numbers() {
    assert_eq!(compare_versions("2", "10"), Ordering::Less);
    assert_eq!(compare_versions("10", "2"), Ordering::Greater);
    assert_eq!(compare_versions("10", "10"), Ordering::Equal);
}

#[test]
fn test_sorting_is_natural_not_lexicographic() {
    let mut versions = vec!["2", "10", "1"];
    versions.sort_by(|a, b| compare_versions(a, b));
    assert_eq!(versions, vec!["1", "2", "10"]);
}

#[test]
fn test_dotted_versions() {
    assert_eq!(compare_versions("1.9.1", "1.10.0"), Ordering::Less);
    assert_eq!(compare_versions("2.0", "2.0.1"), Ordering::Less);
}

#[test]
fn test_leading_zeros_are_numerically_equal_but_ordered() {
    assert_eq!(compare_versions("001", "2"), Ordering::Less);
    assert_eq!(compare_versions("010", "10"), Ordering::Greater);
    assert_eq!(compare_versions("10", "010"), Ordering::Less);
}

#[test]
fn test_mixed_alphanumeric() {
    assert_eq!(compare_versions("2a", "2b"), Ordering::Less);
    assert_eq!(compare_versions("a10", "a9"), Ordering::Greater);
    assert_eq!(compare_versions("", "1"), Ordering::Less);
}

#[test]
fn test_name_comparator_is_plain_string_order() {
    assert_eq!(compare_names("add col", "init"), Ordering::Less);
    assert_eq!(compare_names("v10", "v2"), Ordering::Less);
}
