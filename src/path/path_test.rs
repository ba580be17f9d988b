use super::*;

#[test]
fn test_parse_extracts_user() {
    let parsed = parse("alice@x/foo/bar").unwrap();
    assert_eq!(parsed.user().as_str(), "alice@x");
    assert_eq!(parsed.nelem(), 2);
    assert_eq!(parsed.path(), "alice@x/foo/bar");
}

#[test]
fn test_parse_root_forms() {
    assert_eq!(parse("alice@x").unwrap().path(), "alice@x/");
    assert_eq!(parse("alice@x/").unwrap().path(), "alice@x/");
    assert!(parse("alice@x/").unwrap().is_root());
}

#[test]
fn test_parse_collapses_repeated_slashes() {
    assert_eq!(parse("alice@x//a///b/").unwrap().path(), "alice@x/a/b");
}

#[test]
fn test_parse_rejects_bad_names() {
    assert_eq!(parse(""), Err(PathError::Empty));
    assert_eq!(parse("alice/foo"), Err(PathError::MissingAt("alice".to_string())));
    assert_eq!(parse("@x/foo"), Err(PathError::BadUserName("@x".to_string())));
    assert_eq!(parse("alice@/foo"), Err(PathError::BadUserName("alice@".to_string())));
    assert!(matches!(parse("alice@x/a/../b"), Err(PathError::BadElement(_))));
}

#[test]
fn test_drop_path() {
    assert_eq!(drop_path("alice@x/dir/new", 1), "alice@x/dir");
    assert_eq!(drop_path("alice@x/foo", 1), "alice@x/");
    assert_eq!(drop_path("alice@x/a/b/c", 2), "alice@x/a");
    // The root has no parent.
    assert_eq!(drop_path("alice@x/", 1), "alice@x/");
    // Unparseable names come back as given.
    assert_eq!(drop_path("nouser/dir", 1), "nouser/dir");
}

#[test]
fn test_is_access_file() {
    assert!(is_access_file("alice@x/Access"));
    assert!(is_access_file("alice@x/dir/Access"));
    assert!(!is_access_file("alice@x/dir/Access.txt"));
    assert!(!is_access_file("alice@x/Access/file"));
    assert!(!is_access_file("alice@x/"));
    assert!(!is_access_file("Access"));
}

#[test]
fn test_user_name_root() {
    let user = UserName::parse("bob@example.com").unwrap();
    assert_eq!(user.root(), "bob@example.com/");
    assert_eq!(user.to_string(), "bob@example.com");
}
