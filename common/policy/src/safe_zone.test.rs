use super::*;

#[test]
fn test_contains_relative_paths() {
    let zone = SafeZone::new("/work/project");
    assert!(zone.contains("src/main.rs"));
    assert!(zone.contains("."));
    assert!(!zone.contains("../other"));
    assert!(!zone.contains("/etc/passwd"));
}

#[test]
fn test_contains_absolute_paths() {
    let zone = SafeZone::new("/work/project");
    assert!(zone.contains("/work/project/src/lib.rs"));
    assert!(!zone.contains("/work/other"));
}

#[test]
fn test_dot_dot_escape_detected_lexically() {
    let zone = SafeZone::new("/work/project");
    assert!(!zone.contains("src/../../escape"));
    assert!(zone.contains("src/../inside"));
}

#[test]
fn test_additional_directories() {
    let zone = SafeZone::new("/work/project").with_additional_dir("/shared/cache");
    assert!(zone.contains("/shared/cache/artifacts"));
    assert!(!zone.contains("/shared/other"));
}

#[test]
fn test_resolve_against_workdir() {
    let zone = SafeZone::new("/work/project");
    assert_eq!(
        zone.resolve("src/main.rs"),
        PathBuf::from("/work/project/src/main.rs")
    );
    assert_eq!(zone.resolve("/abs/path"), PathBuf::from("/abs/path"));
    assert_eq!(
        zone.resolve("src/../notes.md"),
        PathBuf::from("/work/project/notes.md")
    );
}
