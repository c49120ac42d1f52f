use super::*;

#[test]
fn test_new_session() {
    let session = Session::new("/work/project", Path::new("/sessions"));
    assert!(!session.id.is_empty());
    assert_eq!(session.working_dir, PathBuf::from("/work/project"));
    assert_eq!(
        session.transcript_path,
        PathBuf::from(format!("/sessions/{}.jsonl", session.id))
    );
    assert_eq!(session.created_at, session.last_activity_at);
}

#[test]
fn test_ids_unique() {
    let a = Session::new("/w", Path::new("/s"));
    let b = Session::new("/w", Path::new("/s"));
    assert_ne!(a.id, b.id);
}

#[test]
fn test_touch_advances_activity() {
    let mut session = Session::new("/w", Path::new("/s"));
    let before = session.last_activity_at;
    std::thread::sleep(std::time::Duration::from_millis(5));
    session.touch();
    assert!(session.last_activity_at > before);
    assert!(session.idle_secs() <= 1);
}

#[test]
fn test_serde_round_trip() {
    let session = Session::new("/work", Path::new("/sessions"));
    let json = serde_json::to_string(&session).expect("serialize");
    let back: Session = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back.id, session.id);
    assert_eq!(back.transcript_path, session.transcript_path);
}
