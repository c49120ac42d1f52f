use super::*;
use pretty_assertions::assert_eq;

fn zone() -> SafeZone {
    SafeZone::new("/work/project")
}

fn texts(command: &str) -> Vec<String> {
    segment_command(command)
        .into_iter()
        .map(|s| s.text)
        .collect()
}

#[test]
fn test_single_segment() {
    assert_eq!(texts("git status -s"), vec!["git status -s"]);
}

#[test]
fn test_sequence_operators() {
    assert_eq!(
        texts("git add . && git commit -m x; git push | tee log"),
        vec!["git add .", "git commit -m x", "git push", "tee log"]
    );
}

#[test]
fn test_operators_inside_quotes_do_not_split() {
    assert_eq!(
        texts("echo 'a && b' | wc -l"),
        vec!["echo a && b", "wc -l"]
    );
}

#[test]
fn test_leading_env_assignments_stripped() {
    assert_eq!(
        texts("RUST_LOG=debug FOO=1 cargo test"),
        vec!["cargo test"]
    );
}

#[test]
fn test_env_assignment_after_program_kept() {
    // Only leading assignments are environment; later `=` words are args.
    assert_eq!(texts("git config user.name=x"), vec!["git config user.name=x"]);
}

#[test]
fn test_redirections_stripped() {
    assert_eq!(texts("echo hi > out.txt"), vec!["echo hi"]);
    assert_eq!(texts("echo hi >out.txt"), vec!["echo hi"]);
    assert_eq!(texts("cmd 2>&1"), vec!["cmd"]);
    assert_eq!(texts("cmd < input.txt"), vec!["cmd"]);
    assert_eq!(texts("cargo test 2> err.log"), vec!["cargo test"]);
}

#[test]
fn test_empty_segments_dropped() {
    assert_eq!(texts("git status &&"), vec!["git status"]);
    assert!(texts("").is_empty());
    assert!(texts(" ; ; ").is_empty());
}

#[test]
fn test_safe_commands() {
    let zone = zone();
    for cmd in ["pwd", "true", "false"] {
        let segments = segment_command(cmd);
        assert!(is_safe_segment(&segments[0], &zone), "{cmd} should be safe");
    }
}

#[test]
fn test_ls_safe_only_inside_zone() {
    let zone = zone();
    let inside = segment_command("ls src");
    assert!(is_safe_segment(&inside[0], &zone));

    let outside = segment_command("ls /etc");
    assert!(!is_safe_segment(&outside[0], &zone));

    let bare = segment_command("ls -la");
    assert!(is_safe_segment(&bare[0], &zone));
}

#[test]
fn test_cd_safe_only_inside_zone() {
    let zone = zone();
    let inside = segment_command("cd src/deep");
    assert!(is_safe_segment(&inside[0], &zone));

    let escape = segment_command("cd ../..");
    assert!(!is_safe_segment(&escape[0], &zone));
}

#[test]
fn test_blacklist() {
    assert!(is_blacklisted("rm"));
    assert!(is_blacklisted("sudo"));
    assert!(is_blacklisted("dd"));
    assert!(!is_blacklisted("git"));
}

#[test]
fn test_smart_prefix_multi_word_cli() {
    let seg = &segment_command("git status -s")[0];
    assert_eq!(smart_prefix(seg), Some("git status".to_string()));

    let seg = &segment_command("cargo build --release")[0];
    assert_eq!(smart_prefix(seg), Some("cargo build".to_string()));
}

#[test]
fn test_smart_prefix_plain_command() {
    let seg = &segment_command("make -j8")[0];
    assert_eq!(smart_prefix(seg), Some("make".to_string()));
}

#[test]
fn test_smart_prefix_skips_flag_subcommand() {
    let seg = &segment_command("git --version")[0];
    assert_eq!(smart_prefix(seg), Some("git".to_string()));
}

#[test]
fn test_expand_prefix_rule_for_extended_segment() {
    let rules = expand_command_rules("git status -s", &zone());
    assert_eq!(rules, vec![PermissionRule::BashPrefix("git status".to_string())]);
}

#[test]
fn test_expand_exact_rule_for_prefix_only_segment() {
    let rules = expand_command_rules("make", &zone());
    assert_eq!(rules, vec![PermissionRule::BashExact("make".to_string())]);
}

#[test]
fn test_expand_omits_safe_and_blacklisted_segments() {
    let rules = expand_command_rules("pwd && rm -rf target && git push origin", &zone());
    assert_eq!(rules, vec![PermissionRule::BashPrefix("git push".to_string())]);
}

#[test]
fn test_expand_omits_out_of_zone_ls() {
    let rules = expand_command_rules("ls /etc && cargo check", &zone());
    assert_eq!(rules, vec![PermissionRule::BashExact("cargo check".to_string())]);
}

#[test]
fn test_expand_dedups() {
    let rules = expand_command_rules("git status && git status -s", &zone());
    assert_eq!(rules, vec![PermissionRule::BashPrefix("git status".to_string())]);
}

#[test]
fn test_expansion_round_trip_covers_command() {
    // Every expanded rule must match the command it came from.
    let command = "git add -A && cargo test --workspace && make";
    let zone = zone();
    let rules = expand_command_rules(command, &zone);
    for segment in segment_command(command) {
        let covered = is_safe_segment(&segment, &zone)
            || rules.iter().any(|r| r.matches_segment(&segment.text));
        assert!(covered, "segment '{}' not covered", segment.text);
    }
}
