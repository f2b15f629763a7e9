use super::*;

#[test]
fn substitutes_whole_token() {
    assert_eq!(substitute("run %IN out", "IN", "/data/x.csv"), "run /data/x.csv out");
}

#[test]
fn does_not_touch_longer_token() {
    let cmd = "run %IN with %INPUT_DIR";
    assert_eq!(
        substitute(cmd, "IN", "/a"),
        "run /a with %INPUT_DIR"
    );
}

#[test]
fn substitutes_named_key_token() {
    assert_eq!(substitute("cmd --model %MODEL", "MODEL", "resnet"), "cmd --model resnet");
}

#[test]
fn substitutes_all_occurrences() {
    assert_eq!(substitute("%IN %IN", "IN", "x"), "x x");
}

#[test]
fn token_at_end_of_string_matches() {
    assert!(contains_token("cp %IN", "IN"));
    assert_eq!(substitute("cp %IN", "IN", "/a/b"), "cp /a/b");
}

#[test]
fn contains_token_false_for_prefix_collision() {
    assert!(!contains_token("%INPUT_DIR only", "IN"));
    assert!(contains_token("%INPUT_DIR only", "INPUT_DIR"));
}

#[test]
fn contains_token_true_for_exact_match() {
    assert!(contains_token("x %OUT y", "OUT"));
}
