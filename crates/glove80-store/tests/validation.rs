//! Key validation service: arity, parameter conversion and suggestions.

use glove80_store::{IssueField, ValidationService};
use serde_json::json;

fn service() -> ValidationService {
    ValidationService::new(&["Base", "Lower", "Magic"])
}

#[test]
fn test_kp_keycode_canonicalized() {
    let result = service().validate(" &kp ", &[json!("a")]);
    assert!(result.is_valid(), "{:?}", result.issues);
    assert_eq!(result.value, "&kp");
    assert_eq!(result.params, vec![json!({"value": "A", "params": []})]);
}

#[test]
fn test_keycode_from_nested_binding() {
    let result = service().validate("&kp", &[json!({"value": "pg_up", "params": []})]);
    assert_eq!(result.params[0], json!({"value": "PG_UP", "params": []}));
}

#[test]
fn test_unknown_behavior() {
    let result = service().validate("&bogus", &[]);
    let issue = result.first_issue(IssueField::Value).unwrap();
    assert_eq!(issue.message, "Unknown behavior '&bogus'");
    assert!(result.params.is_empty());
}

#[test]
fn test_empty_behavior() {
    let result = service().validate("   ", &[]);
    assert_eq!(
        result.first_issue(IssueField::Value).unwrap().message,
        "Behavior is required"
    );
}

#[test]
fn test_arity_messages() {
    let missing = service().validate("&lt", &[json!("Lower")]);
    assert_eq!(
        missing.first_issue(IssueField::Params).unwrap().message,
        "&lt expects 2 parameter(s)"
    );

    let extra = service().validate("&trans", &[json!("A")]);
    assert_eq!(
        extra.first_issue(IssueField::Params).unwrap().message,
        "&trans accepts only 0 parameter(s)"
    );
}

#[test]
fn test_layer_param_becomes_tag() {
    let result = service().validate("&mo", &[json!("Lower")]);
    assert!(result.is_valid());
    assert_eq!(result.params, vec![json!({"name": "Lower"})]);

    let result = service().validate("&tog", &[json!({"name": "Gaming"})]);
    let issue = result.first_issue(IssueField::Params).unwrap();
    assert_eq!(issue.message, "Unknown layer 'Gaming'");
    assert_eq!(issue.param_index, Some(0));
}

#[test]
fn test_update_layers_refreshes_names() {
    let mut service = service();
    service.update_layers(&["Gaming"]);
    assert!(service.validate("&tog", &[json!("Gaming")]).is_valid());
    assert!(!service.validate("&tog", &[json!("Base")]).is_valid());
}

#[test]
fn test_integer_params_bounds() {
    let ok = service().validate("&macro_wait_time", &[json!("25")]);
    assert_eq!(ok.params, vec![json!(25)]);

    let negative = service().validate("&macro_tap_time", &[json!(-3)]);
    assert_eq!(
        negative.first_issue(IssueField::Params).unwrap().message,
        "Value must be >= 0"
    );

    let text = service().validate("&macro_tap_time", &[json!("soon")]);
    assert_eq!(
        text.first_issue(IssueField::Params).unwrap().message,
        "Parameter must be an integer (got 'soon')"
    );
}

#[test]
fn test_unknown_keycode_keeps_raw_param() {
    let result = service().validate("&kp", &[json!("NOPE")]);
    assert_eq!(result.params, vec![json!("NOPE")]);
    assert_eq!(
        result.first_issue(IssueField::Params).unwrap().message,
        "Unknown keycode 'NOPE'"
    );
}

#[test]
fn test_suggestions() {
    let service = service();
    assert_eq!(service.suggest_behaviors("&m", 3), vec!["&macro_pause_for_release", "&macro_press", "&macro_release"]);
    assert_eq!(service.suggest_layers("l", 8), vec!["Lower"]);
    assert_eq!(service.suggest_keycodes("f1", 2), vec!["F1", "F10"]);

    let all = service.suggestions("");
    assert_eq!(all.behaviors.len(), 8);
    assert_eq!(all.layers, vec!["Base", "Lower", "Magic"]);
}
