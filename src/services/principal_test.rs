use super::*;
use serde_json::json;

// =============================================================================
// Role parsing
// =============================================================================

#[test]
fn parses_canonical_names() {
    for role in Role::ALL {
        assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
    }
}

#[test]
fn parse_is_case_insensitive_and_trimmed() {
    assert_eq!(" admin ".parse::<Role>().unwrap(), Role::Admin);
    assert_eq!("Kitchen".parse::<Role>().unwrap(), Role::Kitchen);
}

#[test]
fn parse_strips_role_prefix() {
    assert_eq!("ROLE_CASHIER".parse::<Role>().unwrap(), Role::Cashier);
    assert_eq!("role_staff".parse::<Role>().unwrap(), Role::Staff);
}

#[test]
fn parse_rejects_unknown() {
    let err = "MANAGER".parse::<Role>().unwrap_err();
    assert_eq!(err, UnknownRole("MANAGER".into()));
    assert!(err.to_string().contains("MANAGER"));
}

#[test]
fn display_is_canonical_uppercase() {
    assert_eq!(Role::Customer.to_string(), "CUSTOMER");
}

// =============================================================================
// Role serde
// =============================================================================

#[test]
fn deserializes_from_string_or_object() {
    assert_eq!(serde_json::from_value::<Role>(json!("admin")).unwrap(), Role::Admin);
    assert_eq!(serde_json::from_value::<Role>(json!({ "name": "ROLE_STAFF" })).unwrap(), Role::Staff);
}

#[test]
fn deserialize_unknown_role_fails() {
    assert!(serde_json::from_value::<Role>(json!("overlord")).is_err());
}

#[test]
fn serializes_as_canonical_string() {
    assert_eq!(serde_json::to_value(Role::Kitchen).unwrap(), json!("KITCHEN"));
}

#[test]
fn lenient_role_maps_unknown_to_none() {
    #[derive(Deserialize)]
    struct Row {
        #[serde(default, deserialize_with = "lenient_role")]
        role: Option<Role>,
    }
    let known: Row = serde_json::from_value(json!({ "role": { "name": "cashier" } })).unwrap();
    let unknown: Row = serde_json::from_value(json!({ "role": "janitor" })).unwrap();
    let missing: Row = serde_json::from_value(json!({})).unwrap();
    assert_eq!(known.role, Some(Role::Cashier));
    assert_eq!(unknown.role, None);
    assert_eq!(missing.role, None);
}

// =============================================================================
// Principal
// =============================================================================

#[test]
fn principal_decodes_me_response() {
    let principal: Principal =
        serde_json::from_value(json!({ "username": "alice", "email": "a@example.com", "role": "admin" })).unwrap();
    assert_eq!(principal.username, "alice");
    assert_eq!(principal.role, Role::Admin);
    assert_eq!(principal.email.as_deref(), Some("a@example.com"));
    assert!(principal.is_admin());
}

#[test]
fn principal_without_role_is_rejected() {
    assert!(serde_json::from_value::<Principal>(json!({ "username": "bob" })).is_err());
}

#[test]
fn staff_principal_is_not_admin() {
    assert!(!Principal::new("bob", Role::Staff).is_admin());
}
