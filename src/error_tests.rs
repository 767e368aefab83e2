use super::*;

#[test]
fn http_status_mapping() {
    assert_eq!(AppError::validation("oops").http_status(), 400);
    assert_eq!(AppError::rejected(418, None).http_status(), 418);
    assert_eq!(AppError::unauthorized("no").http_status(), 401);
    assert_eq!(AppError::transport("reset").http_status(), 503);
    assert_eq!(AppError::decode("bad json").http_status(), 502);
    assert_eq!(AppError::internal("panic").http_status(), 500);
}

#[test]
fn user_message_prefers_backend_text() {
    let e = AppError::rejected(400, Some("bad credentials".into()));
    assert_eq!(e.user_message("generic"), "bad credentials");

    let e = AppError::rejected(500, None);
    assert_eq!(e.user_message("generic"), "generic");

    let e = AppError::rejected(400, Some("   ".into()));
    assert_eq!(e.user_message("generic"), "generic");

    let e = AppError::transport("connection refused");
    assert_eq!(e.user_message("generic"), "generic");

    let e = AppError::validation("Passwords do not match!");
    assert_eq!(e.user_message("generic"), "Passwords do not match!");
}

#[test]
fn display_includes_status() {
    assert_eq!(AppError::rejected(401, Some("nope".into())).to_string(), "HTTP 401: nope");
    assert_eq!(AppError::rejected(502, None).to_string(), "HTTP 502");
    assert_eq!(AppError::rejected(502, None).code_str(), "rejected");
}

#[test]
fn transport_classification() {
    assert!(AppError::transport("x").is_transport());
    assert!(!AppError::decode("x").is_transport());
    assert!(!AppError::rejected(500, None).is_transport());
}
