//! Unit tests for session configuration parsing.

use super::*;
use mockable::MockEnv;
use rstest::{fixture, rstest};
use std::collections::HashMap;
use std::io::Write;
use tempfile::NamedTempFile;

fn key_file(len: usize) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create key file");
    file.write_all(&vec![b'k'; len]).expect("write key bytes");
    file
}

#[fixture]
fn full_key() -> NamedTempFile {
    key_file(SESSION_KEY_MIN_LEN)
}

fn release_vars(key: &NamedTempFile) -> HashMap<&'static str, String> {
    HashMap::from([
        (KEY_FILE_ENV, key.path().to_string_lossy().into_owned()),
        (COOKIE_SECURE_ENV, "1".to_owned()),
        (SAMESITE_ENV, "Strict".to_owned()),
        (ALLOW_EPHEMERAL_ENV, "0".to_owned()),
    ])
}

fn mock_env(vars: HashMap<&'static str, String>) -> MockEnv {
    let mut env = MockEnv::new();
    env.expect_string()
        .times(0..)
        .returning(move |key| vars.get(key).cloned());
    env
}

fn release_error(vars: HashMap<&'static str, String>) -> SessionConfigError {
    match session_settings_from_env(&mock_env(vars), BuildMode::Release) {
        Ok(_) => panic!("release settings should have been rejected"),
        Err(error) => error,
    }
}

#[rstest]
#[case(COOKIE_SECURE_ENV)]
#[case(SAMESITE_ENV)]
#[case(ALLOW_EPHEMERAL_ENV)]
fn release_requires_every_toggle(full_key: NamedTempFile, #[case] missing: &'static str) {
    let mut vars = release_vars(&full_key);
    vars.remove(missing);

    let error = release_error(vars);

    assert!(
        matches!(error, SessionConfigError::MissingEnv { name } if name == missing),
        "unexpected error: {error}"
    );
}

#[rstest]
#[case(COOKIE_SECURE_ENV, "maybe")]
#[case(ALLOW_EPHEMERAL_ENV, "")]
#[case(SAMESITE_ENV, "sometimes")]
fn release_rejects_malformed_toggles(
    full_key: NamedTempFile,
    #[case] name: &'static str,
    #[case] value: &str,
) {
    let mut vars = release_vars(&full_key);
    vars.insert(name, value.to_owned());

    let error = release_error(vars);

    assert!(
        matches!(&error, SessionConfigError::InvalidEnv { name: got, value: raw, .. } if *got == name && raw == value),
        "unexpected error: {error}"
    );
}

#[rstest]
fn release_rejects_ephemeral_keys(full_key: NamedTempFile) {
    let mut vars = release_vars(&full_key);
    vars.insert(ALLOW_EPHEMERAL_ENV, "yes".to_owned());

    assert!(matches!(
        release_error(vars),
        SessionConfigError::EphemeralNotAllowed
    ));
}

#[rstest]
fn release_rejects_unreadable_and_short_keys(full_key: NamedTempFile) {
    let mut missing = release_vars(&full_key);
    missing.insert(KEY_FILE_ENV, "/nonexistent/inquiry/session_key".to_owned());
    assert!(matches!(
        release_error(missing),
        SessionConfigError::KeyRead { .. }
    ));

    let short = key_file(SESSION_KEY_MIN_LEN - 1);
    assert!(matches!(
        release_error(release_vars(&short)),
        SessionConfigError::KeyTooShort { length, .. } if length == SESSION_KEY_MIN_LEN - 1
    ));
}

#[rstest]
fn release_rejects_insecure_same_site_none(full_key: NamedTempFile) {
    let mut vars = release_vars(&full_key);
    vars.insert(COOKIE_SECURE_ENV, "0".to_owned());
    vars.insert(SAMESITE_ENV, "None".to_owned());

    assert!(matches!(
        release_error(vars),
        SessionConfigError::InsecureSameSiteNone
    ));
}

#[rstest]
fn release_accepts_complete_settings(full_key: NamedTempFile) {
    let mut vars = release_vars(&full_key);
    vars.insert(COOKIE_NAME_ENV, "marketplace_session".to_owned());

    let settings = session_settings_from_env(&mock_env(vars), BuildMode::Release)
        .expect("complete release settings");

    assert!(settings.cookie_secure);
    assert_eq!(settings.same_site, SameSite::Strict);
    assert_eq!(settings.cookie_name, "marketplace_session");
}

#[rstest]
fn same_key_file_yields_same_signing_key(full_key: NamedTempFile) {
    let first = session_settings_from_env(&mock_env(release_vars(&full_key)), BuildMode::Release)
        .expect("first read");
    let second = session_settings_from_env(&mock_env(release_vars(&full_key)), BuildMode::Release)
        .expect("second read");

    assert_eq!(first.key.master(), second.key.master());
}

#[rstest]
fn debug_falls_back_to_defaults() {
    let settings = session_settings_from_env(&mock_env(HashMap::new()), BuildMode::Debug)
        .expect("debug defaults");

    assert!(settings.cookie_secure);
    assert_eq!(settings.same_site, SameSite::Lax);
    assert_eq!(settings.cookie_name, DEFAULT_COOKIE_NAME);
}

#[rstest]
fn debug_tolerates_malformed_values(full_key: NamedTempFile) {
    let mut vars = release_vars(&full_key);
    vars.insert(SAMESITE_ENV, "unexpected".to_owned());
    vars.insert(COOKIE_SECURE_ENV, "perhaps".to_owned());
    vars.insert(COOKIE_NAME_ENV, "   ".to_owned());

    let settings =
        session_settings_from_env(&mock_env(vars), BuildMode::Debug).expect("debug fallback");

    assert!(settings.cookie_secure);
    assert_eq!(settings.same_site, SameSite::Lax);
    assert_eq!(settings.cookie_name, DEFAULT_COOKIE_NAME);
}
