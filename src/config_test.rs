use super::*;
use std::collections::HashMap;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect();
    move |key| vars.get(key).cloned()
}

#[test]
fn from_lookup_defaults_to_compiled_profile() {
    let cfg = ClientConfig::from_lookup(lookup_from(&[])).unwrap();
    assert_eq!(cfg.profile, BuildProfile::compiled());
    assert_eq!(cfg.api_base_url, BuildProfile::compiled().default_base_url());
}

#[test]
fn development_profile_uses_local_origin() {
    let cfg = ClientConfig::from_lookup(lookup_from(&[("NOTES_BUILD_PROFILE", "development")])).unwrap();
    assert_eq!(cfg.profile, BuildProfile::Development);
    assert_eq!(cfg.api_base_url, "http://localhost:3001");
}

#[test]
fn production_profile_uses_same_origin_prefix() {
    let cfg = ClientConfig::from_lookup(lookup_from(&[("NOTES_BUILD_PROFILE", "production")])).unwrap();
    assert_eq!(cfg.profile, BuildProfile::Production);
    assert_eq!(cfg.api_base_url, "/api");
}

#[test]
fn base_url_override_wins_over_profile_default() {
    let cfg = ClientConfig::from_lookup(lookup_from(&[
        ("NOTES_BUILD_PROFILE", "production"),
        ("NOTES_API_BASE_URL", "https://notes.example.test/"),
    ]))
    .unwrap();
    assert_eq!(cfg.api_base_url, "https://notes.example.test/");
}

#[test]
fn blank_override_is_ignored() {
    let cfg = ClientConfig::from_lookup(lookup_from(&[
        ("NOTES_BUILD_PROFILE", "dev"),
        ("NOTES_API_BASE_URL", "   "),
    ]))
    .unwrap();
    assert_eq!(cfg.api_base_url, DEFAULT_DEVELOPMENT_BASE_URL);
}

#[test]
fn unknown_profile_is_rejected() {
    let err = ClientConfig::from_lookup(lookup_from(&[("NOTES_BUILD_PROFILE", "staging")])).unwrap_err();
    assert_eq!(err, ConfigError::UnknownProfile("staging".to_owned()));
    assert!(err.to_string().contains("NOTES_BUILD_PROFILE"));
}
