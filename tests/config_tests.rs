use serial_test::serial;
use std::env;
use wishlist_portal::config::{AppConfig, Env};

#[test]
#[serial]
fn default_config_is_safe_for_tests() {
    let config = AppConfig::default();
    assert_eq!(config.env, Env::Local);
    assert!(!config.jwt_secret.is_empty());
    assert!(config.db_url.starts_with("postgres://"));
}

#[test]
#[serial]
fn load_defaults_to_local_with_fallback_secret() {
    unsafe {
        env::remove_var("APP_ENV");
        env::remove_var("JWT_SECRET");
        env::set_var("DATABASE_URL", "postgres://u:p@localhost:5432/portal");
    }

    let config = AppConfig::load();
    assert_eq!(config.env, Env::Local);
    assert_eq!(config.db_url, "postgres://u:p@localhost:5432/portal");
    assert_eq!(config.jwt_secret, "super-secure-test-secret-value-local");

    unsafe {
        env::remove_var("DATABASE_URL");
    }
}

#[test]
#[serial]
fn load_honors_explicit_secret() {
    unsafe {
        env::remove_var("APP_ENV");
        env::set_var("DATABASE_URL", "postgres://u:p@localhost:5432/portal");
        env::set_var("JWT_SECRET", "explicit-secret");
    }

    let config = AppConfig::load();
    assert_eq!(config.jwt_secret, "explicit-secret");

    unsafe {
        env::remove_var("DATABASE_URL");
        env::remove_var("JWT_SECRET");
    }
}
