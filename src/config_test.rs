use std::collections::HashMap;

use super::*;

fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect();
    move |key| map.get(key).cloned()
}

#[test]
fn empty_environment_uses_defaults() {
    let config = AppConfig::from_lookup(lookup(&[]));
    assert_eq!(config, AppConfig::default());
    assert_eq!(config.bridge_timeout, Duration::from_secs(10));
    let splash = config.splash.expect("splash on by default");
    assert_eq!(splash.min_dwell, Duration::from_secs(3));
    assert_eq!(splash.asset, AssetSource::File(PathBuf::from("public/smart-cart-ar.png")));
}

#[test]
fn overrides_are_applied() {
    let config = AppConfig::from_lookup(lookup(&[
        ("CART_BRIDGE_TIMEOUT_MS", "250"),
        ("CART_SPLASH_MIN_MS", "1500"),
        ("CART_SPLASH_ASSET", "http://localhost:5173/splash.png"),
        ("CART_SIMULATOR", "off"),
        ("CART_SIMULATOR_STORE", "/tmp/cart.json"),
    ]));
    assert_eq!(config.bridge_timeout, Duration::from_millis(250));
    let splash = config.splash.expect("splash");
    assert_eq!(splash.min_dwell, Duration::from_millis(1500));
    assert_eq!(splash.asset, AssetSource::Http("http://localhost:5173/splash.png".to_owned()));
    assert!(!config.simulator);
    assert_eq!(config.simulator_store, Some(PathBuf::from("/tmp/cart.json")));
}

#[test]
fn splash_can_be_disabled() {
    let config = AppConfig::from_lookup(lookup(&[("CART_SPLASH_ENABLED", "false")]));
    assert!(config.splash.is_none());
}

#[test]
fn invalid_values_fall_back_to_defaults() {
    let config = AppConfig::from_lookup(lookup(&[
        ("CART_BRIDGE_TIMEOUT_MS", "soon"),
        ("CART_SPLASH_ENABLED", "maybe"),
        ("CART_SIMULATOR_STORE", "  "),
    ]));
    assert_eq!(config.bridge_timeout, Duration::from_millis(DEFAULT_BRIDGE_TIMEOUT_MS));
    assert!(config.splash.is_some());
    assert_eq!(config.simulator_store, None);
}

#[test]
fn parse_flag_accepts_common_spellings() {
    for raw in ["1", "true", "YES", " on "] {
        assert_eq!(parse_flag(raw), Some(true), "{raw}");
    }
    for raw in ["0", "False", "no", "OFF"] {
        assert_eq!(parse_flag(raw), Some(false), "{raw}");
    }
    assert_eq!(parse_flag("enabled"), None);
}

#[test]
fn from_env_reads_process_environment() {
    unsafe { std::env::set_var("CART_SPLASH_MIN_MS", "42") };
    let config = AppConfig::from_env();
    unsafe { std::env::remove_var("CART_SPLASH_MIN_MS") };
    assert_eq!(config.splash.map(|s| s.min_dwell), Some(Duration::from_millis(42)));
}
