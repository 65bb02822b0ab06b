use std::path::PathBuf;

/// Test that the built-in site layout exists in src/defaults
#[test]
fn test_default_site_config_exists() {
    let config_path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("src/defaults/site.toml");

    assert!(
        config_path.exists(),
        "Default site config should exist at {:?}",
        config_path
    );
}

/// Test that the built-in site layout parses and names every page
#[test]
fn test_default_site_config_loads() {
    let config_path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("src/defaults/site.toml");

    let content =
        std::fs::read_to_string(&config_path).expect("Should be able to read site config");

    let config: toml::Value = toml::from_str(&content).expect("Site config should be valid TOML");
    let pages = config["pages"].as_array().expect("pages should be an array");
    assert_eq!(pages.len(), 7);
    for page in pages {
        assert!(page.get("id").is_some());
        assert!(page.get("file").is_some());
        assert!(page.get("sections").is_some());
    }
}
