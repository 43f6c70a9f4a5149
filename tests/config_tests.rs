use std::fs;

use pretty_assertions::assert_eq;
use serde_json::json;

use wpifmt_lib::config::{CONFIG_FILE_NAME, Config, discover_config_file};

#[test]
fn defaults_enable_format_on_save_only() {
    let config = Config::default();

    assert!(config.run_format_on_save);
    assert!(!config.save_on_format_request);
    assert!(!config.force_lf_on_save);
    assert!(config.ignore_force_lf_save_files.is_empty());
    assert_eq!(config.tool, "wpiformat");
}

#[test]
fn settings_keys_are_camel_case() {
    let config = Config {
        run_format_on_save: false,
        save_on_format_request: true,
        force_lf_on_save: true,
        ignore_force_lf_save_files: vec!["*.bat".to_string()],
        tool: "wpiformat".to_string(),
    };

    let value = serde_json::to_value(&config).unwrap();
    assert_eq!(
        value,
        json!({
            "runFormatOnSave": false,
            "saveOnFormatRequest": true,
            "forceLFOnSave": true,
            "ignoreForceLFSaveFiles": ["*.bat"],
            "tool": "wpiformat",
        })
    );

    let round_tripped: Config = serde_json::from_value(value).unwrap();
    assert_eq!(round_tripped, config);
}

#[test]
fn partial_json_payload_fills_in_defaults() {
    let mut config = Config::default();
    assert!(config.apply_json(&json!({ "runFormatOnSave": false })));

    assert!(!config.run_format_on_save);
    assert_eq!(config.tool, "wpiformat");
}

#[test]
fn section_wrapped_payload_is_rejected() {
    let mut config = Config::default();
    let applied = config.apply_json(&json!({ "wpifmt": { "runFormatOnSave": false } }));

    assert!(!applied);
    assert!(config.run_format_on_save);
}

#[test]
fn loads_toml_file() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join(CONFIG_FILE_NAME);
    fs::write(
        &path,
        r#"
runFormatOnSave = false
forceLFOnSave = true
ignoreForceLFSaveFiles = ["*.bat", "Makefile"]
"#,
    )
    .unwrap();

    let config = Config::load_file(&path).unwrap();
    assert!(!config.run_format_on_save);
    assert!(config.force_lf_on_save);
    assert_eq!(config.ignore_force_lf_save_files, vec!["*.bat", "Makefile"]);
    assert_eq!(config.tool, "wpiformat");
}

#[test]
fn unknown_toml_key_is_an_error() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join(CONFIG_FILE_NAME);
    fs::write(&path, "runFormatOnSav = false\n").unwrap();

    assert!(Config::load_file(&path).is_err());
}

#[test]
fn missing_explicit_file_is_an_error() {
    let temp = tempfile::tempdir().unwrap();
    let missing = temp.path().join("nope.toml");

    assert!(Config::load(Some(&missing), temp.path()).is_err());
}

#[test]
fn discovery_walks_upward() {
    let temp = tempfile::tempdir().unwrap();
    let root = temp.path();
    fs::write(root.join(CONFIG_FILE_NAME), "runFormatOnSave = false\n").unwrap();
    let deep = root.join("a/b/c");
    fs::create_dir_all(&deep).unwrap();

    assert_eq!(discover_config_file(&deep), Some(root.join(CONFIG_FILE_NAME)));

    let config = Config::load(None, &deep).unwrap();
    assert!(!config.run_format_on_save);
}

#[test]
fn no_config_file_means_defaults() {
    let temp = tempfile::tempdir().unwrap();
    let config = Config::load(None, temp.path()).unwrap();
    assert_eq!(config, Config::default());
}
