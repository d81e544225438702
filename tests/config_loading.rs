// tests/config_loading.rs
use cosmos_news_monitor::config::{
    load_default, load_from, ClassifierKind, DEFAULT_API_URL, ENV_API_URL, ENV_CONFIG_PATH,
};
use std::{env, fs};

#[test]
#[serial_test::serial]
fn toml_and_json_files_load() {
    let dir = tempfile::tempdir().unwrap();

    let p_toml = dir.path().join("news.toml");
    fs::write(
        &p_toml,
        r#"
api_url = "http://localhost:8000"
default_page_size = 50

[classifier]
provider = "remote"
url = "http://localhost:9000/sentiment"
timeout_ms = 500
"#,
    )
    .unwrap();
    let cfg = load_from(&p_toml).unwrap();
    assert_eq!(cfg.api_url, "http://localhost:8000");
    assert_eq!(cfg.default_page_size, 50);
    assert_eq!(cfg.classifier.provider, ClassifierKind::Remote);
    assert_eq!(cfg.classifier.timeout_ms, 500);

    let p_json = dir.path().join("news.json");
    fs::write(&p_json, r#"{ "enrich_concurrency": 2, "default_page_size": 7 }"#).unwrap();
    let cfg = load_from(&p_json).unwrap();
    assert_eq!(cfg.enrich_concurrency, 2);
    assert_eq!(cfg.default_page_size, 20, "invalid page size falls back");

    let bad = dir.path().join("broken.toml");
    fs::write(&bad, "api_url = [").unwrap();
    assert!(load_from(&bad).is_err());
}

#[serial_test::serial]
#[test]
fn default_uses_env_then_fallbacks() {
    // Isolate CWD so the repo's own config/ is not picked up.
    let old = env::current_dir().unwrap();
    let tmp = tempfile::tempdir().unwrap();
    env::set_current_dir(tmp.path()).unwrap();
    env::remove_var(ENV_CONFIG_PATH);
    env::remove_var(ENV_API_URL);

    // 1) Nothing on disk -> defaults
    let cfg = load_default().unwrap();
    assert_eq!(cfg.api_url, DEFAULT_API_URL);

    // 2) Fallback TOML in ./config/
    let cfg_dir = tmp.path().join("config");
    fs::create_dir_all(&cfg_dir).unwrap();
    fs::write(cfg_dir.join("news.toml"), r#"api_url = "http://toml.local""#).unwrap();
    assert_eq!(load_default().unwrap().api_url, "http://toml.local");

    // 3) Env path wins over fallbacks
    let p_env = tmp.path().join("custom.json");
    fs::write(&p_env, r#"{ "api_url": "http://json.local" }"#).unwrap();
    env::set_var(ENV_CONFIG_PATH, p_env.display().to_string());
    assert_eq!(load_default().unwrap().api_url, "http://json.local");

    // 4) Env override wins over file values
    env::set_var(ENV_API_URL, "http://override.local");
    assert_eq!(load_default().unwrap().api_url, "http://override.local");
    env::remove_var(ENV_API_URL);

    // 5) Dangling env path is an error
    env::set_var(ENV_CONFIG_PATH, tmp.path().join("missing.toml").display().to_string());
    assert!(load_default().is_err());
    env::remove_var(ENV_CONFIG_PATH);

    env::set_current_dir(&old).unwrap();
}
