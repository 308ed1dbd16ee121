use std::fs;
use std::path::PathBuf;

use serial_test::serial;

use blockfall::config::CONFIG_ENV_VAR;
use blockfall::{ConfigStore, Game, GameConfig, RotationCycle};

fn scratch_path(name: &str) -> PathBuf {
    let mut path = std::env::temp_dir();
    path.push(format!("blockfall-test-{}-{}", std::process::id(), name));
    path.push("config.json");
    path
}

fn cleanup(path: &PathBuf) {
    if let Some(parent) = path.parent() {
        let _ = fs::remove_dir_all(parent);
    }
}

#[test]
fn missing_file_yields_defaults() {
    let path = scratch_path("missing");
    cleanup(&path);

    let config = ConfigStore::new(&path).load().expect("missing file is not an error");

    assert_eq!(config, GameConfig::default());
}

#[test]
fn saved_config_loads_back() {
    let path = scratch_path("saved");
    let store = ConfigStore::new(&path);
    let config = GameConfig {
        columns: 12,
        rows: 24,
        rotation_validated: true,
        rotation_cycle: RotationCycle::Four,
        ..GameConfig::default()
    };

    store.save(&config).expect("save should create parent dirs");
    let loaded = store.load().expect("saved config should load");
    cleanup(&path);

    assert_eq!(loaded, config);
}

#[test]
fn malformed_json_is_an_error() {
    let path = scratch_path("malformed");
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, "{ columns: ").unwrap();

    let result = ConfigStore::new(&path).load();
    cleanup(&path);

    let message = format!("{:#}", result.unwrap_err());
    assert!(message.contains("parsing"), "{}", message);
}

#[test]
fn invalid_values_are_rejected_on_load() {
    let path = scratch_path("invalid");
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, r#"{"columns": 2}"#).unwrap();

    let result = ConfigStore::new(&path).load();
    cleanup(&path);

    assert!(result.is_err());
}

#[test]
fn loaded_config_shapes_the_game() {
    let path = scratch_path("shapes-game");
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, r#"{"columns": 14, "rows": 30, "initial_speed_ms": 800}"#).unwrap();

    let config = ConfigStore::new(&path).load().unwrap();
    cleanup(&path);
    let game = Game::new(config);

    assert_eq!(game.board().columns(), 14);
    assert_eq!(game.board().rows(), 30);
    assert_eq!(game.speed_ms(), 800);
    assert_eq!(game.current_piece().position.row, 0);
}

#[test]
#[serial]
fn env_var_overrides_default_location() {
    let path = scratch_path("env");
    std::env::set_var(CONFIG_ENV_VAR, &path);

    let store = ConfigStore::from_env();
    std::env::remove_var(CONFIG_ENV_VAR);

    assert_eq!(store.path(), path.as_path());
}

#[test]
#[serial]
fn default_location_is_under_config_home() {
    std::env::remove_var(CONFIG_ENV_VAR);
    let previous = std::env::var_os("XDG_CONFIG_HOME");
    std::env::set_var("XDG_CONFIG_HOME", "/tmp/blockfall-xdg");

    let store = ConfigStore::from_env();

    match previous {
        Some(value) => std::env::set_var("XDG_CONFIG_HOME", value),
        None => std::env::remove_var("XDG_CONFIG_HOME"),
    }
    assert_eq!(
        store.path(),
        PathBuf::from("/tmp/blockfall-xdg/blockfall/config.json").as_path()
    );
}
