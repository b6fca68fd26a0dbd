// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;

fn clear() {
    std::env::remove_var("SB_STATE_DIR");
    std::env::remove_var("XDG_STATE_HOME");
    std::env::remove_var("SB_CONFIG");
}

#[test]
#[serial(env)]
fn explicit_state_dir_wins() {
    clear();
    std::env::set_var("SB_STATE_DIR", "/tmp/sb-state");
    std::env::set_var("XDG_STATE_HOME", "/tmp/xdg");
    assert_eq!(state_dir().unwrap(), PathBuf::from("/tmp/sb-state"));
    clear();
}

#[test]
#[serial(env)]
fn xdg_state_home_is_namespaced() {
    clear();
    std::env::set_var("XDG_STATE_HOME", "/tmp/xdg");
    assert_eq!(state_dir().unwrap(), PathBuf::from("/tmp/xdg/switchboard"));
    clear();
}

#[test]
#[serial(env)]
fn falls_back_to_home() {
    clear();
    let home = std::env::var("HOME").unwrap();
    assert_eq!(
        state_dir().unwrap(),
        PathBuf::from(home).join(".local/state/switchboard")
    );
}

#[test]
#[serial(env)]
fn config_override() {
    clear();
    assert_eq!(config_path(), None);
    std::env::set_var("SB_CONFIG", "/etc/switchboard.toml");
    assert_eq!(config_path(), Some(PathBuf::from("/etc/switchboard.toml")));
    clear();
}
