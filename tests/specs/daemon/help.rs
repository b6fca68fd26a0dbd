//! `sbd` argument handling specs

use crate::prelude::*;

#[test]
fn version_flag_prints_version() {
    sbd(&["--version"])
        .passes()
        .stdout_eq(&format!("sbd {}\n", env!("CARGO_PKG_VERSION")));
}

#[test]
fn help_flag_prints_usage() {
    sbd(&["--help"])
        .passes()
        .stdout_has("USAGE:")
        .stdout_has("--version");
}

#[test]
fn unexpected_argument_fails() {
    sbd(&["--frobnicate"])
        .fails()
        .stderr_has("unexpected argument '--frobnicate'");
}
