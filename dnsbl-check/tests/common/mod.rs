// dnsbl-check/tests/common/mod.rs

use assert_cmd::Command;
use tempfile::TempDir;

/// `dnsbl-check` run from `home`, isolated from the user's config files and
/// `DNSBL_*` environment.
pub fn dnsbl_check(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("dnsbl-check").unwrap();
    cmd.current_dir(home.path())
        .env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path())
        .env_remove("RUST_LOG");
    for var in [
        "DNSBL_CONCURRENCY",
        "DNSBL_TIMEOUT",
        "DNSBL_NAMESERVERS",
        "DNSBL_PROVIDERS",
        "DNSBL_FORMAT",
        "DNSBL_CONFIG",
    ] {
        cmd.env_remove(var);
    }
    cmd
}
