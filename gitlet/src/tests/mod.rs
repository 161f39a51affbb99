
/// Runs the built `gitlet` binary with `$args` (a space-separated string)
/// inside `$dir`, the integration-level counterpart to `cli::run`'s
/// in-process tests: this exercises the real process boundary (argv, exit
/// code, stdout) rather than calling `dispatch` directly.
#[macro_export]
macro_rules! gitlet {
    ($dir:expr, $args:expr) => {{
        assert_cmd::Command::cargo_bin("gitlet")
            .unwrap()
            .current_dir($dir)
            .args($args.split(' ').filter(|s: &&str| !s.is_empty()))
            .assert()
    }};
}
