mod cli;
#[cfg(test)]
#[macro_use]
mod tests;

/// Verbosity is gated on `GITLET_LOG`, mirroring the reference implementation's
/// own `BIT_LOG`-gated `env_logger` setup (§4.12). Protocol output on stdout is
/// unconditional and independent of this.
fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::new().filter_or("GITLET_LOG", "off")).init();
}

fn main() {
    init_logging();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let workdir = std::env::current_dir().expect("failed to read current working directory");

    let code = cli::run(&args, &workdir);
    std::process::exit(code);
}
