use env_logger::{Builder, Env, Target};

/// Initialise the process logger. Output goes to stderr so that stdout
/// only ever carries the JSON result line.
pub fn init_logger() {
    let _ = Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Stderr)
        .format_timestamp_millis()
        .try_init();
}
