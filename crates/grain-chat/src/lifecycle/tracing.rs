//! # Observability & Tracing
//!
//! [`setup_tracing`] installs a compact `tracing-subscriber` formatter filtered by
//! `RUST_LOG`. Logs go to stderr so they never interleave with the chat session on stdout.
//!
//! ```bash
//! # Connection attempts, activations, batch summaries
//! RUST_LOG=info cargo run
//!
//! # Every call, with its payload
//! RUST_LOG=debug cargo run
//!
//! # Only the runtime
//! RUST_LOG=grain_framework=debug cargo run
//! ```
//!
//! With `RUST_LOG=debug` a chat message looks like:
//!
//! ```text
//! DEBUG message{channel=general author=Alexey}:call{call=Message(..) grain_type="ChatRoom"}: Sending request
//! DEBUG Message accepted channel=general author=Alexey
//! ```

pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}
