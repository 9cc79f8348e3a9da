use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing from `CSSM_LOG`, falling back to `RUST_LOG`.
///
/// Does nothing when neither is set. `CSSM_LOG_TREE=1` selects indented,
/// span-nested output. Safe to call multiple times.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        let Some(directives) = std::env::var("CSSM_LOG")
            .ok()
            .or_else(|| std::env::var("RUST_LOG").ok())
        else {
            return;
        };
        let filter = EnvFilter::new(directives);

        if std::env::var("CSSM_LOG_TREE").is_ok_and(|v| v == "1") {
            tracing_subscriber::registry()
                .with(
                    tracing_tree::HierarchicalLayer::new(2)
                        .with_targets(true)
                        .with_writer(std::io::stderr),
                )
                .with(filter)
                .init();
        } else {
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_level(true)
                        .with_writer(std::io::stderr),
                )
                .with(filter)
                .init();
        }
    });
}
