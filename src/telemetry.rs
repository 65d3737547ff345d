use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "shelfmark_api=info,compute_similarities=info,tower_http=info";

/// Installs the global `tracing` subscriber, honoring `RUST_LOG` when set
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
