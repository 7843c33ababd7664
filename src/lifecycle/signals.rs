//! OS signal handling.
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - Exposed as a future so the simulation loop can `select!` on it directly
//! - A second Ctrl-C is left to the default handler once the first is consumed

/// Resolves on the first Ctrl-C.
///
/// If the handler cannot be installed the error is logged and the future never
/// resolves, so the run goes to completion instead of stopping at once.
pub async fn interrupted() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Ctrl-C received, stopping simulation"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    }
}
