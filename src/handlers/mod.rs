pub mod clients;
pub mod dashboard;
pub mod orders;
pub mod recipes;

/// Liveness probe, no identity required.
pub async fn health() -> &'static str {
    "ok"
}
