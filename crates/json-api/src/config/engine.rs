//! Engine Config

use clap::Args;

/// Engine behavior toggles.
#[derive(Debug, Args)]
pub struct EngineConfig {
    /// Lock and recount promo usage before recording a redemption. Turns
    /// the best-effort usage limit into a hard guarantee at the cost of a
    /// row lock per redemption.
    #[arg(long, env = "STRICT_PROMO_USAGE", default_value_t = false)]
    pub strict_promo_usage: bool,
}
