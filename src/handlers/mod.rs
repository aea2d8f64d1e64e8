// handlers/mod.rs - Handler tiers
//
// Public (no auth) → Protected (access token + active user) → Elevated (global admin)
pub mod elevated;
pub mod protected;
pub mod public;
