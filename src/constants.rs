//! Default values and fixed parameters of the rule engine and the territory
//! estimator.
//!
//! Everything here that a game may want to change at runtime is mirrored in
//! [`GameConfig`](crate::config::GameConfig); the remaining values are the
//! tuning constants of the influence diffusion.

// =============================================================================
// Game Defaults
// =============================================================================

/// Default board size (NxN). Standard Go sizes are 9, 13, or 19.
pub const DEFAULT_SIZE: usize = 19;

/// Default komi awarded to White for moving second.
pub const DEFAULT_KOMI: f32 = 6.5;

/// Number of prior positions retained for the positional superko check.
pub const KO_WINDOW: usize = 8;

/// Consecutive passes that end the game.
pub const PASSES_TO_END: u32 = 2;

/// Largest board the text coordinates can address (`A`..`Z` without `I`).
pub const MAX_VERTEX_SIZE: usize = 25;

// =============================================================================
// Territory Seeding
// =============================================================================

/// Seed value of an occupied intersection (positive for Black).
pub const STONE_SEED: f64 = 10.0;

/// Value of an empty region bordered by a single color.
pub const SOLE_BORDER_SEED: f64 = 5.0;

/// Half-width of the range used for regions bordered by both colors.
pub const CONTESTED_RANGE: f64 = 2.0;

/// Normalized influence beyond which an empty point counts as territory.
pub const OWNERSHIP_THRESHOLD: f64 = 0.5;

// =============================================================================
// Influence Diffusion
// =============================================================================

/// Smoothing passes in potential-territory mode.
pub const POTENTIAL_PASSES: usize = 8;

/// Smoothing passes in simple mode.
pub const SIMPLE_PASSES: usize = 3;

/// Neighbor weight of an orthogonally adjacent point (potential mode).
pub const ORTHOGONAL_WEIGHT: f64 = 0.4;

/// Neighbor weight of a diagonally adjacent point (potential mode).
pub const DIAGONAL_WEIGHT: f64 = 0.2;

/// Multiplier applied to the weight of a neighbor holding a stone.
pub const STONE_WEIGHT_FACTOR: f64 = 2.0;

/// Share of a point's own value kept per pass (potential mode).
pub const POTENTIAL_RETAIN: f64 = 0.6;

/// Share of a point's own value kept per pass (simple mode).
pub const SIMPLE_RETAIN: f64 = 0.7;
