//! Text canonicalization for artist and title comparison.

pub mod normalize;
pub mod variants;

pub use normalize::{normalize, normalize_with, NormalizeOptions};
pub use variants::{artist_variants, title_variants};
