/// Tunables for a single simplification run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimplifyOptions {
    /// Largest integer power of a sum that is multiplied out.
    /// `(x + 1)^20` stays opaque with the default of 16.
    pub max_expand_exponent: u32,
    /// Nested rule rewrites allowed below one node before giving up.
    pub max_rewrite_depth: usize,
}

impl Default for SimplifyOptions {
    fn default() -> Self {
        Self {
            max_expand_exponent: 16,
            max_rewrite_depth: 64,
        }
    }
}
