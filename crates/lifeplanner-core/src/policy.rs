//! What each engine does when its store fails.
//!
//! | engine       | read fails                     | write fails                        |
//! |--------------|--------------------------------|------------------------------------|
//! | entitlements | act as the free tier           | report `false` to caller           |
//! | ad throttle  | deny the ad (stats show zeros) | deny; a shown ad still counts once |
//!
//! Neither failure reaches the UI as an error. Changing one row without the
//! other changes product behavior.

/// Engines that read persisted state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Engine {
    Entitlements,
    AdThrottle,
}

/// How a failed read is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Degradation {
    /// Use the free-tier record.
    AssumeFreeTier,
    /// Answer "no".
    Deny,
}

impl Engine {
    pub const fn on_read_failure(self) -> Degradation {
        match self {
            Engine::Entitlements => Degradation::AssumeFreeTier,
            Engine::AdThrottle => Degradation::Deny,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engines_degrade_in_opposite_directions() {
        assert_eq!(Engine::Entitlements.on_read_failure(), Degradation::AssumeFreeTier);
        assert_eq!(Engine::AdThrottle.on_read_failure(), Degradation::Deny);
    }
}
