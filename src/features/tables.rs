//! Lookup tables behind the derived flags.

/// Immutable vocabularies consumed by [`super::FeatureEngineer`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureTables {
    /// Exact-match facing direction codes.
    pub facing: &'static [(&'static str, u8)],
    /// Exact-match furnished statuses.
    pub furnished: &'static [&'static str],
    /// Lowercase parking values meaning a space is available.
    pub parking: &'static [&'static str],
    /// Lowercase security values meaning the listing is secured.
    pub security: &'static [&'static str],
    /// Lowercase substring marking a ready-to-move listing.
    pub ready_token: &'static str,
}

impl FeatureTables {
    pub const STANDARD: FeatureTables = FeatureTables {
        facing: &[("North", 0), ("East", 1), ("West", 2), ("South", 3)],
        furnished: &["Furnished", "Semi-furnished"],
        parking: &["yes", "covered", "open"],
        security: &["yes", "24x7", "gated"],
        ready_token: "ready",
    };

    /// `None` for any direction outside the table.
    pub fn facing_code(&self, facing: &str) -> Option<u8> {
        self.facing
            .iter()
            .find(|(name, _)| *name == facing)
            .map(|&(_, code)| code)
    }

    pub fn is_furnished(&self, status: &str) -> bool {
        self.furnished.contains(&status)
    }

    pub fn is_ready_to_move(&self, availability: &str) -> bool {
        availability.to_lowercase().contains(self.ready_token)
    }

    pub fn has_parking(&self, parking: &str) -> bool {
        self.parking.contains(&parking.to_lowercase().as_str())
    }

    pub fn has_security(&self, security: Option<&str>) -> bool {
        security.is_some_and(|s| self.security.contains(&s.to_lowercase().as_str()))
    }
}

impl Default for FeatureTables {
    fn default() -> Self {
        Self::STANDARD
    }
}
