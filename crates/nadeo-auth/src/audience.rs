//! Token audiences

use std::fmt;

/// The two Nadeo services this client authenticates against.
///
/// Both audiences share one Ubisoft session ticket but carry separate
/// token pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Audience {
    /// Campaigns, clubs, leaderboards
    Live,
    /// Map metadata
    Core,
}

impl Audience {
    /// Service name sent in the exchange request body. Doubles as the
    /// on-disk token file stem.
    pub fn service_name(self) -> &'static str {
        match self {
            Audience::Live => "NadeoLiveServices",
            Audience::Core => "NadeoServices",
        }
    }
}

impl fmt::Display for Audience {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.service_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_names_match_the_wire_values() {
        assert_eq!(Audience::Live.service_name(), "NadeoLiveServices");
        assert_eq!(Audience::Core.service_name(), "NadeoServices");
    }

    #[test]
    fn display_uses_the_service_name() {
        assert_eq!(Audience::Live.to_string(), "NadeoLiveServices");
    }
}
