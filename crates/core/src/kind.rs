use crate::error::AvgError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The category of numbers requested from the remote source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumberKind {
    Prime,
    Fibonacci,
    Even,
    Random,
}

impl NumberKind {
    /// All kinds in display order.
    pub const ALL: [NumberKind; 4] = [
        NumberKind::Prime,
        NumberKind::Fibonacci,
        NumberKind::Even,
        NumberKind::Random,
    ];

    /// Single-letter selector used on the command line and in service routes.
    #[must_use]
    pub fn id(self) -> char {
        match self {
            Self::Prime     => 'p',
            Self::Fibonacci => 'f',
            Self::Even      => 'e',
            Self::Random    => 'r',
        }
    }

    /// Path segment appended to the source base URL.
    #[must_use]
    pub fn route(self) -> &'static str {
        match self {
            Self::Prime     => "primes",
            Self::Fibonacci => "fibo",
            Self::Even      => "even",
            Self::Random    => "rand",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Prime     => "Prime",
            Self::Fibonacci => "Fibonacci",
            Self::Even      => "Even",
            Self::Random    => "Random",
        }
    }

    /// Parse either the short selector (`p`) or the long name (`prime`).
    pub fn from_id(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "p" | "prime" | "primes"       => Some(Self::Prime),
            "f" | "fibonacci" | "fibo"     => Some(Self::Fibonacci),
            "e" | "even"                   => Some(Self::Even),
            "r" | "random" | "rand"        => Some(Self::Random),
            _ => None,
        }
    }
}

impl FromStr for NumberKind {
    type Err = AvgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_id(s).ok_or_else(|| AvgError::UnknownKind(s.to_string()))
    }
}

impl fmt::Display for NumberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_and_long_ids_parse() {
        assert_eq!(NumberKind::from_id("p"), Some(NumberKind::Prime));
        assert_eq!(NumberKind::from_id("Fibonacci"), Some(NumberKind::Fibonacci));
        assert_eq!(NumberKind::from_id(" E "), Some(NumberKind::Even));
        assert_eq!(NumberKind::from_id("rand"), Some(NumberKind::Random));
        assert_eq!(NumberKind::from_id("x"), None);
    }

    #[test]
    fn id_round_trips_through_from_id() {
        for kind in NumberKind::ALL {
            assert_eq!(NumberKind::from_id(&kind.id().to_string()), Some(kind));
        }
    }

    #[test]
    fn routes_match_test_server() {
        let routes: Vec<_> = NumberKind::ALL.iter().map(|k| k.route()).collect();
        assert_eq!(routes, ["primes", "fibo", "even", "rand"]);
    }

    #[test]
    fn unknown_kind_is_an_error() {
        let err = "q".parse::<NumberKind>().unwrap_err();
        assert!(matches!(err, AvgError::UnknownKind(ref s) if s == "q"));
    }
}
