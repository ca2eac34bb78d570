use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Roster slot a player is drafted into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Position {
    Qb,
    Rb,
    Wr,
    Te,
    K,
    Dst,
}

impl Position {
    /// Every position, in roster order.
    pub const ALL: [Position; 6] = [
        Position::Qb,
        Position::Rb,
        Position::Wr,
        Position::Te,
        Position::K,
        Position::Dst,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Qb => "QB",
            Self::Rb => "RB",
            Self::Wr => "WR",
            Self::Te => "TE",
            Self::K => "K",
            Self::Dst => "DST",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Position {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "QB" => Ok(Self::Qb),
            "RB" => Ok(Self::Rb),
            "WR" => Ok(Self::Wr),
            "TE" => Ok(Self::Te),
            "K" => Ok(Self::K),
            "DST" | "D/ST" | "DEF" => Ok(Self::Dst),
            _ => Err(UnknownVariant(s.to_string())),
        }
    }
}

/// League scoring rules applied to projections.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ScoringFormat {
    /// No points per reception.
    #[default]
    Standard,
    /// One point per reception.
    Ppr,
    /// Half a point per reception.
    HalfPpr,
}

impl ScoringFormat {
    pub const ALL: [ScoringFormat; 3] = [
        ScoringFormat::Standard,
        ScoringFormat::Ppr,
        ScoringFormat::HalfPpr,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Ppr => "ppr",
            Self::HalfPpr => "half_ppr",
        }
    }
}

impl fmt::Display for ScoringFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScoringFormat {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "standard" => Ok(Self::Standard),
            "ppr" => Ok(Self::Ppr),
            "half_ppr" => Ok(Self::HalfPpr),
            _ => Err(UnknownVariant(s.to_string())),
        }
    }
}

/// Returned when a string does not name a known enum variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown variant: {0}")]
pub struct UnknownVariant(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_parsing() {
        assert_eq!("qb".parse::<Position>(), Ok(Position::Qb));
        assert_eq!(" WR ".parse::<Position>(), Ok(Position::Wr));
        assert_eq!("D/ST".parse::<Position>(), Ok(Position::Dst));
        assert!("LB".parse::<Position>().is_err());
    }

    #[test]
    fn test_position_serde_uses_roster_labels() {
        let json = serde_json::to_string(&Position::Dst).unwrap();
        assert_eq!(json, "\"DST\"");
        let parsed: Position = serde_json::from_str("\"TE\"").unwrap();
        assert_eq!(parsed, Position::Te);
    }

    #[test]
    fn test_scoring_format_round_trips_through_str() {
        for format in ScoringFormat::ALL {
            assert_eq!(format.as_str().parse::<ScoringFormat>(), Ok(format));
        }
        assert_eq!(
            serde_json::to_string(&ScoringFormat::HalfPpr).unwrap(),
            "\"half_ppr\""
        );
        assert_eq!(ScoringFormat::default(), ScoringFormat::Standard);
    }

    #[test]
    fn test_scoring_format_rejects_unknown() {
        let err = "superflex".parse::<ScoringFormat>().unwrap_err();
        assert_eq!(err.to_string(), "unknown variant: superflex");
    }
}
