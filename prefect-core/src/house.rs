//! The closed house enumeration and its rendering surfaces.
//!
//! Every affiliation comparison in the engine goes through this enum rather
//! than string or emoji matching, and each target surface (emoji, display
//! name) has exactly one rendering function.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A team affiliation a chat participant can be sorted into.
///
/// `HouseElf` competes for the cup but is skipped by the underdog bonus;
/// `Unaffiliated` never competes — their points are tallied separately as
/// "wasted".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum House {
    /// The brave.
    Gryffindor,
    /// The cunning.
    Slytherin,
    /// The loyal.
    Hufflepuff,
    /// The clever.
    Ravenclaw,
    /// The overworked pseudo-house.
    HouseElf,
    /// Not sorted yet.
    Unaffiliated,
}

impl House {
    /// Houses that compete for the term cup, in tie-break precedence order.
    ///
    /// When two houses finish a term on the same total, the one listed first
    /// here wins.
    pub const COMPETING: [House; 5] = [
        House::Gryffindor,
        House::Slytherin,
        House::Hufflepuff,
        House::Ravenclaw,
        House::HouseElf,
    ];

    /// The emoji surface for this house.
    #[must_use]
    pub fn emoji(self) -> &'static str {
        match self {
            Self::Gryffindor => "🦁",
            Self::Slytherin => "🐍",
            Self::Hufflepuff => "🦡",
            Self::Ravenclaw => "🦅",
            Self::HouseElf => "🧝",
            Self::Unaffiliated => "❌",
        }
    }

    /// The display-name surface for this house.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Gryffindor => "Gryffindor",
            Self::Slytherin => "Slytherin",
            Self::Hufflepuff => "Hufflepuff",
            Self::Ravenclaw => "Ravenclaw",
            Self::HouseElf => "House Elf",
            Self::Unaffiliated => "Unaffiliated",
        }
    }

    /// Stable storage representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gryffindor => "gryffindor",
            Self::Slytherin => "slytherin",
            Self::Hufflepuff => "hufflepuff",
            Self::Ravenclaw => "ravenclaw",
            Self::HouseElf => "houseelf",
            Self::Unaffiliated => "unaffiliated",
        }
    }

    /// Parse user input or a stored value, case-insensitively.
    ///
    /// Returns `None` for anything that is not a known house, so callers can
    /// tell a typo from an explicit `Unaffiliated`.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "gryffindor" => Some(Self::Gryffindor),
            "slytherin" => Some(Self::Slytherin),
            "hufflepuff" => Some(Self::Hufflepuff),
            "ravenclaw" => Some(Self::Ravenclaw),
            "houseelf" | "house elf" | "house-elf" => Some(Self::HouseElf),
            "unaffiliated" => Some(Self::Unaffiliated),
            _ => None,
        }
    }

    /// Precedence rank used to break total ties at rollover. Lower wins.
    #[must_use]
    pub fn precedence(self) -> usize {
        Self::COMPETING
            .iter()
            .position(|h| *h == self)
            .unwrap_or(Self::COMPETING.len())
    }
}

impl fmt::Display for House {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
