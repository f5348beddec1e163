//! Transition categories a lane connection may grant.
//!
//! A closed flags set: `TRACK` covers rail-like vehicles (tram, trolley,
//! metro, train), `NORMAL` covers everything else. Serialized as the
//! lower-case names joined by `|` (`"track|normal"` is written as `"all"`).

use std::fmt;
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, Not, Sub, SubAssign};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TransitionGroup(u8);

impl TransitionGroup {
    pub const NONE: Self = Self(0);
    pub const TRACK: Self = Self(1);
    pub const NORMAL: Self = Self(2);
    pub const ALL: Self = Self(Self::TRACK.0 | Self::NORMAL.0);

    /// Build from raw bits, dropping anything outside `ALL`.
    #[inline]
    pub const fn from_bits_truncate(bits: u8) -> Self {
        Self(bits & Self::ALL.0)
    }

    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// True when every bit of `other` is present in `self`.
    ///
    /// An empty `other` is trivially contained; callers that must not treat
    /// "nothing requested" as a match check `other.is_empty()` first.
    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    #[inline]
    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    #[inline]
    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }

    /// Iterate the single-bit groups set in `self`.
    pub fn iter(self) -> impl Iterator<Item = Self> {
        [Self::TRACK, Self::NORMAL]
            .into_iter()
            .filter(move |g| self.contains(*g))
    }
}

impl BitOr for TransitionGroup {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for TransitionGroup {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for TransitionGroup {
    type Output = Self;

    #[inline]
    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl BitAndAssign for TransitionGroup {
    #[inline]
    fn bitand_assign(&mut self, rhs: Self) {
        self.0 &= rhs.0;
    }
}

impl Sub for TransitionGroup {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self(self.0 & !rhs.0)
    }
}

impl SubAssign for TransitionGroup {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        self.remove(rhs);
    }
}

impl Not for TransitionGroup {
    type Output = Self;

    #[inline]
    fn not(self) -> Self {
        Self(!self.0 & Self::ALL.0)
    }
}

impl fmt::Display for TransitionGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::NONE => f.write_str("none"),
            Self::TRACK => f.write_str("track"),
            Self::NORMAL => f.write_str("normal"),
            Self::ALL => f.write_str("all"),
            other => write!(f, "{:#04b}", other.0),
        }
    }
}

impl fmt::Debug for TransitionGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TransitionGroup({})", self)
    }
}

/// Error returned when a group name cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown transition group '{0}' (expected none, track, normal, all)")]
pub struct ParseGroupError(pub String);

impl FromStr for TransitionGroup {
    type Err = ParseGroupError;

    /// Accepts `none`, `track`, `normal`, `all` (alias `both`), combined
    /// with `|` or `,`. Case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut group = Self::NONE;
        for part in s.split(['|', ',']) {
            let part = part.trim();
            group |= match part.to_ascii_lowercase().as_str() {
                "none" | "" => Self::NONE,
                "track" => Self::TRACK,
                "normal" => Self::NORMAL,
                "all" | "both" => Self::ALL,
                _ => return Err(ParseGroupError(s.to_string())),
            };
        }
        Ok(group)
    }
}

impl TryFrom<String> for TransitionGroup {
    type Error = ParseGroupError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TransitionGroup> for String {
    fn from(group: TransitionGroup) -> Self {
        group.to_string()
    }
}
