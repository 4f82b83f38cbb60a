use std::{
    fmt::{Debug, Display, Formatter},
    str::FromStr,
};

use serde_with::{DeserializeFromStr, SerializeDisplay};

use crate::prelude::*;

/// Calendar month encoded by the backend as a six-digit `YYYYMM` key.
///
/// The derived ordering is chronological, which matches the lexicographic ordering
/// of the fixed-width key.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, SerializeDisplay, DeserializeFromStr)]
pub struct YearMonth {
    year: u16,
    month: u8,
}

impl YearMonth {
    #[must_use]
    pub const fn new(year: u16, month: u8) -> Option<Self> {
        if month >= 1 && month <= 12 { Some(Self { year, month }) } else { None }
    }

    /// Build from the numeric `year * 100 + month` key.
    #[cfg(test)]
    #[must_use]
    pub fn from_key(key: u32) -> Option<Self> {
        Self::new(u16::try_from(key / 100).ok()?, u8::try_from(key % 100).ok()?)
    }

    #[must_use]
    pub const fn year(self) -> u16 {
        self.year
    }

    /// Zero-based month index, suitable for twelve-slot arrays.
    #[must_use]
    pub const fn month_index(self) -> usize {
        self.month as usize - 1
    }

    #[must_use]
    pub fn key(self) -> u32 {
        u32::from(self.year) * 100 + u32::from(self.month)
    }

    #[must_use]
    pub const fn succ(self) -> Self {
        if self.month == 12 {
            Self { year: self.year + 1, month: 1 }
        } else {
            Self { year: self.year, month: self.month + 1 }
        }
    }

    /// Chart label, for example `2025-07`.
    #[must_use]
    pub const fn label(self) -> Label {
        Label(self)
    }

    /// Every month from `self` up to and including `until`.
    pub fn iter_until(self, until: Self) -> impl Iterator<Item = Self> {
        std::iter::successors(Some(self), |month| Some(month.succ()))
            .take_while(move |month| *month <= until)
    }

    /// Loose parsing: four year digits, optional separators, one or two month digits.
    ///
    /// Accepts `202507`, `2025-7`, `2025.07` and alike.
    #[must_use]
    pub fn parse_loose(text: &str) -> Option<Self> {
        let text = text.trim();
        let start = text.find(|c: char| c.is_ascii_digit())?;
        let text = &text[start..];
        let year = text.get(..4).filter(|year| year.bytes().all(|b| b.is_ascii_digit()))?;
        let rest = text[4..].trim_start_matches(|c: char| !c.is_ascii_digit());
        let month_len = rest.bytes().take(2).take_while(u8::is_ascii_digit).count();
        if month_len == 0 {
            return None;
        }
        Self::new(year.parse().ok()?, rest[..month_len].parse().ok()?)
    }
}

impl FromStr for YearMonth {
    type Err = Error;

    /// Strict parsing of the six-character `YYYYMM` key.
    fn from_str(text: &str) -> Result<Self> {
        let text = text.trim();
        ensure!(
            text.len() == 6 && text.bytes().all(|b| b.is_ascii_digit()),
            "`{text}` is not a six-digit year-month",
        );
        Self::new(text[..4].parse()?, text[4..].parse()?)
            .with_context(|| format!("`{text}` has an invalid month"))
    }
}

impl Display for YearMonth {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}{:02}", self.year, self.month)
    }
}

impl Debug for YearMonth {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

#[derive(Copy, Clone)]
pub struct Label(YearMonth);

impl Display for Label {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.0.year, self.0.month)
    }
}
