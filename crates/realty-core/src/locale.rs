//! Site locales and `Accept-Language` negotiation.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Languages the site is published in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    En,
    Cs,
}

impl Default for Locale {
    fn default() -> Self {
        Self::Cs
    }
}

impl Locale {
    pub const ALL: [Locale; 2] = [Locale::En, Locale::Cs];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Cs => "cs",
        }
    }

    /// Parses a locale tag, case-insensitive and tolerant of region suffixes
    /// (`cs-CZ`, `en_GB`). `cz` is accepted as a common misspelling of `cs`.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }
        let normalized = value.to_ascii_lowercase();
        let lang = normalized.split(['-', '_']).next().unwrap_or("");
        match lang {
            "en" => Some(Self::En),
            "cs" | "cz" => Some(Self::Cs),
            _ => None,
        }
    }

    /// The locale that is not `self`; used for alternate links.
    pub const fn other(self) -> Self {
        match self {
            Self::En => Self::Cs,
            Self::Cs => Self::En,
        }
    }

    /// Picks the best supported locale from an `Accept-Language` header.
    ///
    /// Entries are ranked by their `q` weight, ties keep header order, and
    /// `q=0` entries are never selected. Returns `default` when nothing in the
    /// header is supported.
    pub fn negotiate(accept_language: &str, default: Locale) -> Locale {
        let mut ranked: Vec<(usize, f32, Locale)> = accept_language
            .split(',')
            .enumerate()
            .filter_map(|(position, entry)| {
                let mut parts = entry.split(';');
                let tag = parts.next()?.trim();
                let locale = Self::parse(tag)?;
                let weight = parts
                    .filter_map(|param| param.trim().strip_prefix("q="))
                    .find_map(|q| q.trim().parse::<f32>().ok())
                    .unwrap_or(1.0);
                (weight > 0.0).then_some((position, weight, locale))
            })
            .collect();

        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        ranked.first().map(|(_, _, locale)| *locale).unwrap_or(default)
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unsupported locale: {s}"))
    }
}
