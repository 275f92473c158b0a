// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Rectangle of the last cleaned area.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

/// Four comma-separated signed decimals, nothing else.
const AREA_PATTERN: &str =
    r"^-?[0-9]+\.?[0-9]*,-?[0-9]+\.?[0-9]*,-?[0-9]+\.?[0-9]*,-?[0-9]+\.?[0-9]*$";

fn area_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(AREA_PATTERN).ok()).as_ref()
}

/// Rectangle `(x1, y1)`-`(x2, y2)`, each coordinate rounded to one decimal.
///
/// # Examples
///
/// ```
/// use vacbot_lib::types::Area;
///
/// let area = Area::parse("-1.26,2,3.14159,-4.07").unwrap();
/// assert_eq!(area.to_string(), "-1.3,2.0,3.1,-4.1");
///
/// assert!(Area::parse("1,2,3").is_none());
/// assert!(Area::parse("1,2,3,x").is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Area {
    /// First corner, x.
    pub x1: f64,
    /// First corner, y.
    pub y1: f64,
    /// Second corner, x.
    pub x2: f64,
    /// Second corner, y.
    pub y2: f64,
}

impl Area {
    /// Parses the vendor's `x1,y1,x2,y2` string.
    ///
    /// Returns `None` unless the whole string matches the strict
    /// four-decimal pattern.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        if !area_pattern()?.is_match(value) {
            return None;
        }
        let mut coords = value.split(',').map(|part| part.parse::<f64>().ok().map(round1));
        Some(Self {
            x1: coords.next()??,
            y1: coords.next()??,
            x2: coords.next()??,
            y2: coords.next()??,
        })
    }

    /// Returns the four coordinates in `x1, y1, x2, y2` order.
    #[must_use]
    pub fn coordinates(&self) -> [f64; 4] {
        [self.x1, self.y1, self.x2, self.y2]
    }
}

impl fmt::Display for Area {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.1},{:.1},{:.1},{:.1}",
            self.x1, self.y1, self.x2, self.y2
        )
    }
}

/// Rounds to one decimal the way the vendor apps do: from the exact binary
/// value, with exact ties going away from zero.
#[allow(clippy::float_cmp)]
fn round1(value: f64) -> f64 {
    let magnitude = value.abs();
    let quarters = magnitude * 4.0;
    let rounded = if quarters.fract() == 0.0 && quarters % 2.0 == 1.0 {
        // Odd quarters (0.25, 0.75, ...) are the only exact ties.
        (magnitude * 10.0).round() / 10.0
    } else {
        format!("{magnitude:.1}").parse().unwrap_or(magnitude)
    };
    rounded.copysign(value)
}
