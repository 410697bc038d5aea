//! Magnitude scaling for chart axes.
//!
//! [`auto_scale`] picks one power-of-thousand divisor for a batch of values so
//! that every series on a chart shares the same unit.

use serde::Serialize;
use std::fmt;

/// Display magnitude of a scaled value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Magnitude {
    /// No scaling.
    #[default]
    Units,
    /// Divided by one thousand.
    Thousands,
    /// Divided by one million.
    Millions,
    /// Divided by one billion.
    Billions,
}

impl Magnitude {
    /// Picks the magnitude for a maximum absolute value.
    #[must_use]
    pub fn for_max(max_abs: f64) -> Self {
        if max_abs >= 1e10 {
            Self::Billions
        } else if max_abs >= 1e7 {
            Self::Millions
        } else if max_abs >= 1e4 {
            Self::Thousands
        } else {
            Self::Units
        }
    }

    /// The divisor applied to raw values.
    #[must_use]
    pub const fn divisor(&self) -> f64 {
        match self {
            Self::Units => 1.0,
            Self::Thousands => 1e3,
            Self::Millions => 1e6,
            Self::Billions => 1e9,
        }
    }

    /// The unit word, empty for [`Magnitude::Units`].
    #[must_use]
    pub const fn word(&self) -> &'static str {
        match self {
            Self::Units => "",
            Self::Thousands => "Thousands",
            Self::Millions => "Millions",
            Self::Billions => "Billions",
        }
    }
}

/// Divisor and axis label computed for one chart.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ScaleFactor {
    /// Magnitude chosen for the batch.
    pub magnitude: Magnitude,
    /// Axis label, e.g. "Millions USD", "Billions" or "USD".
    pub label: String,
}

impl ScaleFactor {
    /// The divisor applied to raw values.
    #[must_use]
    pub const fn divisor(&self) -> f64 {
        self.magnitude.divisor()
    }

    /// Scales one value; absent stays absent.
    #[must_use]
    pub fn apply(&self, value: Option<f64>) -> Option<f64> {
        value.map(|v| v / self.divisor())
    }

    /// Scales a whole series.
    #[must_use]
    pub fn apply_all(&self, values: &[Option<f64>]) -> Vec<Option<f64>> {
        values.iter().map(|v| self.apply(*v)).collect()
    }
}

impl fmt::Display for ScaleFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

/// Computes the scale for a batch of values.
///
/// Absent and non-finite values are ignored. An empty batch yields divisor 1.
/// `unit` (typically a currency code) is appended to the magnitude word.
#[must_use]
pub fn auto_scale<I>(values: I, unit: Option<&str>) -> ScaleFactor
where
    I: IntoIterator<Item = Option<f64>>,
{
    let max_abs = values
        .into_iter()
        .flatten()
        .filter(|v| v.is_finite())
        .map(f64::abs)
        .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |m| m.max(v))));

    let magnitude = max_abs.map_or(Magnitude::Units, Magnitude::for_max);
    let label = [magnitude.word(), unit.unwrap_or_default()]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    ScaleFactor { magnitude, label }
}
