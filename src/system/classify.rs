use serde::Serialize;

pub const MEDIUM_ABOVE: f64 = 50.0;
pub const HIGH_ABOVE: f64 = 80.0;

/// Severity tier for any utilization percentage.
///
/// Ordered by severity, so `Tier::Low < Tier::Medium < Tier::High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Low,
    Medium,
    High,
}

impl Tier {
    /// `<= 50` is Low, `<= 80` is Medium, anything above is High.
    /// NaN falls through every comparison and lands in Low.
    pub fn classify(percent: f64) -> Self {
        if percent > HIGH_ABOVE {
            Tier::High
        } else if percent > MEDIUM_ABOVE {
            Tier::Medium
        } else {
            Tier::Low
        }
    }

    /// Colour name used by the static HTML report (`usage-level-{color}`).
    pub fn color_name(self) -> &'static str {
        match self {
            Tier::Low => "green",
            Tier::Medium => "orange",
            Tier::High => "red",
        }
    }
}

pub fn classify(percent: f64) -> Tier {
    Tier::classify(percent)
}
