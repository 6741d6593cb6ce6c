use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lower bound (inclusive) of the WARNING band, in ppm
pub const PPM_WARNING: f64 = 200.0;
/// Lower bound (inclusive) of the DANGER band, in ppm
pub const PPM_DANGER: f64 = 500.0;
/// Lower bound (inclusive) of the CRITICAL band, in ppm
pub const PPM_CRITICAL: f64 = 900.0;

/// Discrete severity bucket derived from gas concentration
///
/// Variants are declared in increasing severity, so the derived `Ord`
/// gives the total severity order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HazardLevel {
    /// Gas concentration is within safe limits
    Normal,
    /// Elevated readings; possible early leak
    Warning,
    /// Confirmed gas leak
    Danger,
    /// Explosive-risk concentration
    Critical,
}

impl HazardLevel {
    /// Textual name used in logs and on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            HazardLevel::Normal => "NORMAL",
            HazardLevel::Warning => "WARNING",
            HazardLevel::Danger => "DANGER",
            HazardLevel::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for HazardLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HazardLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NORMAL" => Ok(HazardLevel::Normal),
            "WARNING" => Ok(HazardLevel::Warning),
            "DANGER" => Ok(HazardLevel::Danger),
            "CRITICAL" => Ok(HazardLevel::Critical),
            other => Err(format!("Unknown hazard level: {}", other)),
        }
    }
}

/// Percept event tag carried between agents
///
/// The first four variants correspond one-to-one with [`HazardLevel`];
/// `Shutdown` is the control sentinel that terminates the receiving agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventTag {
    NormalCondition,
    PossibleGasLeak,
    GasLeakConfirmed,
    CriticalGasLevel,
    Shutdown,
}

impl EventTag {
    /// All tags, in wire-name order
    pub const ALL: [EventTag; 5] = [
        EventTag::NormalCondition,
        EventTag::PossibleGasLeak,
        EventTag::GasLeakConfirmed,
        EventTag::CriticalGasLevel,
        EventTag::Shutdown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventTag::NormalCondition => "NORMAL_CONDITION",
            EventTag::PossibleGasLeak => "POSSIBLE_GAS_LEAK",
            EventTag::GasLeakConfirmed => "GAS_LEAK_CONFIRMED",
            EventTag::CriticalGasLevel => "CRITICAL_GAS_LEVEL",
            EventTag::Shutdown => "SHUTDOWN",
        }
    }

    /// True for the three abnormal percepts that open an incident
    pub fn is_hazard(&self) -> bool {
        matches!(
            self,
            EventTag::PossibleGasLeak | EventTag::GasLeakConfirmed | EventTag::CriticalGasLevel
        )
    }

    /// Whether this event warrants the full response protocol
    pub fn requires_response(&self) -> bool {
        matches!(self, EventTag::GasLeakConfirmed | EventTag::CriticalGasLevel)
    }

    /// Hazard level this tag was derived from, `None` for the control sentinel
    pub fn level(&self) -> Option<HazardLevel> {
        match self {
            EventTag::NormalCondition => Some(HazardLevel::Normal),
            EventTag::PossibleGasLeak => Some(HazardLevel::Warning),
            EventTag::GasLeakConfirmed => Some(HazardLevel::Danger),
            EventTag::CriticalGasLevel => Some(HazardLevel::Critical),
            EventTag::Shutdown => None,
        }
    }
}

impl fmt::Display for EventTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventTag::ALL
            .iter()
            .copied()
            .find(|tag| tag.as_str() == s)
            .ok_or_else(|| format!("Unknown event tag: {}", s))
    }
}

/// Classifies a gas concentration (ppm) into a hazard level
///
/// Thresholds follow common industrial references:
/// - `< 200` NORMAL
/// - `200..500` WARNING
/// - `500..900` DANGER
/// - `>= 900` CRITICAL
///
/// Negative concentrations classify as NORMAL. NaN classifies as CRITICAL
/// so that a faulty probe is never reported as safe.
///
/// # Example
/// ```
/// use lpg_response::domain::percept::{classify, HazardLevel};
///
/// assert_eq!(classify(199.9), HazardLevel::Normal);
/// assert_eq!(classify(200.0), HazardLevel::Warning);
/// assert_eq!(classify(900.0), HazardLevel::Critical);
/// ```
pub fn classify(ppm: f64) -> HazardLevel {
    if ppm.is_nan() || ppm >= PPM_CRITICAL {
        HazardLevel::Critical
    } else if ppm >= PPM_DANGER {
        HazardLevel::Danger
    } else if ppm >= PPM_WARNING {
        HazardLevel::Warning
    } else {
        HazardLevel::Normal
    }
}

/// Maps a hazard level to the percept event it produces
pub fn to_event(level: HazardLevel) -> EventTag {
    match level {
        HazardLevel::Normal => EventTag::NormalCondition,
        HazardLevel::Warning => EventTag::PossibleGasLeak,
        HazardLevel::Danger => EventTag::GasLeakConfirmed,
        HazardLevel::Critical => EventTag::CriticalGasLevel,
    }
}

/// Maps a textual hazard level name to its event, falling back to
/// `NORMAL_CONDITION` for names that are not a known level
pub fn event_for_level_name(name: &str) -> EventTag {
    name.parse::<HazardLevel>()
        .map(to_event)
        .unwrap_or(EventTag::NormalCondition)
}
