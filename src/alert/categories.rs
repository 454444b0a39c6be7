//! Index → severity category mapping and health guidance.
//!
//! Categories follow the EPA AQI bands. Lookup walks the bands in ascending
//! order and picks the first whose upper bound is at or above the index, so a
//! value sitting exactly on a shared boundary (50, 100, ...) belongs to the
//! lower, less severe band. Anything above the last bounded band falls
//! through to `Hazardous`.

use std::fmt;

use serde::Serialize;

/// Severity levels, in ascending order of severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum AqiCategory {
    Good,
    Moderate,
    UnhealthyForSensitive,
    Unhealthy,
    VeryUnhealthy,
    Hazardous,
}

/// Ordered bands used by `classify`. `None` marks the open-ended top band.
pub const CATEGORY_BANDS: [(AqiCategory, Option<u16>); 6] = [
    (AqiCategory::Good, Some(50)),
    (AqiCategory::Moderate, Some(100)),
    (AqiCategory::UnhealthyForSensitive, Some(150)),
    (AqiCategory::Unhealthy, Some(200)),
    (AqiCategory::VeryUnhealthy, Some(300)),
    (AqiCategory::Hazardous, None),
];

impl AqiCategory {
    /// Numeric level, 1 (Good) through 6 (Hazardous).
    pub fn level(&self) -> u8 {
        match self {
            AqiCategory::Good => 1,
            AqiCategory::Moderate => 2,
            AqiCategory::UnhealthyForSensitive => 3,
            AqiCategory::Unhealthy => 4,
            AqiCategory::VeryUnhealthy => 5,
            AqiCategory::Hazardous => 6,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AqiCategory::Good => "Good",
            AqiCategory::Moderate => "Moderate",
            AqiCategory::UnhealthyForSensitive => "Unhealthy for Sensitive",
            AqiCategory::Unhealthy => "Unhealthy",
            AqiCategory::VeryUnhealthy => "Very Unhealthy",
            AqiCategory::Hazardous => "Hazardous",
        }
    }

    /// EPA display color as a hex token.
    pub fn color(&self) -> &'static str {
        match self {
            AqiCategory::Good => "#00e400",
            AqiCategory::Moderate => "#ffff00",
            AqiCategory::UnhealthyForSensitive => "#ff7e00",
            AqiCategory::Unhealthy => "#ff0000",
            AqiCategory::VeryUnhealthy => "#8f3f97",
            AqiCategory::Hazardous => "#7e0023",
        }
    }

    /// Inclusive upper index bound; `None` for the top band.
    pub fn upper_bound(&self) -> Option<u16> {
        CATEGORY_BANDS
            .iter()
            .find(|(category, _)| category == self)
            .and_then(|(_, bound)| *bound)
    }

    pub fn health_guidance(&self) -> HealthGuidance {
        let (general, sensitive, icon) = match self {
            AqiCategory::Good => (
                "Air quality is satisfactory. Enjoy outdoor activities!",
                "No special precautions needed.",
                "😊",
            ),
            AqiCategory::Moderate => (
                "Air quality is acceptable. Sensitive groups may experience minor issues.",
                "Consider reducing prolonged outdoor exertion.",
                "🙂",
            ),
            AqiCategory::UnhealthyForSensitive => (
                "Sensitive groups may experience health effects.",
                "Reduce prolonged or heavy outdoor exertion. Watch for symptoms.",
                "😐",
            ),
            AqiCategory::Unhealthy => (
                "Everyone may experience health effects.",
                "Avoid prolonged outdoor exertion. Consider wearing masks.",
                "😷",
            ),
            AqiCategory::VeryUnhealthy => (
                "Health alert: everyone may experience serious health effects.",
                "Avoid all outdoor physical activities. Stay indoors.",
                "⚠️",
            ),
            AqiCategory::Hazardous => (
                "Health warning: emergency conditions. Everyone is affected.",
                "Remain indoors and keep activity levels low. Use air purifiers.",
                "🚨",
            ),
        };
        HealthGuidance {
            category: *self,
            level: self.level(),
            color: self.color(),
            general,
            sensitive,
            icon,
        }
    }
}

impl fmt::Display for AqiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Display-ready advice for one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthGuidance {
    pub category: AqiCategory,
    pub level: u8,
    pub color: &'static str,
    pub general: &'static str,
    pub sensitive: &'static str,
    pub icon: &'static str,
}

/// Maps an index value to its category. Total over all `u16` values.
pub fn classify(index_value: u16) -> AqiCategory {
    for (category, bound) in CATEGORY_BANDS {
        match bound {
            Some(upper) if index_value <= upper => return category,
            Some(_) => continue,
            None => return category,
        }
    }
    AqiCategory::Hazardous
}

/// Guidance for the category an index value falls in.
pub fn health_recommendations(index_value: u16) -> HealthGuidance {
    classify(index_value).health_guidance()
}
