//! User-defined downscaling rules.

use serde::{Deserialize, Serialize};

/// Condition under which a rule applies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResizeTrigger {
    /// Image is at least this many kilobytes.
    SizeKb(f64),
    /// Image is at least this wide and this tall.
    Dimensions {
        /// Minimum width in pixels.
        width: u32,
        /// Minimum height in pixels.
        height: u32,
    },
}

/// A `(trigger, percentage)` pair as written in the configuration.
///
/// The trigger is kept as text so that half-edited rules survive a config
/// round trip. Triggers containing `x` are dimension triggers
/// (`"1920x1080"`), anything else is a size threshold in KB (`"6000"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResizeRule {
    /// Raw trigger text.
    pub trigger: String,
    /// Target scale in percent.
    pub percentage: u32,
}

impl ResizeRule {
    /// Creates a new rule.
    #[must_use]
    pub fn new(trigger: impl Into<String>, percentage: u32) -> Self {
        Self {
            trigger: trigger.into(),
            percentage,
        }
    }

    /// Parses the trigger. Returns `None` for empty or unparseable text.
    #[must_use]
    pub fn parsed_trigger(&self) -> Option<ResizeTrigger> {
        let text = self.trigger.trim();
        if text.is_empty() {
            return None;
        }

        if let Some((width, height)) = text.split_once(['x', 'X']) {
            let width = width.trim().parse::<u32>().ok()?;
            let height = height.trim().parse::<u32>().ok()?;
            return Some(ResizeTrigger::Dimensions { width, height });
        }

        text.parse::<f64>()
            .ok()
            .filter(|kb| kb.is_finite() && *kb >= 0.0)
            .map(ResizeTrigger::SizeKb)
    }

    /// Returns the percentage when it lies in `1..=100`.
    #[must_use]
    pub fn valid_percentage(&self) -> Option<u32> {
        (1..=100)
            .contains(&self.percentage)
            .then_some(self.percentage)
    }
}

/// Rules shipped in a fresh configuration.
#[must_use]
pub fn default_rules() -> Vec<ResizeRule> {
    vec![ResizeRule::new("6000", 80), ResizeRule::new("12000", 60)]
}
