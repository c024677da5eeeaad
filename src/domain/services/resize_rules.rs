//! Resize rule evaluation and the paste size threshold.

use tracing::trace;

use crate::domain::entities::{Dimensions, ImageBuffer, ResizeRule, ResizeTrigger};

/// Scale used when no rule applies.
pub const FULL_SCALE: u32 = 100;

/// Picks a downscale percentage from the configured resize rules.
pub struct ResizeRuleEngine;

impl ResizeRuleEngine {
    /// Picks the scale percentage for an image.
    ///
    /// Every matching rule is considered and the smallest percentage wins, so
    /// rule order never matters. Rules with an unparseable trigger or a
    /// percentage outside `1..=100` are ignored.
    #[must_use]
    pub fn resolve_scale(buffer: &ImageBuffer, dimensions: Dimensions, rules: &[ResizeRule]) -> u32 {
        Self::scale_for(buffer.size_kb(), dimensions, rules)
    }

    /// Same as [`ResizeRuleEngine::resolve_scale`] for an already-measured size.
    #[must_use]
    pub fn scale_for(size_kb: f64, dimensions: Dimensions, rules: &[ResizeRule]) -> u32 {
        let mut best = FULL_SCALE;

        for rule in rules {
            let (Some(trigger), Some(percentage)) = (rule.parsed_trigger(), rule.valid_percentage())
            else {
                trace!(trigger = %rule.trigger, percentage = rule.percentage, "Skipping unusable resize rule");
                continue;
            };

            let matches = match trigger {
                ResizeTrigger::SizeKb(threshold) => size_kb >= threshold,
                ResizeTrigger::Dimensions { width, height } => {
                    dimensions.width >= width && dimensions.height >= height
                }
            };

            if matches {
                best = best.min(percentage);
            }
        }

        best
    }

    /// Decides whether a pasted image should bypass conversion entirely.
    ///
    /// With `trigger_when_larger` the image is skipped when it is larger than
    /// `threshold_kb`; otherwise it is skipped when it is at most
    /// `threshold_kb`. Empty buffers are never skipped.
    #[must_use]
    pub fn should_skip_conversion(
        buffer: &ImageBuffer,
        threshold_kb: f64,
        trigger_when_larger: bool,
    ) -> bool {
        if buffer.is_empty() {
            return false;
        }

        let size_kb = buffer.size_kb();
        let is_larger = size_kb > threshold_kb;
        let is_smaller_or_equal = size_kb <= threshold_kb;

        (trigger_when_larger && is_larger) || (!trigger_when_larger && is_smaller_or_equal)
    }

    /// Target dimensions for scaling by `percentage`, at least one pixel each.
    #[must_use]
    pub fn scaled_dimensions(dimensions: Dimensions, percentage: u32) -> Dimensions {
        let scale = |value: u32| -> u32 {
            let scaled = (u64::from(value) * u64::from(percentage) + 50) / 100;
            u32::try_from(scaled).unwrap_or(u32::MAX).max(1)
        };
        Dimensions::new(scale(dimensions.width), scale(dimensions.height))
    }
}
