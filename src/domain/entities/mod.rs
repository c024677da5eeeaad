//! Domain entity definitions.

mod conversion;
mod image;
mod link;
mod resize_rule;

pub use conversion::{ConversionDirection, ConversionResult, ConversionScope, ScopeReport};
pub use image::{DEFAULT_IMAGE_NAME, Dimensions, ImageBuffer, ImageSource, file_name_of};
pub use link::{LinkKind, LinkMatch};
pub use resize_rule::{ResizeRule, ResizeTrigger, default_rules};
