use crate::core::Variant;

pub const HIGH_DEFINITION: &str = "hd";
pub const STANDARD_DEFINITION: &str = "sd";

/// Pick the variant to play or download.
///
/// First "hd", else first "sd", else the first variant. `None` means the item is
/// unplayable.
pub fn select_variant(variants: &[Variant]) -> Option<&Variant> {
    variants
        .iter()
        .find(|v| v.has_quality(HIGH_DEFINITION))
        .or_else(|| variants.iter().find(|v| v.has_quality(STANDARD_DEFINITION)))
        .or_else(|| variants.first())
}
