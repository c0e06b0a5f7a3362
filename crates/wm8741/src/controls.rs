//! Enumerated codec controls.
//!
//! Each user-visible setting is described by an [`EnumControl`]: the
//! register, the field position, and the item texts the control surface
//! shows. The typed enums ([`AntiClippingMode`], [`DitherMode`],
//! [`FilterResponse`]) convert between item indices and meaningful names
//! so callers never handle raw field codes.
//!
//! On the dual-mono board both codec instances must always agree on these
//! controls; the synchronized read/write paths live in [`crate::pair`].

use crate::registers::{
    FILTER_RESPONSE_MASK, FILTER_RESPONSE_SHIFT, MODE2_DITHER_MASK, MODE2_DITHER_SHIFT,
    REG_FILTER_CONTROL, REG_MODE_CONTROL_2, REG_VOLUME_CONTROL, VOLUME_ATT2DB_SHIFT,
};

/// Descriptor for an enumerated control backed by one register field.
#[derive(Debug, Clone, Copy)]
pub struct EnumControl {
    /// Register holding the field.
    pub reg: u8,
    /// Bit offset of the field within the register.
    pub shift: u8,
    /// Unshifted field mask.
    pub mask: u16,
    /// Item texts, in field-code order.
    pub items: &'static [&'static str],
}

impl EnumControl {
    /// Extract the field value from a full register value.
    #[must_use]
    pub fn extract(&self, reg_val: u16) -> u16 {
        (reg_val >> self.shift) & self.mask
    }

    /// Merge `item` into `reg_val`, leaving the other fields untouched.
    #[must_use]
    pub fn merge(&self, reg_val: u16, item: u16) -> u16 {
        (reg_val & !(self.mask << self.shift)) | ((item & self.mask) << self.shift)
    }

    /// Whether `item` names a valid entry of this control.
    #[must_use]
    pub fn is_valid_item(&self, item: u16) -> bool {
        usize::from(item) < self.items.len()
    }
}

/// Anti-clipping mode: a fixed 2 dB analogue attenuation ahead of the
/// output stage.
pub const ANTI_CLIPPING: EnumControl = EnumControl {
    reg: REG_VOLUME_CONTROL,
    shift: VOLUME_ATT2DB_SHIFT,
    mask: 0x1,
    items: &["Off", "On"],
};

/// Dither applied to the volume-scaled signal.
pub const DITHER: EnumControl = EnumControl {
    reg: REG_MODE_CONTROL_2,
    shift: MODE2_DITHER_SHIFT,
    mask: MODE2_DITHER_MASK,
    items: &["Off", "RPDF", "TPDF", "HPDF"],
};

/// Digital filter response selection.
pub const FILTER: EnumControl = EnumControl {
    reg: REG_FILTER_CONTROL,
    shift: FILTER_RESPONSE_SHIFT,
    mask: FILTER_RESPONSE_MASK,
    items: &[
        "Response 1",
        "Response 2",
        "Response 3",
        "Response 4",
        "Response 5",
    ],
};

/// Anti-clipping mode items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AntiClippingMode {
    /// No extra attenuation.
    Off,
    /// 2 dB analogue attenuation engaged.
    On,
}

/// Dither mode items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DitherMode {
    /// Dither disabled.
    Off,
    /// Rectangular probability density function.
    Rpdf,
    /// Triangular probability density function.
    Tpdf,
    /// High-passed triangular probability density function.
    Hpdf,
}

/// Digital filter response items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FilterResponse {
    /// FIR response 1.
    Response1,
    /// FIR response 2.
    Response2,
    /// FIR response 3.
    Response3,
    /// FIR response 4.
    Response4,
    /// FIR response 5.
    Response5,
}

macro_rules! enum_items {
    ($ty:ty, $($variant:path => $item:literal),+ $(,)?) => {
        impl $ty {
            /// Field code / item index of this variant.
            #[must_use]
            pub fn item(self) -> u16 {
                match self {
                    $($variant => $item,)+
                }
            }

            /// Map an item index back to a variant.
            #[must_use]
            pub fn from_item(item: u16) -> Option<Self> {
                match item {
                    $($item => Some($variant),)+
                    _ => None,
                }
            }
        }
    };
}

enum_items!(AntiClippingMode,
    AntiClippingMode::Off => 0,
    AntiClippingMode::On => 1,
);

enum_items!(DitherMode,
    DitherMode::Off => 0,
    DitherMode::Rpdf => 1,
    DitherMode::Tpdf => 2,
    DitherMode::Hpdf => 3,
);

enum_items!(FilterResponse,
    FilterResponse::Response1 => 0,
    FilterResponse::Response2 => 1,
    FilterResponse::Response3 => 2,
    FilterResponse::Response4 => 3,
    FilterResponse::Response5 => 4,
);

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_then_extract_round_trips() {
        for item in 0..4u16 {
            let merged = DITHER.merge(0x01ff, item);
            assert_eq!(DITHER.extract(merged), item);
        }
    }

    #[test]
    fn merge_preserves_unrelated_fields() {
        // Anti-clipping lives in R4 alongside the soft-mute bit.
        let merged = ANTI_CLIPPING.merge(0x0079, 0);
        assert_eq!(merged, 0x0059);
        let restored = ANTI_CLIPPING.merge(merged, 1);
        assert_eq!(restored, 0x0079);
    }

    #[test]
    fn item_counts_match_the_hardware_fields() {
        assert_eq!(ANTI_CLIPPING.items.len(), 2);
        assert_eq!(DITHER.items.len(), 4);
        assert_eq!(FILTER.items.len(), 5);
        // The 3-bit filter field has headroom; codes 5–7 stay invalid.
        assert!(!FILTER.is_valid_item(5));
    }

    #[test]
    fn typed_enums_round_trip_their_items() {
        for mode in [
            DitherMode::Off,
            DitherMode::Rpdf,
            DitherMode::Tpdf,
            DitherMode::Hpdf,
        ] {
            assert_eq!(DitherMode::from_item(mode.item()), Some(mode));
        }
        assert_eq!(FilterResponse::from_item(5), None);
    }
}
