//! Integration tests for the audio domain newtypes.
//!
//! Exercises the public construction paths the way dependent crates use
//! them: clamping vs. strict construction, and the width normalization
//! boundary (24-bit carried in 32-bit containers downstream).

#![allow(clippy::unwrap_used)]

use platform::{BitWidth, OutOfRangeError, VolumeSteps};
use proptest::prelude::*;

#[test]
fn volume_steps_full_scale_constants() {
    assert_eq!(VolumeSteps::MUTED.get(), 0);
    assert_eq!(VolumeSteps::FULL.get(), 1023);
    assert!(VolumeSteps::MUTED < VolumeSteps::FULL);
}

#[test]
fn volume_steps_strict_constructor_reports_the_range() {
    let err = VolumeSteps::try_new(4096).unwrap_err();
    assert_eq!(
        err,
        OutOfRangeError {
            value: 4096,
            min: 0,
            max: 1023,
        }
    );
    assert_eq!(err.to_string(), "value 4096 outside valid range 0..=1023");
}

#[test]
fn bit_width_covers_exactly_the_interface_widths() {
    let supported: Vec<u8> = (0u8..=64)
        .filter(|&b| BitWidth::from_bits(b).is_some())
        .collect();
    assert_eq!(supported, vec![16, 24, 32]);
}

proptest! {
    /// Clamping construction never exceeds full scale and is the identity
    /// within range.
    #[test]
    fn volume_steps_clamping(v in 0u16..=u16::MAX) {
        let steps = VolumeSteps::new(v);
        prop_assert!(steps.get() <= VolumeSteps::MAX);
        if v <= VolumeSteps::MAX {
            prop_assert_eq!(steps.get(), v);
        }
    }

    /// Strict construction agrees with clamping construction exactly on
    /// the valid range.
    #[test]
    fn volume_steps_strict_matches_clamping_in_range(v in 0u16..=1023) {
        prop_assert_eq!(VolumeSteps::try_new(v).unwrap(), VolumeSteps::new(v));
    }
}
