//! Property tests for angle unwrapping and clamped trig.

use std::f64::consts::PI;

use proptest::prelude::*;
use vrwheel_geometry::{AngleHistory, clamped_acos, clamped_asin, dead_and_stretch, wrap_to_pi};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn unwrapped_steps_never_exceed_pi(raws in prop::collection::vec(-PI..PI, 2..64)) {
        let mut hist = AngleHistory::default();
        let mut prev = hist.latest();
        for raw in raws {
            let committed = hist.push_unwrapped(raw);
            prop_assert!((committed - prev).abs() <= PI + 1e-9,
                "step {} -> {} exceeds pi", prev, committed);
            // committed reduces mod 2pi back to the raw input
            let residue = wrap_to_pi(committed - raw);
            prop_assert!(residue.abs() < 1e-9, "residue {} for raw {}", residue, raw);
            prev = committed;
        }
    }

    #[test]
    fn wrap_is_idempotent(angle in -1e4f64..1e4) {
        let once = wrap_to_pi(angle);
        prop_assert!((-PI..PI).contains(&once));
        prop_assert!((wrap_to_pi(once) - once).abs() < 1e-9);
    }

    #[test]
    fn clamped_trig_is_total(x in prop::num::f64::ANY) {
        prop_assert!(!clamped_acos(x).is_nan());
        prop_assert!(!clamped_asin(x).is_nan());
    }

    #[test]
    fn dead_and_stretch_stays_in_unit_range(v in -1.0f64..=1.0, dead in 0.0f64..0.95) {
        let out = dead_and_stretch(v, dead);
        prop_assert!((-1.0 - 1e-12..=1.0 + 1e-12).contains(&out));
    }
}
