/// Fails unless `|left - right| <= tolerance`. NaN on either side always
/// fails. An optional trailing format string is appended to the message.
///
/// ```rust
/// use vrwheel_test_helpers::assert_approx_eq;
///
/// assert_approx_eq!(1.0, 1.0001, 0.001);
/// assert_approx_eq!(-0.5_f32, -0.5, 0.0, "wheel angle at frame {}", 3);
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $tolerance:expr $(,)?) => {
        $crate::assert_approx_eq!($left, $right, $tolerance, "")
    };
    ($left:expr, $right:expr, $tolerance:expr, $($arg:tt)+) => {{
        let (a, b, tol) = ($left, $right, $tolerance);
        let gap = (a - b).abs();
        if !(gap <= tol) {
            panic!(
                "{:?} and {:?} differ by {:?} (allowed {:?}) {}",
                a, b, gap, tol, format_args!($($arg)+)
            );
        }
    }};
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_close_values_pass() {
        assert_approx_eq!(0.3_f64, 0.1 + 0.2, 1e-12);
        assert_approx_eq!(10.0_f32, 10.4, 0.5, "degrees");
    }

    #[test]
    #[should_panic(expected = "differ by")]
    fn test_nan_never_matches() {
        assert_approx_eq!(f64::NAN, 0.0, 1.0);
    }

    #[test]
    #[should_panic(expected = "frame 7")]
    fn test_message_is_appended() {
        assert_approx_eq!(1.0_f64, 2.0, 0.1, "frame {}", 7);
    }
}
