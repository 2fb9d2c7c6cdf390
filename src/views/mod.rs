//! Markup generators, one per view. They only produce text; all state lives
//! in the store and all tree work happens in [`crate::render`].

pub mod pagination;
pub mod preview;
pub mod recipe;
pub mod upload;

pub use pagination::{page_controls, PageControls, PaginationView};
pub use preview::{PreviewList, PreviewView};
pub use recipe::RecipeView;
pub use upload::UploadView;

/// Largest denominator tried when writing a quantity as a fraction.
const MAX_DENOMINATOR: u64 = 16;

/// Write a quantity the way a cookbook would: `2`, `1/2`, `1 1/3`. Values
/// with no close small fraction fall back to at most two decimals.
pub fn format_quantity(quantity: f64) -> String {
    if !quantity.is_finite() {
        return String::new();
    }
    let negative = quantity < 0.0;
    let value = quantity.abs();
    let mut whole = value.trunc() as u64;
    let frac = value - value.trunc();

    let (mut num, mut den) = (0u64, 1u64);
    let mut best_err = frac;
    for d in 2..=MAX_DENOMINATOR {
        let n = (frac * d as f64).round() as u64;
        let err = (frac - n as f64 / d as f64).abs();
        if err + 1e-12 < best_err {
            best_err = err;
            num = n;
            den = d;
        }
    }
    if (1.0 - frac) < best_err {
        whole += 1;
        num = 0;
        best_err = 1.0 - frac;
    }
    if best_err > 0.01 {
        let s = format!("{value:.2}");
        let s = s.trim_end_matches('0').trim_end_matches('.');
        return if negative { format!("-{s}") } else { s.to_string() };
    }
    if num == den {
        whole += 1;
        num = 0;
    }

    let g = gcd(num, den);
    let (num, den) = (num / g.max(1), den / g.max(1));
    let body = match (whole, num) {
        (w, 0) => w.to_string(),
        (0, n) => format!("{n}/{den}"),
        (w, n) => format!("{w} {n}/{den}"),
    };
    if negative {
        format!("-{body}")
    } else {
        body
    }
}

fn gcd(a: u64, b: u64) -> u64 {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_and_simple_fractions() {
        assert_eq!(format_quantity(2.0), "2");
        assert_eq!(format_quantity(0.5), "1/2");
        assert_eq!(format_quantity(1.5), "1 1/2");
        assert_eq!(format_quantity(0.25), "1/4");
        assert_eq!(format_quantity(0.75), "3/4");
    }

    #[test]
    fn test_scaled_values_snap_to_fractions() {
        assert_eq!(format_quantity(1.0 / 3.0), "1/3");
        assert_eq!(format_quantity(2.0 * 5.0 / 3.0), "3 1/3");
        assert_eq!(format_quantity(0.999_999), "1");
    }

    #[test]
    fn test_awkward_values_use_decimals() {
        assert_eq!(format_quantity(0.03), "0.03");
        assert_eq!(format_quantity(1.03), "1.03");
        assert_eq!(format_quantity(0.0), "0");
    }
}
