//! Modular arithmetic for periodic (tiled) index spaces.

/// Maps `index` into `[0, period)`.
///
/// The `%` operator truncates toward zero, so a negative `index` yields a negative remainder that must be shifted by one
/// period. `period` must be positive.
#[inline]
pub fn wrap_index(index: i32, period: i32) -> i32 {
    let base = index % period;
    if base < 0 {
        base + period
    } else {
        base
    }
}

/// Maps a continuous `coordinate` into `[0, period)`, consistently with `wrap_index` on the integer points.
///
/// Uses the IEEE (symmetric) remainder, which lies in `[-period / 2, period / 2]`, then shifts negative results by one period.
#[inline]
pub fn wrap_coordinate(coordinate: f64, period: f64) -> f64 {
    let base = coordinate - (coordinate / period).round_ties_even() * period;
    let wrapped = if base < 0.0 { base + period } else { base };

    // Rounding in the shift can land exactly on the period.
    if wrapped >= period {
        wrapped - period
    } else {
        wrapped
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝

#[cfg(test)]
mod test {
    use super::*;

    use num::Integer;

    #[test]
    fn wrap_negative_indices() {
        assert_eq!(wrap_index(-1, 5), 4);
        assert_eq!(wrap_index(-5, 5), 0);
        assert_eq!(wrap_index(-6, 5), 4);
        assert_eq!(wrap_index(7, 5), 2);
        assert_eq!(wrap_index(0, 5), 0);
    }

    #[test]
    fn wrap_index_agrees_with_floor_modulus() {
        for period in 1..7 {
            for i in -20..20 {
                assert_eq!(wrap_index(i, period), i.mod_floor(&period));
            }
        }
    }

    #[test]
    fn wrap_continuous_coordinates() {
        assert_eq!(wrap_coordinate(-1.0, 5.0), 4.0);
        assert_eq!(wrap_coordinate(7.0, 5.0), 2.0);
        assert_eq!(wrap_coordinate(-0.5, 5.0), 4.5);
        assert_eq!(wrap_coordinate(2.5, 5.0), 2.5);
        assert_eq!(wrap_coordinate(12.25, 5.0), 2.25);
        assert_eq!(wrap_coordinate(5.0, 5.0), 0.0);
    }

    #[test]
    fn continuous_wrap_matches_integer_wrap_on_lattice_points() {
        for i in -12..12 {
            assert_eq!(wrap_coordinate(i as f64, 5.0), wrap_index(i, 5) as f64);
        }
    }
}
