/// Occupancy limits for a tree of branching factor `ORDER`.
///
/// Non-root nodes hold `KEY_LOWER..KEY_UPPER` keys and, when internal,
/// `SUB_LOWER..SUB_UPPER` children. A node reaching `KEY_UPPER` keys is split.
///
/// `KEY_LOWER` is `ORDER / 2` for odd orders. Even orders round down to
/// `(ORDER - 1) / 2`: splitting `ORDER` keys leaves `ORDER / 2 - 1` on the right,
/// and a merge must fit in `KEY_UPPER - 1` keys.
pub(crate) struct Limits<const ORDER: usize>;

impl<const ORDER: usize> Limits<ORDER> {
    pub(crate) const KEY_LOWER: usize = (ORDER - 1) / 2;
    pub(crate) const KEY_UPPER: usize = ORDER;
    pub(crate) const SUB_LOWER: usize = Self::KEY_LOWER + 1;
    pub(crate) const SUB_UPPER: usize = Self::KEY_UPPER + 1;

    /// Evaluated wherever a tree is constructed, rejecting `ORDER < 3` at compile time.
    pub(crate) const ASSERT: () = assert!(ORDER >= 3, "B-tree `ORDER` must be at least 3");
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn order_three() {
        assert_eq!(Limits::<3>::KEY_LOWER, 1);
        assert_eq!(Limits::<3>::KEY_UPPER, 3);
        assert_eq!(Limits::<3>::SUB_LOWER, 2);
        assert_eq!(Limits::<3>::SUB_UPPER, 4);
    }

    #[test]
    fn odd_orders_use_half() {
        assert_eq!(Limits::<5>::KEY_LOWER, 5 / 2);
        assert_eq!(Limits::<7>::KEY_LOWER, 7 / 2);
        assert_eq!(Limits::<129>::KEY_LOWER, 129 / 2);
    }

    #[test]
    fn even_order() {
        assert_eq!(Limits::<16>::KEY_LOWER, 7);
        assert_eq!(Limits::<16>::KEY_UPPER, 16);
        assert_eq!(Limits::<16>::SUB_LOWER, 8);
        assert_eq!(Limits::<16>::SUB_UPPER, 17);
    }

    #[test]
    fn split_and_merge_stay_in_bounds() {
        fn check<const ORDER: usize>() {
            let lower = Limits::<ORDER>::KEY_LOWER;
            let upper = Limits::<ORDER>::KEY_UPPER;

            // Splitting `upper` keys keeps `mid` on the left and `upper - mid - 1` on the right.
            let mid = upper / 2;
            assert!(mid >= lower, "order {ORDER}: left half underflows");
            assert!(upper - mid - 1 >= lower, "order {ORDER}: right half underflows");

            // An underflowing node, its separator and a minimal sibling.
            assert!((lower - 1) + 1 + lower < upper, "order {ORDER}: merge overflows");
        }
        check::<3>();
        check::<4>();
        check::<5>();
        check::<6>();
        check::<16>();
        check::<127>();
        check::<128>();
    }
}
