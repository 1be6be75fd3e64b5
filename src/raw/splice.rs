use core::ops::Range;

use smallvec::{Array, SmallVec};

/// Moves `src[range]` into `dst` starting at `at`, preserving order.
///
/// Elements are moved, never cloned, so node contents need neither `Clone` nor `Default`.
pub(crate) fn cut_paste<A: Array>(src: &mut SmallVec<A>, range: Range<usize>, dst: &mut SmallVec<A>, at: usize) {
    dst.insert_many(at, src.drain(range));
}

/// Moves `src[at..]` into a fresh vector, leaving `src[..at]` behind.
pub(crate) fn split_tail<A: Array>(src: &mut SmallVec<A>, at: usize) -> SmallVec<A> {
    let mut tail = SmallVec::new();
    let end = src.len();
    cut_paste(src, at..end, &mut tail, 0);
    tail
}

/// Appends all of `src` to the end of `dst`, leaving `src` empty.
pub(crate) fn append<A: Array>(src: &mut SmallVec<A>, dst: &mut SmallVec<A>) {
    let end = src.len();
    let at = dst.len();
    cut_paste(src, 0..end, dst, at);
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use alloc::string::{String, ToString};
    use smallvec::smallvec;

    #[test]
    fn cut_paste_into_middle() {
        let mut src: SmallVec<[u32; 4]> = smallvec![1, 2, 3, 4];
        let mut dst: SmallVec<[u32; 4]> = smallvec![10, 20];
        cut_paste(&mut src, 1..3, &mut dst, 1);
        assert_eq!(src.as_slice(), &[1, 4]);
        assert_eq!(dst.as_slice(), &[10, 2, 3, 20]);
    }

    #[test]
    fn split_tail_moves_upper_half() {
        let mut src: SmallVec<[String; 3]> = smallvec!["a".to_string(), "b".to_string(), "c".to_string()];
        let tail = split_tail(&mut src, 1);
        assert_eq!(src.as_slice(), &["a"]);
        assert_eq!(tail.as_slice(), &["b", "c"]);
    }

    #[test]
    fn split_tail_at_end_is_empty() {
        let mut src: SmallVec<[u32; 3]> = smallvec![1, 2];
        let tail = split_tail(&mut src, 2);
        assert!(tail.is_empty());
        assert_eq!(src.len(), 2);
    }

    #[test]
    fn append_spills_past_inline_capacity() {
        let mut src: SmallVec<[u32; 3]> = smallvec![4, 5];
        let mut dst: SmallVec<[u32; 3]> = smallvec![1, 2, 3];
        append(&mut src, &mut dst);
        assert!(src.is_empty());
        assert_eq!(dst.as_slice(), &[1, 2, 3, 4, 5]);
    }
}
