use std::{cmp, fmt};

const FIRST_N_ELEMENTS: usize = 3;

/// Debug formatter for keyframe vectors: prints the first few entries and
/// a count of the rest
#[cfg(not(feature = "debug-print-all"))]
pub fn trimmed_collection_fmt<T: fmt::Debug>(n: &Vec<T>, f: &mut fmt::Formatter) -> fmt::Result {
    let first_three = &n[..cmp::min(FIRST_N_ELEMENTS, n.len())];
    let remaining = n.len() - first_three.len();

    if remaining == 0 {
        write!(f, "{:#?}", n)
    } else {
        write!(f, "{:#?} + {} elements", first_three, remaining)
    }
}

#[cfg(feature = "debug-print-all")]
pub fn trimmed_collection_fmt<T: fmt::Debug>(n: &Vec<T>, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "{:#?}", n)
}

#[cfg(all(test, not(feature = "debug-print-all")))]
mod tests {
    use super::*;

    struct Wrapper(Vec<u32>);

    impl fmt::Debug for Wrapper {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            trimmed_collection_fmt(&self.0, f)
        }
    }

    #[test]
    fn test_short_collection_printed_whole() {
        let out = format!("{:?}", Wrapper(vec![1, 2]));
        assert!(!out.contains("elements"));
    }

    #[test]
    fn test_long_collection_trimmed() {
        let out = format!("{:?}", Wrapper((0..10).collect()));
        assert!(out.ends_with("+ 7 elements"));
    }
}
