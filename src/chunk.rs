//! Order-preserving fixed-size grouping used to bound concurrency.

/// Split `items` into consecutive groups of `size`; only the last group may be
/// shorter. Concatenating the groups yields `items` unchanged.
///
/// # Panics
/// Panics when `size` is zero.
pub fn chunk<T>(items: Vec<T>, size: usize) -> Vec<Vec<T>> {
    assert!(size > 0, "chunk size must be positive");
    let mut chunks = Vec::with_capacity(items.len().div_ceil(size));
    let mut iter = items.into_iter().peekable();
    while iter.peek().is_some() {
        chunks.push(iter.by_ref().take(size).collect());
    }
    chunks
}

/// Split one chunk into at most `parts` contiguous, disjoint groups of
/// `ceil(len / parts)` items; only the last group may be shorter.
///
/// # Panics
/// Panics when `parts` is zero.
pub fn split_into<T>(items: Vec<T>, parts: usize) -> Vec<Vec<T>> {
    assert!(parts > 0, "part count must be positive");
    if items.is_empty() {
        return Vec::new();
    }
    let per_part = items.len().div_ceil(parts);
    chunk(items, per_part)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sizes<T>(chunks: &[Vec<T>]) -> Vec<usize> {
        chunks.iter().map(Vec::len).collect()
    }

    #[test]
    fn empty_input_yields_no_chunks() {
        assert!(chunk(Vec::<u8>::new(), 3).is_empty());
    }

    #[test]
    fn last_chunk_carries_the_remainder() {
        let chunks = chunk((0..23).collect(), 10);
        assert_eq!(sizes(&chunks), vec![10, 10, 3]);
        assert_eq!(chunks.concat(), (0..23).collect::<Vec<_>>());
    }

    #[test]
    fn exact_multiple_has_no_short_chunk() {
        assert_eq!(sizes(&chunk((0..9).collect(), 3)), vec![3, 3, 3]);
    }

    #[test]
    fn concatenation_reproduces_input_for_many_shapes() {
        for len in 0..40usize {
            for size in 1..12usize {
                let input: Vec<usize> = (0..len).collect();
                let chunks = chunk(input.clone(), size);
                assert_eq!(chunks.len(), len.div_ceil(size));
                assert!(chunks.iter().rev().skip(1).all(|c| c.len() == size));
                assert_eq!(chunks.concat(), input);
            }
        }
    }

    #[test]
    #[should_panic(expected = "chunk size must be positive")]
    fn zero_size_panics() {
        chunk(vec![1, 2, 3], 0);
    }

    #[test]
    fn split_into_halves() {
        assert_eq!(sizes(&split_into((0..10).collect(), 2)), vec![5, 5]);
        assert_eq!(sizes(&split_into((0..3).collect(), 2)), vec![2, 1]);
        assert_eq!(sizes(&split_into((0..1).collect(), 2)), vec![1]);
        assert!(split_into(Vec::<u8>::new(), 2).is_empty());
    }

    #[test]
    fn split_into_never_exceeds_part_count() {
        for len in 1..30usize {
            for parts in 1..6usize {
                let split = split_into((0..len).collect::<Vec<_>>(), parts);
                assert!(split.len() <= parts);
                assert_eq!(split.concat(), (0..len).collect::<Vec<_>>());
            }
        }
    }
}
