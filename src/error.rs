use thiserror::Error;

/// Failures reported by [`UnrolledList`](crate::UnrolledList) and its cursors.
///
/// Every failing operation leaves the list exactly as it was before the call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("index out of bounds: the len is {len} but the index is {index}")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("no such element")]
    NoSuchElement,

    /// The list was structurally modified behind a cursor's back.
    #[error("concurrent modification: cursor expected generation {expected}, list is at {found}")]
    ConcurrentModification { expected: u64, found: u64 },

    #[error("illegal state: {0}")]
    IllegalState(&'static str),
}

pub type Result<T, E = Error> = core::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use crate::Error;

    #[test]
    fn test_display_mentions_index_and_len() {
        let error = Error::IndexOutOfBounds { index: 7, len: 3 };
        assert_eq!(
            error.to_string(),
            "index out of bounds: the len is 3 but the index is 7"
        );
    }

    #[test]
    fn test_display_mentions_both_generations() {
        let error = Error::ConcurrentModification {
            expected: 4,
            found: 5,
        };
        assert!(error.to_string().contains("expected generation 4"));
        assert!(error.to_string().contains("list is at 5"));
    }
}
