use std::fmt;
use std::marker::PhantomData;

use serde::de::{SeqAccess, Visitor};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{SegmentCapacity, UnrolledList, Usize};

/// Lists serialize as a plain sequence with a known length.
/// Segment boundaries are not part of the format.
impl<T, const N: usize> Serialize for UnrolledList<T, N>
where
    T: Serialize,
    Usize<N>: SegmentCapacity,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.len))?;
        for value in self {
            seq.serialize_element(value)?;
        }
        seq.end()
    }
}

struct ListVisitor<T, const N: usize>(PhantomData<fn() -> T>);

impl<'de, T, const N: usize> Visitor<'de> for ListVisitor<T, N>
where
    T: Deserialize<'de>,
    Usize<N>: SegmentCapacity,
{
    type Value = UnrolledList<T, N>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a sequence")
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut list = UnrolledList::new();
        while let Some(value) = seq.next_element()? {
            list.push_back(value);
        }
        Ok(list)
    }
}

impl<'de, T, const N: usize> Deserialize<'de> for UnrolledList<T, N>
where
    T: Deserialize<'de>,
    Usize<N>: SegmentCapacity,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_seq(ListVisitor(PhantomData))
    }
}

#[cfg(test)]
mod tests {
    use quickcheck_macros::quickcheck;

    use crate::tests::assert_invariants;
    use crate::{SegmentCapacity, UnrolledList, Usize};

    #[test]
    fn test_serialize_emits_a_flat_sequence() {
        let mut list = UnrolledList::<_, 2>::new();
        (0..5).for_each(|v| list.push_front(v));

        let json = serde_json::to_string(&list).unwrap();
        assert_eq!(json, "[4,3,2,1,0]");
    }

    #[test]
    fn test_deserialize_rebuilds_a_dense_list() {
        let list: UnrolledList<i32, 4> = serde_json::from_str("[1,2,3,4,5,6,7,8,9,10,11]").unwrap();

        assert_eq!(list, [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11]);
        assert_eq!(assert_invariants(&list), [4, 4, 3]);
    }

    #[test]
    fn test_deserialize_rejects_non_sequences() {
        assert!(serde_json::from_str::<UnrolledList<i32, 4>>("{\"a\":1}").is_err());
        assert!(serde_json::from_str::<UnrolledList<i32, 4>>("[1,\"two\"]").is_err());
    }

    #[quickcheck]
    fn test_round_trip_preserves_order(seed: Vec<i32>) {
        fn _test<const N: usize>(seed: &[i32])
        where
            Usize<N>: SegmentCapacity,
        {
            let mut list = UnrolledList::<_, N>::from_iter(seed.iter().copied());
            if !list.is_empty() {
                list.remove(list.len() / 2).unwrap();
            }

            let json = serde_json::to_string(&list).unwrap();
            let rebuilt: UnrolledList<i32, N> = serde_json::from_str(&json).unwrap();

            assert_eq!(rebuilt.len(), list.len());
            assert_eq!(rebuilt, list);
            assert_invariants(&rebuilt);
        }

        _test::<2>(&seed);
        _test::<4>(&seed);
        _test::<32>(&seed);
    }
}
