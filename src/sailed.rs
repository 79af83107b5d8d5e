use crate::{SegmentCapacity, Usize};

pub trait Sailed {}

macro_rules! segment_capacities {
    ($($n:literal),* $(,)?) => {
        $(
            impl Sailed for Usize<$n> {}
            impl SegmentCapacity for Usize<$n> {}
        )*
    };
}

// Even capacities only: splits and merges move exactly `N / 2` elements.
segment_capacities!(
    2, 4, 6, 8, 10, 12, 14, 16, 18, 20, 22, 24, 26, 28, 30, 32, 34, 36, 38, 40, 42, 44, 46, 48,
    50, 52, 54, 56, 58, 60, 62, 64, 128, 256, 512, 1024,
);
