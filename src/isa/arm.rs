//! 32-bit ARM (Thumb2) feature table.

use super::features::FeatureTable;

/// Hardware integer division.
pub const DIV: u32 = 1 << 0;
/// Single-copy atomic LDRD/STRD.
pub const ATOMIC_LDRD_STRD: u32 = 1 << 1;
pub const ARMV8A: u32 = 1 << 2;

const A15_FLAGS: u32 = DIV | ATOMIC_LDRD_STRD;
const ARMV8_FLAGS: u32 = DIV | ATOMIC_LDRD_STRD | ARMV8A;

pub static TABLE: FeatureTable = FeatureTable {
    features: &[
        ("div", DIV),
        ("atomic_ldrd_strd", ATOMIC_LDRD_STRD),
        ("armv8a", ARMV8A),
    ],
    variants: &[
        ("default", 0),
        ("generic", 0),
        ("cortex-a5", 0),
        ("cortex-a8", 0),
        ("cortex-a9", 0),
        ("cortex-a7", A15_FLAGS),
        ("cortex-a15", A15_FLAGS),
        ("krait", A15_FLAGS),
        ("cortex-a53", ARMV8_FLAGS),
        ("cortex-a57", ARMV8_FLAGS),
        ("kryo", ARMV8_FLAGS),
    ],
    lenient_variants: false,
    build_flags,
};

fn build_flags() -> u32 {
    if cfg!(target_feature = "v8") {
        ARMV8_FLAGS
    } else if cfg!(target_feature = "v7") {
        ATOMIC_LDRD_STRD
    } else {
        0
    }
}
