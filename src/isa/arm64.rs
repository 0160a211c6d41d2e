//! ARM64 feature table.

use super::features::FeatureTable;

/// Code must avoid the Cortex-A53 835769/843419 errata sequences.
pub const A53: u32 = 1 << 0;
pub const CRC: u32 = 1 << 1;
pub const LSE: u32 = 1 << 2;
pub const FP16: u32 = 1 << 3;
pub const DOTPROD: u32 = 1 << 4;

const ARMV8_2_FLAGS: u32 = CRC | LSE | FP16 | DOTPROD;

pub static TABLE: FeatureTable = FeatureTable {
    features: &[
        ("a53", A53),
        ("crc", CRC),
        ("lse", LSE),
        ("fp16", FP16),
        ("dotprod", DOTPROD),
    ],
    variants: &[
        ("default", A53),
        ("generic", A53),
        ("cortex-a35", CRC),
        ("cortex-a53", A53 | CRC),
        ("cortex-a57", A53 | CRC),
        ("cortex-a72", A53 | CRC),
        ("cortex-a73", A53 | CRC),
        ("cortex-a55", ARMV8_2_FLAGS),
        ("cortex-a75", ARMV8_2_FLAGS),
        ("cortex-a76", ARMV8_2_FLAGS),
        ("exynos-m1", CRC),
        ("exynos-m2", CRC),
        ("exynos-m3", CRC),
        ("denver64", CRC),
        ("kryo", CRC),
        ("kryo385", ARMV8_2_FLAGS),
    ],
    lenient_variants: false,
    build_flags,
};

fn build_flags() -> u32 {
    // The errata workaround cannot be ruled out from target features alone.
    let mut flags = A53;
    if cfg!(target_feature = "crc") {
        flags |= CRC;
    }
    if cfg!(target_feature = "lse") {
        flags |= LSE;
    }
    if cfg!(target_feature = "fp16") {
        flags |= FP16;
    }
    if cfg!(target_feature = "dotprod") {
        flags |= DOTPROD;
    }
    flags
}
