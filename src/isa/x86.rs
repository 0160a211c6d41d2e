//! x86 and x86-64 feature table.

use super::features::FeatureTable;

pub const SSSE3: u32 = 1 << 0;
pub const SSE4_1: u32 = 1 << 1;
pub const SSE4_2: u32 = 1 << 2;
pub const AVX: u32 = 1 << 3;
pub const AVX2: u32 = 1 << 4;
pub const POPCNT: u32 = 1 << 5;

const SILVERMONT_FLAGS: u32 = SSSE3 | SSE4_1 | SSE4_2 | POPCNT;

pub static TABLE: FeatureTable = FeatureTable {
    features: &[
        ("ssse3", SSSE3),
        ("sse4.1", SSE4_1),
        ("sse4.2", SSE4_2),
        ("avx", AVX),
        ("avx2", AVX2),
        ("popcnt", POPCNT),
    ],
    variants: &[
        ("default", 0),
        ("x86-64", 0),
        ("atom", SSSE3),
        ("sandybridge", SILVERMONT_FLAGS),
        ("silvermont", SILVERMONT_FLAGS),
        ("goldmont", SILVERMONT_FLAGS),
        ("goldmont-plus", SILVERMONT_FLAGS),
        ("kabylake", SILVERMONT_FLAGS | AVX | AVX2),
    ],
    lenient_variants: true,
    build_flags,
};

fn build_flags() -> u32 {
    let mut flags = 0;
    if cfg!(target_feature = "ssse3") {
        flags |= SSSE3;
    }
    if cfg!(target_feature = "sse4.1") {
        flags |= SSE4_1;
    }
    if cfg!(target_feature = "sse4.2") {
        flags |= SSE4_2;
    }
    if cfg!(target_feature = "avx") {
        flags |= AVX;
    }
    if cfg!(target_feature = "avx2") {
        flags |= AVX2;
    }
    if cfg!(target_feature = "popcnt") {
        flags |= POPCNT;
    }
    flags
}
