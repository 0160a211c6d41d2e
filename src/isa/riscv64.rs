//! RISC-V 64 feature table.

use super::features::FeatureTable;

pub const ZBA: u32 = 1 << 0;
pub const ZBB: u32 = 1 << 1;
pub const ZBS: u32 = 1 << 2;

pub static TABLE: FeatureTable = FeatureTable {
    features: &[("zba", ZBA), ("zbb", ZBB), ("zbs", ZBS)],
    variants: &[("default", 0), ("generic", ZBA | ZBB | ZBS)],
    lenient_variants: false,
    build_flags,
};

fn build_flags() -> u32 {
    let mut flags = 0;
    if cfg!(target_feature = "zba") {
        flags |= ZBA;
    }
    if cfg!(target_feature = "zbb") {
        flags |= ZBB;
    }
    if cfg!(target_feature = "zbs") {
        flags |= ZBS;
    }
    flags
}
