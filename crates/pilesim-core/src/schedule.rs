use crate::StepHasher;

/// Fixed engine pipeline of one DEM step, in execution order.
#[repr(u8)]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum StepStage {
    ForceReset = 1,
    UpdateAabbs = 2,
    Broadphase = 3,
    Narrowphase = 4,
    ContactLaw = 5,
    Integrate = 6,
}

pub fn schedule_digest(stages: &[StepStage]) -> [u8; 32] {
    let mut h = StepHasher::new();
    for s in stages { h.update_bytes(&[*s as u8]); }
    h.finalize()
}
