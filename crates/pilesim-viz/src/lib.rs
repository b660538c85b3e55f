mod plot;
mod snapshot;

use pilesim_core::{StepStage, schedule_digest};

pub use plot::{PlotBuffer, PlotSample};
pub use snapshot::{FieldSource, BodyRecord, ContactRecord, Record, SnapshotStream};

#[derive(Default)]
pub struct ScheduleRecorder { stages: Vec<StepStage> }

impl ScheduleRecorder {
    pub fn new() -> Self { Self { stages: Vec::new() } }
    pub fn push(&mut self, s: StepStage) { self.stages.push(s); }
    pub fn clear(&mut self) { self.stages.clear(); }
    pub fn stages(&self) -> &[StepStage] { &self.stages }
    pub fn digest(&self) -> [u8; 32] { schedule_digest(&self.stages) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_follows_order() {
        let mut a = ScheduleRecorder::new();
        a.push(StepStage::ForceReset);
        a.push(StepStage::Integrate);
        let mut b = ScheduleRecorder::new();
        b.push(StepStage::Integrate);
        b.push(StepStage::ForceReset);
        assert_ne!(a.digest(), b.digest());
        b.clear();
        b.push(StepStage::ForceReset);
        b.push(StepStage::Integrate);
        assert_eq!(a.digest(), b.digest());
        assert_eq!(a.stages().len(), 2);
    }
}
