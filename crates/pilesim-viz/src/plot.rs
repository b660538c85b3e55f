use pilesim_core::Scalar;
use serde::Serialize;

/// One point of the live plot. `pile_y` is only known once the pile is moving.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct PlotSample {
    pub iter: u64,
    pub unbalanced_force: Scalar,
    pub pile_y: Option<Scalar>,
    pub force_y: Scalar,
}

/// Append-only series kept in memory for plotting after (or during) a run.
#[derive(Clone, Debug, Default)]
pub struct PlotBuffer { samples: Vec<PlotSample> }

impl PlotBuffer {
    pub fn new() -> Self { Self::default() }
    pub fn push(&mut self, s: PlotSample) { self.samples.push(s); }
    pub fn samples(&self) -> &[PlotSample] { &self.samples }
    pub fn last(&self) -> Option<&PlotSample> { self.samples.last() }
    pub fn len(&self) -> usize { self.samples.len() }
    pub fn is_empty(&self) -> bool { self.samples.is_empty() }

    /// `(iter, pile_y)` for the samples that carry a pile position.
    pub fn pile_track(&self) -> impl Iterator<Item = (u64, Scalar)> + '_ {
        self.samples.iter().filter_map(|s| s.pile_y.map(|y| (s.iter, y)))
    }
}
