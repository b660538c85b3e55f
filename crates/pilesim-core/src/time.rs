#[derive(Copy, Clone, Debug, Default)]
pub struct StepStats {
    pub iter: u64,
    pub pairs_tested: u32,
    pub contacts: u32,
}
