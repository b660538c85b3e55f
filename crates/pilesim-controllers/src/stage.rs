use core::fmt;

#[repr(u8)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Default)]
pub enum Stage {
    /// Warm-up without gravity.
    #[default]
    Settling = 0,
    /// Spheres fall and come to rest under gravity.
    Depositing = 1,
    /// Pile driven into the pack at constant velocity.
    Inserting = 2,
}

impl Stage {
    #[inline] pub fn index(self) -> u8 { self as u8 }

    /// The stage that follows this one, if any.
    pub fn next(self) -> Option<Stage> {
        match self {
            Stage::Settling => Some(Stage::Depositing),
            Stage::Depositing => Some(Stage::Inserting),
            Stage::Inserting => None,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.index()) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_order() {
        assert_eq!(Stage::default(), Stage::Settling);
        assert_eq!(Stage::Settling.next(), Some(Stage::Depositing));
        assert_eq!(Stage::Depositing.next(), Some(Stage::Inserting));
        assert_eq!(Stage::Inserting.next(), None);
        assert!(Stage::Settling < Stage::Depositing && Stage::Depositing < Stage::Inserting);
        assert_eq!(Stage::Inserting.to_string(), "2");
    }
}
