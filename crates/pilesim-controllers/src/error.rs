use pilesim_core::BodyId;
use thiserror::Error;

pub type ControlResult<T> = Result<T, ControlError>;

/// Every variant is fatal for the run: the step loop stops at the first one.
#[derive(Debug, Error)]
pub enum ControlError {
    #[error("{0} is not present in the simulation")]
    UnknownBody(BodyId),

    #[error("empty body range for {0}")]
    EmptyRange(&'static str),

    #[error("pile body set is empty")]
    EmptyPile,

    #[error("{0} has a non-finite position")]
    NonFinitePosition(BodyId),

    #[error("simulation has no material")]
    NoMaterial,
}
