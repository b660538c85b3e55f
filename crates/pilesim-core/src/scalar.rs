/// Engine-wide floating point type. Grain radii are millimetres inside a metre-tall cell,
/// so everything runs in double precision.
pub type Scalar = f64;
