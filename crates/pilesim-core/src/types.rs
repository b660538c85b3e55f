use glam::DVec3;
use crate::Scalar;

pub type Vec3 = DVec3;

#[inline] pub fn vec3(x: Scalar, y: Scalar, z: Scalar) -> Vec3 { Vec3::new(x, y, z) }

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Velocity { pub lin: Vec3, pub ang: Vec3 }

/// Per-body lock mask over the six degrees of freedom.
/// A locked axis keeps whatever velocity was imposed on it; the integrator never accelerates it.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct Dofs(u8);

impl Dofs {
    pub const NONE: Dofs = Dofs(0);
    pub const X:  Dofs = Dofs(1 << 0);
    pub const Y:  Dofs = Dofs(1 << 1);
    pub const Z:  Dofs = Dofs(1 << 2);
    pub const RX: Dofs = Dofs(1 << 3);
    pub const RY: Dofs = Dofs(1 << 4);
    pub const RZ: Dofs = Dofs(1 << 5);
    pub const ALL: Dofs = Dofs(0b11_1111);

    #[inline] pub fn contains(self, other: Dofs) -> bool { self.0 & other.0 == other.0 }
    #[inline] pub fn is_all(self) -> bool { self == Dofs::ALL }

    /// Linear axis `k` (0 = x, 1 = y, 2 = z) is locked.
    #[inline] pub fn lin_locked(self, k: usize) -> bool { self.0 & (1 << k) != 0 }
    /// Rotational axis `k` is locked.
    #[inline] pub fn ang_locked(self, k: usize) -> bool { self.0 & (1 << (k + 3)) != 0 }
}

impl core::ops::BitOr for Dofs {
    type Output = Dofs;
    fn bitor(self, rhs: Dofs) -> Dofs { Dofs(self.0 | rhs.0) }
}
