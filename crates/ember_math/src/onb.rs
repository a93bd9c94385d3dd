use crate::Vec3;

/// Orthonormal basis `{u, v, w}` built around a single direction.
///
/// `w` is the normalized input; `u` and `v` complete a right-handed frame.
/// Used to map samples generated around +Z (cosine lobes, cones) onto an
/// arbitrary normal or light direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Onb {
    u: Vec3,
    v: Vec3,
    w: Vec3,
}

impl Onb {
    /// Build a basis whose `w` axis points along `n`.
    pub fn from_w(n: Vec3) -> Self {
        let w = n.normalize();
        // Any helper axis works as long as it is not parallel to w.
        let a = if w.x.abs() > 0.9 { Vec3::Y } else { Vec3::X };
        let u = a.cross(w).normalize();
        let v = w.cross(u);
        Self { u, v, w }
    }

    #[inline]
    pub fn u(&self) -> Vec3 {
        self.u
    }

    #[inline]
    pub fn v(&self) -> Vec3 {
        self.v
    }

    #[inline]
    pub fn w(&self) -> Vec3 {
        self.w
    }

    /// Transform local coordinates `(a.x, a.y, a.z)` into world space.
    #[inline]
    pub fn local(&self, a: Vec3) -> Vec3 {
        a.x * self.u + a.y * self.v + a.z * self.w
    }
}
