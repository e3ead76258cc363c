use super::body::BodyHandle;

/// Keeps two bodies a fixed distance apart (XPBD, optional compliance)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceConstraint {
    pub a: BodyHandle,
    pub b: BodyHandle,
    pub rest_length: f32,
    /// Inverse stiffness; zero is rigid
    pub compliance: f32,
    pub(crate) lambda: f32,
}

impl DistanceConstraint {
    pub fn new(a: BodyHandle, b: BodyHandle, rest_length: f32) -> Self {
        Self {
            a,
            b,
            rest_length,
            compliance: 0.0,
            lambda: 0.0,
        }
    }

    pub fn with_compliance(mut self, compliance: f32) -> Self {
        self.compliance = compliance;
        self
    }

    pub fn involves(&self, handle: BodyHandle) -> bool {
        self.a == handle || self.b == handle
    }
}
