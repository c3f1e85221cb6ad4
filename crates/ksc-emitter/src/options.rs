/// Code generation switches.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EmitterOptions {
    /// Reject unary intrinsics whose result type is not primitive instead
    /// of emitting them anyway.
    pub assert_primitive_operands: bool,
}

impl Default for EmitterOptions {
    fn default() -> Self {
        EmitterOptions {
            assert_primitive_operands: true,
        }
    }
}
