use serde::Serialize;

/// The condition-code register.
///
/// Only arithmetic instructions set these; everything else leaves them
/// alone. The architectural reset state has ZF set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConditionCodes {
    /// Zero flag.
    pub zf: bool,
    /// Sign flag.
    pub sf: bool,
    /// Overflow flag.
    pub of: bool,
}

impl Default for ConditionCodes {
    fn default() -> Self {
        ConditionCodes {
            zf: true,
            sf: false,
            of: false,
        }
    }
}

impl std::fmt::Display for ConditionCodes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Z={} S={} O={}",
            u8::from(self.zf),
            u8::from(self.sf),
            u8::from(self.of)
        )
    }
}
