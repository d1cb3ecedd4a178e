/// Outcome of a content-safety check on a piece of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModerationVerdict {
    blocked: bool,
    reason: Option<String>,
}

impl ModerationVerdict {
    /// A verdict letting the text through.
    pub fn allowed() -> Self {
        Self {
            blocked: false,
            reason: None,
        }
    }

    /// A verdict blocking the text for the given reason.
    pub fn blocked(reason: impl Into<String>) -> Self {
        Self {
            blocked: true,
            reason: Some(reason.into()),
        }
    }

    /// Returns true if the text must not be used.
    pub fn is_blocked(&self) -> bool {
        self.blocked
    }

    /// Returns the block reason, if any.
    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    /// Consumes the verdict and returns the block reason.
    pub fn into_reason(self) -> Option<String> {
        self.reason
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allowed_has_no_reason() {
        let verdict = ModerationVerdict::allowed();
        assert!(!verdict.is_blocked());
        assert_eq!(verdict.reason(), None);
    }

    #[test]
    fn blocked_keeps_reason() {
        let verdict = ModerationVerdict::blocked("Content blocked by safety guardrail");
        assert!(verdict.is_blocked());
        assert_eq!(verdict.reason(), Some("Content blocked by safety guardrail"));
    }
}
