/// Tracks whether an input-method composition is in progress.
///
/// While active, intermediate input must not reach the line store; the final text is
/// committed once when the composition ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompositionGuard {
    active: bool,
}

impl CompositionGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self) {
        self.active = true;
    }

    pub fn end(&mut self) {
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

#[cfg(test)]
mod tests {
    use super::CompositionGuard;

    #[test]
    fn begin_and_end_toggle_state() {
        let mut guard = CompositionGuard::new();
        assert!(!guard.is_active());
        guard.begin();
        guard.begin();
        assert!(guard.is_active());
        guard.end();
        assert!(!guard.is_active());
    }
}
