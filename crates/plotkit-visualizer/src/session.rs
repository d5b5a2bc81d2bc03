//! Render session state that outlives a single render

/// Marker state carried across renders
///
/// The lift counter keeps increasing from one render to the next until the
/// host resets it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderSession {
    pub lift_counter: u64,
    pub lift_markers: bool,
}

impl RenderSession {
    pub fn new(lift_markers: bool) -> Self {
        Self {
            lift_counter: 0,
            lift_markers,
        }
    }

    /// Flip marker drawing, returning the new setting
    pub fn toggle_lift_markers(&mut self) -> bool {
        self.lift_markers = !self.lift_markers;
        self.lift_markers
    }

    pub fn reset_counter(&mut self) {
        self.lift_counter = 0;
    }

    /// Return the current counter value and advance it
    ///
    /// Wraps back to zero instead of overflowing.
    pub fn next_label(&mut self) -> u64 {
        let label = self.lift_counter;
        self.lift_counter = self.lift_counter.wrapping_add(1);
        label
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_and_toggle() {
        let mut session = RenderSession::new(false);
        assert!(session.toggle_lift_markers());
        assert_eq!(session.next_label(), 0);
        assert_eq!(session.next_label(), 1);
        assert_eq!(session.lift_counter, 2);
        session.reset_counter();
        assert_eq!(session.lift_counter, 0);
        assert!(!session.toggle_lift_markers());
    }

    #[test]
    fn test_counter_wraps_at_limit() {
        let mut session = RenderSession {
            lift_counter: u64::MAX,
            lift_markers: true,
        };
        assert_eq!(session.next_label(), u64::MAX);
        assert_eq!(session.lift_counter, 0);
        assert_eq!(session.next_label(), 0);
    }
}
