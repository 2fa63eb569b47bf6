#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum GuardState {
    #[default]
    Idle,
    ConfirmationShown,
    ExitArmed,
}

/// Arbiter for what a physical back/forward notification means once the
/// stack sits at its floor: show the exit confirmation, treat the press as
/// an implicit cancel, or let the host actually leave.
///
/// Externally this reads as the two short-lived flags `allow_exit` and
/// `confirmation_showing`; internally it is a closed three-state machine,
/// so at most one flag can ever be true.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExitGuard {
    state: GuardState,
}

impl ExitGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while a deliberately triggered real back navigation is in
    /// flight. The very next notification consumes it.
    pub fn allow_exit(&self) -> bool {
        self.state == GuardState::ExitArmed
    }

    /// True while the exit-confirmation UI is on screen. The next
    /// notification consumes it as an implicit "no".
    pub fn confirmation_showing(&self) -> bool {
        self.state == GuardState::ConfirmationShown
    }

    pub fn is_idle(&self) -> bool {
        self.state == GuardState::Idle
    }

    /// The confirmation UI just went up.
    pub fn show_confirmation(&mut self) {
        self.state = GuardState::ConfirmationShown;
    }

    /// The user confirmed exit; the controller triggers a real back right
    /// after this.
    pub fn arm_exit(&mut self) {
        self.state = GuardState::ExitArmed;
    }

    /// Consume whichever flag was set and return to Idle.
    pub fn reset(&mut self) {
        self.state = GuardState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at_most_one_flag(guard: &ExitGuard) -> bool {
        !(guard.allow_exit() && guard.confirmation_showing())
    }

    #[test]
    fn starts_idle() {
        let guard = ExitGuard::new();
        assert!(guard.is_idle());
        assert!(!guard.allow_exit());
        assert!(!guard.confirmation_showing());
    }

    #[test]
    fn at_most_one_flag_in_every_state() {
        let mut guard = ExitGuard::new();
        assert!(at_most_one_flag(&guard));
        guard.show_confirmation();
        assert!(at_most_one_flag(&guard));
        guard.arm_exit();
        assert!(at_most_one_flag(&guard));
        guard.reset();
        assert!(at_most_one_flag(&guard));
    }

    #[test]
    fn arming_exit_clears_the_confirmation_flag() {
        let mut guard = ExitGuard::new();
        guard.show_confirmation();
        guard.arm_exit();
        assert!(guard.allow_exit());
        assert!(!guard.confirmation_showing());
    }

    #[test]
    fn reset_consumes_either_flag() {
        let mut guard = ExitGuard::new();
        guard.show_confirmation();
        guard.reset();
        assert!(guard.is_idle());

        guard.arm_exit();
        guard.reset();
        assert!(guard.is_idle());
    }
}
