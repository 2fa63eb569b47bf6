use crate::entry::{parse_product_fragment, NavEntry, TabName};
use crate::guard::ExitGuard;
use crate::history::{BackForwardEvent, HistoryBridge};
use crate::restore::{RestoreOutcome, ViewRestorer};
use crate::stack::NavStack;

/// Composes stack, guard, bridge and restorer into the navigation
/// subsystem's single entry point.
///
/// The controller is a singly-owned object and every back/forward
/// notification is handled through `&mut self`, so the handler always
/// reads current state, never a snapshot captured when some listener was
/// registered. It is also the only consumer of the bridge's notifications
/// (it owns the bridge), which makes double handling of one back-press
/// unrepresentable.
pub struct NavigationController {
    stack: NavStack,
    guard: ExitGuard,
    bridge: HistoryBridge,
    restorer: ViewRestorer,
    bootstrapped: bool,
}

impl NavigationController {
    pub fn new(bridge: HistoryBridge, restorer: ViewRestorer) -> Self {
        Self {
            stack: NavStack::new(),
            guard: ExitGuard::new(),
            bridge,
            restorer,
            bootstrapped: false,
        }
    }

    /// One-shot page-load path; calling it again is a no-op.
    ///
    /// Captures the landing fragment before the in-place `Home` replace
    /// can clear it, then honours a `product-<id>` deep link with one
    /// initial restoration. A resolving product is pushed like a normal
    /// navigation so a back-press returns to Home; a stale link stays on
    /// Home.
    pub fn bootstrap(&mut self) {
        if self.bootstrapped {
            return;
        }
        self.bootstrapped = true;

        let fragment = self.bridge.fragment();
        self.bridge.replace_physical_if_missing(&NavEntry::Home);

        let Some(id) = fragment.as_deref().and_then(parse_product_fragment) else {
            return;
        };
        let entry = NavEntry::Product { id };
        if self.restorer.restore(&entry) == RestoreOutcome::Restored {
            self.push_nav_state(entry);
        }
    }

    /// Append a screen and mirror it as a physical history entry. Every
    /// explicit in-app navigation goes through here.
    pub fn push_nav_state(&mut self, entry: NavEntry) {
        if self.guard.confirmation_showing() {
            // the exit dialog is modal; a stray push now would desync the
            // pending trap bookkeeping
            log::debug!(
                "ignoring push of {} while exit confirmation is showing",
                entry.describe()
            );
            return;
        }
        self.bridge.push_physical(&entry);
        self.stack.push(entry);
    }

    /// Tab switch: close any open product view, then push the tab.
    pub fn navigate_to(&mut self, tab: TabName) {
        self.restorer.view_mut().clear_product();
        self.push_nav_state(NavEntry::Tab { name: tab });
    }

    /// The single handler for physical back/forward notifications.
    ///
    /// The event payload is informational only; the decision is made from
    /// guard flags first, stack depth second.
    pub fn handle_back_or_forward(&mut self, event: &BackForwardEvent) {
        if let Some(state) = &event.state {
            log::trace!("back/forward notification, payload {state}");
        }

        // a deliberately triggered exit: consume the flag and let the
        // host leave the page
        if self.guard.allow_exit() {
            self.guard.reset();
            return;
        }

        // back-press while the dialog is open: implicit "no"
        if self.guard.confirmation_showing() {
            self.guard.reset();
            self.restorer.view_mut().hide_exit_prompt();
            self.bridge.trap_current_position(self.stack.peek());
            return;
        }

        if self.stack.depth() <= 1 {
            self.guard.show_confirmation();
            self.restorer.view_mut().show_exit_prompt();
            self.bridge.trap_current_position(self.stack.peek());
            return;
        }

        // the host already moved, so no physical push here
        if let Some((popped, new_top)) = self.stack.pop() {
            log::debug!(
                "popped {}, restoring {}",
                popped.describe(),
                new_top.describe()
            );
            self.restorer.restore(&new_top);
        }
    }

    /// Drain queued notifications. The host loop's single integration
    /// point for physical back/forward handling.
    pub fn pump(&mut self) {
        while let Some(event) = self.bridge.poll_back_or_forward() {
            self.handle_back_or_forward(&event);
        }
    }

    /// The confirmation dialog's "Yes": arm the guard, then ask the host
    /// for a real back navigation.
    pub fn confirm_exit(&mut self) {
        if !self.guard.confirmation_showing() {
            log::debug!("confirm_exit without a visible confirmation, ignoring");
            return;
        }
        self.guard.arm_exit();
        self.bridge.trigger_physical_back();
    }

    /// The confirmation dialog's "No". Idempotent: a second call finds
    /// nothing showing and does nothing.
    pub fn cancel_exit(&mut self) {
        if !self.guard.confirmation_showing() {
            return;
        }
        self.guard.reset();
        self.restorer.view_mut().hide_exit_prompt();
        self.bridge.trap_current_position(self.stack.peek());
    }

    /// Logout event from the auth subsystem: back to Idle at `[Home]`.
    pub fn handle_logout(&mut self) {
        if self.guard.confirmation_showing() {
            self.restorer.view_mut().hide_exit_prompt();
        }
        self.guard.reset();
        self.stack.reset();
    }

    pub fn stack(&self) -> &NavStack {
        &self.stack
    }

    pub fn guard(&self) -> &ExitGuard {
        &self.guard
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::AffiliateSection;
    use crate::history::{InMemoryHistory, UnavailableHistory};
    use crate::restore::{MemoryCatalog, MemorySession, Product, ViewRestorer};
    use crate::testkit::{RecordingView, ViewEvent};

    struct Rig {
        browser: InMemoryHistory,
        session: MemorySession,
        catalog: MemoryCatalog,
        view: RecordingView,
        controller: NavigationController,
    }

    impl Rig {
        fn press_back(&mut self) {
            self.browser.press_back();
            self.controller.pump();
        }

        fn entries(&self) -> &[NavEntry] {
            self.controller.stack().entries()
        }
    }

    fn rig_with_fragment(fragment: Option<&str>) -> Rig {
        let browser = InMemoryHistory::with_fragment(fragment);
        let session = MemorySession::new(false, false);
        let catalog = MemoryCatalog::new();
        catalog.insert(Product {
            id: 42,
            title: "Linen tote".into(),
        });
        catalog.insert(Product {
            id: 7,
            title: "Walnut desk organizer".into(),
        });
        let view = RecordingView::new();
        let restorer = ViewRestorer::new(session.clone(), catalog.clone(), view.clone());
        let mut controller =
            NavigationController::new(HistoryBridge::new(browser.clone()), restorer);
        controller.bootstrap();
        Rig {
            browser,
            session,
            catalog,
            view,
            controller,
        }
    }

    fn rig() -> Rig {
        rig_with_fragment(None)
    }

    fn tab(name: TabName) -> NavEntry {
        NavEntry::Tab { name }
    }

    #[test]
    fn scenario_a_back_pops_to_the_previous_screen() {
        let mut rig = rig();
        rig.controller.push_nav_state(tab(TabName::Cart));
        rig.controller.push_nav_state(NavEntry::Product { id: 42 });
        assert_eq!(
            rig.entries(),
            &[
                NavEntry::Home,
                tab(TabName::Cart),
                NavEntry::Product { id: 42 }
            ]
        );
        // one physical record per stack entry, plus the external seed
        assert_eq!(rig.browser.record_count(), rig.controller.stack().depth() + 1);

        rig.press_back();
        assert_eq!(rig.entries(), &[NavEntry::Home, tab(TabName::Cart)]);
        assert_eq!(rig.view.count(&ViewEvent::SelectTab(TabName::Cart)), 1);
        assert!(rig.controller.guard().is_idle());
    }

    #[test]
    fn scenario_b_back_at_the_floor_raises_the_confirmation() {
        let mut rig = rig();
        rig.press_back();
        assert!(rig.controller.guard().confirmation_showing());
        assert_eq!(rig.view.count(&ViewEvent::ShowExitPrompt), 1);
        assert_eq!(rig.entries(), &[NavEntry::Home]);
        // the trap re-pinned the position, we did not leave
        assert!(!rig.browser.on_external_page());
    }

    #[test]
    fn scenario_c_cancel_hides_and_traps_exactly_once() {
        let mut rig = rig();
        rig.press_back();
        let records_before = rig.browser.record_count();

        rig.controller.cancel_exit();
        assert!(rig.controller.guard().is_idle());
        assert_eq!(rig.view.count(&ViewEvent::HideExitPrompt), 1);
        assert_eq!(rig.browser.record_count(), records_before + 1);
        assert_eq!(rig.entries(), &[NavEntry::Home]);

        // second cancel is a no-op: identical state
        rig.controller.cancel_exit();
        assert!(rig.controller.guard().is_idle());
        assert_eq!(rig.view.count(&ViewEvent::HideExitPrompt), 1);
        assert_eq!(rig.browser.record_count(), records_before + 1);
    }

    #[test]
    fn scenario_d_confirm_lets_the_host_leave() {
        let mut rig = rig();
        rig.press_back();

        rig.controller.confirm_exit();
        assert!(rig.controller.guard().allow_exit());

        let events_before = rig.view.events().len();
        rig.controller.pump();
        assert!(rig.controller.guard().is_idle());
        assert!(rig.browser.on_external_page());
        // the consuming notification performs no further controller action
        assert_eq!(rig.view.events().len(), events_before);
        assert_eq!(rig.entries(), &[NavEntry::Home]);
    }

    #[test]
    fn scenario_e_popping_onto_a_deleted_product_falls_back_home() {
        let mut rig = rig();
        rig.controller.push_nav_state(NavEntry::Product { id: 7 });
        rig.controller.push_nav_state(tab(TabName::Shop));

        rig.catalog.remove(7);
        rig.press_back();

        assert_eq!(rig.view.count(&ViewEvent::SelectHome), 1);
        assert_eq!(
            rig.entries(),
            &[NavEntry::Home, NavEntry::Product { id: 7 }]
        );
        assert!(rig.controller.guard().is_idle());
    }

    #[test]
    fn scenario_f_logout_resets_stack_and_guard() {
        let mut rig = rig();
        rig.session.set_admin(true);
        rig.controller.push_nav_state(tab(TabName::Account));
        rig.controller.push_nav_state(NavEntry::Cms);

        rig.controller.handle_logout();
        assert_eq!(rig.entries(), &[NavEntry::Home]);
        assert!(rig.controller.guard().is_idle());
    }

    #[test]
    fn logout_dismisses_a_visible_confirmation() {
        let mut rig = rig();
        rig.press_back();
        assert!(rig.controller.guard().confirmation_showing());

        rig.controller.handle_logout();
        assert!(rig.controller.guard().is_idle());
        assert_eq!(rig.view.count(&ViewEvent::HideExitPrompt), 1);
    }

    #[test]
    fn back_press_while_the_dialog_is_open_is_an_implicit_cancel() {
        let mut rig = rig();
        rig.press_back();
        rig.press_back();

        assert!(rig.controller.guard().is_idle());
        assert_eq!(rig.view.count(&ViewEvent::HideExitPrompt), 1);
        assert_eq!(rig.view.count(&ViewEvent::ShowExitPrompt), 1);

        // the trap re-armed the decision point: next back asks again
        rig.press_back();
        assert_eq!(rig.view.count(&ViewEvent::ShowExitPrompt), 2);
    }

    #[test]
    fn cancelled_confirmation_can_be_raised_again() {
        let mut rig = rig();
        rig.press_back();
        rig.controller.cancel_exit();

        rig.press_back();
        assert!(rig.controller.guard().confirmation_showing());
        assert_eq!(rig.view.count(&ViewEvent::ShowExitPrompt), 2);
    }

    #[test]
    fn pushes_are_ignored_while_the_confirmation_is_showing() {
        let mut rig = rig();
        rig.press_back();

        rig.controller.push_nav_state(tab(TabName::Cart));
        assert_eq!(rig.entries(), &[NavEntry::Home]);
        assert!(rig.controller.guard().confirmation_showing());
    }

    #[test]
    fn confirm_without_a_dialog_is_ignored() {
        let mut rig = rig();
        rig.controller.confirm_exit();
        assert!(rig.controller.guard().is_idle());
        assert!(!rig.browser.on_external_page());
    }

    #[test]
    fn navigate_to_clears_any_open_product_first() {
        let mut rig = rig();
        rig.controller.push_nav_state(NavEntry::Product { id: 42 });
        rig.controller.navigate_to(TabName::Cart);

        assert_eq!(rig.view.count(&ViewEvent::ClearProduct), 1);
        assert_eq!(rig.controller.stack().peek(), &tab(TabName::Cart));
    }

    #[test]
    fn affiliate_entries_restore_only_under_the_affiliate_role() {
        let mut rig = rig();
        rig.session.set_affiliate(true);
        rig.controller.push_nav_state(NavEntry::AffiliateTab {
            section: AffiliateSection::Payouts,
        });
        rig.controller.push_nav_state(tab(TabName::Shop));

        rig.session.set_affiliate(false);
        rig.press_back();

        // popped onto the affiliate entry without the role: benign no-op
        assert_eq!(
            rig.view
                .count(&ViewEvent::ShowAffiliate(AffiliateSection::Payouts)),
            0
        );
        assert!(rig.controller.guard().is_idle());
    }

    #[test]
    fn bootstrap_honours_a_product_deep_link() {
        let mut rig = rig_with_fragment(Some("product-42"));
        assert_eq!(
            rig.entries(),
            &[NavEntry::Home, NavEntry::Product { id: 42 }]
        );
        assert_eq!(rig.view.count(&ViewEvent::ShowProduct(42)), 1);
        assert_eq!(rig.browser.current_fragment().as_deref(), Some("product-42"));

        // guarded against re-trigger on later renders
        rig.controller.bootstrap();
        assert_eq!(rig.entries().len(), 2);
        assert_eq!(rig.view.count(&ViewEvent::ShowProduct(42)), 1);
    }

    #[test]
    fn bootstrap_with_a_stale_deep_link_stays_on_home() {
        let rig = rig_with_fragment(Some("product-999"));
        assert_eq!(rig.entries(), &[NavEntry::Home]);
        assert_eq!(rig.view.count(&ViewEvent::SelectHome), 1);
    }

    #[test]
    fn bootstrap_ignores_foreign_fragments() {
        let rig = rig_with_fragment(Some("checkout-step-2"));
        assert_eq!(rig.entries(), &[NavEntry::Home]);
        assert!(rig.view.events().is_empty());
    }

    #[test]
    fn unavailable_history_leaves_in_app_navigation_working() {
        let view = RecordingView::new();
        let restorer = ViewRestorer::new(
            MemorySession::new(false, false),
            MemoryCatalog::new(),
            view.clone(),
        );
        let mut controller =
            NavigationController::new(HistoryBridge::new(UnavailableHistory), restorer);
        controller.bootstrap();

        controller.push_nav_state(tab(TabName::Cart));
        controller.navigate_to(TabName::Shop);
        assert_eq!(controller.stack().depth(), 3);
        // nothing to drain, nothing panics
        controller.pump();
        assert!(controller.guard().is_idle());
    }
}
