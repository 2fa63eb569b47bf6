use serde::{Deserialize, Serialize};

use crate::controller::NavigationController;
use crate::entry::{AffiliateSection, NavEntry, TabName};
use crate::history::{HistoryBridge, InMemoryHistory};
use crate::restore::{MemoryCatalog, MemorySession, Product, ViewRestorer, ViewSink};

/// Replay script: starting roles, seed catalog, optional deep-link
/// fragment, then the steps to drive through the controller.
#[derive(Debug, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub admin: bool,
    #[serde(default)]
    pub affiliate: bool,
    /// Address fragment present at page load, without the `#`.
    #[serde(default)]
    pub fragment: Option<String>,
    #[serde(default)]
    pub products: Vec<Product>,
    pub steps: Vec<Step>,
}

/// One scripted user action or domain event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    NavigateTo { tab: TabName },
    OpenProduct { id: u64 },
    OpenCms,
    OpenAffiliate { section: AffiliateSection },
    /// Physical back button.
    Back,
    /// Physical forward button.
    Forward,
    ConfirmExit,
    CancelExit,
    /// Delete a product from the catalog mid-session.
    RemoveProduct { id: u64 },
    SetRoles {
        #[serde(default)]
        admin: bool,
        #[serde(default)]
        affiliate: bool,
    },
    Logout,
}

impl Step {
    pub fn name(&self) -> &'static str {
        match self {
            Step::NavigateTo { .. } => "navigate_to",
            Step::OpenProduct { .. } => "open_product",
            Step::OpenCms => "open_cms",
            Step::OpenAffiliate { .. } => "open_affiliate",
            Step::Back => "back",
            Step::Forward => "forward",
            Step::ConfirmExit => "confirm_exit",
            Step::CancelExit => "cancel_exit",
            Step::RemoveProduct { .. } => "remove_product",
            Step::SetRoles { .. } => "set_roles",
            Step::Logout => "logout",
        }
    }
}

/// Controller state after one step, as written to the trace file.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceRecord {
    pub step: usize,
    pub action: Step,
    pub stack: Vec<String>,
    pub confirmation_showing: bool,
    pub allow_exit: bool,
    pub fragment: Option<String>,
    pub exited: bool,
}

/// Drives a fresh controller + in-memory browser through a script, one
/// step at a time.
pub struct ScriptRunner {
    browser: InMemoryHistory,
    session: MemorySession,
    catalog: MemoryCatalog,
    controller: NavigationController,
    exited: bool,
}

impl ScriptRunner {
    pub fn new(script: &Script, view: impl ViewSink + 'static) -> Self {
        let browser = InMemoryHistory::with_fragment(script.fragment.as_deref());
        let session = MemorySession::new(script.admin, script.affiliate);
        let catalog = MemoryCatalog::new();
        for product in &script.products {
            catalog.insert(product.clone());
        }

        let restorer = ViewRestorer::new(session.clone(), catalog.clone(), view);
        let mut controller =
            NavigationController::new(HistoryBridge::new(browser.clone()), restorer);
        controller.bootstrap();

        Self {
            browser,
            session,
            catalog,
            controller,
            exited: false,
        }
    }

    /// Apply one step, pump the resulting notifications, snapshot state.
    pub fn apply(&mut self, index: usize, step: &Step) -> TraceRecord {
        if self.exited {
            log::warn!("step {} after the page exited, skipping", step.name());
        } else {
            match step {
                Step::NavigateTo { tab } => self.controller.navigate_to(*tab),
                Step::OpenProduct { id } => {
                    self.controller.push_nav_state(NavEntry::Product { id: *id })
                }
                Step::OpenCms => self.controller.push_nav_state(NavEntry::Cms),
                Step::OpenAffiliate { section } => self
                    .controller
                    .push_nav_state(NavEntry::AffiliateTab { section: *section }),
                Step::Back => self.browser.press_back(),
                Step::Forward => self.browser.press_forward(),
                Step::ConfirmExit => self.controller.confirm_exit(),
                Step::CancelExit => self.controller.cancel_exit(),
                Step::RemoveProduct { id } => self.catalog.remove(*id),
                Step::SetRoles { admin, affiliate } => {
                    self.session.set_admin(*admin);
                    self.session.set_affiliate(*affiliate);
                }
                Step::Logout => {
                    self.session.clear();
                    self.controller.handle_logout();
                }
            }
            self.controller.pump();
            if self.browser.on_external_page() {
                self.exited = true;
            }
        }

        TraceRecord {
            step: index + 1,
            action: step.clone(),
            stack: self
                .controller
                .stack()
                .entries()
                .iter()
                .map(NavEntry::describe)
                .collect(),
            confirmation_showing: self.controller.guard().confirmation_showing(),
            allow_exit: self.controller.guard().allow_exit(),
            fragment: self.browser.current_fragment(),
            exited: self.exited,
        }
    }

    pub fn exited(&self) -> bool {
        self.exited
    }
}
