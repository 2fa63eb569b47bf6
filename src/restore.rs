use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::entry::{AffiliateSection, NavEntry, TabName};

/// Role queries answered by the auth subsystem. Consulted live at every
/// restoration, never cached: roles can change between back-presses.
pub trait SessionGate {
    fn is_admin(&self) -> bool;
    fn is_affiliate(&self) -> bool;
}

/// Catalog lookup answered by the product subsystem.
pub trait ProductLookup {
    fn find_product(&self, id: u64) -> Option<Product>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: u64,
    pub title: String,
}

/// The view layer's side of restoration. Rendering itself lives outside
/// this subsystem; these calls are the whole contract.
pub trait ViewSink {
    fn select_home(&mut self);
    fn select_tab(&mut self, tab: TabName);
    fn show_product(&mut self, product: &Product);
    fn clear_product(&mut self);
    fn open_cms(&mut self);
    fn close_cms(&mut self);
    fn show_affiliate_tab(&mut self, section: AffiliateSection);
    fn show_exit_prompt(&mut self);
    fn hide_exit_prompt(&mut self);
}

/// What a restoration actually did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// The entry's own view was reproduced.
    Restored,
    /// The product no longer exists; Home was shown instead.
    FellBackToHome,
    /// The session lost the required privilege; nothing was shown.
    Skipped,
}

/// Reproduces the UI state for a popped entry via the collaborators.
///
/// Stale product references and privilege mismatches are recovered here,
/// quietly; a popped entry must never crash the page.
pub struct ViewRestorer {
    session: Box<dyn SessionGate>,
    catalog: Box<dyn ProductLookup>,
    view: Box<dyn ViewSink>,
}

impl ViewRestorer {
    pub fn new(
        session: impl SessionGate + 'static,
        catalog: impl ProductLookup + 'static,
        view: impl ViewSink + 'static,
    ) -> Self {
        Self {
            session: Box::new(session),
            catalog: Box::new(catalog),
            view: Box::new(view),
        }
    }

    pub fn restore(&mut self, entry: &NavEntry) -> RestoreOutcome {
        match entry {
            NavEntry::Home => {
                self.restore_home();
                RestoreOutcome::Restored
            }
            NavEntry::Tab { name } => {
                self.view.select_tab(*name);
                self.view.clear_product();
                self.view.close_cms();
                RestoreOutcome::Restored
            }
            NavEntry::Product { id } => match self.catalog.find_product(*id) {
                Some(product) => {
                    self.view.show_product(&product);
                    RestoreOutcome::Restored
                }
                None => {
                    log::debug!("product {id} no longer in catalog, falling back to home");
                    self.restore_home();
                    RestoreOutcome::FellBackToHome
                }
            },
            NavEntry::Cms => {
                if self.session.is_admin() {
                    self.view.open_cms();
                    RestoreOutcome::Restored
                } else {
                    log::debug!("cms entry reached without admin role, ignoring");
                    RestoreOutcome::Skipped
                }
            }
            NavEntry::AffiliateTab { section } => {
                if self.session.is_affiliate() {
                    self.view.show_affiliate_tab(*section);
                    RestoreOutcome::Restored
                } else {
                    log::debug!(
                        "affiliate entry {} reached without affiliate role, ignoring",
                        section.label()
                    );
                    RestoreOutcome::Skipped
                }
            }
        }
    }

    fn restore_home(&mut self) {
        self.view.select_home();
        self.view.clear_product();
        self.view.close_cms();
    }

    pub fn view_mut(&mut self) -> &mut dyn ViewSink {
        self.view.as_mut()
    }
}

/// Role store with a shareable handle, so the host can flip roles while
/// the restorer keeps its own clone.
#[derive(Debug, Clone, Default)]
pub struct MemorySession {
    roles: Rc<RefCell<(bool, bool)>>, // (admin, affiliate)
}

impl MemorySession {
    pub fn new(admin: bool, affiliate: bool) -> Self {
        Self {
            roles: Rc::new(RefCell::new((admin, affiliate))),
        }
    }

    pub fn set_admin(&self, admin: bool) {
        self.roles.borrow_mut().0 = admin;
    }

    pub fn set_affiliate(&self, affiliate: bool) {
        self.roles.borrow_mut().1 = affiliate;
    }

    /// Everything off, as after logout.
    pub fn clear(&self) {
        *self.roles.borrow_mut() = (false, false);
    }
}

impl SessionGate for MemorySession {
    fn is_admin(&self) -> bool {
        self.roles.borrow().0
    }

    fn is_affiliate(&self) -> bool {
        self.roles.borrow().1
    }
}

/// Product store with a shareable handle; deleting a product mid-session
/// is exactly the stale-reference case restoration must survive.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    products: Rc<RefCell<BTreeMap<u64, Product>>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, product: Product) {
        self.products.borrow_mut().insert(product.id, product);
    }

    pub fn remove(&self, id: u64) {
        self.products.borrow_mut().remove(&id);
    }
}

impl ProductLookup for MemoryCatalog {
    fn find_product(&self, id: u64) -> Option<Product> {
        self.products.borrow().get(&id).cloned()
    }
}
