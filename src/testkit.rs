//! Recording view sink shared by the unit tests.

use std::cell::RefCell;
use std::rc::Rc;

use crate::entry::{AffiliateSection, TabName};
use crate::restore::{Product, ViewSink};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    SelectHome,
    SelectTab(TabName),
    ShowProduct(u64),
    ClearProduct,
    OpenCms,
    CloseCms,
    ShowAffiliate(AffiliateSection),
    ShowExitPrompt,
    HideExitPrompt,
}

/// `ViewSink` that records every call; tests keep a cloned handle while
/// the restorer owns the boxed one.
#[derive(Clone, Default)]
pub struct RecordingView {
    events: Rc<RefCell<Vec<ViewEvent>>>,
}

impl RecordingView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ViewEvent> {
        self.events.borrow().clone()
    }

    pub fn count(&self, event: &ViewEvent) -> usize {
        self.events.borrow().iter().filter(|e| *e == event).count()
    }

    fn record(&self, event: ViewEvent) {
        self.events.borrow_mut().push(event);
    }
}

impl ViewSink for RecordingView {
    fn select_home(&mut self) {
        self.record(ViewEvent::SelectHome);
    }

    fn select_tab(&mut self, tab: TabName) {
        self.record(ViewEvent::SelectTab(tab));
    }

    fn show_product(&mut self, product: &Product) {
        self.record(ViewEvent::ShowProduct(product.id));
    }

    fn clear_product(&mut self) {
        self.record(ViewEvent::ClearProduct);
    }

    fn open_cms(&mut self) {
        self.record(ViewEvent::OpenCms);
    }

    fn close_cms(&mut self) {
        self.record(ViewEvent::CloseCms);
    }

    fn show_affiliate_tab(&mut self, section: AffiliateSection) {
        self.record(ViewEvent::ShowAffiliate(section));
    }

    fn show_exit_prompt(&mut self) {
        self.record(ViewEvent::ShowExitPrompt);
    }

    fn hide_exit_prompt(&mut self) {
        self.record(ViewEvent::HideExitPrompt);
    }
}
