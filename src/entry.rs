use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Prefix of the address fragment used when a product view tops the stack
/// (`product-<id>`).
pub const PRODUCT_FRAGMENT_PREFIX: &str = "product-";

/// Top-level storefront sections reachable from the tab bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TabName {
    Shop,
    Cart,
    Orders,
    Account,
}

impl TabName {
    pub fn label(&self) -> &'static str {
        match self {
            TabName::Shop => "Shop",
            TabName::Cart => "Cart",
            TabName::Orders => "Orders",
            TabName::Account => "Account",
        }
    }
}

/// Sub-sections of the affiliate dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AffiliateSection {
    Overview,
    Links,
    Earnings,
    Payouts,
}

impl AffiliateSection {
    pub fn label(&self) -> &'static str {
        match self {
            AffiliateSection::Overview => "Overview",
            AffiliateSection::Links => "Links",
            AffiliateSection::Earnings => "Earnings",
            AffiliateSection::Payouts => "Payouts",
        }
    }
}

/// One logical screen on the navigation stack.
///
/// Serialized form doubles as the state payload attached to physical
/// history entries, so it stays a closed tagged union: every screen kind
/// is a variant, and restoration can match exhaustively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "screen", rename_all = "snake_case")]
pub enum NavEntry {
    /// Stack floor; always present at index 0.
    Home,
    Tab { name: TabName },
    /// Catalog item. Existence is not guaranteed at restore time.
    Product { id: u64 },
    /// Only meaningful when the session has administrator privilege.
    Cms,
    /// Only meaningful when the session has affiliate privilege.
    AffiliateTab { section: AffiliateSection },
}

impl NavEntry {
    /// Address fragment this entry wants visible, if any.
    pub fn fragment(&self) -> Option<String> {
        match self {
            NavEntry::Product { id } => Some(format!("{PRODUCT_FRAGMENT_PREFIX}{id}")),
            _ => None,
        }
    }

    /// State payload carried by the matching physical history entry.
    pub fn to_payload(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Decode a physical entry's payload. Payloads are informational only;
    /// anything unrecognized decodes to `None`.
    pub fn from_payload(payload: &Value) -> Option<NavEntry> {
        serde_json::from_value(payload.clone()).ok()
    }

    pub fn describe(&self) -> String {
        match self {
            NavEntry::Home => "home".into(),
            NavEntry::Tab { name } => format!("tab:{}", name.label()),
            NavEntry::Product { id } => format!("product:{id}"),
            NavEntry::Cms => "cms".into(),
            NavEntry::AffiliateTab { section } => format!("affiliate:{}", section.label()),
        }
    }
}

/// Parse a `product-<id>` fragment. Anything else is `None`.
pub fn parse_product_fragment(fragment: &str) -> Option<u64> {
    fragment
        .strip_prefix(PRODUCT_FRAGMENT_PREFIX)
        .and_then(|rest| rest.parse::<u64>().ok())
}
