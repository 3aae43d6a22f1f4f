//! Public page view.

use serde::{Deserialize, Serialize};

use super::document::{PageContent, PageStyle};

/// Everything the public checkout page needs to render, without any gateway
/// credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageView {
    pub page_content: PageContent,
    pub page_style: PageStyle,
    /// Name of the gateway the checkout button leads to, if any.
    pub gateway_name: Option<String>,
    pub checkout_available: bool,
}
