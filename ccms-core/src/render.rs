//! Public page rendering.

use ccms_sdk::objects::{ConfigDocument, PageView};
use thiserror::Error;
use url::Url;

/// Why the checkout button cannot navigate anywhere.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    #[error("No payment gateway is currently configured. Please contact support.")]
    NoGateway,

    #[error("The payment gateway {0} is misconfigured. Please contact support.")]
    InvalidUrl(String),
}

/// Build the public page view. Gateway credentials never leave this
/// function.
pub fn page_view(document: &ConfigDocument) -> PageView {
    let gateway = document.active_gateway();
    PageView {
        page_content: document.page_content.clone(),
        page_style: document.page_style.clone(),
        gateway_name: gateway.map(|g| g.name.clone()),
        checkout_available: checkout_target(document).is_ok(),
    }
}

/// Where the checkout button leads: the active gateway's checkout URL.
pub fn checkout_target(document: &ConfigDocument) -> Result<Url, CheckoutError> {
    let gateway = document.active_gateway().ok_or(CheckoutError::NoGateway)?;
    if gateway.checkout_url.is_empty() {
        return Err(CheckoutError::NoGateway);
    }
    Url::parse(&gateway.checkout_url).map_err(|_| CheckoutError::InvalidUrl(gateway.name.clone()))
}
