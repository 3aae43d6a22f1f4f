//! The configuration document rendered by the public checkout page.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The single structured record describing page copy, style and
/// payment-gateway configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigDocument {
    pub page_content: PageContent,
    pub page_style: PageStyle,
    pub payment_gateways: Vec<Gateway>,
    pub active_gateway_id: Option<String>,
}

/// Copy shown on the checkout page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageContent {
    pub title: String,
    pub main_heading: String,
    pub sub_heading: String,
    pub description: String,
    pub button_text: String,
    pub footer_text: String,
    pub language: Language,
}

/// Page language. Only this fixed set is accepted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Fr,
    Es,
    De,
    Pt,
}

/// Colors and background of the checkout page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageStyle {
    pub background_color: String,
    /// A `data:` URI, or `None` for no image.
    #[serde(default)]
    pub background_image: Option<String>,
    pub text_color: String,
    pub button_color: String,
    pub button_hover_color: String,
}

/// One configured payment-processor checkout target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gateway {
    pub id: String,
    pub name: String,
    pub checkout_url: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub api_keys: ApiKeys,
}

/// Gateway credentials. Besides the two well-known keys a gateway may carry
/// any number of additional string-valued keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeys {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

impl ConfigDocument {
    /// Resolve `active_gateway_id` against the gateway list.
    ///
    /// Returns `None` both when no gateway is selected and when the selected
    /// id does not exist in the list.
    pub fn active_gateway(&self) -> Option<&Gateway> {
        let id = self.active_gateway_id.as_deref()?;
        self.payment_gateways.iter().find(|g| g.id == id)
    }
}

impl Default for ConfigDocument {
    fn default() -> Self {
        Self {
            page_content: PageContent {
                title: "Secure Payment Checkout".to_string(),
                main_heading: "Complete Your Payment".to_string(),
                sub_heading: "Fast, Secure, Reliable".to_string(),
                description: "You're just one step away from completing your transaction. \
                    Our payment gateway ensures your information is secure and your \
                    transaction is processed quickly."
                    .to_string(),
                button_text: "Proceed to Secure Checkout".to_string(),
                footer_text: "© 2023 Payment Checkout. All rights reserved. Secure payment processing."
                    .to_string(),
                language: Language::En,
            },
            page_style: PageStyle {
                background_color: "#F6F6F6".to_string(),
                background_image: None,
                text_color: "#2D3250".to_string(),
                button_color: "#2D3250".to_string(),
                button_hover_color: "#424769".to_string(),
            },
            payment_gateways: vec![
                Gateway {
                    id: "stripe".to_string(),
                    name: "Stripe".to_string(),
                    checkout_url: "https://checkout.stripe.com".to_string(),
                    is_active: true,
                    api_keys: ApiKeys {
                        public_key: Some("pk_test_example".to_string()),
                        secret_key: Some("sk_test_example".to_string()),
                        extra: BTreeMap::new(),
                    },
                },
                Gateway {
                    id: "flutterwave".to_string(),
                    name: "Flutterwave".to_string(),
                    checkout_url: "https://checkout.flutterwave.com".to_string(),
                    is_active: false,
                    api_keys: ApiKeys {
                        public_key: Some("FLWPUBK_TEST".to_string()),
                        secret_key: Some("FLWSECK_TEST".to_string()),
                        extra: BTreeMap::new(),
                    },
                },
            ],
            active_gateway_id: Some("stripe".to_string()),
        }
    }
}
