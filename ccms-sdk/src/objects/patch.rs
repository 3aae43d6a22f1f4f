//! Partial updates accepted by `POST /config`.

use serde::{Deserialize, Deserializer, Serialize};

use super::document::{Gateway, Language};

/// A partial update of a [`ConfigDocument`](super::ConfigDocument).
///
/// Every section is optional. `active_gateway_id` distinguishes an absent
/// field (`None`, leave unchanged) from an explicit `null` (`Some(None)`,
/// deselect the gateway).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_content: Option<PageContentPatch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_style: Option<PageStylePatch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_gateways: Option<Vec<Gateway>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub active_gateway_id: Option<Option<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageContentPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_heading: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_heading: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub button_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<Language>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageStylePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    /// `Some(None)` clears the background image.
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub background_image: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub button_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub button_hover_color: Option<String>,
}

impl ConfigPatch {
    /// Patch that only changes the active gateway.
    pub fn activate(gateway_id: Option<String>) -> Self {
        Self {
            active_gateway_id: Some(gateway_id),
            ..Default::default()
        }
    }

    /// Whether the patch carries no changes at all.
    pub fn is_empty(&self) -> bool {
        self.page_content.is_none()
            && self.page_style.is_none()
            && self.payment_gateways.is_none()
            && self.active_gateway_id.is_none()
    }
}

/// Present-but-null deserializes to `Some(None)`; the `default` attribute
/// covers the absent case.
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
