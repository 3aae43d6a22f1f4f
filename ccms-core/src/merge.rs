//! Config merge service.
//!
//! Reads the current document, applies a [`ConfigPatch`] and appends the
//! result as a new version. Each update is an unlocked read-modify-write:
//! concurrent updates are last-write-wins.

use ccms_sdk::objects::{
    ConfigDocument, ConfigPatch, Gateway, PageContent, PageContentPatch, PageStyle,
    PageStylePatch,
};
use itertools::Itertools;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::store::{ContentStore, StoreError};

/// Reasons a patch is rejected before anything is written.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("gateway id must not be empty")]
    EmptyGatewayId,

    #[error("duplicate gateway id: {0}")]
    DuplicateGatewayId(String),

    #[error("more than one gateway is flagged active")]
    MultipleActiveGateways,

    #[error("gateway {id} has an invalid checkout url: {reason}")]
    InvalidCheckoutUrl { id: String, reason: String },
}

/// Errors returned by [`MergeService::update`].
#[derive(Debug, Error)]
pub enum MergeError {
    #[error("invalid update: {0}")]
    Validation(#[from] ValidationError),

    #[error("persistence error: {0}")]
    Persistence(#[from] StoreError),
}

/// Reads and updates the configuration document through an injected store.
#[derive(Clone)]
pub struct MergeService {
    store: Arc<dyn ContentStore>,
}

impl MergeService {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }

    /// The current document. Never fails.
    ///
    /// A missing or structurally incomplete latest version is replaced by
    /// the default document, which is persisted. If the store cannot be
    /// read the default is returned without writing anything.
    pub async fn get(&self) -> ConfigDocument {
        match self.store.latest().await {
            Ok(Some(stored)) => match stored.decode() {
                Some(document) => document,
                None => {
                    warn!(
                        version = stored.version,
                        "Stored document is incomplete, reseeding default"
                    );
                    self.seed_default().await
                }
            },
            Ok(None) => {
                info!("No stored document, seeding default");
                self.seed_default().await
            }
            Err(e) => {
                error!(error = %e, "Failed to read document, serving default");
                ConfigDocument::default()
            }
        }
    }

    /// Validate `patch`, merge it over the current document and persist the
    /// result as a new version. Returns the merged document.
    pub async fn update(&self, patch: ConfigPatch) -> Result<ConfigDocument, MergeError> {
        validate(&patch)?;

        let current = match self.store.latest().await? {
            Some(stored) => stored.decode().unwrap_or_else(|| {
                warn!(
                    version = stored.version,
                    "Stored document is incomplete, merging over default"
                );
                ConfigDocument::default()
            }),
            None => ConfigDocument::default(),
        };
        if patch.is_empty() {
            debug!("Empty patch, nothing stored");
            return Ok(current);
        }

        let merged = merge(current, patch);
        let version = self.store.append(&merged).await?;
        debug!(version, "Stored merged document");
        Ok(merged)
    }

    async fn seed_default(&self) -> ConfigDocument {
        let document = ConfigDocument::default();
        if let Err(e) = self.store.append(&document).await {
            warn!(error = %e, "Failed to persist default document");
        }
        document
    }
}

/// Apply `patch` over `current`.
///
/// - `pageContent` / `pageStyle`: provided keys overwrite, the rest stay.
/// - `activeGatewayId`: set (including to none), then every gateway's
///   `isActive` is recomputed from it.
/// - `paymentGateways`: replaces the whole list, after the step above.
pub fn merge(mut current: ConfigDocument, patch: ConfigPatch) -> ConfigDocument {
    if let Some(content) = patch.page_content {
        merge_content(&mut current.page_content, content);
    }

    if let Some(style) = patch.page_style {
        merge_style(&mut current.page_style, style);
    }

    if let Some(active_id) = patch.active_gateway_id {
        for gateway in &mut current.payment_gateways {
            gateway.is_active = active_id.as_deref() == Some(gateway.id.as_str());
        }
        current.active_gateway_id = active_id;
    }

    if let Some(gateways) = patch.payment_gateways {
        current.payment_gateways = gateways;
    }

    current
}

fn merge_content(content: &mut PageContent, patch: PageContentPatch) {
    let PageContentPatch {
        title,
        main_heading,
        sub_heading,
        description,
        button_text,
        footer_text,
        language,
    } = patch;
    if let Some(v) = title {
        content.title = v;
    }
    if let Some(v) = main_heading {
        content.main_heading = v;
    }
    if let Some(v) = sub_heading {
        content.sub_heading = v;
    }
    if let Some(v) = description {
        content.description = v;
    }
    if let Some(v) = button_text {
        content.button_text = v;
    }
    if let Some(v) = footer_text {
        content.footer_text = v;
    }
    if let Some(v) = language {
        content.language = v;
    }
}

fn merge_style(style: &mut PageStyle, patch: PageStylePatch) {
    let PageStylePatch {
        background_color,
        background_image,
        text_color,
        button_color,
        button_hover_color,
    } = patch;
    if let Some(v) = background_color {
        style.background_color = v;
    }
    if let Some(v) = background_image {
        style.background_image = v;
    }
    if let Some(v) = text_color {
        style.text_color = v;
    }
    if let Some(v) = button_color {
        style.button_color = v;
    }
    if let Some(v) = button_hover_color {
        style.button_hover_color = v;
    }
}

/// Reject a patch whose gateway list would break the document invariants.
///
/// `language` is not checked here: an unknown language already fails to
/// deserialize.
pub fn validate(patch: &ConfigPatch) -> Result<(), ValidationError> {
    let Some(gateways) = &patch.payment_gateways else {
        return Ok(());
    };

    if gateways.iter().any(|g| g.id.trim().is_empty()) {
        return Err(ValidationError::EmptyGatewayId);
    }

    if let Some(dup) = gateways.iter().map(|g| g.id.as_str()).duplicates().next() {
        return Err(ValidationError::DuplicateGatewayId(dup.to_string()));
    }

    if gateways.iter().filter(|g| g.is_active).count() > 1 {
        return Err(ValidationError::MultipleActiveGateways);
    }

    gateways.iter().try_for_each(validate_checkout_url)
}

/// An empty URL is allowed (the gateway is simply not usable); anything
/// else must be an absolute http(s) URL.
fn validate_checkout_url(gateway: &Gateway) -> Result<(), ValidationError> {
    if gateway.checkout_url.is_empty() {
        return Ok(());
    }
    let invalid = |reason: String| ValidationError::InvalidCheckoutUrl {
        id: gateway.id.clone(),
        reason,
    };
    let url = url::Url::parse(&gateway.checkout_url).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(invalid(format!("unsupported scheme {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryContentStore, StoredDocument};
    use async_trait::async_trait;
    use ccms_sdk::objects::{ApiKeys, Language};

    fn gateway(id: &str, active: bool) -> Gateway {
        Gateway {
            id: id.to_string(),
            name: id.to_uppercase(),
            checkout_url: format!("https://{id}.example.com/pay"),
            is_active: active,
            api_keys: ApiKeys::default(),
        }
    }

    fn active_ids(doc: &ConfigDocument) -> Vec<&str> {
        doc.payment_gateways
            .iter()
            .filter(|g| g.is_active)
            .map(|g| g.id.as_str())
            .collect()
    }

    struct BrokenStore;

    #[async_trait]
    impl ContentStore for BrokenStore {
        async fn latest(&self) -> Result<Option<StoredDocument>, StoreError> {
            Err(StoreError::Unavailable("connection refused".to_string()))
        }

        async fn append(&self, _document: &ConfigDocument) -> Result<i64, StoreError> {
            Err(StoreError::Unavailable("connection refused".to_string()))
        }
    }

    /// Reads succeed, writes fail.
    struct ReadOnlyStore(MemoryContentStore);

    #[async_trait]
    impl ContentStore for ReadOnlyStore {
        async fn latest(&self) -> Result<Option<StoredDocument>, StoreError> {
            self.0.latest().await
        }

        async fn append(&self, _document: &ConfigDocument) -> Result<i64, StoreError> {
            Err(StoreError::Unavailable("read-only".to_string()))
        }
    }

    #[test]
    fn test_content_only_patch_leaves_other_sections() {
        let before = ConfigDocument::default();
        let patch: ConfigPatch =
            serde_json::from_str(r#"{"pageContent": {"title": "New Title"}}"#).unwrap();

        let after = merge(before.clone(), patch);

        assert_eq!(after.page_content.title, "New Title");
        assert_eq!(after.page_content.main_heading, before.page_content.main_heading);
        assert_eq!(after.page_style, before.page_style);
        assert_eq!(after.payment_gateways, before.payment_gateways);
        assert_eq!(after.active_gateway_id, before.active_gateway_id);
    }

    #[test]
    fn test_switch_active_gateway() {
        let after = merge(
            ConfigDocument::default(),
            ConfigPatch::activate(Some("flutterwave".to_string())),
        );

        assert_eq!(after.active_gateway_id.as_deref(), Some("flutterwave"));
        assert_eq!(active_ids(&after), vec!["flutterwave"]);
        let stripe = after.payment_gateways.iter().find(|g| g.id == "stripe").unwrap();
        assert!(!stripe.is_active);
    }

    #[test]
    fn test_activate_unknown_gateway_deactivates_all() {
        let after = merge(
            ConfigDocument::default(),
            ConfigPatch::activate(Some("paypal".to_string())),
        );
        assert!(active_ids(&after).is_empty());
        assert!(after.active_gateway().is_none());
    }

    #[test]
    fn test_explicit_null_deselects_gateway() {
        let patch: ConfigPatch = serde_json::from_str(r#"{"activeGatewayId": null}"#).unwrap();
        let after = merge(ConfigDocument::default(), patch);
        assert_eq!(after.active_gateway_id, None);
        assert!(active_ids(&after).is_empty());
    }

    #[test]
    fn test_gateway_list_replaced_after_activation() {
        let patch = ConfigPatch {
            payment_gateways: Some(vec![gateway("paystack", true), gateway("stripe", false)]),
            active_gateway_id: Some(Some("paystack".to_string())),
            ..Default::default()
        };
        let after = merge(ConfigDocument::default(), patch);

        assert_eq!(after.payment_gateways.len(), 2);
        assert_eq!(after.payment_gateways[0].id, "paystack");
        assert_eq!(active_ids(&after), vec!["paystack"]);
    }

    #[test]
    fn test_style_patch_clears_background_image() {
        let mut before = ConfigDocument::default();
        before.page_style.background_image = Some("data:image/png;base64,AAAA".to_string());

        let keep: ConfigPatch =
            serde_json::from_str(r##"{"pageStyle": {"textColor": "#000000"}}"##).unwrap();
        let kept = merge(before.clone(), keep);
        assert_eq!(kept.page_style.text_color, "#000000");
        assert!(kept.page_style.background_image.is_some());

        let clear: ConfigPatch =
            serde_json::from_str(r#"{"pageStyle": {"backgroundImage": null}}"#).unwrap();
        let cleared = merge(before, clear);
        assert_eq!(cleared.page_style.background_image, None);
        assert_eq!(cleared.page_style.text_color, "#2D3250");
    }

    #[test]
    fn test_merge_is_idempotent() {
        let patch = ConfigPatch {
            page_content: Some(PageContentPatch {
                language: Some(Language::De),
                button_text: Some("Jetzt bezahlen".to_string()),
                ..Default::default()
            }),
            active_gateway_id: Some(Some("flutterwave".to_string())),
            ..Default::default()
        };
        let once = merge(ConfigDocument::default(), patch.clone());
        let twice = merge(once.clone(), patch);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_validate_rejects_duplicates() {
        let patch = ConfigPatch {
            payment_gateways: Some(vec![gateway("stripe", false), gateway("stripe", false)]),
            ..Default::default()
        };
        assert_eq!(
            validate(&patch),
            Err(ValidationError::DuplicateGatewayId("stripe".to_string()))
        );
    }

    #[test]
    fn test_validate_rejects_two_active() {
        let patch = ConfigPatch {
            payment_gateways: Some(vec![gateway("a", true), gateway("b", true)]),
            ..Default::default()
        };
        assert_eq!(validate(&patch), Err(ValidationError::MultipleActiveGateways));
    }

    #[test]
    fn test_validate_checkout_urls() {
        let mut bad = gateway("ftp", false);
        bad.checkout_url = "ftp://files.example.com".to_string();
        let patch = ConfigPatch {
            payment_gateways: Some(vec![bad]),
            ..Default::default()
        };
        assert!(matches!(
            validate(&patch),
            Err(ValidationError::InvalidCheckoutUrl { .. })
        ));

        let mut empty = gateway("draft", false);
        empty.checkout_url = String::new();
        let patch = ConfigPatch {
            payment_gateways: Some(vec![empty]),
            ..Default::default()
        };
        assert_eq!(validate(&patch), Ok(()));

        let mut blank = gateway("x", false);
        blank.id = "  ".to_string();
        let patch = ConfigPatch {
            payment_gateways: Some(vec![blank]),
            ..Default::default()
        };
        assert_eq!(validate(&patch), Err(ValidationError::EmptyGatewayId));
    }

    #[tokio::test]
    async fn test_get_on_empty_store_seeds_default() {
        let store = Arc::new(MemoryContentStore::new());
        let service = MergeService::new(store.clone());

        assert_eq!(service.get().await, ConfigDocument::default());
        assert_eq!(store.version_count().await, 1);

        // Second read finds the seeded version and writes nothing.
        assert_eq!(service.get().await, ConfigDocument::default());
        assert_eq!(store.version_count().await, 1);
    }

    #[tokio::test]
    async fn test_get_reseeds_incomplete_document() {
        let store = Arc::new(MemoryContentStore::new());
        store
            .push_raw(StoredDocument {
                version: 0,
                page_content: None,
                page_style: Some(serde_json::json!({})),
                payment_gateways: Some(serde_json::json!([])),
                active_gateway_id: None,
            })
            .await;
        let service = MergeService::new(store.clone());

        assert_eq!(service.get().await, ConfigDocument::default());
        assert_eq!(store.version_count().await, 2);
    }

    #[tokio::test]
    async fn test_get_degrades_on_read_failure() {
        let service = MergeService::new(Arc::new(BrokenStore));
        assert_eq!(service.get().await, ConfigDocument::default());
    }

    #[tokio::test]
    async fn test_update_then_get_round_trip() {
        let store = Arc::new(MemoryContentStore::new());
        let service = MergeService::new(store.clone());

        let patch: ConfigPatch = serde_json::from_str(
            r##"{
                "pageContent": {"title": "New Title"},
                "pageStyle": {"buttonColor": "#FF0000"},
                "activeGatewayId": "flutterwave"
            }"##,
        )
        .unwrap();
        service.update(patch.clone()).await.unwrap();
        let first = service.get().await;

        assert_eq!(first.page_content.title, "New Title");
        assert_eq!(
            first.page_content.main_heading,
            ConfigDocument::default().page_content.main_heading
        );
        assert_eq!(first.page_style.button_color, "#FF0000");
        assert_eq!(active_ids(&first), vec!["flutterwave"]);

        service.update(patch).await.unwrap();
        assert_eq!(service.get().await, first);
        assert_eq!(store.version_count().await, 2);
    }

    #[tokio::test]
    async fn test_invalid_patch_writes_nothing() {
        let store = Arc::new(MemoryContentStore::new());
        let service = MergeService::new(store.clone());

        let patch = ConfigPatch {
            page_content: Some(PageContentPatch {
                title: Some("Should not land".to_string()),
                ..Default::default()
            }),
            payment_gateways: Some(vec![gateway("a", true), gateway("a", false)]),
            ..Default::default()
        };
        let err = service.update(patch).await.unwrap_err();
        assert!(matches!(err, MergeError::Validation(_)));
        assert_eq!(store.version_count().await, 0);
    }

    #[tokio::test]
    async fn test_empty_patch_stores_nothing() {
        let store = Arc::new(MemoryContentStore::new());
        let service = MergeService::new(store.clone());
        service
            .update(ConfigPatch::activate(Some("stripe".to_string())))
            .await
            .unwrap();

        let unchanged = service.update(ConfigPatch::default()).await.unwrap();
        assert_eq!(unchanged, service.get().await);
        assert_eq!(unchanged.active_gateway_id.as_deref(), Some("stripe"));
        assert_eq!(store.version_count().await, 1);
    }

    #[tokio::test]
    async fn test_update_surfaces_write_failure() {
        let service = MergeService::new(Arc::new(ReadOnlyStore(MemoryContentStore::new())));
        let err = service
            .update(ConfigPatch::activate(None))
            .await
            .unwrap_err();
        assert!(matches!(err, MergeError::Persistence(_)));
    }

    #[tokio::test]
    async fn test_update_surfaces_read_failure() {
        let service = MergeService::new(Arc::new(BrokenStore));
        let err = service
            .update(ConfigPatch::activate(None))
            .await
            .unwrap_err();
        assert!(matches!(err, MergeError::Persistence(_)));
    }
}
