pub mod admin;
pub mod document;
pub mod page;
pub mod patch;

pub use admin::{
    ActionResponse, CreateAccountRequest, DashboardResponse, LoginPageResponse, LoginRequest,
};
pub use document::{ApiKeys, ConfigDocument, Gateway, Language, PageContent, PageStyle};
pub use page::PageView;
pub use patch::{ConfigPatch, PageContentPatch, PageStylePatch};
