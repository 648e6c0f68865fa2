pub mod activity;
pub mod filter;
pub mod title;
pub mod user;

pub use activity::{Activity, ActivityKind, MarkOutcome, UserList};
pub use filter::{PageParams, PageRequest, TitleFilter, TitleQueryParams};
pub use title::{Title, UserTitle, UserTitleRow};
pub use user::CurrentUser;

use serde::Serialize;

/// Body of the favorite / watch-later mutation endpoints
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
