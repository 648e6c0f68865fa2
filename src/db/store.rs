use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{Activity, MarkOutcome, PageRequest, Title, TitleFilter, UserList, UserTitle},
};

/// Query contract of the catalog.
///
/// Users are identified by email. Every listing is ordered and paginated by the
/// store; see the individual methods for the order.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogStore: Send + Sync {
    /// Distinct genres, ascending
    async fn list_genres(&self) -> AppResult<Vec<String>>;

    /// One page of titles matching `filter`, ordered by name then id,
    /// flagged with `user`'s favorites and watch-later entries
    async fn search_titles(
        &self,
        filter: &TitleFilter,
        page: PageRequest,
        user: &str,
    ) -> AppResult<Vec<UserTitle>>;

    /// One page of `user`'s list, ordered by release year, name, then id
    async fn list_marked(
        &self,
        list: UserList,
        page: PageRequest,
        user: &str,
    ) -> AppResult<Vec<UserTitle>>;

    async fn title_exists(&self, title_id: Uuid) -> AppResult<bool>;

    /// Adds a title to a list. A fresh addition records an activity in the same
    /// write; a repeated one changes nothing.
    async fn add_mark(&self, list: UserList, title_id: Uuid, user: &str)
        -> AppResult<MarkOutcome>;

    /// Removes a title from a list, returning whether it was there
    async fn remove_mark(&self, list: UserList, title_id: Uuid, user: &str) -> AppResult<bool>;

    /// One page of `user`'s activity feed, newest first
    async fn list_activities(&self, page: PageRequest, user: &str) -> AppResult<Vec<Activity>>;

    async fn count_titles(&self) -> AppResult<i64>;

    /// Inserts titles, skipping ids already present. Returns how many were new.
    async fn insert_titles(&self, titles: &[Title]) -> AppResult<u64>;
}
