use std::sync::Arc;
use uuid::Uuid;

use crate::{
    db::CatalogStore,
    error::{AppError, AppResult},
    models::{
        Activity, CurrentUser, MarkOutcome, MessageResponse, PageRequest, TitleFilter,
        TitleQueryParams, UserList, UserTitle,
    },
};

/// Catalog operations exposed over HTTP
#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn CatalogStore>,
    page_size: u32,
    activity_page_size: u32,
}

impl CatalogService {
    pub fn new(store: Arc<dyn CatalogStore>, page_size: u32, activity_page_size: u32) -> Self {
        Self {
            store,
            page_size,
            activity_page_size,
        }
    }

    /// One page of the filtered catalog
    pub async fn titles(
        &self,
        params: &TitleQueryParams,
        user: &CurrentUser,
    ) -> AppResult<Vec<UserTitle>> {
        let filter = TitleFilter::from_params_now(params)?;
        let page = PageRequest::parse(params.page.as_deref(), self.page_size)?;

        if !filter.is_satisfiable() {
            tracing::debug!(?filter, "Filter cannot match any title");
            return Ok(Vec::new());
        }

        let titles = self.store.search_titles(&filter, page, &user.email).await?;

        tracing::info!(
            page = page.page,
            query = filter.query.as_deref().unwrap_or(""),
            min_year = filter.min_year,
            max_year = filter.max_year,
            genres = filter.genres.as_ref().map_or(0, |g| g.len()),
            results = titles.len(),
            "Catalog search completed"
        );

        Ok(titles)
    }

    pub async fn genres(&self) -> AppResult<Vec<String>> {
        self.store.list_genres().await
    }

    /// One page of the user's favorites or watch-later list
    pub async fn list(
        &self,
        list: UserList,
        page: Option<&str>,
        user: &CurrentUser,
    ) -> AppResult<Vec<UserTitle>> {
        let page = PageRequest::parse(page, self.page_size)?;
        self.store.list_marked(list, page, &user.email).await
    }

    /// Adds a title to one of the user's lists
    pub async fn mark(
        &self,
        list: UserList,
        title_id: Uuid,
        user: &CurrentUser,
    ) -> AppResult<MessageResponse> {
        if !self.store.title_exists(title_id).await? {
            return Err(AppError::NotFound(format!("Title {} not found", title_id)));
        }

        let outcome = self.store.add_mark(list, title_id, &user.email).await?;

        tracing::info!(
            list = ?list,
            title_id = %title_id,
            outcome = ?outcome,
            "Title marked"
        );

        Ok(MessageResponse::new(mark_message(list, outcome)))
    }

    /// Removes a title from one of the user's lists. Removing an absent title succeeds.
    pub async fn unmark(
        &self,
        list: UserList,
        title_id: Uuid,
        user: &CurrentUser,
    ) -> AppResult<MessageResponse> {
        let removed = self.store.remove_mark(list, title_id, &user.email).await?;

        tracing::info!(list = ?list, title_id = %title_id, removed, "Title unmarked");

        Ok(MessageResponse::new(unmark_message(list)))
    }

    /// One page of the user's activity feed
    pub async fn activities(
        &self,
        page: Option<&str>,
        user: &CurrentUser,
    ) -> AppResult<Vec<Activity>> {
        let page = PageRequest::parse(page, self.activity_page_size)?;
        self.store.list_activities(page, &user.email).await
    }
}

fn mark_message(list: UserList, outcome: MarkOutcome) -> &'static str {
    match (list, outcome) {
        (UserList::Favorites, MarkOutcome::Added) => "Favorite Added",
        (UserList::Favorites, MarkOutcome::AlreadyPresent) => "Already favorited",
        (UserList::WatchLater, MarkOutcome::Added) => "Watch Later Added",
        (UserList::WatchLater, MarkOutcome::AlreadyPresent) => "Already in watch later",
    }
}

fn unmark_message(list: UserList) -> &'static str {
    match list {
        UserList::Favorites => "Favorite removed",
        UserList::WatchLater => "Watch later removed",
    }
}
