use chrono::{DateTime, Utc};
use std::collections::{BTreeSet, HashMap, HashSet};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::CatalogStore;
use crate::{
    error::AppResult,
    models::{
        Activity, ActivityKind, MarkOutcome, PageRequest, Title, TitleFilter, UserList, UserTitle,
    },
};

/// Catalog kept in process memory. Nothing survives a restart.
#[derive(Default)]
pub struct MemoryCatalogStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    titles: HashMap<Uuid, Title>,
    users: HashMap<String, UserMarks>,
    /// Append-only, so insertion order is chronological
    activities: Vec<ActivityRecord>,
}

#[derive(Default)]
struct UserMarks {
    favorites: HashSet<Uuid>,
    watch_later: HashSet<Uuid>,
}

impl UserMarks {
    fn get(&self, list: UserList) -> &HashSet<Uuid> {
        match list {
            UserList::Favorites => &self.favorites,
            UserList::WatchLater => &self.watch_later,
        }
    }

    fn get_mut(&mut self, list: UserList) -> &mut HashSet<Uuid> {
        match list {
            UserList::Favorites => &mut self.favorites,
            UserList::WatchLater => &mut self.watch_later,
        }
    }
}

struct ActivityRecord {
    id: Uuid,
    timestamp: DateTime<Utc>,
    activity: ActivityKind,
    title_id: Uuid,
    user: String,
}

impl Inner {
    fn to_user_title(&self, title: &Title, user: &str) -> UserTitle {
        let (favorited, watch_later) = match self.users.get(user) {
            Some(marks) => (
                marks.favorites.contains(&title.id),
                marks.watch_later.contains(&title.id),
            ),
            None => (false, false),
        };
        UserTitle::new(title.clone(), favorited, watch_later)
    }
}

impl MemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl CatalogStore for MemoryCatalogStore {
    async fn list_genres(&self) -> AppResult<Vec<String>> {
        let inner = self.inner.read().await;
        let genres: BTreeSet<&String> = inner.titles.values().map(|t| &t.genre).collect();
        Ok(genres.into_iter().cloned().collect())
    }

    async fn search_titles(
        &self,
        filter: &TitleFilter,
        page: PageRequest,
        user: &str,
    ) -> AppResult<Vec<UserTitle>> {
        let inner = self.inner.read().await;

        let mut matching: Vec<&Title> = inner
            .titles
            .values()
            .filter(|title| filter.matches(title))
            .collect();
        matching.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));

        Ok(page
            .slice(matching)
            .into_iter()
            .map(|title| inner.to_user_title(title, user))
            .collect())
    }

    async fn list_marked(
        &self,
        list: UserList,
        page: PageRequest,
        user: &str,
    ) -> AppResult<Vec<UserTitle>> {
        let inner = self.inner.read().await;
        let Some(marks) = inner.users.get(user) else {
            return Ok(Vec::new());
        };

        let mut marked: Vec<&Title> = marks
            .get(list)
            .iter()
            .filter_map(|id| inner.titles.get(id))
            .collect();
        marked.sort_by(|a, b| {
            a.released
                .cmp(&b.released)
                .then_with(|| a.title.cmp(&b.title))
                .then(a.id.cmp(&b.id))
        });

        Ok(page
            .slice(marked)
            .into_iter()
            .map(|title| inner.to_user_title(title, user))
            .collect())
    }

    async fn title_exists(&self, title_id: Uuid) -> AppResult<bool> {
        Ok(self.inner.read().await.titles.contains_key(&title_id))
    }

    async fn add_mark(
        &self,
        list: UserList,
        title_id: Uuid,
        user: &str,
    ) -> AppResult<MarkOutcome> {
        let mut inner = self.inner.write().await;

        let added = inner
            .users
            .entry(user.to_string())
            .or_default()
            .get_mut(list)
            .insert(title_id);
        if !added {
            return Ok(MarkOutcome::AlreadyPresent);
        }

        inner.activities.push(ActivityRecord {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            activity: list.activity(),
            title_id,
            user: user.to_string(),
        });

        Ok(MarkOutcome::Added)
    }

    async fn remove_mark(&self, list: UserList, title_id: Uuid, user: &str) -> AppResult<bool> {
        let mut inner = self.inner.write().await;
        Ok(inner
            .users
            .get_mut(user)
            .map(|marks| marks.get_mut(list).remove(&title_id))
            .unwrap_or(false))
    }

    async fn list_activities(&self, page: PageRequest, user: &str) -> AppResult<Vec<Activity>> {
        let inner = self.inner.read().await;

        let feed = inner
            .activities
            .iter()
            .rev()
            .filter(|record| record.user == user)
            .filter_map(|record| {
                inner.titles.get(&record.title_id).map(|title| Activity {
                    id: record.id,
                    timestamp: record.timestamp,
                    activity: record.activity,
                    title: title.title.clone(),
                })
            });

        Ok(page.slice(feed))
    }

    async fn count_titles(&self) -> AppResult<i64> {
        Ok(self.inner.read().await.titles.len() as i64)
    }

    async fn insert_titles(&self, titles: &[Title]) -> AppResult<u64> {
        let mut inner = self.inner.write().await;
        let mut inserted = 0;
        for title in titles {
            if !inner.titles.contains_key(&title.id) {
                inner.titles.insert(title.id, title.clone());
                inserted += 1;
            }
        }
        Ok(inserted)
    }
}
