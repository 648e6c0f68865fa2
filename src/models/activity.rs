use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};
use uuid::Uuid;

/// Kind of action recorded in the activity feed
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityKind {
    Favorited,
    WatchLater,
}

impl ActivityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityKind::Favorited => "FAVORITED",
            ActivityKind::WatchLater => "WATCH_LATER",
        }
    }
}

impl Display for ActivityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FAVORITED" => Ok(ActivityKind::Favorited),
            "WATCH_LATER" => Ok(ActivityKind::WatchLater),
            other => Err(format!("unknown activity kind: {}", other)),
        }
    }
}

/// One entry of a user's activity feed
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Activity {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub activity: ActivityKind,
    /// Name of the title the action was taken on
    pub title: String,
}

/// The two per-user title lists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserList {
    Favorites,
    WatchLater,
}

impl UserList {
    /// Activity recorded when a title is added to this list
    pub fn activity(&self) -> ActivityKind {
        match self {
            UserList::Favorites => ActivityKind::Favorited,
            UserList::WatchLater => ActivityKind::WatchLater,
        }
    }

    /// Backing table name
    pub fn table(&self) -> &'static str {
        match self {
            UserList::Favorites => "favorites",
            UserList::WatchLater => "watchlater",
        }
    }
}

/// Result of adding a title to a user list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkOutcome {
    Added,
    AlreadyPresent,
}
