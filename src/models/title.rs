use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A movie in the catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, FromRow)]
pub struct Title {
    pub id: Uuid,
    /// Display name of the movie
    pub title: String,
    pub synopsis: String,
    /// Release year
    pub released: i32,
    pub genre: String,
}

impl Title {
    /// Creates a new title with a fresh id
    pub fn new(title: &str, released: i32, genre: &str, synopsis: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.to_string(),
            synopsis: synopsis.to_string(),
            released,
            genre: genre.to_string(),
        }
    }

    /// Public path of the poster image served next to the app
    pub fn image_path(&self) -> String {
        format!("/images/{}.webp", self.id)
    }
}

/// A title as seen by one user, with that user's list flags
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserTitle {
    pub id: Uuid,
    pub title: String,
    pub synopsis: String,
    pub released: i32,
    pub genre: String,
    pub favorited: bool,
    pub watch_later: bool,
    pub image: String,
}

impl UserTitle {
    pub fn new(title: Title, favorited: bool, watch_later: bool) -> Self {
        let image = title.image_path();
        Self {
            id: title.id,
            title: title.title,
            synopsis: title.synopsis,
            released: title.released,
            genre: title.genre,
            favorited,
            watch_later,
            image,
        }
    }
}

/// Row shape returned by catalog queries that join the per-user flags
#[derive(Debug, FromRow)]
pub struct UserTitleRow {
    pub id: Uuid,
    pub title: String,
    pub synopsis: String,
    pub released: i32,
    pub genre: String,
    pub favorited: bool,
    pub watch_later: bool,
}

impl From<UserTitleRow> for UserTitle {
    fn from(row: UserTitleRow) -> Self {
        let title = Title {
            id: row.id,
            title: row.title,
            synopsis: row.synopsis,
            released: row.released,
            genre: row.genre,
        };
        UserTitle::new(title, row.favorited, row.watch_later)
    }
}
