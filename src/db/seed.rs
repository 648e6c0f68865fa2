use uuid::Uuid;

use super::CatalogStore;
use crate::{error::AppResult, models::Title};

/// (name, release year, genre, synopsis)
const SAMPLE_CATALOG: &[(&str, i32, &str, &str)] = &[
    ("Alien", 1979, "Horror", "The crew of a towing ship answers a distress call and brings something back aboard."),
    ("Amelie", 2001, "Romance", "A shy Paris waitress quietly rearranges the lives of the people around her."),
    ("Arrival", 2016, "Sci-Fi", "A linguist races to understand visitors whose language reshapes how she sees time."),
    ("Back to the Future", 1985, "Sci-Fi", "A teenager lands thirty years in the past and must get his parents together."),
    ("Casablanca", 1942, "Romance", "A cynical club owner is forced to choose between an old love and a greater cause."),
    ("Die Hard", 1988, "Action", "An off-duty cop is trapped in a skyscraper taken over during a holiday party."),
    ("Fargo", 1996, "Crime", "A pregnant police chief unravels a kidnapping scheme gone badly wrong."),
    ("Get Out", 2017, "Horror", "A weekend visit to his girlfriend's family turns into something far more sinister."),
    ("Groundhog Day", 1993, "Comedy", "A weatherman relives the same small-town day until he gets it right."),
    ("Heat", 1995, "Crime", "A master thief and a relentless detective circle each other across Los Angeles."),
    ("Inception", 2010, "Sci-Fi", "A team of specialists plants an idea inside a sleeping heir's mind."),
    ("Jaws", 1975, "Thriller", "A resort town's police chief hunts the shark terrorizing its beaches."),
    ("Mad Max: Fury Road", 2015, "Action", "Rebels flee across a wasteland with a tyrant's war party in pursuit."),
    ("Moonlight", 2016, "Drama", "Three chapters in the life of a young man growing up in Miami."),
    ("Paddington 2", 2017, "Comedy", "A kind-hearted bear is framed for theft and must clear his name."),
    ("Parasite", 2019, "Thriller", "A struggling family schemes its way into the household of a wealthy one."),
    ("Spirited Away", 2001, "Animation", "A girl trapped in a world of spirits works in a bathhouse to free her parents."),
    ("The Dark Knight", 2008, "Action", "A vigilante faces an agent of chaos who wants to watch the city burn."),
    ("The Godfather", 1972, "Crime", "The aging head of a crime family hands control to his reluctant son."),
    ("The Grand Budapest Hotel", 2014, "Comedy", "A concierge and his lobby boy are caught up in a stolen painting affair."),
    ("The Lord of the Rings: The Fellowship of the Ring", 2001, "Fantasy", "A hobbit sets out to destroy a ring that could doom his world."),
    ("The Matrix", 1999, "Sci-Fi", "A hacker learns that the world he knows is a simulation."),
    ("The Shawshank Redemption", 1994, "Drama", "A banker serving a life sentence finds hope inside prison walls."),
    ("Toy Story", 1995, "Animation", "A cowboy doll feels threatened when a space ranger joins the toy box."),
    ("Up", 2009, "Animation", "A widower ties balloons to his house and flies off with a stowaway scout."),
    ("When Harry Met Sally...", 1989, "Romance", "Two friends spend years arguing about whether men and women can be just friends."),
];

/// Namespace for sample ids so every deployment seeds the same ids
const SAMPLE_ID_BASE: u128 = 0x5eed_0000_0000_4000_8000_0000_0000_0000;

/// Built-in catalog used to bootstrap empty deployments
pub fn sample_catalog() -> Vec<Title> {
    SAMPLE_CATALOG
        .iter()
        .enumerate()
        .map(|(index, (title, released, genre, synopsis))| Title {
            id: Uuid::from_u128(SAMPLE_ID_BASE + index as u128 + 1),
            title: title.to_string(),
            synopsis: synopsis.to_string(),
            released: *released,
            genre: genre.to_string(),
        })
        .collect()
}

/// Inserts the sample catalog when the store holds no titles
pub async fn seed_if_empty(store: &dyn CatalogStore) -> AppResult<u64> {
    let existing = store.count_titles().await?;
    if existing > 0 {
        tracing::info!(existing, "Catalog already populated, skipping seed");
        return Ok(0);
    }

    let inserted = store.insert_titles(&sample_catalog()).await?;
    tracing::info!(inserted, "Seeded sample catalog");
    Ok(inserted)
}
