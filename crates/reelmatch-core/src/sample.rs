//! Small built-in catalogue so the tools work without any data file.
use serde_json::json;

use crate::source::MemorySource;

pub fn sample_catalogue() -> MemorySource {
    let rows = vec![
        json!({
            "id": "155", "title": "The Dark Knight", "genres": "Action Crime Drama",
            "overview": "Batman fights Joker",
            "vote_average": 8.5, "vote_count": 30000, "year": 2008, "type": "movie"
        }),
        json!({
            "id": "27205", "title": "Inception", "genres": "Action Adventure Sci-Fi",
            "overview": "Dreams within dreams",
            "vote_average": 8.4, "vote_count": 34000, "year": 2010, "type": "movie"
        }),
        json!({
            "id": "862", "title": "Toy Story", "genres": "Animation Adventure Comedy",
            "overview": "Toys come to life",
            "vote_average": 8.0, "vote_count": 17000, "year": 1995, "type": "movie"
        }),
        json!({
            "id": "12", "title": "Finding Nemo", "genres": "Animation Adventure Comedy",
            "overview": "Fish finds son",
            "vote_average": 7.8, "vote_count": 18000, "year": 2003, "type": "movie"
        }),
        json!({
            "id": "157336", "title": "Interstellar", "genres": "Adventure Drama Sci-Fi",
            "overview": "Space exploration and time",
            "vote_average": 8.4, "vote_count": 33000, "year": 2014, "type": "movie"
        }),
        json!({
            "id": "603", "title": "The Matrix", "genres": "Action Sci-Fi",
            "overview": "A hacker learns reality is a simulation",
            "vote_average": 8.2, "vote_count": 24000, "year": 1999, "type": "movie"
        }),
        json!({
            "id": "1396", "title": "Breaking Bad", "genres": "Crime Drama",
            "overview": "A chemistry teacher turns to making drugs",
            "vote_average": 8.9, "vote_count": 13000, "year": 2008, "type": "tv"
        }),
        json!({
            "id": "1399", "title": "Game of Thrones", "genres": "Adventure Drama Fantasy",
            "overview": "Noble families fight for the Iron Throne",
            "vote_average": 8.4, "vote_count": 22000, "year": 2011, "type": "tv"
        }),
        json!({
            "id": "585", "title": "Monsters, Inc.", "genres": "Animation Comedy Family",
            "overview": "Monsters scare children to power their city",
            "vote_average": 7.8, "vote_count": 18500, "year": 2001, "type": "movie"
        }),
        json!({
            "id": "66732", "title": "Stranger Things", "genres": "Drama Fantasy Sci-Fi",
            "overview": "Kids face a monster and secret experiments",
            "vote_average": 8.6, "vote_count": 16000, "year": 2016, "type": "tv"
        }),
    ];
    MemorySource::from_values("sample", rows).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::TableSource;

    #[test]
    fn sample_has_every_default_column() {
        let table = sample_catalogue().read().expect("read");
        assert_eq!(table.len(), 10);
        for col in ["id", "title", "genres", "overview", "vote_count", "year", "type"] {
            assert!(table.has_column(col), "missing {col}");
        }
    }
}
