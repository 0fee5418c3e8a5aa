use crate::error::{ClientError, Result};
use crate::map::MapSurface;
use crate::session::{Refresh, Session};

pub const EMPTY_QUERY: &str = "Enter an ID or a city!";
pub const ID_NOT_FOUND: &str = "No distributor found with this ID";

/// How a search box entry is looked up.
///
/// The split is purely textual: anything that reads as a finite number is an
/// identifier, so a city whose name is all digits cannot be searched for.
/// "Number" means Rust float syntax: hex (`0x10`) and spelled-out infinity
/// (`Infinity`) are not numbers here and go to the city lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchQuery {
    /// Numeric text, passed to the id endpoint as typed
    Identifier(String),
    /// Substring of a city name
    City(String),
}

impl SearchQuery {
    pub fn classify(text: &str) -> Result<Self> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(ClientError::usage(EMPTY_QUERY));
        }

        if trimmed.parse::<f64>().is_ok_and(f64::is_finite) {
            Ok(SearchQuery::Identifier(trimmed.to_string()))
        } else {
            Ok(SearchQuery::City(trimmed.to_string()))
        }
    }
}

impl<M: MapSurface> Session<M> {
    /// Look up distributors by id or by city and show what was found.
    ///
    /// Makes exactly one request and changes the map at most once. A missing
    /// id or a server error leaves the map untouched.
    pub async fn search(&self, text: &str) -> Result<Refresh> {
        let result = self.try_search(text).await;
        self.report(result)
    }

    async fn try_search(&self, text: &str) -> Result<Refresh> {
        let query = SearchQuery::classify(text)?;
        let generation = self.next_generation();

        match query {
            SearchQuery::Identifier(id) => {
                tracing::debug!("Looking up distributor {}", id);
                match self.api().get_by_id(&id).await? {
                    Some(record) => Ok(self.render(generation, std::slice::from_ref(&record)).await),
                    None => Err(ClientError::NotFound(ID_NOT_FOUND.to_string())),
                }
            }
            SearchQuery::City(city) => {
                tracing::debug!("Searching distributors in '{}'", city);
                let records = self.api().search_city(&city).await?;
                tracing::info!("Search for '{}' matched {} distributors", city, records.len());
                Ok(self.render(generation, &records).await)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::{Notice, NoticeLevel};
    use crate::test_support::{italy, record, session, Call, FakeApi};

    fn seeded() -> std::sync::Arc<FakeApi> {
        FakeApi::with_records(vec![
            record(1, "Milano", 45.4642, 9.19),
            record(2, "Roma", 41.9028, 12.4964),
        ])
    }

    #[test]
    fn test_classify() {
        assert_eq!(SearchQuery::classify("42").unwrap(), SearchQuery::Identifier("42".into()));
        assert_eq!(SearchQuery::classify(" 00123 ").unwrap(), SearchQuery::Identifier("00123".into()));
        assert_eq!(SearchQuery::classify("1.5").unwrap(), SearchQuery::Identifier("1.5".into()));
        assert_eq!(SearchQuery::classify("Roma").unwrap(), SearchQuery::City("Roma".into()));
        assert_eq!(SearchQuery::classify("42 Roma").unwrap(), SearchQuery::City("42 Roma".into()));
        assert_eq!(SearchQuery::classify("NaN").unwrap(), SearchQuery::City("NaN".into()));
        assert_eq!(SearchQuery::classify("inf").unwrap(), SearchQuery::City("inf".into()));
        assert_eq!(SearchQuery::classify("0x10").unwrap(), SearchQuery::City("0x10".into()));
        assert_eq!(SearchQuery::classify("Infinity").unwrap(), SearchQuery::City("Infinity".into()));
    }

    #[test]
    fn test_classify_empty_is_usage_error() {
        let err = SearchQuery::classify("   ").unwrap_err();
        assert!(err.is_usage());
        assert_eq!(err.to_string(), EMPTY_QUERY);
    }

    #[tokio::test]
    async fn test_numeric_text_goes_to_id_lookup() {
        let api = seeded();
        let (session, _) = session(api.clone());

        let refresh = session.search(" 2 ").await.unwrap();

        assert_eq!(refresh, Refresh { records: 1, rendered: true });
        assert_eq!(api.calls(), vec![Call::GetById("2".into())]);
        let ids: Vec<u64> = session
            .with_markers(|set| set.markers().iter().map(|m| m.record().id).collect())
            .await;
        assert_eq!(ids, vec![2]);
    }

    #[tokio::test]
    async fn test_text_goes_to_city_lookup() {
        let api = seeded();
        let (session, _) = session(api.clone());

        session.search("Roma").await.unwrap();

        assert_eq!(api.calls(), vec![Call::SearchCity("Roma".into())]);
        assert_eq!(session.marker_count().await, 1);
    }

    #[tokio::test]
    async fn test_empty_search_makes_no_request() {
        let api = seeded();
        let (session, notices) = session(api.clone());

        assert!(session.search("  ").await.is_err());

        assert!(api.calls().is_empty());
        assert_eq!(notices.notices(), vec![Notice::error(EMPTY_QUERY)]);
    }

    #[tokio::test]
    async fn test_unknown_id_keeps_markers() {
        let api = seeded();
        let (session, notices) = session(api.clone());
        session.load_all().await.unwrap();

        let err = session.search("999").await.unwrap_err();

        assert!(matches!(err, ClientError::NotFound(_)));
        assert_eq!(session.marker_count().await, 2);
        assert_eq!(notices.notices(), vec![Notice::error(ID_NOT_FOUND)]);
    }

    #[tokio::test]
    async fn test_empty_city_result_clears_map_and_keeps_view() {
        let api = seeded();
        let (session, notices) = session(api.clone());
        session.load_all().await.unwrap();
        let view = session.viewport().await;

        api.set_search_reply(Ok(Vec::new()));
        let refresh = session.search("Milano").await.unwrap();

        assert_eq!(refresh.records, 0);
        assert_eq!(session.marker_count().await, 0);
        assert_eq!(session.viewport().await, view);
        assert!(notices.notices().is_empty());
    }

    #[tokio::test]
    async fn test_server_error_is_shown_verbatim() {
        let api = seeded();
        let (session, notices) = session(api.clone());
        session.load_all().await.unwrap();

        api.set_search_reply(Err("Nessun distributore trovato"));
        assert!(session.search("Bolzano").await.is_err());

        assert_eq!(session.marker_count().await, 2);
        let notices = notices.notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, NoticeLevel::Error);
        assert_eq!(notices[0].text, "Nessun distributore trovato");
    }

    #[tokio::test]
    async fn test_search_before_any_load_leaves_initial_view() {
        let (session, _) = session(seeded());
        session.search("999").await.unwrap_err();
        assert_eq!(session.viewport().await, italy());
    }

    #[tokio::test]
    async fn test_stale_search_does_not_overwrite_newer_load() {
        let api = seeded();
        let (session, _) = session(api.clone());
        let (started, release) = api.hold_next_search();

        let searching = {
            let session = session.clone();
            tokio::spawn(async move { session.search("Roma").await })
        };
        started.await.unwrap();

        let loaded = session.load_all().await.unwrap();
        assert!(loaded.rendered);

        release.send(()).unwrap();
        let stale = searching.await.unwrap().unwrap();

        assert_eq!(stale, Refresh { records: 1, rendered: false });
        assert_eq!(session.marker_count().await, 2);
    }
}
