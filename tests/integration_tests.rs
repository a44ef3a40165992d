// Integration tests for the POI recommender

use async_trait::async_trait;
use poi_recommender::core::{distance_meters, has_distinct_categories, RecommendError, RecommendationPipeline};
use poi_recommender::models::{
    Category, Coordinate, GlobalCandidate, LikedCandidate, Locale, Poi, Reason, RecommendationQuery,
    RecommendationType, SocialCandidate,
};
use poi_recommender::services::{CandidateSource, InMemorySource, SourceError};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

const TACO_PLACE: &str = "4bf58dd8d48988d151941735";
const CAFE: &str = "4bf58dd8d48988d16d941735";
const MUSEUM: &str = "4bf58dd8d48988d181941735";
const BAR: &str = "4bf58dd8d48988d116941735";
const MULTIPLEX: &str = "4bf58dd8d48988d180941735";
const DEPARTMENT_STORE: &str = "4bf58dd8d48988d1f6941735";

fn coord(lat: f64, lon: f64) -> Coordinate {
    Coordinate::new(lat, lon).unwrap()
}

fn center() -> Coordinate {
    coord(19.04365, -98.197968)
}

fn category(id: &str) -> Category {
    let name = match id {
        TACO_PLACE => "Taco Place",
        CAFE => "Café",
        MUSEUM => "Museum",
        BAR => "Bar",
        MULTIPLEX => "Multiplex",
        DEPARTMENT_STORE => "Department Store",
        _ => "Other",
    };
    Category::new(id, name, format!("https://ss3.4sqi.net/img/categories_v2/{}_88.png", id))
}

/// Downtown Puebla: two taquerías, a café, a museum and a bar within 800m,
/// a cinema and a department store a few kilometers away
fn puebla() -> InMemorySource {
    InMemorySource::new()
        .with_poi(
            Poi::new("4cdd6a06930af04d92fb9597", "Taquería Los Ángeles", coord(19.04336700060403, -98.19716334342957))
                .with_rating(8.1)
                .with_categories([category(TACO_PLACE)]),
        )
        .with_poi(
            Poi::new("4c3ce8087c1ee21ebd388d71", "Antigua Taquería La Oriental", coord(19.044926274591635, -98.19751471281052))
                .with_rating(8.9)
                .with_categories([category(TACO_PLACE)]),
        )
        .with_poi(
            Poi::new("cafe-gruta", "Café de la Gruta", coord(19.0450, -98.1990))
                .with_rating(7.5)
                .with_categories([category(CAFE)]),
        )
        .with_poi(
            Poi::new("museo-amparo", "Museo Amparo", coord(19.0405, -98.1966))
                .with_rating(9.3)
                .with_categories([category(MUSEUM)]),
        )
        .with_poi(
            Poi::new("bar-taco", "Bar La Pasita", coord(19.0430, -98.1960))
                .with_rating(6.0)
                .with_categories([category(BAR), category(TACO_PLACE)]),
        )
        .with_poi(
            Poi::new("4bad0850f964a52082263be3", "Cinépolis", coord(19.032099226143384, -98.23300838470459))
                .with_rating(9.8)
                .with_categories([category(MULTIPLEX)]),
        )
        .with_poi(
            Poi::new("4c2b7f8257a9c9b6affff567", "Liverpool", coord(19.03174044908608, -98.23100973086046))
                .with_rating(9.0)
                .with_categories([category(DEPARTMENT_STORE)]),
        )
        .with_user("u1", "Daniel", Some("Pedraza"))
        .with_user("u2", "Ana", Some("López"))
        .with_credential("tok-1", "u1")
        .with_like("u1", CAFE)
        .with_like("u1", BAR)
        .with_like("u2", MUSEUM)
        .with_like("u2", TACO_PLACE)
        .with_friendship("u1", "u2")
}

fn names(recommendations: &[poi_recommender::Recommendation]) -> Vec<&str> {
    recommendations.iter().map(|r| r.poi.name.as_str()).collect()
}

#[tokio::test]
async fn test_anonymous_puebla_scenario() {
    let pipeline = RecommendationPipeline::new(Arc::new(puebla()));
    let query = RecommendationQuery::anonymous(center(), 800);

    let result = pipeline.recommend(&query).await.unwrap();

    assert_eq!(
        names(&result),
        vec!["Antigua Taquería La Oriental", "Café de la Gruta", "Museo Amparo"]
    );
    assert!(result.iter().all(|r| r.kind() == RecommendationType::Global));
    assert!(result.iter().all(|r| distance_meters(center(), r.poi.location) <= 800.0));
    assert!(has_distinct_categories(&result));
    for pair in result.windows(2) {
        assert!(distance_meters(center(), pair[0].poi.location) <= distance_meters(center(), pair[1].poi.location));
    }
}

#[tokio::test]
async fn test_personalized_blend() {
    let pipeline = RecommendationPipeline::new(Arc::new(puebla()));
    let query = RecommendationQuery::new(center(), 800, Some("tok-1".to_string()), Locale::En);

    let result = pipeline.recommend(&query).await.unwrap();

    assert_eq!(names(&result), vec!["Café de la Gruta", "Bar La Pasita", "Museo Amparo"]);
    assert_eq!(result[0].reason, Reason::SelfLiked { category: "Café".to_string() });
    // The bar is also a Taco Place, but it was matched through "Bar"
    assert_eq!(result[1].reason, Reason::SelfLiked { category: "Bar".to_string() });
    assert_eq!(
        result[2].reason,
        Reason::Social {
            friend: "Ana López".to_string(),
            category: "Museum".to_string()
        }
    );
    assert!(has_distinct_categories(&result));
    assert!(result.iter().all(|r| !r.poi.categories.is_empty()));
}

#[tokio::test]
async fn test_anonymous_never_personalized() {
    let pipeline = RecommendationPipeline::new(Arc::new(puebla()));

    for radius in [100, 800, 5_000, 20_000] {
        let result = pipeline
            .recommend(&RecommendationQuery::anonymous(center(), radius))
            .await
            .unwrap();
        assert!(result.iter().all(|r| r.kind() == RecommendationType::Global));
    }
}

#[tokio::test]
async fn test_invalid_token_fetches_no_candidates() {
    let source = Arc::new(puebla());
    let pipeline = RecommendationPipeline::new(source.clone());
    let query = RecommendationQuery::new(center(), 800, Some("unknown".to_string()), Locale::En);

    let result = pipeline.recommend(&query).await;

    assert!(matches!(result, Err(RecommendError::InvalidUser)));
    assert_eq!(source.candidate_fetches(), 0);
    assert_eq!(source.category_lookups(), 0);
}

#[tokio::test]
async fn test_locale_does_not_affect_selection() {
    let pipeline = RecommendationPipeline::new(Arc::new(puebla()));

    for token in [None, Some("tok-1".to_string())] {
        let en = RecommendationQuery::new(center(), 800, token.clone(), Locale::En);
        let es = RecommendationQuery::new(center(), 800, token, Locale::Es);

        let en_result = pipeline.recommend(&en).await.unwrap();
        let es_result = pipeline.recommend(&es).await.unwrap();
        assert_eq!(en_result, es_result);
    }
}

#[tokio::test]
async fn test_wide_radius_includes_far_places() {
    let pipeline = RecommendationPipeline::new(Arc::new(puebla()));
    let result = pipeline
        .recommend(&RecommendationQuery::anonymous(center(), 20_000))
        .await
        .unwrap();

    let names = names(&result);
    assert!(names.contains(&"Cinépolis"));
    assert!(names.contains(&"Liverpool"));
    assert_eq!(names.last(), Some(&"Cinépolis"));
}

/// Source returning canned rows, for scenarios the in-memory data can't express
#[derive(Default)]
struct ScriptedSource {
    liked: Vec<LikedCandidate>,
    social: Vec<SocialCandidate>,
    global: Vec<GlobalCandidate>,
    categories: HashMap<String, HashSet<Category>>,
    fail_global: bool,
}

#[async_trait]
impl CandidateSource for ScriptedSource {
    async fn credential_exists(&self, access_token: &str) -> Result<bool, SourceError> {
        Ok(access_token == "valid")
    }

    async fn fetch_global_candidates(&self, _: Coordinate, _: u32) -> Result<Vec<GlobalCandidate>, SourceError> {
        if self.fail_global {
            return Err(SourceError::Unavailable("connection reset".to_string()));
        }
        Ok(self.global.clone())
    }

    async fn fetch_self_candidates(&self, _: &str, _: Coordinate, _: u32) -> Result<Vec<LikedCandidate>, SourceError> {
        Ok(self.liked.clone())
    }

    async fn fetch_social_candidates(&self, _: &str, _: Coordinate, _: u32) -> Result<Vec<SocialCandidate>, SourceError> {
        Ok(self.social.clone())
    }

    async fn fetch_categories_for_poi(&self, poi_id: &str) -> Result<HashSet<Category>, SourceError> {
        Ok(self.categories.get(poi_id).cloned().unwrap_or_default())
    }
}

#[tokio::test]
async fn test_source_priority_beats_distance() {
    // ~50m and ~10m north of the center, same category
    let self_poi = Poi::new("self-50m", "Taquería El Patio", coord(19.04410, -98.197968));
    let global_poi = Poi::new("global-10m", "Tacos Tony", coord(19.04374, -98.197968));

    let taco: HashSet<Category> = [category(TACO_PLACE)].into_iter().collect();
    let source = ScriptedSource {
        liked: vec![LikedCandidate {
            poi: self_poi,
            category: "Taco Place".to_string(),
        }],
        global: vec![GlobalCandidate {
            poi: global_poi,
            rating: 9.9,
        }],
        categories: HashMap::from([
            ("self-50m".to_string(), taco.clone()),
            ("global-10m".to_string(), taco),
        ]),
        ..Default::default()
    };

    let pipeline = RecommendationPipeline::new(Arc::new(source));
    let query = RecommendationQuery::new(center(), 800, Some("valid".to_string()), Locale::En);
    let result = pipeline.recommend(&query).await.unwrap();

    assert!(distance_meters(center(), coord(19.04374, -98.197968)) < 15.0);
    assert!(distance_meters(center(), coord(19.04410, -98.197968)) > 45.0);
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].poi.external_id, "self-50m");
    assert_eq!(result[0].kind(), RecommendationType::SelfLiked);
}

#[tokio::test]
async fn test_source_failure_fails_whole_call() {
    let source = ScriptedSource {
        liked: vec![LikedCandidate {
            poi: Poi::new("l", "Liked", center()),
            category: "Café".to_string(),
        }],
        fail_global: true,
        ..Default::default()
    };

    let pipeline = RecommendationPipeline::new(Arc::new(source));
    let query = RecommendationQuery::new(center(), 800, Some("valid".to_string()), Locale::En);

    let result = pipeline.recommend(&query).await;
    assert!(matches!(result, Err(RecommendError::Source(SourceError::Unavailable(_)))));
}
