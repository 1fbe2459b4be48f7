mod common;

use common::{seed_events, seeded_engine, NYC};
use engine::query::{parse_date, parse_distance_km};
use engine::{BoundingBox, Engine, EngineError, GeoPoint, Query, SortMode};
use std::collections::HashSet;

fn ids(resp: &engine::SearchResponse) -> Vec<String> {
    resp.events.iter().map(|h| h.event.id.clone()).collect()
}

#[test]
fn empty_query_pages_through_whole_corpus() {
    let engine = seeded_engine();
    let page = |n| engine.search(&Query::default().with_page(n, 20)).unwrap();

    let p1 = page(1);
    let p2 = page(2);
    let p3 = page(3);
    let p4 = page(4);
    assert_eq!(p1.total, 42);
    assert_eq!(p1.events.len(), 20);
    assert_eq!(p2.events.len(), 20);
    assert_eq!(p3.events.len(), 2);
    assert!(p4.events.is_empty());
    assert_eq!(p4.total, 42);

    let mut all = ids(&p1);
    all.extend(ids(&p2));
    all.extend(ids(&p3));
    let unique: HashSet<&String> = all.iter().collect();
    assert_eq!(unique.len(), 42);

    let whole = engine.search(&Query::default().with_page(1, 42)).unwrap();
    assert_eq!(ids(&whole), all);
    assert!(whole.events.iter().all(|h| h.score == 0.0));
    // match-all relevance ties fall back to date
    assert_eq!(whole.events[0].event.id, "evt-001");
    assert_eq!(whole.events[1].event.id, "evt-015");
}

#[test]
fn sports_near_new_york_under_100() {
    let engine = seeded_engine();
    let q = Query::default()
        .with_category("Sports")
        .with_price_max(100.0)
        .with_origin(NYC, Some(parse_distance_km("50km").unwrap()));
    let resp = engine.search(&q).unwrap();

    assert_eq!(ids(&resp), vec!["evt-003"]);
    let hit = &resp.events[0];
    assert_eq!(hit.event.date, parse_date("2026-06-20").unwrap());
    let d = hit.distance.unwrap();
    assert!((d - 14.62).abs() < 0.5, "distance {d}");
    for h in &resp.events {
        assert_eq!(h.event.category, "Sports");
        assert!(h.event.price <= 100.0);
        assert!(h.distance.unwrap() <= 50.0);
    }
}

#[test]
fn origin_without_radius_uses_default() {
    let engine = seeded_engine();
    let resp = engine.search(&Query::default().with_origin(NYC, None)).unwrap();
    assert_eq!(resp.total, 5);
}

#[test]
fn bounding_box_around_new_york() {
    let engine = seeded_engine();
    let bbox = BoundingBox::from_edges(Some(42.0), Some(39.0), Some(-75.0), Some(-72.0)).unwrap();
    let resp = engine.search_within_box(&bbox, None).unwrap();
    let got: Vec<&str> = resp.events.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(got, vec!["evt-001", "evt-002", "evt-003", "evt-004", "evt-005"]);
    assert_eq!(resp.total, 5);
    assert!(resp.events.iter().all(|e| e.city != "Los Angeles"));

    let sports = engine.search_within_box(&bbox, Some("Sports")).unwrap();
    assert_eq!(sports.total, 1);
    assert_eq!(sports.events[0].id, "evt-003");
}

#[test]
fn map_results_are_capped_but_total_is_not() {
    let mut config = engine::EngineConfig::default();
    config.map_result_cap = 3;
    let engine = Engine::new(config);
    engine.load(seed_events()).unwrap();
    let world = BoundingBox::from_edges(Some(90.0), Some(-90.0), Some(-180.0), Some(180.0)).unwrap();
    let resp = engine.search_within_box(&world, None).unwrap();
    assert_eq!(resp.total, 42);
    assert_eq!(resp.events.len(), 3);
}

#[test]
fn distance_sort_orders_by_distance_and_breaks_ties_by_id() {
    let engine = seeded_engine();
    let q = Query::default().with_origin(NYC, Some(50.0)).with_sort(SortMode::Distance);
    let resp = engine.search(&q).unwrap();
    assert_eq!(resp.sort, SortMode::Distance);
    assert_eq!(ids(&resp), vec!["evt-002", "evt-005", "evt-001", "evt-004", "evt-003"]);
}

#[test]
fn distance_sort_without_origin_falls_back_to_relevance() {
    let engine = seeded_engine();
    let relevance = engine.search(&Query::text("music festival")).unwrap();
    let distance = engine
        .search(&Query::text("music festival").with_sort(SortMode::Distance))
        .unwrap();
    assert_eq!(distance.sort, SortMode::Relevance);
    assert_eq!(ids(&distance), ids(&relevance));
    assert!(distance.events.iter().all(|h| h.distance.is_none()));
}

#[test]
fn unknown_sort_name_behaves_like_relevance() {
    let engine = seeded_engine();
    let q = Query::text("tech").with_sort(SortMode::parse("loudest"));
    let resp = engine.search(&q).unwrap();
    assert_eq!(resp.sort, SortMode::Relevance);
    assert_eq!(ids(&resp), ids(&engine.search(&Query::text("tech")).unwrap()));
}

#[test]
fn relevance_ties_break_by_date() {
    let engine = seeded_engine();
    let resp = engine.search(&Query::text("sydney")).unwrap();
    assert_eq!(ids(&resp), vec!["evt-041", "evt-042"]);
    assert_eq!(resp.events[0].score, resp.events[1].score);
}

#[test]
fn price_and_popularity_sorts() {
    let engine = seeded_engine();
    let by_price = engine
        .search(&Query::default().with_category("Festival").with_sort(SortMode::Price))
        .unwrap();
    assert_eq!(&ids(&by_price)[..5], &["evt-021", "evt-026", "evt-034", "evt-042", "evt-015"]);

    let by_pop = engine.search(&Query::default().with_sort(SortMode::Popularity)).unwrap();
    assert_eq!(&ids(&by_pop)[..3], &["evt-026", "evt-042", "evt-021"]);
}

#[test]
fn date_range_filter() {
    let engine = seeded_engine();
    let q = Query::default().with_dates(Some(parse_date("2026-01-01").unwrap()), Some(parse_date("2026-01-31").unwrap()));
    let resp = engine.search(&q).unwrap();
    assert_eq!(ids(&resp), vec!["evt-041"]);

    let open_ended = Query::default().with_dates(Some(parse_date("2026-10-12").unwrap()), None);
    assert_eq!(ids(&engine.search(&open_ended).unwrap()), vec!["evt-005"]);
}

#[test]
fn city_and_country_filters() {
    let engine = seeded_engine();
    let japan = engine.search(&Query::default().with_country("Japan")).unwrap();
    assert_eq!(japan.total, 3);
    let la_sports = engine
        .search(&Query::default().with_city("Los Angeles").with_category("Sports"))
        .unwrap();
    assert_eq!(ids(&la_sports), vec!["evt-008"]);
}

#[test]
fn every_title_finds_its_event() {
    let engine = seeded_engine();
    for ev in seed_events() {
        let resp = engine.search(&Query::text(ev.title.clone()).with_page(1, 50)).unwrap();
        let hit = resp
            .events
            .iter()
            .find(|h| h.event.id == ev.id)
            .unwrap_or_else(|| panic!("{} not found by its title", ev.id));
        assert!(hit.score > 0.0);
    }
}

#[test]
fn fuzzy_match_and_highlight() {
    let engine = seeded_engine();
    let resp = engine.search(&Query::text("Yankes")).unwrap();
    assert_eq!(resp.events[0].event.id, "evt-003");
    let hit = &resp.events[0];
    assert_eq!(hit.display_title, "<em>Yankees</em> vs Red Sox");
    let hl = hit.highlight.as_ref().unwrap();
    assert!(hl.description.as_ref().unwrap().contains("<em>Yankees</em>"));
}

#[test]
fn unhighlighted_fields_fall_back_to_raw_values() {
    let engine = seeded_engine();
    let resp = engine.search(&Query::text("baseball")).unwrap();
    let hit = &resp.events[0];
    assert_eq!(hit.event.id, "evt-003");
    assert_eq!(hit.display_title, hit.event.title);
    assert_eq!(hit.display_description, "Don't miss this epic <em>baseball</em> showdown.");
    assert!(hit.highlight.as_ref().unwrap().title.is_none());
}

#[test]
fn distance_is_attached_whatever_the_sort() {
    let engine = seeded_engine();
    let q = Query::default().with_origin(NYC, Some(50.0)).with_sort(SortMode::Date);
    let resp = engine.search(&q).unwrap();
    assert_eq!(resp.events.len(), 5);
    for h in &resp.events {
        let d = h.distance.unwrap();
        assert_eq!(d, (d * 100.0).round() / 100.0);
    }
}

#[test]
fn identical_queries_serialize_identically() {
    let engine = seeded_engine();
    let q = Query::text("festival music").with_origin(GeoPoint::new(48.8566, 2.3522), Some(2000.0));
    let a = serde_json::to_string(&engine.search(&q).unwrap()).unwrap();
    let b = serde_json::to_string(&engine.search(&q).unwrap()).unwrap();
    assert_eq!(a, b);
}

#[test]
fn unknown_category_is_empty_not_an_error() {
    let engine = seeded_engine();
    let resp = engine.search(&Query::default().with_category("Opera")).unwrap();
    assert_eq!(resp.total, 0);
    assert!(resp.events.is_empty());
}

#[test]
fn text_with_no_matches_is_empty() {
    let engine = seeded_engine();
    let resp = engine.search(&Query::text("xylophonequartet")).unwrap();
    assert_eq!(resp.total, 0);
}

#[test]
fn categories_and_stats() {
    let engine = seeded_engine();
    let cats: Vec<(String, usize)> = engine
        .list_categories()
        .unwrap()
        .into_iter()
        .map(|c| (c.name, c.count))
        .collect();
    assert_eq!(
        cats,
        vec![
            ("Festival".to_string(), 13),
            ("Music".to_string(), 11),
            ("Conference".to_string(), 8),
            ("Sports".to_string(), 8),
            ("Theater".to_string(), 2),
        ]
    );

    let stats = engine.stats_overview().unwrap();
    assert_eq!(stats.total, 42);
    assert_eq!(stats.avg_price, 323.26);
    let cities: Vec<&str> = stats.top_cities.iter().take(4).map(|c| c.name.as_str()).collect();
    assert_eq!(cities, vec!["New York", "San Francisco", "Chicago", "London"]);
    assert_eq!(stats.top_categories.len(), 5);
}

#[test]
fn get_by_id() {
    let engine = seeded_engine();
    assert_eq!(engine.get_by_id("evt-027").unwrap().title, "Tokyo Marathon");
    assert_eq!(engine.get_by_id("evt-999"), Err(EngineError::NotFound("evt-999".into())));
}

#[test]
fn nothing_loaded_is_distinct_from_not_found() {
    let engine = Engine::default();
    assert!(!engine.is_loaded());
    assert_eq!(engine.search(&Query::default()), Err(EngineError::IndexUnavailable));
    assert_eq!(engine.get_by_id("evt-001"), Err(EngineError::IndexUnavailable));
    assert_eq!(engine.list_categories(), Err(EngineError::IndexUnavailable));
    assert_eq!(engine.stats_overview(), Err(EngineError::IndexUnavailable));
}

#[test]
fn validation_happens_before_index_lookup() {
    let engine = Engine::default();
    let bad = Query::default().with_origin(GeoPoint::new(95.0, 0.0), None);
    assert!(matches!(engine.search(&bad), Err(EngineError::Validation(_))));
    let bad_box = BoundingBox { top_lat: 10.0, bottom_lat: 0.0, left_lon: 0.0, right_lon: 200.0 };
    assert!(matches!(engine.search_within_box(&bad_box, None), Err(EngineError::Validation(_))));
}

#[test]
fn empty_corpus_is_loaded_but_empty() {
    let engine = Engine::default();
    assert_eq!(engine.load(Vec::new()).unwrap(), 0);
    let resp = engine.search(&Query::default()).unwrap();
    assert_eq!(resp.total, 0);
    assert_eq!(engine.stats_overview().unwrap().avg_price, 0.0);
}
