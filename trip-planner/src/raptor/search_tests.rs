//! End-to-end tests for the Range-Raptor planner.

use super::*;
use super::test_network::{self, EXPECTED_PATH, t};
use crate::domain::{
    AccessEgress, OpeningHours, PatternIndex, StopIndex, Transfer, TransitMode, TripPattern,
    TripSchedule,
};
use crate::transit::{SlackConfig, Timetable, TimetableBuilder, TransitDataProvider};

fn stop(timetable: &Timetable, name: &str) -> StopIndex {
    timetable.stop_index(name).unwrap()
}

fn request(timetable: &Timetable, direction: SearchDirection) -> SearchRequest {
    let time = if direction.is_forward() {
        t("10:00")
    } else {
        t("12:00")
    };
    SearchRequest::new(
        time,
        vec![test_network::access(stop(timetable, "A"))],
        vec![test_network::egress(stop(timetable, "E"))],
    )
    .with_config(SearchConfig {
        direction,
        ..SearchConfig::default()
    })
    .with_costs(test_network::costs(timetable))
}

fn plan(timetable: &Timetable, request: &SearchRequest) -> SearchResult {
    let slack = test_network::slack();
    Planner::new(timetable, &slack).search(request).unwrap()
}

fn describe_all(timetable: &Timetable, result: &SearchResult) -> Vec<String> {
    result
        .paths
        .iter()
        .map(|path| test_network::describe(timetable, path))
        .collect()
}

/// The fixture plus a slow direct line from A to E.
fn with_slow_direct_line() -> Timetable {
    let mut builder = test_network::builder();
    test_network::add_line(&mut builder, "L99", &["A", "E"], &["10:04", "12:05"]);
    builder.build()
}

const SLOW_DIRECT_PATH: &str =
    "Walk 3m ~ A ~ BUS L99 10:04 12:05 ~ E ~ Walk 7m45s [10:00:15 12:13 2h12m45s Tx0 C1 8_658]";

#[test]
fn forward_search_finds_best_path() {
    let timetable = test_network::builder().build();
    let result = plan(&timetable, &request(&timetable, SearchDirection::Forward));

    assert_eq!(describe_all(&timetable, &result), vec![EXPECTED_PATH]);
    assert_eq!(result.no_result, None);
    assert_eq!(result.stats.iterations, 60);

    let path = &result.paths[0];
    assert_eq!(path.c1(), 815_400);
    assert_eq!(path.number_of_transfers(), 2);
    assert_eq!(path.duration(), 7_185);
}

#[test]
fn reverse_search_finds_the_same_path() {
    let timetable = test_network::builder().build();
    let forward = plan(&timetable, &request(&timetable, SearchDirection::Forward));
    let reverse = plan(&timetable, &request(&timetable, SearchDirection::Reverse));

    assert_eq!(describe_all(&timetable, &reverse), vec![EXPECTED_PATH]);
    assert_eq!(forward.paths, reverse.paths);
}

#[test]
fn dominated_direct_line_is_dropped() {
    let timetable = with_slow_direct_line();
    let result = plan(&timetable, &request(&timetable, SearchDirection::Forward));

    assert_eq!(describe_all(&timetable, &result), vec![EXPECTED_PATH]);
}

#[test]
fn transfers_as_destination_criterion_keeps_direct_line() {
    let timetable = with_slow_direct_line();
    let mut request = request(&timetable, SearchDirection::Forward);
    request.config.transfers_as_destination_criterion = true;
    request.config.debug = true;

    let result = plan(&timetable, &request);
    assert_eq!(
        describe_all(&timetable, &result),
        vec![EXPECTED_PATH, SLOW_DIRECT_PATH]
    );
}

#[test]
fn round_limit_cuts_long_paths() {
    let timetable = with_slow_direct_line();
    let mut request = request(&timetable, SearchDirection::Forward);
    request.config.max_transfers = 1;

    let result = plan(&timetable, &request);
    assert_eq!(describe_all(&timetable, &result), vec![SLOW_DIRECT_PATH]);
}

#[test]
fn range_search_keeps_later_cheaper_trip() {
    let mut builder = test_network::builder();
    let stops = vec![
        test_network::stop(&builder, "A"),
        test_network::stop(&builder, "E"),
    ];
    let trips = vec![
        TripSchedule::from_times("L5-1", vec![t("10:10"), t("10:40")]).unwrap(),
        TripSchedule::from_times("L5-2", vec![t("10:30"), t("10:45")]).unwrap(),
    ];
    builder
        .add_pattern(TripPattern::new("L5", TransitMode::Bus, stops, trips).unwrap())
        .unwrap();
    let timetable = builder.build();

    let result = plan(&timetable, &request(&timetable, SearchDirection::Forward));
    let trips: Vec<_> = result
        .paths
        .iter()
        .flat_map(|path| path.transit_legs().map(|leg| leg.trip_id.clone()))
        .collect();
    assert_eq!(trips, vec!["L5-1", "L5-2"]);

    // The walk is moved to just catch the later trip
    assert_eq!(result.paths[1].start_time(), t("10:26:15"));
    assert!(result.paths[1].c1() < result.paths[0].c1());
}

#[test]
fn zero_timeout_fails_fast() {
    let timetable = test_network::builder().build();
    let mut request = request(&timetable, SearchDirection::Forward);
    request.config.timeout_ms = 0;

    let slack = test_network::slack();
    let err = Planner::new(&timetable, &slack).search(&request).unwrap_err();
    assert!(matches!(err, SearchError::Timeout { .. }));
}

/// Wraps a timetable and stalls on every pattern lookup.
struct SlowTimetable {
    inner: Timetable,
    delay: std::time::Duration,
    lookups: std::sync::atomic::AtomicUsize,
}

impl TransitDataProvider for SlowTimetable {
    fn num_stops(&self) -> usize {
        self.inner.num_stops()
    }

    fn num_patterns(&self) -> usize {
        self.inner.num_patterns()
    }

    fn pattern(&self, index: PatternIndex) -> &TripPattern {
        self.lookups.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        std::thread::sleep(self.delay);
        self.inner.pattern(index)
    }

    fn patterns_at(&self, stop: StopIndex) -> &[PatternIndex] {
        self.inner.patterns_at(stop)
    }

    fn transfers_from(&self, stop: StopIndex) -> &[Transfer] {
        self.inner.transfers_from(stop)
    }

    fn transfers_to(&self, stop: StopIndex) -> &[Transfer] {
        self.inner.transfers_to(stop)
    }
}

#[test]
fn timeout_between_rounds() {
    let timetable = SlowTimetable {
        inner: test_network::builder().build(),
        delay: std::time::Duration::from_millis(300),
        lookups: Default::default(),
    };
    // One iteration, so the deadline can only trip inside the round loop
    let mut request = request(&timetable.inner, SearchDirection::Forward);
    request.config.search_window_mins = 1;
    request.config.timeout_ms = 100;
    assert_eq!(request.iteration_times().len(), 1);

    let slack = test_network::slack();
    let err = Planner::new(&timetable, &slack).search(&request).unwrap_err();
    let SearchError::Timeout { elapsed } = err else {
        panic!("expected a timeout, got {err:?}");
    };
    assert!(elapsed >= std::time::Duration::from_millis(300));
    // Round one scanned L11; round two never started
    assert_eq!(
        timetable.lookups.load(std::sync::atomic::Ordering::Relaxed),
        1
    );
}

#[test]
fn no_egress_means_no_access_or_egress() {
    let timetable = test_network::builder().build();
    let mut request = request(&timetable, SearchDirection::Forward);
    request.egress.clear();

    let result = plan(&timetable, &request);
    assert!(result.paths.is_empty());
    assert_eq!(result.no_result, Some(NoResultReason::NoAccessOrEgress));
}

#[test]
fn closed_access_means_no_access_or_egress() {
    let timetable = test_network::builder().build();
    let mut request = request(&timetable, SearchDirection::Forward);
    let hours = OpeningHours::new(t("06:00"), t("07:00")).unwrap();
    request.access = vec![test_network::access(stop(&timetable, "A")).with_opening_hours(hours)];

    let result = plan(&timetable, &request);
    assert_eq!(result.no_result, Some(NoResultReason::NoAccessOrEgress));
    assert_eq!(result.stats.access_arrivals, 0);
}

#[test]
fn isolated_stop_means_no_transit_connection() {
    let mut builder = test_network::builder();
    let isolated = builder.add_stop("F");
    let timetable = builder.build();
    let mut request = request(&timetable, SearchDirection::Forward);
    request.access = vec![AccessEgress::new(isolated, 60, 12_000)];

    let result = plan(&timetable, &request);
    assert_eq!(result.no_result, Some(NoResultReason::NoTransitConnection));
}

#[test]
fn missed_connections_mean_none_within_window() {
    let timetable = test_network::builder().build();
    let mut request = request(&timetable, SearchDirection::Forward);
    request.config.max_transfers = 0;

    let result = plan(&timetable, &request);
    assert_eq!(result.no_result, Some(NoResultReason::NoneWithinSearchWindow));
    assert!(result.stats.boardings > 0);
}

#[test]
fn invalid_requests_rejected() {
    let timetable = test_network::builder().build();
    let slack = SlackConfig::default();
    let planner = Planner::new(&timetable, &slack);

    let mut no_window = request(&timetable, SearchDirection::Forward);
    no_window.config.search_window_mins = 0;
    assert!(matches!(
        planner.search(&no_window),
        Err(SearchError::InvalidRequest(_))
    ));

    let mut unknown_stop = request(&timetable, SearchDirection::Forward);
    unknown_stop.egress = vec![AccessEgress::new(StopIndex(99), 60, 0)];
    assert!(matches!(
        planner.search(&unknown_stop),
        Err(SearchError::InvalidRequest(_))
    ));

    let a = stop(&timetable, "A");
    let too_many = request(&timetable, SearchDirection::Forward)
        .with_pass_through(vec![vec![a]; MAX_PASS_THROUGH_POINTS + 1]);
    assert!(matches!(
        planner.search(&too_many),
        Err(SearchError::InvalidRequest(_))
    ));
}

#[test]
fn huge_search_window_is_rejected() {
    let timetable = test_network::builder().build();
    let slack = test_network::slack();
    let planner = Planner::new(&timetable, &slack);

    for mins in [MAX_SEARCH_WINDOW_MINS + 1, i64::MAX] {
        let mut request = request(&timetable, SearchDirection::Forward);
        request.config.search_window_mins = mins;
        assert!(matches!(
            planner.search(&request),
            Err(SearchError::InvalidRequest(_))
        ));
    }

    let mut widest = request(&timetable, SearchDirection::Forward);
    widest.config.search_window_mins = MAX_SEARCH_WINDOW_MINS;
    widest.config.iteration_step_secs = 1;
    assert!(widest.validate(timetable.num_stops()).is_ok());
    assert_eq!(widest.iteration_times().len(), 48 * 3600);
}

#[test]
fn iteration_times_follow_direction() {
    let timetable = test_network::builder().build();
    let mut forward = request(&timetable, SearchDirection::Forward);
    forward.config.search_window_mins = 3;
    assert_eq!(
        forward.iteration_times(),
        vec![t("10:02"), t("10:01"), t("10:00")]
    );

    let mut reverse = request(&timetable, SearchDirection::Reverse);
    reverse.config.search_window_mins = 3;
    assert_eq!(
        reverse.iteration_times(),
        vec![t("11:58"), t("11:59"), t("12:00")]
    );
}

#[test]
fn pass_through_keeps_slower_path() {
    let mut builder = test_network::builder();
    test_network::add_line(&mut builder, "L98", &["A", "E"], &["10:04", "10:30"]);
    let timetable = builder.build();
    let c = stop(&timetable, "C");

    let fast = plan(&timetable, &request(&timetable, SearchDirection::Forward));
    assert_eq!(fast.paths.len(), 1);
    assert_eq!(fast.paths[0].transit_legs().next().unwrap().line, "L98");

    for direction in [SearchDirection::Forward, SearchDirection::Reverse] {
        let request = request(&timetable, direction).with_pass_through(vec![vec![c]]);
        let result = plan(&timetable, &request);
        assert_eq!(
            describe_all(&timetable, &result),
            vec![EXPECTED_PATH.replace(']', " C2 1]")],
            "{direction:?}"
        );
    }
}

#[test]
fn pass_through_never_visited() {
    let mut builder = test_network::builder();
    let elsewhere = builder.add_stop("Z");
    let timetable = builder.build();

    let request =
        request(&timetable, SearchDirection::Forward).with_pass_through(vec![vec![elsewhere]]);
    let result = plan(&timetable, &request);
    assert!(result.paths.is_empty());
    assert_eq!(result.no_result, Some(NoResultReason::NoneWithinSearchWindow));
}

/// Line P calls at S0, X, S2 and S3, with trips ten minutes apart.
fn via_line() -> Timetable {
    let mut builder = TimetableBuilder::new();
    for name in ["S0", "X", "S2", "S3"] {
        builder.add_stop(name);
    }
    let stops = ["S0", "X", "S2", "S3"]
        .iter()
        .map(|name| test_network::stop(&builder, name))
        .collect();
    let trips = vec![
        TripSchedule::from_times("P-0", vec![t("10:00"), t("10:10"), t("10:20"), t("10:30")])
            .unwrap(),
        TripSchedule::from_times("P-1", vec![t("10:10"), t("10:20"), t("10:30"), t("10:40")])
            .unwrap(),
    ];
    builder
        .add_pattern(TripPattern::new("P", TransitMode::Bus, stops, trips).unwrap())
        .unwrap();
    builder.build()
}

#[test]
fn via_stop_passed_on_board_survives_later_boarding() {
    let timetable = via_line();
    let (s0, x, s2, s3) = (
        stop(&timetable, "S0"),
        stop(&timetable, "X"),
        stop(&timetable, "S2"),
        stop(&timetable, "S3"),
    );
    let request = |access| {
        SearchRequest::new(t("10:05"), access, vec![AccessEgress::new(s3, 60, 0)])
            .with_pass_through(vec![vec![x]])
    };

    let alone = plan(&timetable, &request(vec![AccessEgress::new(s0, 60, 200_000)]));
    let trips: Vec<_> = alone
        .paths
        .iter()
        .flat_map(|path| path.transit_legs().map(|leg| leg.trip_id.as_str()))
        .collect();
    assert_eq!(trips, vec!["P-1"]);
    assert_eq!(alone.paths[0].c2(), Some(1));

    // Boarding the earlier trip at S2 skips X, so it must not replace the
    // ride that already passed X
    let both = plan(
        &timetable,
        &request(vec![
            AccessEgress::new(s0, 60, 200_000),
            AccessEgress::new(s2, 60, 0),
        ]),
    );
    assert_eq!(both.no_result, None);
    assert_eq!(both.paths, alone.paths);
}

#[test]
fn transit_group_priority_keeps_fewer_groups() {
    // L21 and L31 are in group 1; the slow direct line stays in group 0
    let mut builder = TimetableBuilder::new();
    for name in ["A", "B", "C", "D", "E"] {
        builder.add_stop(name);
    }
    let lines = [
        ("L11", ["A", "B"], ["10:04", "10:35"], 0),
        ("L21", ["C", "D"], ["11:00", "11:23"], 1),
        ("L31", ["D", "E"], ["11:40", "11:52"], 1),
        ("L99", ["A", "E"], ["10:04", "12:05"], 0),
    ];
    for (line, stops, times, group) in lines {
        let pattern = test_network::bus_line(&builder, line, &stops, &times)
            .with_transit_group(group)
            .unwrap();
        builder.add_pattern(pattern).unwrap();
    }
    let (b, c) = (
        test_network::stop(&builder, "B"),
        test_network::stop(&builder, "C"),
    );
    builder.add_transfer(b, c, 225, 45_000).unwrap();
    let timetable = builder.build();

    let plain = plan(&timetable, &request(&timetable, SearchDirection::Forward));
    assert_eq!(plain.paths.len(), 1);

    let request = request(&timetable, SearchDirection::Forward).with_transit_group_priority();
    let result = plan(&timetable, &request);
    assert_eq!(
        describe_all(&timetable, &result),
        vec![
            EXPECTED_PATH.replace(']', " C2 3]"),
            SLOW_DIRECT_PATH.replace(']', " C2 1]"),
        ]
    );
}

#[test]
fn max_results_truncates() {
    let timetable = with_slow_direct_line();
    let mut request = request(&timetable, SearchDirection::Forward);
    request.config.transfers_as_destination_criterion = true;
    request.config.max_results = 1;

    let result = plan(&timetable, &request);
    assert_eq!(describe_all(&timetable, &result), vec![EXPECTED_PATH]);
}

mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn shuffled_network(order: &[usize]) -> Timetable {
        let lines: [(&str, &[&str], &[&str]); 5] = [
            ("L11", &["A", "B"], &["10:04", "10:35"]),
            ("L21", &["C", "D"], &["11:00", "11:23"]),
            ("L31", &["D", "E"], &["11:40", "11:52"]),
            ("L99", &["A", "E"], &["10:04", "12:05"]),
            ("L77", &["A", "C", "E"], &["10:20", "10:50", "12:30"]),
        ];
        let mut builder = TimetableBuilder::new();
        for name in ["A", "B", "C", "D", "E"] {
            builder.add_stop(name);
        }
        for &i in order {
            let (line, stops, times) = lines[i];
            test_network::add_line(&mut builder, line, stops, times);
        }
        let (b, c) = (
            test_network::stop(&builder, "B"),
            test_network::stop(&builder, "C"),
        );
        builder.add_transfer(b, c, 225, 45_000).unwrap();
        builder.build()
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        /// Results do not depend on the order patterns are scanned in.
        #[test]
        fn pattern_order_does_not_matter(
            order in Just(vec![0usize, 1, 2, 3, 4]).prop_shuffle(),
            reverse in any::<bool>(),
        ) {
            let direction = if reverse { SearchDirection::Reverse } else { SearchDirection::Forward };

            let baseline = shuffled_network(&[0, 1, 2, 3, 4]);
            let mut base_request = request(&baseline, direction);
            base_request.config.transfers_as_destination_criterion = true;
            let expected = describe_all(&baseline, &plan(&baseline, &base_request));

            let shuffled = shuffled_network(&order);
            let mut request = request(&shuffled, direction);
            request.config.transfers_as_destination_criterion = true;
            let actual = describe_all(&shuffled, &plan(&shuffled, &request));

            prop_assert!(!expected.is_empty());
            prop_assert_eq!(actual, expected);
        }
    }
}
