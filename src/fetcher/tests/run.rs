use super::*;
use std::time::{Duration, Instant};

/// Empty listing for every April 2008 day
async fn mount_empty_april(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path_regex(r"^/components/game/mlb/year_2008/month_04/day_\d{2}/$"))
        .respond_with(ResponseTemplate::new(200).set_body_string(day_listing(&[])))
        .mount(server)
        .await;
}

fn april(first: u32, last: u32) -> DateRange {
    DateRange::new(day(2008, 4, first), day(2008, 4, last)).unwrap()
}

#[tokio::test]
async fn run_fetches_every_day_in_range() {
    let server = MockServer::start().await;
    let temp_dir = tempdir().unwrap();
    mount_empty_april(&server).await;

    let fetcher = create_test_fetcher(&server, temp_dir.path());
    let summary = fetcher.run(april(1, 3)).await;

    assert_eq!(summary.days_submitted, 3);
    assert_eq!(summary.days_completed, 3);
    assert_eq!(summary.days_failed, 0);
    for d in 1..=3 {
        assert!(day(2008, 4, d).local_dir(temp_dir.path()).is_dir());
    }
}

#[tokio::test]
async fn failing_day_does_not_affect_the_others() {
    let server = MockServer::start().await;
    let temp_dir = tempdir().unwrap();
    mount_empty_april(&server).await;

    // A plain file where day_02 should be created
    let month_dir = temp_dir.path().join("year_2008/month_04");
    std::fs::create_dir_all(&month_dir).unwrap();
    std::fs::write(month_dir.join("day_02"), b"blocker").unwrap();

    let fetcher = create_test_fetcher(&server, temp_dir.path());
    let mut rx = fetcher.subscribe();
    let summary = fetcher.run(april(1, 3)).await;

    assert_eq!(summary.days_submitted, 3);
    assert_eq!(summary.days_completed, 2);
    assert_eq!(summary.days_failed, 1);

    let failed: Vec<DateDescriptor> = drain_events(&mut rx)
        .into_iter()
        .filter_map(|e| match e {
            Event::DayFailed { date, .. } => Some(date),
            _ => None,
        })
        .collect();
    assert_eq!(failed, vec![day(2008, 4, 2)]);
}

#[tokio::test]
async fn run_after_shutdown_rejects_every_day() {
    let server = MockServer::start().await;
    let temp_dir = tempdir().unwrap();
    mount_empty_april(&server).await;

    let fetcher = create_test_fetcher(&server, temp_dir.path());
    fetcher.shutdown();
    let summary = fetcher.run(april(1, 5)).await;

    assert_eq!(summary.days_submitted, 0);
    assert_eq!(summary.days_rejected, 5);
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn worker_limit_bounds_parallel_days() {
    let server = MockServer::start().await;
    let temp_dir = tempdir().unwrap();
    Mock::given(method("GET"))
        .and(path_regex(r"^/components/game/mlb/year_2008/month_04/day_\d{2}/$"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(day_listing(&[]))
                .set_delay(Duration::from_millis(200)),
        )
        .mount(&server)
        .await;

    let mut config = test_config(&server, temp_dir.path());
    config.max_concurrent_days = 2;
    let fetcher = GamedayFetcher::new(config).unwrap();

    let mut rx = fetcher.subscribe();
    let start = Instant::now();
    let summary = fetcher.run(april(1, 4)).await;
    let elapsed = start.elapsed();

    assert_eq!(summary.days_completed, 4);
    // Four 200ms days through two workers take at least two rounds
    assert!(elapsed >= Duration::from_millis(400), "took {elapsed:?}");
    assert_eq!(peak_days_in_flight(&drain_events(&mut rx)), 2);
}

/// Highest number of days between DayStarted and DayFinished at any point
fn peak_days_in_flight(events: &[Event]) -> usize {
    let (mut current, mut peak) = (0usize, 0usize);
    for event in events {
        match event {
            Event::DayStarted { .. } => {
                current += 1;
                peak = peak.max(current);
            }
            Event::DayFinished { .. } => current -= 1,
            _ => {}
        }
    }
    peak
}

#[tokio::test]
async fn entity_shared_across_parallel_days_is_downloaded_once() {
    let server = MockServer::start().await;
    let temp_dir = tempdir().unwrap();
    let (d1, d2) = (day(2008, 4, 1), day(2008, 4, 2));
    let (g1, g2) = ("gid_2008_04_01_bosmlb_oakmlb_1", "gid_2008_04_02_bosmlb_oakmlb_1");

    mount_day(&server, d1, &[g1]).await;
    mount_day(&server, d2, &[g2]).await;
    mount_game(&server, d1, g1, &[111], &[201]).await;
    mount_game(&server, d2, g2, &[111], &[202]).await;

    let fetcher = create_test_fetcher(&server, temp_dir.path());
    let summary = fetcher.run(april(1, 2)).await;

    assert_eq!(summary.days_completed, 2);
    assert_eq!(summary.games_completed, 2);
    assert_eq!(summary.entities_downloaded, 3);
    assert_eq!(summary.entities_skipped, 1);
    assert_eq!(requests_ending_with(&server, "/pitchers/111.xml").await, 1);

    let written = walkdir::WalkDir::new(temp_dir.path())
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name() == "111.xml")
        .count();
    assert_eq!(written, 1);
}

#[tokio::test]
async fn second_run_skips_finished_days() {
    let server = MockServer::start().await;
    let temp_dir = tempdir().unwrap();
    mount_empty_april(&server).await;

    let fetcher = create_test_fetcher(&server, temp_dir.path());
    fetcher.run(april(1, 3)).await;
    let before = server.received_requests().await.unwrap().len();

    let summary = fetcher.run(april(1, 3)).await;
    assert_eq!(summary.days_skipped, 3);
    assert_eq!(server.received_requests().await.unwrap().len(), before);
}

#[tokio::test]
async fn shutdown_during_run_cancels_waiting_and_in_flight_days() {
    let server = MockServer::start().await;
    let temp_dir = tempdir().unwrap();
    Mock::given(method("GET"))
        .and(path_regex(r"^/components/game/mlb/year_2008/month_04/day_\d{2}/$"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(day_listing(&[]))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let mut config = test_config(&server, temp_dir.path());
    config.max_concurrent_days = 1;
    let fetcher = GamedayFetcher::new(config).unwrap();

    let handle = tokio::spawn({
        let fetcher = fetcher.clone();
        async move { fetcher.run(april(1, 2)).await }
    });
    tokio::time::sleep(Duration::from_millis(200)).await;

    let start = Instant::now();
    fetcher.shutdown();
    let summary = handle.await.unwrap();

    assert!(start.elapsed() < Duration::from_secs(1));
    assert_eq!(summary.days_submitted, 2);
    assert_eq!(summary.days_failed, 2);
}

#[tokio::test]
async fn run_emits_queue_finish_and_complete_events() {
    let server = MockServer::start().await;
    let temp_dir = tempdir().unwrap();
    mount_empty_april(&server).await;

    let fetcher = create_test_fetcher(&server, temp_dir.path());
    let mut rx = fetcher.subscribe();
    let summary = fetcher.run(april(1, 2)).await;

    let events = drain_events(&mut rx);
    let queued = events
        .iter()
        .filter(|e| matches!(e, Event::DayQueued { .. }))
        .count();
    let finished = events
        .iter()
        .filter(|e| matches!(e, Event::DayFinished { .. }))
        .count();
    assert_eq!(queued, 2);
    assert_eq!(finished, 2);
    match events.last() {
        Some(Event::RunComplete { summary: emitted }) => assert_eq!(emitted, &summary),
        other => panic!("expected RunComplete last, got {other:?}"),
    }
}

#[tokio::test]
async fn refused_connection_on_one_day_leaves_other_days_complete() {
    let server = MockServer::start().await;
    let temp_dir = tempdir().unwrap();
    let (d1, d2) = (day(2008, 4, 1), day(2008, 4, 2));
    let (g1, g2) = ("gid_2008_04_01_bosmlb_oakmlb_1", "gid_2008_04_02_bosmlb_oakmlb_1");

    mount_day(&server, d1, &[g1]).await;
    mount_day(&server, d2, &[g2]).await;
    let listing = index_page(&[(
        format!("{}/batters/444.xml", refused_url()),
        "444.xml".to_string(),
    )]);
    Mock::given(method("GET"))
        .and(path(format!("{}batters/", game_path(d1, g1))))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing))
        .with_priority(1)
        .mount(&server)
        .await;
    mount_game(&server, d1, g1, &[111], &[]).await;
    mount_game(&server, d2, g2, &[112], &[222]).await;

    let fetcher = create_test_fetcher(&server, temp_dir.path());
    let summary = fetcher.run(april(1, 2)).await;

    assert_eq!(summary.days_incomplete, 1);
    assert_eq!(summary.days_completed, 1);
    assert_eq!(summary.days_failed, 0);
    assert_eq!(summary.games_failed, 1);
    assert!(d2.local_dir(temp_dir.path()).join(g2).join("222.xml").exists());
}
