//! Shared helpers for fetcher tests: a mock gd2-style remote and test fetchers.

use crate::config::Config;
use crate::fetcher::GamedayFetcher;
use crate::types::{DateDescriptor, Event};
use std::path::Path;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Path of the tree root on the mock server
pub(crate) const BASE_PATH: &str = "/components/game/mlb/";

pub(crate) fn day(y: i32, m: u32, d: u32) -> DateDescriptor {
    DateDescriptor::from_ymd(y, m, d).unwrap()
}

/// Config pointing at `server` and writing below `root`
pub(crate) fn test_config(server: &MockServer, root: &Path) -> Config {
    Config {
        base_url: format!("{}{}", server.uri(), BASE_PATH),
        local_root: root.to_path_buf(),
        max_concurrent_days: 4,
        request_timeout: Some(Duration::from_secs(5)),
        ..Config::default()
    }
}

/// Fetcher with the default test config
pub(crate) fn create_test_fetcher(server: &MockServer, root: &Path) -> GamedayFetcher {
    GamedayFetcher::new(test_config(server, root)).unwrap()
}

/// Server path of a day folder, with trailing slash
pub(crate) fn day_path(date: DateDescriptor) -> String {
    format!("{BASE_PATH}{}/", date.path_segment())
}

/// Server path of a game folder, with trailing slash
pub(crate) fn game_path(date: DateDescriptor, game: &str) -> String {
    format!("{}{game}/", day_path(date))
}

/// Absolute URL of a game folder on `server`
pub(crate) fn game_url(server: &MockServer, date: DateDescriptor, game: &str) -> String {
    format!("{}{}", server.uri(), game_path(date, game))
}

/// Apache-style index page: a parent link followed by one anchor per `(href, text)`
pub(crate) fn index_page(entries: &[(String, String)]) -> String {
    let mut html = String::from(
        "<html><head><title>Index</title></head><body><ul>\n\
         <li><a href=\"../\"> Parent Directory</a></li>\n",
    );
    for (href, text) in entries {
        html.push_str(&format!("<li><a href=\"{href}\"> {text}</a></li>\n"));
    }
    html.push_str("</ul></body></html>\n");
    html
}

/// Day listing naming `games` plus a non-game entry that must be ignored
pub(crate) fn day_listing(games: &[&str]) -> String {
    let mut entries: Vec<(String, String)> = games
        .iter()
        .map(|g| (format!("{g}/"), format!("{g}/")))
        .collect();
    entries.push(("epg.xml".to_string(), "epg.xml".to_string()));
    index_page(&entries)
}

/// Entity listing with one `<id>.xml` anchor per id
pub(crate) fn entity_listing(ids: &[u64]) -> String {
    let entries: Vec<(String, String)> = ids
        .iter()
        .map(|id| (format!("{id}.xml"), format!("{id}.xml")))
        .collect();
    index_page(&entries)
}

pub(crate) fn entity_body(id: u64) -> String {
    format!("<Player id=\"{id}\"/>")
}

pub(crate) fn primary_body(game: &str) -> String {
    format!("<game id=\"{game}\"><inning num=\"1\"/></game>")
}

pub(crate) async fn mount_day(server: &MockServer, date: DateDescriptor, games: &[&str]) {
    Mock::given(method("GET"))
        .and(path(day_path(date)))
        .respond_with(ResponseTemplate::new(200).set_body_string(day_listing(games)))
        .mount(server)
        .await;
}

/// Mount a complete game: primary file, both listings and every entity file
pub(crate) async fn mount_game(
    server: &MockServer,
    date: DateDescriptor,
    game: &str,
    pitchers: &[u64],
    batters: &[u64],
) {
    let base = game_path(date, game);
    Mock::given(method("GET"))
        .and(path(format!("{base}inning/inning_all.xml")))
        .respond_with(ResponseTemplate::new(200).set_body_string(primary_body(game)))
        .mount(server)
        .await;

    for (category, ids) in [("pitchers", pitchers), ("batters", batters)] {
        Mock::given(method("GET"))
            .and(path(format!("{base}{category}/")))
            .respond_with(ResponseTemplate::new(200).set_body_string(entity_listing(ids)))
            .mount(server)
            .await;
        for id in ids {
            Mock::given(method("GET"))
                .and(path(format!("{base}{category}/{id}.xml")))
                .respond_with(ResponseTemplate::new(200).set_body_string(entity_body(*id)))
                .mount(server)
                .await;
        }
    }
}

/// Number of requests the server saw whose path ends with `suffix`
pub(crate) async fn requests_ending_with(server: &MockServer, suffix: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path().ends_with(suffix))
        .count()
}

/// Drain every event currently buffered in `rx`
pub(crate) fn drain_events(rx: &mut tokio::sync::broadcast::Receiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// Serve one response that announces `content_length` bytes, sends `prefix`, then stalls
///
/// Returns the URL to request. The connection stays open until the test ends.
pub(crate) async fn stalling_server(content_length: usize, prefix: &'static [u8]) -> String {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 4096];
        let _ = socket.read(&mut buf).await;
        let head = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: text/xml\r\nContent-Length: {content_length}\r\n\r\n"
        );
        socket.write_all(head.as_bytes()).await.unwrap();
        socket.write_all(prefix).await.unwrap();
        socket.flush().await.unwrap();
        tokio::time::sleep(Duration::from_secs(30)).await;
        drop(socket);
    });
    format!("http://{addr}/inning/inning_all.xml")
}

/// Base URL of a local port nothing listens on
pub(crate) fn refused_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}
