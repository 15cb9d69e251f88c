//! Mock gd2 server and fetcher construction

use crate::common::fixtures;
use fillbass::{Config, DateDescriptor};
use std::path::Path;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BASE_PATH: &str = "/components/game/mlb/";

/// A wiremock server laid out like the gd2 tree
pub struct GamedayRemote {
    pub server: MockServer,
}

impl GamedayRemote {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Config targeting this server and writing below `root`
    pub fn config(&self, root: &Path) -> Config {
        Config {
            base_url: format!("{}{}", self.server.uri(), BASE_PATH),
            local_root: root.to_path_buf(),
            request_timeout: Some(Duration::from_secs(5)),
            ..Config::default()
        }
    }

    pub fn day_path(date: DateDescriptor) -> String {
        format!("{BASE_PATH}{}/", date.path_segment())
    }

    /// Mount the day index; `expect` pins how often it may be requested
    pub async fn mount_day(&self, date: DateDescriptor, games: &[&str], expect: Option<u64>) {
        let mut mock = Mock::given(method("GET"))
            .and(path(Self::day_path(date)))
            .respond_with(ResponseTemplate::new(200).set_body_string(fixtures::day_index(games)));
        if let Some(n) = expect {
            mock = mock.expect(n);
        }
        mock.mount(&self.server).await;
    }

    pub async fn mount_game(
        &self,
        date: DateDescriptor,
        game: &str,
        pitchers: &[u64],
        batters: &[u64],
    ) {
        let base = format!("{}{game}/", Self::day_path(date));
        Mock::given(method("GET"))
            .and(path(format!("{base}inning/inning_all.xml")))
            .respond_with(ResponseTemplate::new(200).set_body_string(fixtures::inning_all(game)))
            .mount(&self.server)
            .await;

        for (category, ids) in [("pitchers", pitchers), ("batters", batters)] {
            Mock::given(method("GET"))
                .and(path(format!("{base}{category}/")))
                .respond_with(
                    ResponseTemplate::new(200).set_body_string(fixtures::entity_index(ids)),
                )
                .mount(&self.server)
                .await;
            for id in ids {
                Mock::given(method("GET"))
                    .and(path(format!("{base}{category}/{id}.xml")))
                    .respond_with(ResponseTemplate::new(200).set_body_string(fixtures::player(*id)))
                    .mount(&self.server)
                    .await;
            }
        }
    }

    pub async fn request_count(&self) -> usize {
        self.server
            .received_requests()
            .await
            .map(|r| r.len())
            .unwrap_or(0)
    }
}
