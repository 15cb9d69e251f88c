use super::test_helpers::*;
use super::*;
use crate::config::ResumeMode;
use crate::types::{DateDescriptor, DateRange, DayStatus, EntityId, GameId};
use tempfile::tempdir;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod run;
