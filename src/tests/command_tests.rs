//! Command actions and argument parsing.

use crate::{execute, split_line, Cli, Command};
use clap::Parser;
use serde_json::json;
use ukc_lib::{config::Config, noaa::NoaaClient, UkcError};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn parse(line: &str) -> Result<Cli, clap::Error> {
    Cli::try_parse_from(std::iter::once("ukc-calculator".to_string()).chain(split_line(line)))
}

/// Client whose endpoints nothing listens on; only for offline actions.
fn offline_client() -> NoaaClient {
    let mut config = Config::default();
    config.api.metadata_url = "http://127.0.0.1:9".to_string();
    config.api.datagetter_url = "http://127.0.0.1:9/datagetter".to_string();
    NoaaClient::new(config).unwrap()
}

async fn mock_predictions() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/datagetter"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "predictions": [
                { "t": "2024-06-16 03:00", "v": "3.000", "type": "H" },
                { "t": "2024-06-16 09:00", "v": "1.000", "type": "L" },
                { "t": "2024-06-16 15:00", "v": "2.800", "type": "H" }
            ]
        })))
        .mount(&server)
        .await;
    server
}

fn client_for(server: &MockServer) -> NoaaClient {
    let mut config = Config::default();
    config.api.metadata_url = server.uri();
    config.api.datagetter_url = format!("{}/datagetter", server.uri());
    NoaaClient::new(config).unwrap()
}

#[test]
fn split_line_honours_quotes() {
    assert_eq!(
        split_line(r#"search "Boston Harbor"  extra"#),
        vec!["search", "Boston Harbor", "extra"]
    );
    assert!(split_line("   ").is_empty());
}

#[test]
fn search_joins_words() {
    let cli = parse("search Boston Harbor").unwrap();
    assert_eq!(
        cli.command,
        Command::Search {
            name: vec!["Boston".to_string(), "Harbor".to_string()]
        }
    );
}

#[test]
fn height_accepts_negative_low_water() {
    let cli = parse("height --high-time 03:00 --high 3.0 --low-time 09:00 --low -0.2 -p 06:00")
        .unwrap();
    assert!(matches!(cli.command, Command::Height { low, .. } if low == "-0.2"));
}

#[test]
fn missing_arguments_are_rejected() {
    assert!(parse("squat --speed 10").is_err());
    assert!(parse("tides --station 8443970").is_err());
}

#[tokio::test]
async fn squat_action_reports_example() {
    let cli = parse("squat -b 0.7 -s 10").unwrap();
    let output = execute(cli.command, &offline_client()).await.unwrap();
    assert_eq!(output, "Estimated squat: 0.70 meters\n");
}

#[tokio::test]
async fn squat_action_rejects_text() {
    let cli = parse("squat -b seven -s 10").unwrap();
    let result = execute(cli.command, &offline_client()).await;
    assert!(matches!(result, Err(UkcError::InvalidInput(_))));
}

#[tokio::test]
async fn height_action_at_midpoint() {
    let cli = parse("height --high-time 03:00 --high 3.0 --low-time 09:00 --low 1.0 -p 06:00")
        .unwrap();
    let output = execute(cli.command, &offline_client()).await.unwrap();
    assert_eq!(output, "Height of tide at 06:00: 2.00 meters\n");
}

#[tokio::test]
async fn height_action_across_midnight() {
    let cli = parse("height --high-time 22:00 --high 3.0 --low-time 04:00 --low 1.0 -p 01:00")
        .unwrap();
    let output = execute(cli.command, &offline_client()).await.unwrap();
    assert_eq!(output, "Height of tide at 01:00: 2.00 meters\n");
}

#[tokio::test]
async fn height_action_rejects_equal_times() {
    let cli = parse("height --high-time 03:00 --high 3.0 --low-time 03:00 --low 1.0 -p 03:00")
        .unwrap();
    let result = execute(cli.command, &offline_client()).await;
    assert!(matches!(result, Err(UkcError::InvalidInput(_))));
}

#[tokio::test]
async fn clearance_action_with_manual_tide() {
    let cli =
        parse("clearance -b 0.7 -s 10 --draft 8.0 --depth 12.0 --lowest-tide 1.5").unwrap();
    let output = execute(cli.command, &offline_client()).await.unwrap();
    assert!(output.contains("0.70 m"));
    assert!(output.contains("4.80 m"));
    assert!(!output.contains("Height of tide"));
}

#[tokio::test]
async fn clearance_action_needs_a_tide_source() {
    let cli = parse("clearance -b 0.7 -s 10 --draft 8.0 --depth 12.0").unwrap();
    let result = execute(cli.command, &offline_client()).await;
    assert!(matches!(result, Err(UkcError::InvalidInput(_))));
}

#[tokio::test]
async fn clearance_action_with_station_predictions() {
    let server = mock_predictions().await;
    let cli = parse(
        "clearance -b 0.7 -s 10 --draft 8.0 --depth 12.0 --station 8443970 -d 20240616 -p 06:00",
    )
    .unwrap();

    let output = execute(cli.command, &client_for(&server)).await.unwrap();

    // lowest predicted tide is 1.0 m, passage sits halfway down the ebb
    let line = |label: &str| {
        output
            .lines()
            .find(|l| l.starts_with(label))
            .map(|l| l.trim_start_matches(label).trim().to_string())
    };
    assert_eq!(line("Height of tide at passage:").as_deref(), Some("2.00 m"));
    assert_eq!(line("Under-keel clearance:").as_deref(), Some("4.30 m"));
    assert_eq!(line("Clearance at passage:").as_deref(), Some("5.30 m"));
}

#[tokio::test]
async fn clearance_action_before_first_event_of_the_day() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/datagetter"))
        .and(query_param("begin_date", "20240615"))
        .and(query_param("range", "72"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "predictions": [
                { "t": "2024-06-15 21:30", "v": "1.000", "type": "L" },
                { "t": "2024-06-16 03:30", "v": "3.000", "type": "H" },
                { "t": "2024-06-16 09:45", "v": "0.800", "type": "L" }
            ]
        })))
        .mount(&server)
        .await;
    let cli = parse(
        "clearance -b 0.7 -s 10 --draft 8.0 --depth 12.0 --station 8443970 -d 20240616 -p 01:30",
    )
    .unwrap();

    let output = execute(cli.command, &client_for(&server)).await.unwrap();

    // the flood started the evening before; lowest tide stays on the 16th
    let line = |label: &str| {
        output
            .lines()
            .find(|l| l.starts_with(label))
            .map(|l| l.trim_start_matches(label).trim().to_string())
    };
    assert_eq!(line("Height of tide at passage:").as_deref(), Some("2.50 m"));
    assert_eq!(line("Under-keel clearance:").as_deref(), Some("4.10 m"));
    assert_eq!(line("Clearance at passage:").as_deref(), Some("5.80 m"));
}

#[tokio::test]
async fn clearance_passage_without_station_is_rejected() {
    let cli = parse("clearance -b 0.7 -s 10 --draft 8.0 --depth 12.0 --lowest-tide 1.5 -p 06:00")
        .unwrap();
    let result = execute(cli.command, &offline_client()).await;
    assert!(matches!(result, Err(UkcError::InvalidInput(msg)) if msg.contains("--station")));
}

#[tokio::test]
async fn tides_action_renders_table() {
    let server = mock_predictions().await;
    let cli = parse("tides -s 8443970 -d 20240616").unwrap();

    let output = execute(cli.command, &client_for(&server)).await.unwrap();

    assert!(output.starts_with("Time"));
    assert_eq!(output.lines().count(), 5);
    assert!(output.contains("2024-06-16 09:00"));
}

#[tokio::test]
async fn network_failure_is_reported_not_fatal() {
    let cli = parse("tides -s 8443970 -d 20240616").unwrap();
    let result = execute(cli.command, &offline_client()).await;
    assert!(matches!(result, Err(UkcError::NetworkFailure(_))));

    // the next action still works
    let cli = parse("squat -b 0.7 -s 0").unwrap();
    assert!(execute(cli.command, &offline_client()).await.is_ok());
}

#[tokio::test]
async fn bad_date_is_invalid_input() {
    let cli = parse("tides -s 8443970 -d 2024-06-16").unwrap();
    let result = execute(cli.command, &offline_client()).await;
    assert!(matches!(result, Err(UkcError::InvalidInput(_))));
}
