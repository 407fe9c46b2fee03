//! End-to-end polling against scripted feeds

use crate::support::{ManualClock, ScriptedFeed, temp_csv};
use pricewatch_core::Fixed;
use pricewatch_exchanges::ExchangeError;
use pricewatch_monitor::{CsvSink, MonitorError, PollSettings, Poller, PollerState, shutdown_channel};
use std::fs;
use std::time::Duration;

fn settings() -> PollSettings {
    PollSettings::new("BNBUSDT").with_interval(Duration::from_secs(15))
}

#[monoio::test]
async fn test_three_polls_write_csv() {
    let path = temp_csv("pricewatch-e2e");
    let (trigger, mut shutdown) = shutdown_channel();
    let clock = ManualClock::new(3, trigger);
    let mut poller = Poller::new(ScriptedFeed::prices(&[100, 102, 104]), clock, CsvSink::new(&path), settings());

    poller.run(&mut shutdown).await.unwrap();

    assert_eq!(poller.state(), PollerState::Stopped);
    assert_eq!(poller.series().len(), 3);

    let contents = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], "timestamp,price,MA_7,MA_25,MA_50,MA_75,MA_99,MA_200");
    assert_eq!(lines[1], "2023-11-14T22:13:20.000Z,100,,,,,,");
    assert_eq!(lines[3], "2023-11-14T22:13:50.000Z,104,,,,,,");

    fs::remove_file(&path).unwrap();
}

#[monoio::test]
async fn test_network_failure_skips_one_iteration() {
    let path = temp_csv("pricewatch-e2e");
    let (trigger, mut shutdown) = shutdown_channel();
    let feed = ScriptedFeed::new(vec![
        Ok(Fixed::from_i64(100)),
        Err(ExchangeError::NetworkError("connection reset".to_string())),
        Ok(Fixed::from_i64(104)),
    ]);
    let mut poller = Poller::new(feed, ManualClock::new(3, trigger), CsvSink::new(&path), settings());

    poller.run(&mut shutdown).await.unwrap();

    let prices: Vec<Fixed> = poller.series().samples().iter().map(|s| s.price).collect();
    assert_eq!(prices, vec![Fixed::from_i64(100), Fixed::from_i64(104)]);

    let contents = fs::read_to_string(&path).unwrap();
    assert_eq!(contents.lines().count(), 3);
    assert!(contents.lines().last().unwrap().contains(",104,"));

    fs::remove_file(&path).unwrap();
}

#[monoio::test]
async fn test_averages_appear_once_window_fills() {
    let path = temp_csv("pricewatch-e2e");
    let (trigger, mut shutdown) = shutdown_channel();
    let feed = ScriptedFeed::prices(&[10, 20, 30, 40, 50, 60, 70]);
    let mut poller = Poller::new(
        feed,
        ManualClock::new(7, trigger),
        CsvSink::new(&path),
        settings().with_windows(vec![7, 25]),
    );

    poller.run(&mut shutdown).await.unwrap();

    let contents = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines[0], "timestamp,price,MA_7,MA_25");
    assert!(lines[6].ends_with(",60,,"));
    assert!(lines[7].ends_with(",70,40,"));

    fs::remove_file(&path).unwrap();
}

#[monoio::test]
async fn test_unwritable_output_stops_loop() {
    let path = std::env::temp_dir().join("pricewatch-no-such-dir").join("out.csv");
    let (trigger, mut shutdown) = shutdown_channel();
    let mut poller = Poller::new(
        ScriptedFeed::prices(&[100, 102]),
        ManualClock::new(10, trigger),
        CsvSink::new(&path),
        settings(),
    );

    let err = poller.run(&mut shutdown).await.unwrap_err();

    assert!(matches!(err, MonitorError::Persistence(_)));
    assert_eq!(poller.series().len(), 1);
    assert_eq!(poller.state(), PollerState::Stopped);
}

#[monoio::test]
async fn test_one_fetch_per_iteration() {
    let path = temp_csv("pricewatch-e2e");
    let (trigger, mut shutdown) = shutdown_channel();
    let mut poller = Poller::new(
        ScriptedFeed::prices(&[1, 2, 3, 4, 5]),
        ManualClock::new(5, trigger),
        CsvSink::new(&path),
        settings(),
    );

    poller.run(&mut shutdown).await.unwrap();
    assert_eq!(poller.series().len(), 5);
    assert_eq!(poller.feed().calls(), 5);
    assert_eq!(poller.clock().sleeps(), 5);

    fs::remove_file(&path).unwrap();
}
