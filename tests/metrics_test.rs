//! Comprehensive unit tests for metrics.rs module

use std::time::Duration;

use ios_backup_extract::metrics::MetricsCollector;

#[test]
fn test_metrics_collector_default() {
    let collector = MetricsCollector::default();
    assert_eq!(collector.files_copied, 0);
    assert_eq!(collector.files_renamed, 0);
    assert_eq!(collector.domains_completed, 0);
    assert_eq!(collector.domains_failed, 0);
    assert_eq!(collector.transcripts_written, 0);
    assert_eq!(collector.messages_correlated, 0);
    assert_eq!(collector.unresolved_senders, 0);
    assert_eq!(collector.contacts_exported, 0);
    assert_eq!(collector.errors, 0);
}

#[test]
fn test_record_file_copied() {
    let mut collector = MetricsCollector::new();
    collector.record_file_copied("CameraRollDomain", false);
    collector.record_file_copied("CameraRollDomain", true);
    collector.record_file_copied("MediaDomain", false);

    assert_eq!(collector.files_copied, 3);
    assert_eq!(collector.files_renamed, 1);
}

#[test]
fn test_record_domain_success_and_failure() {
    let mut collector = MetricsCollector::new();
    collector.record_domain("CameraRollDomain", Duration::from_millis(120), true);
    collector.record_domain("MediaDomain", Duration::from_millis(5), false);

    assert_eq!(collector.domains_completed, 1);
    assert_eq!(collector.domains_failed, 1);
}

#[test]
fn test_record_transcript() {
    let mut collector = MetricsCollector::new();
    collector.record_transcript(10, 2);
    collector.record_transcript(0, 0);

    assert_eq!(collector.transcripts_written, 2);
    assert_eq!(collector.messages_correlated, 10);
    assert_eq!(collector.unresolved_senders, 2);
}

#[test]
fn test_record_contacts_exported() {
    let mut collector = MetricsCollector::new();
    collector.record_contacts_exported(42);
    assert_eq!(collector.contacts_exported, 42);
}

#[test]
fn test_record_error() {
    let mut collector = MetricsCollector::new();
    collector.record_error("copy_failed");
    collector.record_error("catalog_unavailable");
    assert_eq!(collector.errors, 2);
}

#[test]
fn test_merge_adds_counts() {
    let mut artifacts = MetricsCollector::new();
    artifacts.record_file_copied("CameraRollDomain", true);
    artifacts.record_domain("CameraRollDomain", Duration::from_millis(1), true);

    let mut correlation = MetricsCollector::new();
    correlation.record_transcript(3, 1);
    correlation.record_error("correlation_query_failed");

    artifacts.merge(&correlation);

    assert_eq!(artifacts.files_copied, 1);
    assert_eq!(artifacts.files_renamed, 1);
    assert_eq!(artifacts.domains_completed, 1);
    assert_eq!(artifacts.transcripts_written, 1);
    assert_eq!(artifacts.messages_correlated, 3);
    assert_eq!(artifacts.unresolved_senders, 1);
    assert_eq!(artifacts.errors, 1);
}

#[test]
fn test_merge_with_empty_is_identity() {
    let mut collector = MetricsCollector::new();
    collector.record_transcript(5, 0);
    let before = collector.clone();

    collector.merge(&MetricsCollector::new());
    assert_eq!(collector, before);
}

#[test]
fn test_log_summary_does_not_panic() {
    let mut collector = MetricsCollector::new();
    collector.record_file_copied("CameraRollDomain", false);
    collector.log_summary();
}
