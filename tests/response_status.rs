mod common;

use common::{date, report, today};
use pfd_stats::config;
use pfd_stats::{classify, ReplyStatus, ResponseClassifier, ResponseStatus};

const OLD: &str = "01/01/2024";
const RECENT: &str = "20/05/2024";

#[test]
fn absent_recipients_means_no_requests() {
    let result = classify(&report(None, Some("A Response"), OLD), today());
    assert_eq!(result.status, ResponseStatus::NoRequests);
    assert_eq!(result.recipient_count, 0);
    assert_eq!(result.reply_count, 0);
    assert_eq!(result.reply_status, None);
    assert!(result.recipients.is_empty());
}

#[test]
fn absent_recipients_wins_over_bad_date() {
    let result = classify(&report(None, None, "not a date"), today());
    assert_eq!(result.status, ResponseStatus::NoRequests);
}

#[test]
fn empty_recipients_after_splitting_is_failed() {
    for raw in ["   ", " | ", "|"] {
        let result = classify(&report(Some(raw), None, OLD), today());
        assert_eq!(result.status, ResponseStatus::Failed, "recipients {:?}", raw);
        assert_eq!(result.recipient_count, 0);
        assert_eq!(result.reply_count, 0);
    }
}

#[test]
fn malformed_date_is_failed() {
    let mut malformed = report(Some("A | B"), Some("A Response"), "2024-01-01");
    assert_eq!(classify(&malformed, today()).status, ResponseStatus::Failed);

    malformed.date_of_report = None;
    assert_eq!(classify(&malformed, today()).status, ResponseStatus::Failed);
}

#[test]
fn all_recipients_replied_is_completed() {
    let result = classify(
        &report(Some("A | B"), Some("A Response | B Response"), OLD),
        today(),
    );
    assert_eq!(result.status, ResponseStatus::Completed);
    assert_eq!(result.recipient_count, 2);
    assert_eq!(result.reply_count, 2);
    assert_eq!(result.responded_count, 2);
    assert_eq!(result.reply_status, Some(ReplyStatus::Received));
}

#[test]
fn no_replies_past_the_window_is_overdue() {
    let result = classify(&report(Some("A | B"), None, OLD), today());
    assert_eq!(result.status, ResponseStatus::Overdue);
    assert_eq!(result.recipient_count, 2);
    assert_eq!(result.reply_count, 0);
    assert!(result
        .recipients
        .iter()
        .all(|r| r.status == ReplyStatus::Overdue));
}

#[test]
fn no_replies_within_the_window_is_pending() {
    let result = classify(&report(Some("A"), None, RECENT), today());
    assert_eq!(result.status, ResponseStatus::Pending);
    assert_eq!(result.reply_status, Some(ReplyStatus::Pending));
}

#[test]
fn some_replies_past_the_window_is_partial() {
    let result = classify(&report(Some("A | B"), Some("A Response"), OLD), today());
    assert_eq!(result.status, ResponseStatus::Partial);
    assert_eq!(result.recipient_count, 2);
    assert_eq!(result.reply_count, 1);
    assert_eq!(result.reply_status, Some(ReplyStatus::Overdue));

    let statuses: Vec<ReplyStatus> = result.recipients.iter().map(|r| r.status).collect();
    assert_eq!(statuses, vec![ReplyStatus::Received, ReplyStatus::Overdue]);
}

#[test]
fn completed_is_never_downgraded_to_pending() {
    let result = classify(&report(Some("A"), Some("A Response"), RECENT), today());
    assert_eq!(result.status, ResponseStatus::Completed);
    // The reply-count status follows the window regardless of replies
    assert_eq!(result.reply_status, Some(ReplyStatus::Pending));
    assert_eq!(result.recipients[0].status, ReplyStatus::Pending);
}

#[test]
fn window_boundary_is_fifty_six_days() {
    // 2024-04-06 is exactly 56 days before 2024-06-01
    let on_boundary = classify(&report(Some("A"), None, "06/04/2024"), today());
    assert_eq!(on_boundary.status, ResponseStatus::Pending);

    let past_boundary = classify(&report(Some("A"), None, "05/04/2024"), today());
    assert_eq!(past_boundary.status, ResponseStatus::Overdue);
}

#[test]
fn reply_urls_match_recipients_after_escaping() {
    let dashed = report(
        Some("NHS England"),
        Some("https://www.judiciary.uk/wp-content/uploads/2023/03/2023-0101-Response-from-NHS-England.pdf"),
        OLD,
    );
    let result = classify(&dashed, today());
    assert_eq!(result.status, ResponseStatus::Completed);
    assert!(result.recipients[0].responded);
    assert_eq!(
        result.recipients[0].document.as_deref(),
        Some("2023-0101-Response-from-NHS-England.pdf")
    );

    let encoded = report(
        Some("Department of Health | Home Office"),
        Some("https://example.org/Department%20of%20Health%20Response.pdf"),
        OLD,
    );
    let result = classify(&encoded, today());
    assert_eq!(result.status, ResponseStatus::Partial);
    assert_eq!(result.responded_count, 1);
}

#[test]
fn replies_without_response_marker_are_not_counted() {
    let result = classify(
        &report(
            Some("A Trust | Council"),
            Some("https://example.org/A_Trust_Acknowledgement.pdf"),
            OLD,
        ),
        today(),
    );
    assert_eq!(result.reply_count, 0);
    // Recipient matching reads the whole replies field, markers included or not
    assert_eq!(result.responded_count, 1);
    assert_eq!(result.status, ResponseStatus::Partial);
}

#[test]
fn substring_matching_can_credit_the_wrong_recipient() {
    let result = classify(
        &report(
            Some("NHS | NHS England"),
            Some("https://example.org/Response-from-NHS-England.pdf"),
            OLD,
        ),
        today(),
    );
    assert_eq!(result.reply_count, 1);
    assert_eq!(result.responded_count, 2);
    assert_eq!(result.status, ResponseStatus::Completed);
}

#[test]
fn younger_reports_only_move_towards_pending() {
    let fixtures = [
        report(Some("A | B"), Some("A Response | B Response"), OLD),
        report(Some("A | B"), None, OLD),
        report(Some("A | B"), Some("A Response"), OLD),
        report(Some("A"), Some("B Response"), OLD),
        report(Some(" | "), None, OLD),
    ];
    let young_today = date(2024, 1, 10);

    for fixture in &fixtures {
        let old = classify(fixture, today()).status;
        let young = classify(fixture, young_today).status;
        match old {
            ResponseStatus::Overdue | ResponseStatus::Partial => {
                assert_eq!(young, ResponseStatus::Pending, "{:?}", fixture)
            }
            other => assert_eq!(young, other, "{:?}", fixture),
        }
    }
}

#[test]
fn window_and_marker_come_from_config() {
    let classifier = ResponseClassifier::new(&config::Response {
        overdue_after_days: 7,
        reply_marker: "Reply".into(),
    });
    let result = classifier.classify(&report(Some("A"), Some("A Reply"), RECENT), today());
    assert_eq!(result.reply_count, 1);
    assert_eq!(result.status, ResponseStatus::Completed);

    // Twelve days old is past a seven day window
    let result = classifier.classify(&report(Some("B | C"), Some("A Reply"), RECENT), today());
    assert_eq!(result.status, ResponseStatus::Overdue);
}

#[test]
fn status_labels_match_output_columns() {
    let labels: Vec<&str> = ResponseStatus::ALL.iter().map(|s| s.as_str()).collect();
    assert_eq!(
        labels,
        vec!["no requests", "failed", "pending", "overdue", "partial", "completed"]
    );
    assert_eq!(ReplyStatus::Received.to_string(), "received");
}
