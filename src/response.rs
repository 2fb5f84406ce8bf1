//! Response tracking for reports.
//!
//! A report is sent to one or more recipients, each of whom has 56 days to
//! respond. Published responses are listed as reply URLs. Classification
//! works from the raw text fields only:
//!
//! * a recipient counts as responded when its name appears in the reply
//!   URLs once `-`, `_` and `%20` are read as spaces. This is substring
//!   containment, so a short recipient name can match another recipient's
//!   reply;
//! * a report without a recipients field has `no requests`, one whose
//!   recipients or date cannot be parsed has `failed`.

use chrono::NaiveDate;
use std::fmt;
use url::Url;

use crate::config;
use crate::report::{parse_report_date, split_entries, Report};

/// Overall response status of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResponseStatus {
    NoRequests,
    Failed,
    Pending,
    Overdue,
    Partial,
    Completed,
}

impl ResponseStatus {
    pub const ALL: [ResponseStatus; 6] = [
        ResponseStatus::NoRequests,
        ResponseStatus::Failed,
        ResponseStatus::Pending,
        ResponseStatus::Overdue,
        ResponseStatus::Partial,
        ResponseStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseStatus::NoRequests => "no requests",
            ResponseStatus::Failed => "failed",
            ResponseStatus::Pending => "pending",
            ResponseStatus::Overdue => "overdue",
            ResponseStatus::Partial => "partial",
            ResponseStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for ResponseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reply status of a single recipient, or of a report by reply count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ReplyStatus {
    Overdue,
    Pending,
    Received,
}

impl ReplyStatus {
    pub const ALL: [ReplyStatus; 3] = [
        ReplyStatus::Overdue,
        ReplyStatus::Pending,
        ReplyStatus::Received,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReplyStatus::Overdue => "overdue",
            ReplyStatus::Pending => "pending",
            ReplyStatus::Received => "received",
        }
    }
}

impl fmt::Display for ReplyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipientResponse {
    pub recipient: String,
    pub responded: bool,
    pub status: ReplyStatus,
    /// File name of the first reply mentioning the recipient.
    pub document: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub status: ResponseStatus,
    /// `None` for `no requests` and `failed` reports.
    pub reply_status: Option<ReplyStatus>,
    pub recipient_count: usize,
    pub reply_count: usize,
    pub responded_count: usize,
    pub recipients: Vec<RecipientResponse>,
}

impl Classification {
    fn terminal(status: ResponseStatus) -> Self {
        Self {
            status,
            reply_status: None,
            recipient_count: 0,
            reply_count: 0,
            responded_count: 0,
            recipients: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResponseClassifier {
    overdue_after_days: i64,
    reply_marker: String,
}

impl Default for ResponseClassifier {
    fn default() -> Self {
        Self::new(&config::Response::default())
    }
}

impl ResponseClassifier {
    pub fn new(cfg: &config::Response) -> Self {
        Self {
            overdue_after_days: cfg.overdue_after_days,
            reply_marker: cfg.reply_marker.clone(),
        }
    }

    pub fn is_overdue(&self, date: NaiveDate, today: NaiveDate) -> bool {
        (today - date).num_days() > self.overdue_after_days
    }

    pub fn classify(&self, report: &Report, today: NaiveDate) -> Classification {
        let Some(recipients_raw) = report.recipients_raw.as_deref() else {
            return Classification::terminal(ResponseStatus::NoRequests);
        };

        let recipients: Vec<&str> = split_entries(recipients_raw).collect();
        if recipients.is_empty() {
            return Classification::terminal(ResponseStatus::Failed);
        }

        let Some(date) = report.date_of_report.as_deref().and_then(parse_report_date) else {
            return Classification::terminal(ResponseStatus::Failed);
        };
        let is_overdue = self.is_overdue(date, today);

        let replies_raw = report.replies_raw.as_deref().unwrap_or("");
        let replies: Vec<&str> = split_entries(replies_raw)
            .filter(|reply| reply.contains(self.reply_marker.as_str()))
            .collect();
        let escaped = escape_replies(replies_raw);

        let mut reply_status = ReplyStatus::Overdue;
        if recipients.len() == replies.len() {
            reply_status = ReplyStatus::Received;
        }
        if !is_overdue {
            reply_status = ReplyStatus::Pending;
        }

        let recipient_responses: Vec<RecipientResponse> = recipients
            .iter()
            .map(|&recipient| {
                let responded = escaped.contains(recipient);
                let mut status = ReplyStatus::Overdue;
                if responded {
                    status = ReplyStatus::Received;
                }
                if !is_overdue {
                    status = ReplyStatus::Pending;
                }
                let document = if responded {
                    replies
                        .iter()
                        .find(|reply| escape_replies(reply).contains(recipient))
                        .map(|reply| document_name(reply))
                } else {
                    None
                };
                RecipientResponse {
                    recipient: recipient.to_string(),
                    responded,
                    status,
                    document,
                }
            })
            .collect();

        let recipient_count = recipients.len();
        let reply_count = replies.len();
        let responded_count = recipient_responses.iter().filter(|r| r.responded).count();

        let mut status = ResponseStatus::Partial;
        if responded_count == 0 {
            status = ResponseStatus::Overdue;
        }
        if recipient_count == reply_count {
            status = ResponseStatus::Completed;
        }
        if responded_count >= recipient_count {
            status = ResponseStatus::Completed;
        }
        if !is_overdue && matches!(status, ResponseStatus::Overdue | ResponseStatus::Partial) {
            status = ResponseStatus::Pending;
        }

        Classification {
            status,
            reply_status: Some(reply_status),
            recipient_count,
            reply_count,
            responded_count,
            recipients: recipient_responses,
        }
    }
}

/// Classifies with the default 56-day window and `Response` marker.
pub fn classify(report: &Report, today: NaiveDate) -> Classification {
    ResponseClassifier::default().classify(report, today)
}

/// Reads URL-encoded separators in reply links as spaces.
pub fn escape_replies(raw: &str) -> String {
    raw.replace('-', " ").replace('_', " ").replace("%20", " ")
}

/// The last path segment of a reply URL, or the reply itself when it is not a URL.
pub fn document_name(reply: &str) -> String {
    Url::parse(reply)
        .ok()
        .and_then(|url| {
            url.path_segments()?
                .filter(|segment| !segment.is_empty())
                .last()
                .map(str::to_string)
        })
        .unwrap_or_else(|| reply.to_string())
}
