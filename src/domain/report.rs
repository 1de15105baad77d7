//! Batch report. Built incrementally by the dispatcher; returned on completion
//! and on abort alike so finished work is never discarded.

use crate::domain::entities::{
    CanonicalNumber, DeliveryState, NormalizationAttempt, Recipient, SessionStrategy,
};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchState {
    Idle,
    Running,
    Completed,
    Aborted,
}

#[derive(Debug, Clone)]
pub struct BatchReport {
    pub state: BatchState,
    pub strategy: SessionStrategy,
    /// Recipients that reached a final state, in dispatch order.
    pub outcomes: Vec<Recipient>,
    /// Recipients never attempted because the batch stopped early.
    pub unattempted: Vec<Recipient>,
    /// Lines rejected before dispatch.
    pub invalid: Vec<NormalizationAttempt>,
    /// Set when the batch aborted on an unrecoverable error.
    pub fatal_error: Option<String>,
    /// Set when the user asked to stop.
    pub cancelled: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

/// Final fate of one input line or recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryStatus {
    Sent,
    Failed(String),
    Skipped(String),
    Invalid(String),
    NotAttempted,
}

impl EntryStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Sent => "sent",
            Self::Failed(_) => "failed",
            Self::Skipped(_) => "skipped",
            Self::Invalid(_) => "invalid",
            Self::NotAttempted => "not_attempted",
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Failed(r) | Self::Skipped(r) | Self::Invalid(r) => Some(r),
            Self::Sent | Self::NotAttempted => None,
        }
    }
}

/// Flattened report row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportEntry {
    pub line: Option<usize>,
    pub input: String,
    pub number: Option<CanonicalNumber>,
    pub status: EntryStatus,
}

impl BatchReport {
    pub fn new(strategy: SessionStrategy) -> Self {
        Self {
            state: BatchState::Idle,
            strategy,
            outcomes: Vec::new(),
            unattempted: Vec::new(),
            invalid: Vec::new(),
            fatal_error: None,
            cancelled: false,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn record(&mut self, recipient: Recipient) {
        self.outcomes.push(recipient);
    }

    /// Abort on an unrecoverable error. `rest` are the recipients never reached.
    pub fn abort(&mut self, reason: String, rest: impl IntoIterator<Item = Recipient>) {
        self.fatal_error = Some(reason);
        self.unattempted.extend(rest);
        self.finish(BatchState::Aborted);
    }

    /// Stop at a recipient boundary on user request.
    pub fn cancel(&mut self, rest: impl IntoIterator<Item = Recipient>) {
        self.cancelled = true;
        self.unattempted.extend(rest);
        self.finish(BatchState::Aborted);
    }

    pub fn complete(&mut self) {
        self.finish(BatchState::Completed);
    }

    fn finish(&mut self, state: BatchState) {
        self.state = state;
        self.finished_at = Some(Utc::now());
    }

    /// Attach lines that failed normalization so the report covers every input line.
    pub fn with_invalid(mut self, invalid: Vec<NormalizationAttempt>) -> Self {
        self.invalid = invalid;
        self
    }

    pub fn is_fatal(&self) -> bool {
        self.fatal_error.is_some()
    }

    pub fn sent_count(&self) -> usize {
        self.count(|s| matches!(s, DeliveryState::Sent))
    }

    pub fn failed_count(&self) -> usize {
        self.count(|s| matches!(s, DeliveryState::Failed(_)))
    }

    pub fn skipped_count(&self) -> usize {
        self.count(|s| matches!(s, DeliveryState::Skipped(_)))
    }

    pub fn invalid_count(&self) -> usize {
        self.invalid.len()
    }

    /// Sends actually attempted (sent + failed).
    pub fn attempted_count(&self) -> usize {
        self.sent_count() + self.failed_count()
    }

    fn count(&self, pred: impl Fn(&DeliveryState) -> bool) -> usize {
        self.outcomes.iter().filter(|r| pred(&r.state)).count()
    }

    /// Every line's fate in input line order. Recipients without a source
    /// line keep their dispatch order after all numbered lines.
    pub fn entries(&self) -> Vec<ReportEntry> {
        let from_recipient = |r: &Recipient, status: EntryStatus| ReportEntry {
            line: r.line,
            input: r.number.to_string(),
            number: Some(r.number.clone()),
            status,
        };

        let mut entries: Vec<ReportEntry> = self
            .outcomes
            .iter()
            .map(|r| {
                let status = match &r.state {
                    DeliveryState::Sent => EntryStatus::Sent,
                    DeliveryState::Failed(reason) => EntryStatus::Failed(reason.clone()),
                    DeliveryState::Skipped(reason) => EntryStatus::Skipped(reason.clone()),
                    DeliveryState::Pending => EntryStatus::NotAttempted,
                };
                from_recipient(r, status)
            })
            .chain(
                self.unattempted
                    .iter()
                    .map(|r| from_recipient(r, EntryStatus::NotAttempted)),
            )
            .chain(self.invalid.iter().map(|a| ReportEntry {
                line: Some(a.line),
                input: a.raw.clone(),
                number: None,
                status: EntryStatus::Invalid(
                    a.outcome
                        .as_ref()
                        .err()
                        .map(|e| e.to_string())
                        .unwrap_or_default(),
                ),
            }))
            .collect();

        // Stable: unnumbered entries keep their relative order.
        entries.sort_by_key(|e| e.line.unwrap_or(usize::MAX));
        entries
    }

    /// Printable summary: totals then one line per entry.
    pub fn summary_lines(&self) -> Vec<String> {
        let mut out = vec![format!(
            "attempted: {}  sent: {}  failed: {}  skipped: {}  invalid: {}",
            self.attempted_count(),
            self.sent_count(),
            self.failed_count(),
            self.skipped_count(),
            self.invalid_count()
        )];
        if let Some(reason) = &self.fatal_error {
            out.push(format!("batch aborted: {}", reason));
        } else if self.cancelled {
            out.push("batch stopped by user".to_string());
        }
        for e in self.entries() {
            let line = e
                .line
                .map(|l| format!("{:>4}", l))
                .unwrap_or_else(|| "   -".to_string());
            let target = e
                .number
                .as_ref()
                .map(|n| n.to_string())
                .unwrap_or_else(|| e.input.clone());
            match e.status.reason() {
                Some(reason) => out.push(format!(
                    "{}  {:<16} {:<13} {}",
                    line,
                    target,
                    e.status.label(),
                    reason
                )),
                None => out.push(format!("{}  {:<16} {}", line, target, e.status.label())),
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::country::CountryRegistry;
    use crate::domain::recipients::RecipientListBuilder;

    #[test]
    fn test_entries_follow_line_order() {
        let registry = CountryRegistry::builtin().unwrap();
        let tr = registry.lookup("tr").unwrap();
        let attempts = RecipientListBuilder::build("05551234567\nbad\n05559876543\n05550000000", tr);
        let (mut recipients, invalid) = RecipientListBuilder::partition(attempts);

        let mut report = BatchReport::new(SessionStrategy::Ephemeral);
        let mut second = recipients.remove(1);
        second.state = DeliveryState::Failed("no chat".into());
        let mut first = recipients.remove(0);
        first.state = DeliveryState::Sent;
        report.record(first);
        report.record(second);
        report.abort("driver gone".into(), recipients);
        let report = report.with_invalid(invalid);

        let statuses: Vec<(Option<usize>, &str)> = report
            .entries()
            .iter()
            .map(|e| (e.line, e.status.label()))
            .collect();
        assert_eq!(
            statuses,
            vec![
                (Some(1), "sent"),
                (Some(2), "invalid"),
                (Some(3), "failed"),
                (Some(4), "not_attempted"),
            ]
        );
        assert_eq!(report.state, BatchState::Aborted);
        assert!(report.is_fatal());
        assert_eq!(report.attempted_count(), 2);
        assert_eq!(report.invalid_count(), 1);
        assert!(report.summary_lines()[1].contains("driver gone"));
    }
}
