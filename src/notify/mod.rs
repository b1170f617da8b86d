//! External notification collaborator.
//!
//! Meeting creation triggers an email-style notification to every
//! participant. Delivery internals are out of scope; the `Notifier` trait is
//! the seam, and the production wiring logs the notice. Dispatch is
//! fire-and-forget with a bounded timeout: a slow or failing channel can
//! never fail or hang the request that scheduled the meeting.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Recipient {
    pub name: String,
    pub role: String,
    pub email: String,
}

/// Everything a notification channel needs to announce a scheduled meeting.
#[derive(Debug, Clone)]
pub struct MeetingNotice {
    pub meeting_id: i64,
    pub organizer_name: String,
    pub meeting_date: String,
    pub meeting_time: String,
    pub description: String,
    pub recipients: Vec<Recipient>,
}

#[derive(Debug)]
pub struct NotifyError(pub String);

impl fmt::Display for NotifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Notification error: {}", self.0)
    }
}

pub trait Notifier: Send + Sync {
    fn meeting_scheduled(&self, notice: &MeetingNotice) -> Result<(), NotifyError>;
}

/// Default channel: writes the notice to the log. Stands in for the outbound
/// email service configured via environment in deployments.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn meeting_scheduled(&self, notice: &MeetingNotice) -> Result<(), NotifyError> {
        for recipient in &notice.recipients {
            log::info!(
                "Meeting {} on {} {} — notifying {} <{}> ({})",
                notice.meeting_id,
                notice.meeting_date,
                notice.meeting_time,
                recipient.name,
                recipient.email,
                recipient.role,
            );
        }
        Ok(())
    }
}

/// Dispatch a meeting notice in the background. The caller returns
/// immediately; the attempt is bounded by `timeout` and made at most once.
/// Failures and timeouts are logged warnings, never surfaced to the caller.
pub fn dispatch_meeting(notifier: Arc<dyn Notifier>, notice: MeetingNotice, timeout: Duration) {
    tokio::spawn(async move {
        let meeting_id = notice.meeting_id;
        let attempt = tokio::task::spawn_blocking(move || notifier.meeting_scheduled(&notice));
        match tokio::time::timeout(timeout, attempt).await {
            Err(_) => log::warn!(
                "Notification for meeting {meeting_id} timed out after {}s",
                timeout.as_secs()
            ),
            Ok(Err(join_err)) => {
                log::warn!("Notification task for meeting {meeting_id} panicked: {join_err}")
            }
            Ok(Ok(Err(e))) => log::warn!("Notification for meeting {meeting_id} failed: {e}"),
            Ok(Ok(Ok(()))) => {}
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct RecordingNotifier {
        sent: Mutex<Vec<i64>>,
    }

    impl Notifier for RecordingNotifier {
        fn meeting_scheduled(&self, notice: &MeetingNotice) -> Result<(), NotifyError> {
            self.sent.lock().unwrap().push(notice.meeting_id);
            Ok(())
        }
    }

    struct FailingNotifier;

    impl Notifier for FailingNotifier {
        fn meeting_scheduled(&self, _notice: &MeetingNotice) -> Result<(), NotifyError> {
            Err(NotifyError("smtp unreachable".to_string()))
        }
    }

    fn notice(id: i64) -> MeetingNotice {
        MeetingNotice {
            meeting_id: id,
            organizer_name: "Prof. Rao".to_string(),
            meeting_date: "2026-03-01".to_string(),
            meeting_time: "14:30".to_string(),
            description: "progress review".to_string(),
            recipients: vec![Recipient {
                name: "A. Student".to_string(),
                role: "Student".to_string(),
                email: "a@nitap.ac.in".to_string(),
            }],
        }
    }

    #[actix_rt::test]
    async fn dispatch_delivers_in_background() {
        let notifier = Arc::new(RecordingNotifier { sent: Mutex::new(vec![]) });
        dispatch_meeting(notifier.clone(), notice(7), Duration::from_secs(5));
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(*notifier.sent.lock().unwrap(), vec![7]);
    }

    #[actix_rt::test]
    async fn dispatch_failure_is_swallowed() {
        // Nothing to assert beyond "does not panic": the error is logged.
        dispatch_meeting(Arc::new(FailingNotifier), notice(8), Duration::from_secs(1));
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
}
