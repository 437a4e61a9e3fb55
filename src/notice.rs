use tokio::sync::mpsc;

use crate::error::LemmacloudError;

/// A non-fatal failure the user should hear about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    DiscoveryFailed { query: String, reason: String },
    ExtractionFailed { url: String, reason: String },
    MaskUnavailable { path: String },
    Other(String),
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Notice::DiscoveryFailed { query, reason } => {
                write!(f, "search for {query:?} failed: {reason}")
            }
            Notice::ExtractionFailed { url, reason } => {
                write!(f, "could not extract text from {url}: {reason}")
            }
            Notice::MaskUnavailable { path } => {
                write!(f, "could not load mask {path}, using a rectangle")
            }
            Notice::Other(message) => f.write_str(message),
        }
    }
}

impl From<LemmacloudError> for Notice {
    fn from(err: LemmacloudError) -> Self {
        match err {
            LemmacloudError::Discovery { query, reason } => Notice::DiscoveryFailed { query, reason },
            LemmacloudError::Extraction { url, reason } => Notice::ExtractionFailed { url, reason },
            other => Notice::Other(other.to_string()),
        }
    }
}

/// Forwards notices to whoever is listening. Without a listener, or once the
/// listener is gone, a notice is logged as a warning instead.
#[derive(Debug, Clone, Default)]
pub struct Notifier {
    tx: Option<mpsc::UnboundedSender<Notice>>,
}

impl Notifier {
    pub fn new(tx: mpsc::UnboundedSender<Notice>) -> Self {
        Self { tx: Some(tx) }
    }

    /// A notifier that only logs.
    pub fn silent() -> Self {
        Self { tx: None }
    }

    pub fn notify(&self, notice: impl Into<Notice>) {
        let notice = notice.into();
        let undelivered = match &self.tx {
            Some(tx) => match tx.send(notice) {
                Ok(()) => None,
                Err(mpsc::error::SendError(notice)) => Some(notice),
            },
            None => Some(notice),
        };
        match undelivered {
            Some(notice) => tracing::warn!("{notice}"),
            None => tracing::debug!("notice forwarded"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[tokio::test]
    async fn test_notifier_forwards_notices() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let notifier = Notifier::new(tx);
        notifier.notify(LemmacloudError::extraction("https://a.example", "404 Not Found"));
        drop(notifier);

        let notice = rx.recv().await.unwrap();
        assert_eq!(
            notice,
            Notice::ExtractionFailed {
                url: "https://a.example".into(),
                reason: "404 Not Found".into()
            }
        );
        assert!(rx.recv().await.is_none());
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn logged_while(f: impl FnOnce()) -> String {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        let bytes = captured.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_forwarded_notice_is_not_also_logged_as_warning() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let notifier = Notifier::new(tx);
        let log = logged_while(|| notifier.notify(Notice::Other("страница пуста".into())));

        assert_eq!(rx.try_recv().unwrap(), Notice::Other("страница пуста".into()));
        assert!(!log.contains("WARN"));
        assert!(!log.contains("страница пуста"));
    }

    #[test]
    fn test_undelivered_notice_is_logged_once() {
        let log = logged_while(|| Notifier::silent().notify(Notice::Other("нет слушателя".into())));
        assert_eq!(log.matches("нет слушателя").count(), 1);
        assert!(log.contains("WARN"));

        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let log = logged_while(|| Notifier::new(tx).notify(Notice::Other("канал закрыт".into())));
        assert_eq!(log.matches("канал закрыт").count(), 1);
    }

    #[test]
    fn test_silent_notifier_does_not_panic_without_receiver() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        Notifier::new(tx).notify(Notice::MaskUnavailable {
            path: "masks/star.png".into(),
        });
        Notifier::silent().notify(Notice::MaskUnavailable {
            path: "masks/bird.png".into(),
        });
    }
}
