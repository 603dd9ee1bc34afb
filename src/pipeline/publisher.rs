//! Publishing: one notification per take

use super::aggregation::TakeList;
use crate::notify::{render_take, NotificationSink};
use std::sync::Arc;
use tracing::{debug, error, info};

/// What happened to each delivery attempt
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishReport {
    pub attempted: usize,
    pub delivered: usize,
    /// Position in the take list and the delivery error
    pub failed: Vec<(usize, String)>,
}

pub struct Publisher {
    sink: Arc<dyn NotificationSink>,
}

impl Publisher {
    pub fn new(sink: Arc<dyn NotificationSink>) -> Self {
        Self { sink }
    }

    /// Deliver every take in list order. A failed delivery is logged and
    /// the remaining takes are still sent.
    pub async fn publish(&self, takes: &TakeList) -> PublishReport {
        let mut report = PublishReport::default();

        for (position, take) in takes.iter().enumerate() {
            report.attempted += 1;
            let message = render_take(take);
            match self.sink.deliver(&message).await {
                Ok(()) => {
                    debug!("Delivered take '{}'", take.title);
                    report.delivered += 1;
                }
                Err(e) => {
                    error!("Failed to deliver take '{}': {}", take.title, e);
                    report.failed.push((position, e.to_string()));
                }
            }
        }

        info!(
            "Published {}/{} takes",
            report.delivered, report.attempted
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::{RecordingSink, HEADER_TEXT};
    use crate::pipeline::types::Take;

    fn take(title: &str) -> Take {
        Take {
            title: title.to_string(),
            body: format!("{title} body"),
            source_url: "https://u1".to_string(),
            origin_url: "https://u2".to_string(),
            justification: "j".to_string(),
        }
    }

    #[tokio::test]
    async fn test_one_message_per_take_in_order() {
        let sink = Arc::new(RecordingSink::new());
        let publisher = Publisher::new(sink.clone());

        let report = publisher
            .publish(&TakeList::new(vec![take("one"), take("two")]))
            .await;

        assert_eq!(report.attempted, 2);
        assert_eq!(report.delivered, 2);
        assert!(report.failed.is_empty());

        let delivered = sink.delivered().await;
        assert_eq!(delivered.len(), 2);
        assert_eq!(delivered[0].blocks[0].text(), Some(HEADER_TEXT));
        assert_eq!(delivered[0].blocks[1].text(), Some("*one*"));
        assert_eq!(delivered[1].blocks[1].text(), Some("*two*"));
    }

    #[tokio::test]
    async fn test_failed_delivery_does_not_stop_the_rest() {
        let sink = Arc::new(RecordingSink::failing_on(&[0]));
        let publisher = Publisher::new(sink.clone());

        let report = publisher
            .publish(&TakeList::new(vec![take("one"), take("two"), take("three")]))
            .await;

        assert_eq!(report.attempted, 3);
        assert_eq!(report.delivered, 2);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, 0);
        assert_eq!(sink.attempts().await, 3);
    }

    #[tokio::test]
    async fn test_empty_list_sends_nothing() {
        let sink = Arc::new(RecordingSink::new());
        let report = Publisher::new(sink.clone()).publish(&TakeList::default()).await;
        assert_eq!(report, PublishReport::default());
        assert_eq!(sink.attempts().await, 0);
    }
}
