//! Synthetic reply engine — fixture logic, not inference.
//!
//! DESIGN
//! ======
//! Replies are chosen by case-insensitive keyword matching on the user's
//! text: report/table words produce a tabular payload from the report
//! fixtures, chart words produce a canned chart payload, anything else gets
//! the generic assistant template quoting the question. The trait seam
//! exists so the dispatcher never knows which engine is behind it.

use async_trait::async_trait;

use crate::chat::types::{AttachmentMeta, ChartKind, ChartPayload, ChartSeries, Payload};
use crate::services::reports;

/// Rows included in a synthetic tabular reply.
const REPLY_TABLE_ROWS: usize = 5;

/// Content and optional payload of a synthetic bot reply.
#[derive(Debug, Clone)]
pub struct Reply {
    pub content: String,
    pub payload: Option<Payload>,
}

/// Composes the bot side of a conversation.
#[async_trait]
pub trait ReplyEngine: Send + Sync {
    async fn compose(&self, text: &str, attachment: Option<&AttachmentMeta>) -> Reply;
}

/// The deterministic keyword-matching engine.
pub struct KeywordResponder;

#[async_trait]
impl ReplyEngine for KeywordResponder {
    async fn compose(&self, text: &str, attachment: Option<&AttachmentMeta>) -> Reply {
        compose_reply(text, attachment)
    }
}

fn compose_reply(text: &str, attachment: Option<&AttachmentMeta>) -> Reply {
    let lower = text.to_lowercase();

    if contains_any(&lower, &["report", "table"]) {
        return Reply {
            content: "Here is the group fare request data you asked for. \
                      Let me know if you want it filtered by sector, currency, or status."
                .into(),
            payload: Some(Payload::Table(reports::tabular_payload(REPLY_TABLE_ROWS))),
        };
    }

    if contains_any(&lower, &["chart", "graph", "trend"]) {
        return Reply {
            content: "Here is the passenger volume trend across the last six months."
                .into(),
            payload: Some(Payload::Chart(passenger_trend_chart())),
        };
    }

    if text.trim().is_empty() {
        if let Some(meta) = attachment {
            return Reply {
                content: format!(
                    "I received your file \"{}\". I can cross-reference it against \
                     flight schedules, passenger analytics, or route performance data.",
                    meta.filename
                ),
                payload: None,
            };
        }
    }

    Reply {
        content: format!(
            "I understand you're asking about: \"{}\". As your Airline Report \
             Assistant, I can help you with flight schedules, passenger analytics, \
             route performance, and operational reports. What specific information \
             would you like me to analyze?",
            text.trim()
        ),
        payload: None,
    }
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

fn passenger_trend_chart() -> ChartPayload {
    ChartPayload {
        kind: ChartKind::Line,
        labels: ["Oct", "Nov", "Dec", "Jan", "Feb", "Mar"]
            .into_iter()
            .map(String::from)
            .collect(),
        series: vec![
            ChartSeries {
                name: "Passengers (k)".into(),
                points: vec![182.0, 175.0, 210.0, 168.0, 171.0, 194.0],
            },
            ChartSeries {
                name: "Load factor (%)".into(),
                points: vec![81.2, 79.5, 88.1, 76.4, 77.9, 83.0],
            },
        ],
    }
}

#[cfg(test)]
#[path = "responder_test.rs"]
mod tests;
