//! Append-only conversation transcript.

use serde::{Deserialize, Serialize};

use super::{Message, ToolResult};
use crate::batch::AggregateReport;

/// Ordered, append-only list of messages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn into_messages(self) -> Vec<Message> {
        self.messages
    }

    /// Append a finished batch: the announcement, then one tool message per
    /// record in input order.
    pub fn record_batch(&mut self, report: &AggregateReport) {
        self.push(Message::tool_calls(
            report.results().iter().map(|r| r.request.clone()),
        ));
        for record in report.results() {
            if let Some(result) = ToolResult::from_record(record) {
                self.push(Message::tool_result(result));
            }
        }
    }
}

impl From<Vec<Message>> for Transcript {
    fn from(messages: Vec<Message>) -> Self {
        Self { messages }
    }
}

impl<'a> IntoIterator for &'a Transcript {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}
