use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use tgsum::ai::{
    CANONICAL_FAILURE_MESSAGE, Summarizer, SummaryRequest, SummaryRequestBuilder, SummaryResult,
};
use tgsum::bot::{CommandHandlers, Messenger};
use tgsum::core::models::{
    Command, CommandInvocation, ConversationId, InboundMessage, Message, SentMessage,
};
use tgsum::errors::BotError;
use tgsum::store::MessageStore;

/// Records every outbound call in order.
#[derive(Default)]
struct RecordingMessenger {
    events: Mutex<Vec<Outbound>>,
    next_id: Mutex<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Outbound {
    Sent { id: i64, text: String },
    Deleted { id: i64 },
}

impl RecordingMessenger {
    fn events(&self) -> Vec<Outbound> {
        self.events.lock().unwrap().clone()
    }

    fn sent_texts(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Outbound::Sent { text, .. } => Some(text),
                Outbound::Deleted { .. } => None,
            })
            .collect()
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn send_text(
        &self,
        conversation_id: ConversationId,
        text: &str,
    ) -> Result<SentMessage, BotError> {
        let id = {
            let mut next = self.next_id.lock().unwrap();
            *next += 1;
            *next
        };
        self.events.lock().unwrap().push(Outbound::Sent {
            id,
            text: text.to_string(),
        });
        Ok(SentMessage {
            conversation_id,
            message_id: id,
        })
    }

    async fn delete_message(&self, message: SentMessage) -> Result<(), BotError> {
        self.events.lock().unwrap().push(Outbound::Deleted {
            id: message.message_id,
        });
        Ok(())
    }
}

/// Returns a canned result and remembers the requests it saw.
struct FakeSummarizer {
    result: SummaryResult,
    requests: Mutex<Vec<SummaryRequest>>,
}

impl FakeSummarizer {
    fn returning(result: SummaryResult) -> Self {
        Self {
            result,
            requests: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Summarizer for FakeSummarizer {
    async fn summarize(&self, request: &SummaryRequest) -> SummaryResult {
        self.requests.lock().unwrap().push(request.clone());
        self.result.clone()
    }
}

struct Harness {
    handlers: CommandHandlers,
    store: Arc<MessageStore>,
    messenger: Arc<RecordingMessenger>,
    summarizer: Arc<FakeSummarizer>,
}

const CHAT: ConversationId = ConversationId(-1001);

fn harness(result: SummaryResult) -> Harness {
    let store = Arc::new(MessageStore::new());
    let messenger = Arc::new(RecordingMessenger::default());
    let summarizer = Arc::new(FakeSummarizer::returning(result));
    let handlers = CommandHandlers::new(
        Arc::clone(&store),
        SummaryRequestBuilder::new("test-deployment"),
        summarizer.clone(),
        messenger.clone(),
    );
    Harness {
        handlers,
        store,
        messenger,
        summarizer,
    }
}

fn fill(store: &MessageStore, senders: &[&str]) {
    for (i, sender) in senders.iter().enumerate() {
        store.append(CHAT, Message::new(*sender, format!("text {i}"), Utc::now()));
    }
}

fn args(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| (*s).to_string()).collect()
}

#[tokio::test]
async fn test_summarize_rejects_non_numeric_count() {
    let h = harness(SummaryResult::Summary("unused".into()));
    fill(&h.store, &["a"; 20]);

    h.handlers
        .summarize(CHAT, "Team", &args(&["abc"]))
        .await
        .unwrap();

    assert_eq!(h.messenger.sent_texts(), vec!["Invalid number."]);
    assert_eq!(h.summarizer.calls(), 0);
    assert_eq!(h.store.len(CHAT), 20);
}

#[tokio::test]
async fn test_summarize_with_too_few_messages() {
    let h = harness(SummaryResult::Summary("unused".into()));
    fill(&h.store, &["a", "b", "c", "d"]);

    h.handlers
        .summarize(CHAT, "Team", &args(&["5"]))
        .await
        .unwrap();

    assert_eq!(h.messenger.sent_texts(), vec!["Not enough messages."]);
    assert_eq!(h.summarizer.calls(), 0);
}

#[tokio::test]
async fn test_summarize_with_exactly_five_messages_proceeds() {
    let h = harness(SummaryResult::Summary("kholase".into()));
    fill(&h.store, &["a", "b", "c", "d", "e"]);

    h.handlers
        .summarize(CHAT, "Team", &args(&["5"]))
        .await
        .unwrap();

    assert_eq!(h.summarizer.calls(), 1);
    assert_eq!(
        h.messenger.events(),
        vec![
            Outbound::Sent {
                id: 1,
                text: "Summarizing 5 messages...".into()
            },
            Outbound::Deleted { id: 1 },
            Outbound::Sent {
                id: 2,
                text: "Summary (5 messages):\n\nkholase".into()
            },
        ]
    );
}

#[tokio::test]
async fn test_summarize_defaults_to_fifty_most_recent() {
    let h = harness(SummaryResult::Summary("ok".into()));
    fill(&h.store, &["a"; 120]);

    h.handlers.summarize(CHAT, "Team", &[]).await.unwrap();

    let requests = h.summarizer.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].user_prompt.contains("Messages: 50\n"));
    assert!(requests[0].user_prompt.contains("a: text 70\n"));
    assert!(!requests[0].user_prompt.contains("a: text 69\n"));
    assert_eq!(requests[0].model, "test-deployment");
}

#[tokio::test]
async fn test_summarize_count_is_clamped_to_maximum() {
    let h = harness(SummaryResult::Summary("ok".into()));
    fill(&h.store, &["a"; 200]);

    h.handlers
        .summarize(CHAT, "Team", &args(&["1000"]))
        .await
        .unwrap();

    assert_eq!(h.messenger.sent_texts()[0], "Summarizing 200 messages...");
}

#[tokio::test]
async fn test_summarizer_failure_removes_notice_and_reports_generic_text_under_header() {
    let h = harness(SummaryResult::failed());
    fill(&h.store, &["a"; 10]);

    let outcome = h.handlers.summarize(CHAT, "Team", &[]).await;

    assert!(outcome.is_ok());
    let events = h.messenger.events();
    assert_eq!(events.len(), 3);
    assert_eq!(events[1], Outbound::Deleted { id: 1 });
    assert_eq!(
        events[2],
        Outbound::Sent {
            id: 2,
            text: format!("Summary (10 messages):\n\n{CANONICAL_FAILURE_MESSAGE}")
        }
    );
}

#[tokio::test]
async fn test_window_without_text_gets_canned_reply_and_no_call() {
    let h = harness(SummaryResult::Summary("unused".into()));
    for _ in 0..6 {
        h.store.append(CHAT, Message::new("a", "", Utc::now()));
    }

    h.handlers.summarize(CHAT, "Team", &[]).await.unwrap();

    assert_eq!(h.summarizer.calls(), 0);
    assert_eq!(
        h.messenger.sent_texts(),
        vec![
            "Summarizing 6 messages...",
            "Summary (6 messages):\n\nNo text messages."
        ]
    );
}

#[tokio::test]
async fn test_long_summary_is_sent_in_ordered_chunks() {
    let summary: String = (0..9000)
        .map(|i| char::from(b'a' + (i % 26) as u8))
        .collect();
    let h = harness(SummaryResult::Summary(summary.clone()));
    fill(&h.store, &["a"; 10]);

    h.handlers.summarize(CHAT, "Team", &[]).await.unwrap();

    let sent = h.messenger.sent_texts();
    let replies = &sent[1..];
    assert_eq!(replies.len(), 3);
    assert!(replies.iter().all(|r| r.chars().count() <= 4096));
    assert_eq!(
        replies.concat(),
        format!("Summary (10 messages):\n\n{summary}")
    );
}

#[tokio::test]
async fn test_clear_empties_history_and_confirms() {
    let h = harness(SummaryResult::Summary("unused".into()));
    fill(&h.store, &["a"; 15]);

    h.handlers.clear(CHAT).await.unwrap();

    assert!(h.store.is_empty(CHAT));
    assert_eq!(h.messenger.sent_texts(), vec!["Chat history cleared."]);
}

#[tokio::test]
async fn test_stats_reports_first_seen_sender_on_tie() {
    let h = harness(SummaryResult::Summary("unused".into()));
    fill(&h.store, &["B", "A", "A", "C", "B", "A", "B"]);

    h.handlers.stats(CHAT).await.unwrap();

    assert_eq!(
        h.messenger.sent_texts(),
        vec!["Messages: 7\nUsers: 3\nMost active: B"]
    );
}

#[tokio::test]
async fn test_stats_on_empty_history() {
    let h = harness(SummaryResult::Summary("unused".into()));

    h.handlers.stats(CHAT).await.unwrap();

    assert_eq!(
        h.messenger.sent_texts(),
        vec!["Messages: 0\nUsers: 0\nMost active: None"]
    );
}

#[tokio::test]
async fn test_handle_command_routes_start() {
    let h = harness(SummaryResult::Summary("unused".into()));
    let invocation = CommandInvocation {
        conversation_id: CHAT,
        conversation_display_name: "Team".into(),
        command: Command::Start,
        arguments: Vec::new(),
    };

    h.handlers.handle_command(&invocation).await.unwrap();

    let sent = h.messenger.sent_texts();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].contains("/summarize 100"));
    assert!(sent[0].contains("/stats"));
}

fn inbound(is_bot: bool) -> InboundMessage {
    InboundMessage {
        conversation_id: CHAT,
        sender_display_name: Some("Sara".into()),
        text: None,
        caption: Some("photo of the whiteboard".into()),
        timestamp: Utc::now(),
        is_automated_sender: is_bot,
    }
}

#[test]
fn test_ingest_stores_caption_and_skips_bots() {
    let h = harness(SummaryResult::Summary("unused".into()));

    assert!(!h.handlers.ingest(&inbound(true)));
    assert!(h.store.is_empty(CHAT));

    assert!(h.handlers.ingest(&inbound(false)));
    let stored = h.store.all(CHAT);
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].sender(), "Sara");
    assert_eq!(stored[0].text(), "photo of the whiteboard");
}

#[test]
fn test_ingest_defaults_sender_name() {
    let h = harness(SummaryResult::Summary("unused".into()));
    let mut event = inbound(false);
    event.sender_display_name = Some(String::new());
    event.text = Some("hello".into());

    h.handlers.ingest(&event);

    let stored = h.store.all(CHAT);
    assert_eq!(stored[0].sender(), "User");
    assert_eq!(stored[0].text(), "hello");
}
