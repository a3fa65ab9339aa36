//! Message loop driven by a scripted bot

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::watch;

use dalnoboy::application::errors::BotError;
use dalnoboy::application::messaging::keyboards;
use dalnoboy::application::messaging::{AdminDispatcher, MessageHandler};
use dalnoboy::application::services::{MessageService, Services};
use dalnoboy::domain::entities::{Message, Reply, ReplyKeyboard, User};
use dalnoboy::domain::traits::{Bot, BotInfo};
use dalnoboy::infrastructure::storage::InMemoryStore;

#[derive(Debug, Clone, PartialEq)]
struct Sent {
    chat_id: i64,
    text: String,
    keyboard: bool,
}

/// Yields the scripted batches, then requests shutdown.
struct ScriptedBot {
    batches: Mutex<VecDeque<Result<Vec<Message>, BotError>>>,
    sent: Arc<Mutex<Vec<Sent>>>,
    shutdown: watch::Sender<bool>,
}

#[async_trait]
impl Bot for ScriptedBot {
    async fn start(&self) -> Result<BotInfo, BotError> {
        Ok(BotInfo {
            id: "1".into(),
            name: "test".into(),
            username: "test_bot".into(),
        })
    }

    async fn next_messages(&self) -> Result<Vec<Message>, BotError> {
        let next = self.batches.lock().unwrap().pop_front();
        match next {
            Some(batch) => batch,
            None => {
                let _ = self.shutdown.send(true);
                Ok(Vec::new())
            }
        }
    }

    async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), BotError> {
        self.sent.lock().unwrap().push(Sent {
            chat_id,
            text: text.to_string(),
            keyboard: false,
        });
        Ok(())
    }

    async fn send_with_keyboard(&self, chat_id: i64, text: &str, _keyboard: &ReplyKeyboard) -> Result<(), BotError> {
        self.sent.lock().unwrap().push(Sent {
            chat_id,
            text: text.to_string(),
            keyboard: true,
        });
        Ok(())
    }
}

fn scripted(batches: Vec<Result<Vec<Message>, BotError>>) -> (ScriptedBot, Arc<Mutex<Vec<Sent>>>, watch::Receiver<bool>) {
    let (tx, rx) = watch::channel(false);
    let sent = Arc::new(Mutex::new(Vec::new()));
    let bot = ScriptedBot {
        batches: Mutex::new(batches.into()),
        sent: sent.clone(),
        shutdown: tx,
    };
    (bot, sent, rx)
}

fn admin() -> AdminDispatcher {
    let services = Services::new(Arc::new(InMemoryStore::with_cities(&["Москва"])));
    AdminDispatcher::new(services.orders, services.customers, services.drivers)
}

fn msg(chat_id: i64, text: &str) -> Message {
    Message::new(chat_id, User::new(chat_id), text)
}

#[tokio::test]
async fn replies_in_arrival_order_and_stops_on_shutdown() {
    let (bot, sent, rx) = scripted(vec![
        Ok(vec![msg(1, "/start"), msg(2, "/status")]),
        Err(BotError::Network("timeout".into())),
        Ok(vec![msg(1, "hello")]),
    ]);

    let service = MessageService::new("admin", bot, admin());
    tokio::time::timeout(std::time::Duration::from_secs(10), service.run(rx))
        .await
        .expect("loop exits after shutdown")
        .unwrap();

    let sent = sent.lock().unwrap();
    assert_eq!(sent.len(), 3);
    assert_eq!(sent[0].chat_id, 1);
    assert!(sent[0].keyboard);
    assert_eq!(sent[1].chat_id, 2);
    assert!(sent[1].text.contains("Orders total: 0"));
    assert!(sent[2].text.starts_with("Unknown command"));
}

/// Always answers with a long text and a keyboard.
struct LongReply;

impl MessageHandler for LongReply {
    fn handle(&self, _message: &Message) -> Reply {
        let text = (0..40).map(|i| format!("line number {}", i)).collect::<Vec<_>>().join("\n");
        Reply::text(text).with_keyboard(keyboards::admin_main_menu())
    }
}

#[tokio::test]
async fn long_reply_is_split_with_keyboard_on_first_part() {
    let (bot, sent, _rx) = scripted(Vec::new());
    let service = MessageService::new("admin", bot, LongReply).with_max_message_len(100);

    let reply = service.process(msg(5, "anything")).await.unwrap();
    service.respond(5, &reply).await.unwrap();

    let sent = sent.lock().unwrap();
    assert!(sent.len() > 1);
    assert!(sent[0].keyboard);
    assert!(sent[1..].iter().all(|s| !s.keyboard));
    assert!(sent.iter().all(|s| s.text.chars().count() <= 100));

    let joined = sent.iter().map(|s| s.text.as_str()).collect::<Vec<_>>().join("\n");
    assert_eq!(joined, reply.text);
}

#[tokio::test]
async fn already_signalled_shutdown_exits_immediately() {
    let (bot, sent, rx) = scripted(vec![Ok(vec![msg(1, "/start")])]);
    bot.shutdown.send(true).unwrap();
    let service = MessageService::new("admin", bot, admin());
    service.run(rx).await.unwrap();
    assert!(sent.lock().unwrap().is_empty());
}
