#![allow(dead_code)]

use async_trait::async_trait;
use parley_dispatch::{DispatchConfig, DispatchCoordinator};
use parley_llm::{
    ChatCompletionBody, CompletionClient, ProviderClient, ProviderConfig, Sleeper, Transport,
    TransportError, TransportResponse,
};
use parley_persist::{
    CatalogAdmin, CatalogStore, ConversationTurn, HistoryStats, HistoryStore, MemoryStore,
    ModelProfile, PersistError,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub type Outcome = Result<TransportResponse, TransportError>;

/// Replays a fixed list of outcomes and records every body it was sent
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Outcome>>,
    pub bodies: Mutex<Vec<ChatCompletionBody>>,
}

impl ScriptedTransport {
    pub fn new(script: Vec<Outcome>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            bodies: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.bodies.lock().unwrap().len()
    }

    pub fn last_body(&self) -> ChatCompletionBody {
        self.bodies.lock().unwrap().last().cloned().expect("no request sent")
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn post(
        &self,
        _url: &str,
        _api_key: &str,
        body: &ChatCompletionBody,
        _timeout: Duration,
    ) -> Outcome {
        self.bodies.lock().unwrap().push(body.clone());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .expect("transport called more times than scripted")
    }
}

/// Transport whose attempts never answer. With `honor_timeout` each attempt
/// waits out its budget and reports a timeout; without it, it hangs forever.
pub struct StalledTransport {
    honor_timeout: bool,
    attempts: AtomicUsize,
}

impl StalledTransport {
    pub fn hanging() -> Arc<Self> {
        Arc::new(Self {
            honor_timeout: false,
            attempts: AtomicUsize::new(0),
        })
    }

    pub fn timing_out() -> Arc<Self> {
        Arc::new(Self {
            honor_timeout: true,
            attempts: AtomicUsize::new(0),
        })
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for StalledTransport {
    async fn post(
        &self,
        _url: &str,
        _api_key: &str,
        _body: &ChatCompletionBody,
        timeout: Duration,
    ) -> Outcome {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.honor_timeout {
            tokio::time::sleep(timeout).await;
            Err(TransportError::Timeout)
        } else {
            std::future::pending().await
        }
    }
}

#[derive(Default)]
pub struct RecordingSleeper {
    pub sleeps: Mutex<Vec<Duration>>,
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
    }
}

impl RecordingSleeper {
    pub fn recorded(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

/// History store that rejects every call
pub struct BrokenHistory;

#[async_trait]
impl HistoryStore for BrokenHistory {
    async fn insert_turn(&self, _turn: ConversationTurn) -> parley_persist::Result<()> {
        Err(PersistError::Connection("disk full".to_string()))
    }

    async fn recent_turns(
        &self,
        _user_id: &str,
        _limit: usize,
    ) -> parley_persist::Result<Vec<ConversationTurn>> {
        Err(PersistError::Connection("disk full".to_string()))
    }

    async fn delete_turns(&self, _user_id: &str) -> parley_persist::Result<usize> {
        Err(PersistError::Connection("disk full".to_string()))
    }

    async fn turn_counts(&self, _user_id: &str) -> parley_persist::Result<HistoryStats> {
        Err(PersistError::Connection("disk full".to_string()))
    }
}

pub fn status(code: u16) -> Outcome {
    Ok(TransportResponse {
        status: code,
        body: String::new(),
    })
}

pub fn completion(text: &str) -> Outcome {
    Ok(TransportResponse {
        status: 200,
        body: serde_json::json!({ "choices": [{ "message": { "content": text } }] }).to_string(),
    })
}

/// A running coordinator plus the handles tests inspect
pub struct Harness {
    pub coordinator: DispatchCoordinator,
    pub store: MemoryStore,
    pub transport: Arc<ScriptedTransport>,
    pub sleeper: Arc<RecordingSleeper>,
}

impl Harness {
    /// Coordinator over a seeded memory store:
    /// "Llama" (default family), "GPT-4o" (vision), "R1" (reasoning, restricted),
    /// "Retired" (disabled). Alice is on the allow-list.
    pub async fn new(script: Vec<Outcome>) -> Self {
        let store = seeded_store().await;
        Self::with_history(store.clone(), Arc::new(store), script)
    }

    pub fn with_history(
        store: MemoryStore,
        history: Arc<dyn HistoryStore>,
        script: Vec<Outcome>,
    ) -> Self {
        let transport = ScriptedTransport::new(script);
        let sleeper = Arc::new(RecordingSleeper::default());
        let client = ProviderClient::with_transport(
            ProviderConfig::default(),
            transport.clone(),
            sleeper.clone(),
        );

        let catalog: Arc<dyn CatalogStore> = Arc::new(store.clone());
        let coordinator = DispatchCoordinator::builder()
            .catalog_store(catalog)
            .history_store(history)
            .client(Arc::new(client))
            .config(DispatchConfig::default())
            .build()
            .unwrap();

        Self {
            coordinator,
            store,
            transport,
            sleeper,
        }
    }

    pub async fn stats(&self, user_id: &str) -> HistoryStats {
        self.store.turn_counts(user_id).await.unwrap()
    }
}

/// Coordinator over the seeded store with a caller-supplied client and
/// default dispatch settings
pub async fn coordinator_with(
    client: Arc<dyn CompletionClient>,
) -> (MemoryStore, DispatchCoordinator) {
    let store = seeded_store().await;
    let coordinator = DispatchCoordinator::builder()
        .catalog_store(Arc::new(store.clone()))
        .history_store(Arc::new(store.clone()))
        .client(client)
        .config(DispatchConfig::default())
        .build()
        .unwrap();
    (store, coordinator)
}

pub async fn seeded_store() -> MemoryStore {
    let store = MemoryStore::new();
    store
        .upsert_model(ModelProfile::new("Llama", "meta-llama/llama-3-8b-instruct", "sk-llama"))
        .await
        .unwrap();
    store
        .upsert_model(ModelProfile::new("GPT-4o", "openai/gpt-4o", "sk-openai"))
        .await
        .unwrap();
    store
        .upsert_model(ModelProfile::new("R1", "deepseek/deepseek-r1", "sk-deepseek").restricted())
        .await
        .unwrap();
    store
        .upsert_model(ModelProfile::new("Retired", "openai/gpt-3.5-turbo", "sk-old").disabled())
        .await
        .unwrap();
    store.allow("Alice").await.unwrap();
    store
}
