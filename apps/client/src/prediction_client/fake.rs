//! Scripted `PredictionService` for controller tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use super::PredictionService;
use crate::errors::ClientError;
use crate::models::BirthDetails;

#[derive(Debug, Clone, PartialEq)]
pub enum Recorded {
    Predict(BirthDetails),
    Chat(String),
}

/// Holds a request open until the test releases it.
#[derive(Default)]
pub struct Gate {
    pub entered: Notify,
    pub release: Notify,
}

#[derive(Default)]
pub struct ScriptedService {
    predictions: Mutex<VecDeque<Result<String, ClientError>>>,
    replies: Mutex<VecDeque<Result<String, ClientError>>>,
    requests: Mutex<Vec<Recorded>>,
    gate: Option<Arc<Gate>>,
}

impl ScriptedService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gated(gate: Arc<Gate>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::default()
        }
    }

    pub fn push_prediction(&self, result: Result<String, ClientError>) {
        self.predictions.lock().unwrap().push_back(result);
    }

    pub fn push_reply(&self, result: Result<String, ClientError>) {
        self.replies.lock().unwrap().push_back(result);
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    async fn wait_at_gate(&self) {
        if let Some(gate) = &self.gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }
    }
}

fn unscripted() -> Result<String, ClientError> {
    Err(ClientError::MalformedResponse("no scripted response".to_string()))
}

#[async_trait]
impl PredictionService for ScriptedService {
    async fn predict(&self, details: &BirthDetails) -> Result<String, ClientError> {
        self.requests
            .lock()
            .unwrap()
            .push(Recorded::Predict(details.clone()));
        self.wait_at_gate().await;
        let next = self.predictions.lock().unwrap().pop_front();
        next.unwrap_or_else(unscripted)
    }

    async fn chat(&self, message: &str) -> Result<String, ClientError> {
        self.requests
            .lock()
            .unwrap()
            .push(Recorded::Chat(message.to_string()));
        self.wait_at_gate().await;
        let next = self.replies.lock().unwrap().pop_front();
        next.unwrap_or_else(unscripted)
    }
}
