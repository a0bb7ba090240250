//! Scripted transport and connector shared by session and runner tests.

use std::{
    collections::VecDeque,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;

use crate::domain::{Connector, Delivery, Transport, TransportError};

pub(crate) const TOPIC: &str = "/topic/chat.room1";

#[derive(Clone, Default)]
pub(crate) struct Recorder {
    pub(crate) subscribed: Arc<Mutex<Vec<String>>>,
    pub(crate) published: Arc<Mutex<Vec<(String, String)>>>,
    pub(crate) closed: Arc<AtomicBool>,
}

impl Recorder {
    pub(crate) fn published_types(&self) -> Vec<String> {
        self.published
            .lock()
            .unwrap()
            .iter()
            .map(|(_, body)| {
                let value: serde_json::Value = serde_json::from_str(body).unwrap();
                value["type"].as_str().unwrap().to_string()
            })
            .collect()
    }
}

/// Replays scripted deliveries, then reports an abrupt close (or stays
/// silent when held open).
pub(crate) struct ScriptedTransport {
    recorder: Recorder,
    incoming: VecDeque<Result<Delivery, TransportError>>,
    echo: bool,
    fail_publish: bool,
    hold_open: bool,
}

impl ScriptedTransport {
    pub(crate) fn new(recorder: &Recorder) -> Self {
        Self {
            recorder: recorder.clone(),
            incoming: VecDeque::new(),
            echo: false,
            fail_publish: false,
            hold_open: false,
        }
    }

    pub(crate) fn held_open(mut self) -> Self {
        self.hold_open = true;
        self
    }

    pub(crate) fn echoing(mut self) -> Self {
        self.echo = true;
        self
    }

    pub(crate) fn failing_publish(mut self) -> Self {
        self.fail_publish = true;
        self
    }

    pub(crate) fn deliver(mut self, body: &str) -> Self {
        self.incoming.push_back(Ok(Delivery {
            destination: TOPIC.to_string(),
            body: body.to_string(),
        }));
        self
    }

    pub(crate) fn broker_error(mut self, message: &str) -> Self {
        self.incoming
            .push_back(Err(TransportError::Protocol(message.to_string())));
        self
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn subscribe(&mut self, destination: &str) -> Result<(), TransportError> {
        self.recorder
            .subscribed
            .lock()
            .unwrap()
            .push(destination.to_string());
        Ok(())
    }

    async fn publish(&mut self, destination: &str, body: String) -> Result<(), TransportError> {
        if self.fail_publish {
            return Err(TransportError::Closed);
        }
        self.recorder
            .published
            .lock()
            .unwrap()
            .push((destination.to_string(), body.clone()));
        if self.echo {
            self.incoming.push_back(Ok(Delivery {
                destination: TOPIC.to_string(),
                body,
            }));
        }
        Ok(())
    }

    async fn recv(&mut self) -> Option<Result<Delivery, TransportError>> {
        if let Some(next) = self.incoming.pop_front() {
            return Some(next);
        }
        if self.hold_open {
            std::future::pending::<()>().await;
        }
        None
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.recorder.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Hands out prepared transports in order; fails once they run out.
pub(crate) struct ScriptedConnector<T> {
    pub(crate) transports: Mutex<VecDeque<Result<T, TransportError>>>,
    /// Number of `open` calls so far
    pub(crate) opened: AtomicUsize,
}

impl<T> ScriptedConnector<T> {
    pub(crate) fn new(transports: Vec<Result<T, TransportError>>) -> Self {
        Self {
            transports: Mutex::new(transports.into()),
            opened: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl<T: Transport + 'static> Connector for ScriptedConnector<T> {
    type Transport = T;

    async fn open(&self) -> Result<T, TransportError> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        let next = self.transports.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Err(TransportError::Connect("connection refused".to_string())))
    }
}
