use std::{thread, time::Duration};

use async_std::{
    channel::{bounded, unbounded, Receiver, Sender},
    future, task,
};
use bevy::prelude::*;

use crate::{
    call::{ScriptCall, ScriptCalls},
    host::{ScriptError, ScriptHost},
};

enum Request {
    Call {
        call: ScriptCall,
        done: Option<Sender<()>>,
    },
    Filter {
        call: ScriptCall,
        verdict: Sender<bool>,
    },
}

/// Thread owning a [`ScriptHost`]. The thread finishes once the
/// corresponding [`ScriptBridge`] is dropped.
pub struct ScriptService;

impl ScriptService {
    /// Spawns the service thread and waits until the host is created.
    ///
    /// # Arguments
    ///
    /// * `factory` - creates the host on the service thread.
    ///
    /// * `timeout` - maximum time the simulation waits for a filter verdict
    ///   or for delivery of an immediate call.
    pub fn spawn<H, F>(factory: F, timeout: Duration) -> Result<ScriptBridge, ScriptError>
    where
        H: ScriptHost + 'static,
        F: FnOnce() -> Result<H, ScriptError> + Send + 'static,
    {
        let (requests_sender, requests_receiver) = unbounded();
        let (started_sender, started_receiver) = bounded(1);

        thread::Builder::new()
            .name("script-service".to_owned())
            .spawn(move || match factory() {
                Ok(host) => {
                    task::block_on(async {
                        // The spawner waits for the result.
                        let _ = started_sender.send(Ok(())).await;
                        run(host, requests_receiver).await;
                    });
                }
                Err(error) => {
                    let _ = task::block_on(started_sender.send(Err(error.to_string())));
                }
            })?;

        match task::block_on(started_receiver.recv()) {
            Ok(Ok(())) => Ok(ScriptBridge {
                requests: requests_sender,
                queued: Vec::new(),
                timeout,
            }),
            Ok(Err(message)) => Err(ScriptError::Startup(message)),
            Err(_) => Err(ScriptError::Startup(
                "the service thread terminated".to_owned(),
            )),
        }
    }
}

async fn run<H: ScriptHost>(mut host: H, requests: Receiver<Request>) {
    info!("Starting script service...");

    while let Ok(request) = requests.recv().await {
        match request {
            Request::Call { call, done } => {
                if let Err(error) = host.call(&call) {
                    warn!("Script call {call} failed: {error}");
                }
                if let Some(done) = done {
                    // The caller might have given up waiting.
                    let _ = done.send(()).await;
                }
            }
            Request::Filter { call, verdict } => {
                let passed = host.call_with_return(&call).unwrap_or_else(|error| {
                    warn!("Script filter {call} failed: {error}");
                    false
                });
                let _ = verdict.send(passed).await;
            }
        }
    }

    info!("Script service finished.");
}

/// Simulation side of the script service.
#[derive(Resource)]
pub struct ScriptBridge {
    requests: Sender<Request>,
    queued: Vec<ScriptCall>,
    timeout: Duration,
}

impl ScriptBridge {
    /// Number of calls waiting for [`Self::flush`].
    pub fn queued(&self) -> usize {
        self.queued.len()
    }

    /// Sends all queued calls to the service, in the order they were queued.
    pub fn flush(&mut self) {
        for call in self.queued.drain(..) {
            if self.requests.try_send(Request::Call { call, done: None }).is_err() {
                warn!("Script service is closed, dropping queued calls.");
                break;
            }
        }
    }
}

impl ScriptCalls for ScriptBridge {
    fn filter(&self, call: ScriptCall) -> bool {
        let (verdict_sender, verdict_receiver) = bounded(1);
        let name = call.to_string();

        task::block_on(async {
            let request = Request::Filter {
                call,
                verdict: verdict_sender,
            };
            if self.requests.send(request).await.is_err() {
                warn!("Script service is closed, rejecting {name}.");
                return false;
            }

            match future::timeout(self.timeout, verdict_receiver.recv()).await {
                Ok(Ok(passed)) => passed,
                Ok(Err(_)) => {
                    warn!("Script service closed before evaluating {name}.");
                    false
                }
                Err(_) => {
                    warn!("Script filter {name} timed out, rejecting.");
                    false
                }
            }
        })
    }

    fn call_now(&mut self, call: ScriptCall) {
        // Requests are processed in order, queued calls go first.
        self.flush();

        let (done_sender, done_receiver) = bounded(1);
        let name = call.to_string();

        task::block_on(async {
            let request = Request::Call {
                call,
                done: Some(done_sender),
            };
            if self.requests.send(request).await.is_err() {
                warn!("Script service is closed, dropping {name}.");
                return;
            }
            if future::timeout(self.timeout, done_receiver.recv())
                .await
                .is_err()
            {
                warn!("Script call {name} did not finish in time.");
            }
        });
    }

    fn queue(&mut self, call: ScriptCall) {
        self.queued.push(call);
    }
}
