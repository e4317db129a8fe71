//! Dedicated-thread engine access (§5 option (a)): a `MatchingEngine` lives on
//! its own thread and callers submit commands through a bounded `crossbeam`
//! channel instead of sharing the engine behind a lock.
//!
//! No direct counterpart in the source, which is single-threaded end to end;
//! this is the concurrency seam the specification leaves as an open option,
//! filled in the style `crypto-zero-apex-engine`'s actor-per-core workers use.

use std::thread::{self, JoinHandle};

use crossbeam::channel::{bounded, Sender};

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::ids::OrderId;
use crate::matching::{MatchingEngine, OrderResult};
use crate::order::NewOrderRequest;

enum Command {
    Submit {
        request: NewOrderRequest,
        reply: Sender<Result<OrderResult, EngineError>>,
    },
    Cancel {
        symbol: String,
        order_id: OrderId,
        reply: Sender<bool>,
    },
    Shutdown,
}

/// A cheaply-cloneable handle to a `MatchingEngine` running on its own
/// thread. Every clone submits to the same engine; commands are processed one
/// at a time off the bounded queue, preserving single-writer semantics
/// without a lock on the hot path.
#[derive(Clone)]
pub struct EngineHandle {
    commands: Sender<Command>,
}

/// Join guard for the worker thread spawned by [`EngineHandle::spawn`].
pub struct EngineWorker {
    join_handle: JoinHandle<()>,
}

impl EngineHandle {
    /// Spawn the worker thread and return a handle plus its join guard. The
    /// command channel's capacity is `config.order_queue_size`; a caller that
    /// outpaces the worker blocks on `submit`/`cancel` rather than the queue
    /// growing without bound.
    pub fn spawn(config: EngineConfig) -> (Self, EngineWorker) {
        let (tx, rx) = bounded::<Command>(config.order_queue_size);
        let join_handle = thread::spawn(move || {
            let mut engine = MatchingEngine::new(config);
            for command in rx {
                match command {
                    Command::Submit { request, reply } => {
                        let _ = reply.send(engine.process_order(request));
                    }
                    Command::Cancel {
                        symbol,
                        order_id,
                        reply,
                    } => {
                        let _ = reply.send(engine.cancel_order(&symbol, &order_id));
                    }
                    Command::Shutdown => break,
                }
            }
        });
        (Self { commands: tx }, EngineWorker { join_handle })
    }

    /// Submit an order and block the calling thread until the worker
    /// processes it. The blocking happens here, on the caller; the matching
    /// thread itself never waits on anything.
    pub fn submit(&self, request: NewOrderRequest) -> Result<OrderResult, EngineError> {
        let (reply_tx, reply_rx) = bounded(1);
        self.commands
            .send(Command::Submit {
                request,
                reply: reply_tx,
            })
            .expect("worker thread outlives every handle clone");
        reply_rx
            .recv()
            .expect("worker replies before the command is dropped")
    }

    pub fn cancel(&self, symbol: impl Into<String>, order_id: OrderId) -> bool {
        let (reply_tx, reply_rx) = bounded(1);
        self.commands
            .send(Command::Cancel {
                symbol: symbol.into(),
                order_id,
                reply: reply_tx,
            })
            .expect("worker thread outlives every handle clone");
        reply_rx
            .recv()
            .expect("worker replies before the command is dropped")
    }

    /// Ask the worker thread to stop accepting commands once its queue
    /// drains. Does not itself wait for the thread to exit; call
    /// [`EngineWorker::join`] for that.
    pub fn shutdown(&self) {
        let _ = self.commands.send(Command::Shutdown);
    }
}

impl EngineWorker {
    pub fn join(self) -> thread::Result<()> {
        self.join_handle.join()
    }
}
