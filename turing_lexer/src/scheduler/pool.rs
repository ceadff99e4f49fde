//! Fixed worker pool with round-robin chunk assignment
//!
//! Worker `w` owns chunks `w, w + W, w + 2W, ..`, so no shared queue or lock
//! is needed. Results come back over an `mpsc` channel and are slotted by
//! chunk id. A shared flag lets an aborting run stop idle workers early.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::thread;
use std::time::Instant;

use crate::logging::{self, codes, RunContext};
use crate::{log_debug, log_performance};

use super::chunk::Chunk;
use super::reassembler::{Reassembler, Reassembly};
use super::worker::{ChunkWorker, WorkerFault, WorkerResult};
use super::{FailurePolicy, SchedulerError};

type Message = Result<WorkerResult, WorkerFault>;

pub struct WorkerPool<'a> {
    workers: usize,
    policy: FailurePolicy,
    label: &'a str,
}

impl<'a> WorkerPool<'a> {
    pub fn new(workers: usize, policy: FailurePolicy, label: &'a str) -> Self {
        Self {
            workers: workers.max(1),
            policy,
            label,
        }
    }

    /// Classify every chunk and reassemble in id order.
    ///
    /// `make_worker` runs once on each worker thread.
    pub fn run<W, F>(&self, source: &str, chunks: Vec<Chunk>, make_worker: F) -> Result<Reassembly, SchedulerError>
    where
        W: ChunkWorker,
        F: Fn(usize) -> W + Sync,
    {
        let mut reassembler = Reassembler::new(chunks.iter().map(Chunk::range).collect(), self.policy);
        if chunks.is_empty() {
            return reassembler.finish(source);
        }

        let workers = self.workers.min(chunks.len());
        let mut queues: Vec<Vec<Chunk>> = (0..workers).map(|_| Vec::new()).collect();
        for chunk in chunks {
            queues[chunk.id % workers].push(chunk);
        }

        let cancelled = AtomicBool::new(false);
        let (sender, receiver) = mpsc::channel::<Message>();

        thread::scope(|scope| {
            let mut handles = Vec::with_capacity(workers);
            for (worker_id, queue) in queues.into_iter().enumerate() {
                let sender = sender.clone();
                let cancelled = &cancelled;
                let make_worker = &make_worker;
                let policy = self.policy;
                let label = self.label;

                handles.push(scope.spawn(move || {
                    let mut worker = make_worker(worker_id);
                    for chunk in queue {
                        if cancelled.load(Ordering::Acquire) {
                            break;
                        }
                        let context = RunContext::for_chunk(label, worker_id, chunk.id);
                        let message = logging::with_run_context(context, || {
                            run_chunk(&mut worker, worker_id, chunk)
                        });
                        if message.is_err() && policy == FailurePolicy::AbortRun {
                            cancelled.store(true, Ordering::Release);
                        }
                        if sender.send(message).is_err() {
                            break;
                        }
                    }
                }));
            }
            drop(sender);

            let mut outcome = Ok(());
            for message in receiver.iter() {
                if let Err(err) = reassembler.accept(message) {
                    cancelled.store(true, Ordering::Release);
                    outcome = Err(err);
                    break;
                }
                if reassembler.is_complete() {
                    break;
                }
            }
            // completed results are dropped with the receiver on abort
            drop(receiver);

            for (worker_id, handle) in handles.into_iter().enumerate() {
                if let Err(payload) = handle.join() {
                    if outcome.is_ok() {
                        outcome = Err(SchedulerError::WorkerPanic {
                            worker_id,
                            message: panic_message(payload.as_ref()),
                        });
                    }
                }
            }
            outcome
        })?;

        if !reassembler.is_complete() {
            return Err(SchedulerError::ChannelClosed {
                received: reassembler.received(),
                expected: reassembler.expected(),
            });
        }
        reassembler.finish(source)
    }
}

fn run_chunk<W: ChunkWorker>(worker: &mut W, worker_id: usize, chunk: Chunk) -> Message {
    let chunk_id = chunk.id;
    let lexemes = chunk.len();
    let started = Instant::now();

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| worker.process(chunk)));
    let elapsed = started.elapsed();

    match outcome {
        Ok(Ok(output)) => {
            log_performance!(codes::success::CHUNK_COMPLETE, "Chunk classified",
                duration = elapsed,
                "lexemes" => lexemes,
                "tokens" => output.tokens.len()
            );
            Ok(WorkerResult::new(chunk_id, worker_id, lexemes, output, elapsed))
        }
        Ok(Err(message)) => Err(WorkerFault {
            chunk_id,
            worker_id,
            message,
            panicked: false,
        }),
        Err(payload) => {
            log_debug!("Worker panic caught", "chunk" => chunk_id);
            Err(WorkerFault {
                chunk_id,
                worker_id,
                message: panic_message(payload.as_ref()),
                panicked: true,
            })
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "worker panicked".to_string()
    }
}
