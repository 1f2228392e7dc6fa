#![forbid(unsafe_code)]

//! Deterministic program simulator for testing.
//!
//! `Simulator` runs a [`Model`] without threads. Background tasks either
//! run inline the moment they are issued ([`TaskMode::Immediate`]) or are
//! parked until the test calls [`Simulator::run_pending`]
//! ([`TaskMode::Deferred`]), which makes in-flight states observable.
//!
//! # Example
//!
//! ```ignore
//! let mut sim = Simulator::new(app);
//! sim.init();
//! sim.send(Msg::Submit);
//! assert!(sim.model().is_busy());
//! ```

use std::collections::VecDeque;

use crate::program::{Cmd, Model};

/// Record of a command that was executed during simulation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CmdRecord {
    None,
    /// Message fed back to the model.
    Msg,
    /// Batch of commands.
    Batch(usize),
    /// Log line emitted.
    Log(String),
    /// Background task issued, by name.
    Task(Option<String>),
}

/// When issued tasks run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskMode {
    /// Run each task as soon as it is issued.
    #[default]
    Immediate,
    /// Queue tasks until [`Simulator::run_pending`].
    Deferred,
}

type PendingTask<M> = Box<dyn FnOnce() -> M + Send>;

/// Deterministic driver for [`Model`] testing.
pub struct Simulator<M: Model> {
    model: M,
    mode: TaskMode,
    pending: VecDeque<PendingTask<M::Message>>,
    command_log: Vec<CmdRecord>,
    logs: Vec<String>,
    running: bool,
}

impl<M: Model> Simulator<M> {
    #[must_use]
    pub fn new(model: M) -> Self {
        Self::with_mode(model, TaskMode::Immediate)
    }

    #[must_use]
    pub fn with_mode(model: M, mode: TaskMode) -> Self {
        Self {
            model,
            mode,
            pending: VecDeque::new(),
            command_log: Vec::new(),
            logs: Vec::new(),
            running: true,
        }
    }

    /// Run [`Model::init`].
    pub fn init(&mut self) {
        let cmd = self.model.init();
        self.execute_cmd(cmd);
    }

    /// Deliver a message. Ignored after teardown.
    pub fn send(&mut self, msg: M::Message) {
        if !self.running {
            return;
        }
        let cmd = self.model.update(msg);
        self.execute_cmd(cmd);
    }

    /// Run every parked task, including tasks they issue. Returns how many ran.
    pub fn run_pending(&mut self) -> usize {
        let mut ran = 0;
        while let Some(task) = self.pending.pop_front() {
            ran += 1;
            let msg = task();
            self.send(msg);
        }
        ran
    }

    /// Number of parked tasks.
    #[must_use]
    pub fn pending_tasks(&self) -> usize {
        self.pending.len()
    }

    /// Tear the model down; parked tasks are discarded unrun.
    pub fn teardown(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        self.pending.clear();
        self.model.teardown();
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    #[must_use]
    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut M {
        &mut self.model
    }

    #[must_use]
    pub fn logs(&self) -> &[String] {
        &self.logs
    }

    #[must_use]
    pub fn command_log(&self) -> &[CmdRecord] {
        &self.command_log
    }

    /// Number of tasks issued so far.
    #[must_use]
    pub fn tasks_issued(&self) -> usize {
        self.command_log
            .iter()
            .filter(|record| matches!(record, CmdRecord::Task(_)))
            .count()
    }

    fn execute_cmd(&mut self, cmd: Cmd<M::Message>) {
        match cmd {
            Cmd::None => self.command_log.push(CmdRecord::None),
            Cmd::Msg(m) => {
                self.command_log.push(CmdRecord::Msg);
                self.send(m);
            }
            Cmd::Batch(cmds) => {
                self.command_log.push(CmdRecord::Batch(cmds.len()));
                for c in cmds {
                    self.execute_cmd(c);
                }
            }
            Cmd::Log(text) => {
                self.command_log.push(CmdRecord::Log(text.clone()));
                self.logs.push(text);
            }
            Cmd::Task(spec, f) => {
                self.command_log.push(CmdRecord::Task(spec.name));
                match self.mode {
                    TaskMode::Immediate => {
                        let msg = f();
                        self.send(msg);
                    }
                    TaskMode::Deferred => self.pending.push_back(f),
                }
            }
        }
    }
}
