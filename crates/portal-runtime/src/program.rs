#![forbid(unsafe_code)]

//! Elm-style program runtime.
//!
//! A [`Model`] owns all application state and changes it only in
//! [`Model::update`]. Side effects are returned as [`Cmd`] values and run by
//! the [`Program`]: background tasks execute on worker threads and their
//! results come back through a channel as ordinary messages, so every state
//! change happens on the owner thread in arrival order.
//!
//! # Example
//!
//! ```ignore
//! let mut program = Program::new(app)?;
//! program.dispatch(Msg::Submit)?;
//! program.wait_idle(Duration::from_secs(30))?;
//! program.teardown();
//! ```

use std::fmt;
use std::io;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// The application state machine driven by a [`Program`].
pub trait Model: Sized {
    /// Messages the model reacts to. Task results are messages too.
    type Message: Send + 'static;

    /// Called once when the program starts.
    fn init(&mut self) -> Cmd<Self::Message> {
        Cmd::none()
    }

    /// Apply one message and return follow-up effects.
    fn update(&mut self, msg: Self::Message) -> Cmd<Self::Message>;

    /// Release subscriptions and other resources. Called once.
    fn teardown(&mut self) {}
}

/// Metadata for a background task.
#[derive(Debug, Clone, Default)]
pub struct TaskSpec {
    /// Name given to the worker thread and used in logs.
    pub name: Option<String>,
}

impl TaskSpec {
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
        }
    }
}

/// Side effect requested by [`Model::update`].
pub enum Cmd<M> {
    /// No operation.
    None,
    /// Execute several commands in order.
    Batch(Vec<Cmd<M>>),
    /// Feed a message straight back into the model.
    Msg(M),
    /// Emit an informational log line.
    Log(String),
    /// Run a blocking closure on a worker thread; its result is delivered
    /// back to the model as a message.
    Task(TaskSpec, Box<dyn FnOnce() -> M + Send>),
}

impl<M> Default for Cmd<M> {
    fn default() -> Self {
        Self::None
    }
}

impl<M: fmt::Debug> fmt::Debug for Cmd<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Batch(cmds) => f.debug_tuple("Batch").field(cmds).finish(),
            Self::Msg(m) => f.debug_tuple("Msg").field(m).finish(),
            Self::Log(s) => f.debug_tuple("Log").field(s).finish(),
            Self::Task(spec, _) => f.debug_struct("Task").field("spec", spec).finish(),
        }
    }
}

impl<M> Cmd<M> {
    #[inline]
    pub fn none() -> Self {
        Self::None
    }

    #[inline]
    pub fn msg(m: M) -> Self {
        Self::Msg(m)
    }

    #[inline]
    pub fn log(msg: impl Into<String>) -> Self {
        Self::Log(msg.into())
    }

    /// Combine commands, collapsing empty and single-element batches.
    pub fn batch(cmds: Vec<Self>) -> Self {
        let mut cmds: Vec<Self> = cmds
            .into_iter()
            .filter(|cmd| !matches!(cmd, Self::None))
            .collect();
        match cmds.len() {
            0 => Self::None,
            1 => cmds.pop().unwrap_or(Self::None),
            _ => Self::Batch(cmds),
        }
    }

    /// Run `f` on a worker thread.
    pub fn task<F>(f: F) -> Self
    where
        F: FnOnce() -> M + Send + 'static,
    {
        Self::Task(TaskSpec::default(), Box::new(f))
    }

    /// Run `f` on a worker thread with explicit metadata.
    pub fn task_with_spec<F>(spec: TaskSpec, f: F) -> Self
    where
        F: FnOnce() -> M + Send + 'static,
    {
        Self::Task(spec, Box::new(f))
    }

    /// Stable name for tracing.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Batch(_) => "Batch",
            Self::Msg(_) => "Msg",
            Self::Log(_) => "Log",
            Self::Task(..) => "Task",
        }
    }
}

/// Threaded runtime for a [`Model`].
pub struct Program<M: Model> {
    model: M,
    task_sender: Sender<M::Message>,
    task_receiver: Option<Receiver<M::Message>>,
    task_handles: Vec<JoinHandle<()>>,
    in_flight: usize,
    running: bool,
}

impl<M: Model> Program<M> {
    /// Start the program: runs [`Model::init`] and its commands.
    pub fn new(model: M) -> io::Result<Self> {
        let (task_sender, task_receiver) = mpsc::channel();
        let mut program = Self {
            model,
            task_sender,
            task_receiver: Some(task_receiver),
            task_handles: Vec::new(),
            in_flight: 0,
            running: true,
        };
        let cmd = program.model.init();
        program.execute_cmd(cmd)?;
        Ok(program)
    }

    /// Deliver one message to the model. Ignored after teardown.
    pub fn dispatch(&mut self, msg: M::Message) -> io::Result<()> {
        if !self.running {
            tracing::trace!("message dropped after teardown");
            return Ok(());
        }
        let cmd = self.model.update(msg);
        self.execute_cmd(cmd)
    }

    /// Deliver every task result that has already arrived.
    ///
    /// Returns the number of results processed.
    pub fn poll(&mut self) -> io::Result<usize> {
        let mut processed = 0;
        while let Some(msg) = self.task_receiver.as_ref().and_then(|rx| rx.try_recv().ok()) {
            self.in_flight = self.in_flight.saturating_sub(1);
            processed += 1;
            self.dispatch(msg)?;
        }
        self.reap_finished_tasks();
        Ok(processed)
    }

    /// Block until no task is in flight or `timeout` elapses.
    ///
    /// Returns `true` when the program went idle.
    pub fn wait_idle(&mut self, timeout: Duration) -> io::Result<bool> {
        let deadline = Instant::now() + timeout;
        while self.running && self.in_flight > 0 {
            let now = Instant::now();
            if now >= deadline {
                return Ok(false);
            }
            let slice = (deadline - now).min(Duration::from_millis(50));
            let received = match self.task_receiver.as_ref() {
                Some(rx) => rx.recv_timeout(slice),
                None => return Ok(true),
            };
            match received {
                Ok(msg) => {
                    self.in_flight = self.in_flight.saturating_sub(1);
                    self.dispatch(msg)?;
                }
                Err(RecvTimeoutError::Timeout) => self.reap_finished_tasks(),
                Err(RecvTimeoutError::Disconnected) => return Ok(true),
            }
        }
        self.reap_finished_tasks();
        Ok(self.in_flight == 0)
    }

    /// Tear the model down and stop accepting results.
    ///
    /// Tasks still running finish on their own; their results are dropped.
    pub fn teardown(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        self.model.teardown();
        self.task_receiver = None;
        if self.in_flight > 0 {
            tracing::debug!(in_flight = self.in_flight, "discarding in-flight task results");
        }
        self.in_flight = 0;
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Tasks started whose result has not been delivered.
    #[must_use]
    pub fn pending_tasks(&self) -> usize {
        self.in_flight
    }

    #[must_use]
    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut M {
        &mut self.model
    }

    fn execute_cmd(&mut self, cmd: Cmd<M::Message>) -> io::Result<()> {
        match cmd {
            Cmd::None => {}
            Cmd::Msg(m) => self.dispatch(m)?,
            Cmd::Batch(cmds) => {
                for c in cmds {
                    self.execute_cmd(c)?;
                }
            }
            Cmd::Log(text) => tracing::info!(target: "portal::cmd", "{text}"),
            Cmd::Task(spec, f) => {
                if !self.running {
                    return Ok(());
                }
                let sender = self.task_sender.clone();
                let name = spec.name.unwrap_or_else(|| "portal-task".to_string());
                let handle = thread::Builder::new().name(name).spawn(move || {
                    let msg = f();
                    let _ = sender.send(msg);
                })?;
                self.in_flight += 1;
                self.task_handles.push(handle);
            }
        }
        Ok(())
    }

    fn reap_finished_tasks(&mut self) {
        if self.task_handles.is_empty() {
            return;
        }
        let mut remaining = Vec::with_capacity(self.task_handles.len());
        for handle in self.task_handles.drain(..) {
            if !handle.is_finished() {
                remaining.push(handle);
                continue;
            }
            let thread_name = handle.thread().name().unwrap_or("unnamed").to_string();
            if let Err(payload) = handle.join() {
                let msg = if let Some(s) = payload.downcast_ref::<&str>() {
                    (*s).to_owned()
                } else if let Some(s) = payload.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "unknown panic payload".to_owned()
                };
                tracing::error!(thread = %thread_name, "background task panicked: {msg}");
                self.in_flight = self.in_flight.saturating_sub(1);
            }
        }
        self.task_handles = remaining;
    }
}

impl<M: Model> Drop for Program<M> {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl<M: Model + fmt::Debug> fmt::Debug for Program<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Program")
            .field("model", &self.model)
            .field("in_flight", &self.in_flight)
            .field("running", &self.running)
            .finish()
    }
}
