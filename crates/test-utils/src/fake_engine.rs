use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use scripthost::config::Configuration;
use scripthost::engine::{Engine, Invocation, InvocationStatus, StopSignal, Target};
use scripthost::pipeline::{PipelineItem, PipelineReader, PipelineWriter};
use tokio::sync::Notify;

/// What a fake invocation does when run.
#[derive(Debug, Clone)]
pub enum Behaviour {
    /// Append these items to the output channel, then finish with `status`.
    Emit(Vec<PipelineItem>, InvocationStatus),
    /// Copy every input item to the output until the input completes (or a
    /// stop is requested).
    EchoInput,
    /// Notify `started`, wait for a stop request, then finish with `status`.
    WaitForStop(InvocationStatus),
}

/// Everything observed about one finished fake invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationRecord {
    pub target: Option<Target>,
    pub args: Vec<String>,
    pub input: Vec<PipelineItem>,
    pub status: InvocationStatus,
}

type BehaviourFn = dyn Fn(&Target, &[String]) -> Behaviour + Send + Sync;

/// A fake engine that:
/// - records every invocation it runs (target, args, consumed input, status)
/// - decides per invocation what to do via a behaviour function.
#[derive(Clone)]
pub struct FakeEngine {
    records: Arc<Mutex<Vec<InvocationRecord>>>,
    behaviour: Arc<BehaviourFn>,
    started: Arc<Notify>,
    created: Arc<Mutex<Vec<Arc<Configuration>>>>,
}

impl FakeEngine {
    pub fn new<F>(behaviour: F) -> Self
    where
        F: Fn(&Target, &[String]) -> Behaviour + Send + Sync + 'static,
    {
        Self {
            records: Arc::new(Mutex::new(Vec::new())),
            behaviour: Arc::new(behaviour),
            started: Arc::new(Notify::new()),
            created: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn always(behaviour: Behaviour) -> Self {
        Self::new(move |_, _| behaviour.clone())
    }

    pub fn records(&self) -> Vec<InvocationRecord> {
        self.records.lock().unwrap().clone()
    }

    /// Configurations handed to `create`, in order.
    pub fn configs(&self) -> Vec<Arc<Configuration>> {
        self.created.lock().unwrap().clone()
    }

    /// Fires once per `WaitForStop` invocation, after it is running.
    pub fn started(&self) -> Arc<Notify> {
        Arc::clone(&self.started)
    }
}

impl Engine for FakeEngine {
    type Invocation = FakeInvocation;

    fn create(&self, config: Arc<Configuration>) -> FakeInvocation {
        self.created.lock().unwrap().push(config);
        FakeInvocation {
            engine: self.clone(),
            target: None,
            args: Vec::new(),
            stop: StopSignal::new(),
        }
    }
}

pub struct FakeInvocation {
    engine: FakeEngine,
    target: Option<Target>,
    args: Vec<String>,
    stop: Arc<StopSignal>,
}

impl Invocation for FakeInvocation {
    fn set_script(&mut self, text: String) {
        self.target = Some(Target::Script(text));
    }

    fn set_command(&mut self, name: String) {
        self.target = Some(Target::Command(name));
    }

    fn add_argument(&mut self, value: String) {
        self.args.push(value);
    }

    fn stop_signal(&self) -> &Arc<StopSignal> {
        &self.stop
    }

    fn run(
        &mut self,
        mut input: PipelineReader,
        output: PipelineWriter,
    ) -> Pin<Box<dyn Future<Output = InvocationStatus> + Send + '_>> {
        Box::pin(async move {
            let behaviour = match &self.target {
                Some(target) => (self.engine.behaviour)(target, &self.args),
                None => Behaviour::Emit(vec![], InvocationStatus::Failed),
            };

            let mut consumed = Vec::new();
            let mut stop = self.stop.subscribe();

            let status = match behaviour {
                Behaviour::Emit(items, status) => {
                    for item in items {
                        let _ = output.send(item).await;
                    }
                    status
                }
                Behaviour::EchoInput => loop {
                    tokio::select! {
                        biased;
                        _ = stop.requested() => break InvocationStatus::Stopped,
                        item = input.recv() => match item {
                            Some(item) => {
                                consumed.push(item.clone());
                                let _ = output.send(item).await;
                            }
                            None => break InvocationStatus::Completed,
                        },
                    }
                },
                Behaviour::WaitForStop(status) => {
                    self.engine.started.notify_one();
                    stop.requested().await;
                    status
                }
            };

            self.engine.records.lock().unwrap().push(InvocationRecord {
                target: self.target.clone(),
                args: self.args.clone(),
                input: consumed,
                status,
            });
            status
        })
    }
}
