use std::sync::Arc;
use std::time::Duration;

use scripthost::cancel::CancellationCoordinator;
use scripthost::engine::{InvocationStatus, Target};
use scripthost::errors::HostError;
use scripthost::modes::dispatch;
use scripthost::pipeline::PipelineItem;
use scripthost_test_utils::builders::ConfigurationBuilder;
use scripthost_test_utils::fake_engine::{Behaviour, FakeEngine};
use scripthost_test_utils::io::TestConsole;
use scripthost_test_utils::{init_tracing, with_timeout};
use tokio::io::AsyncWriteExt;

#[tokio::test]
async fn interrupt_mid_line_ends_repl_with_canceled() {
    init_tracing();
    let engine = FakeEngine::new(|target, _| match target {
        Target::Script(s) if s == "slow" => Behaviour::WaitForStop(InvocationStatus::Stopped),
        _ => Behaviour::Emit(vec![], InvocationStatus::Completed),
    });
    let started = engine.started();
    let coordinator = CancellationCoordinator::new();
    let mut io = TestConsole::with_stdin(b"fast\nslow\nnever\n");

    let task = {
        let engine = engine.clone();
        let coordinator = Arc::clone(&coordinator);
        tokio::spawn(async move {
            dispatch(
                &engine,
                ConfigurationBuilder::new().repl(),
                &mut io.console,
                &coordinator,
            )
            .await
        })
    };

    with_timeout(started.notified()).await;
    assert!(coordinator.interrupt());

    let result = with_timeout(task).await.unwrap();
    assert!(matches!(result, Err(HostError::Canceled)), "{result:?}");

    let scripts: Vec<_> = engine.records().into_iter().map(|r| r.target).collect();
    assert_eq!(
        scripts,
        vec![
            Some(Target::Script("fast".into())),
            Some(Target::Script("slow".into())),
        ]
    );
    assert!(!coordinator.has_active());
}

#[tokio::test]
async fn canceled_even_when_invocation_reports_success() {
    init_tracing();
    let engine = FakeEngine::always(Behaviour::WaitForStop(InvocationStatus::Completed));
    let started = engine.started();
    let coordinator = CancellationCoordinator::new();
    let mut io = TestConsole::with_stdin(b"");

    let task = {
        let engine = engine.clone();
        let coordinator = Arc::clone(&coordinator);
        tokio::spawn(async move {
            dispatch(
                &engine,
                ConfigurationBuilder::new().command("serve", &[]),
                &mut io.console,
                &coordinator,
            )
            .await
        })
    };

    with_timeout(started.notified()).await;
    coordinator.interrupt();

    let result = with_timeout(task).await.unwrap();
    assert!(matches!(result, Err(HostError::Canceled)), "{result:?}");
    assert_eq!(engine.records()[0].status, InvocationStatus::Completed);
}

#[tokio::test]
async fn interrupt_stops_streaming_command_with_open_stdin() {
    init_tracing();
    let engine = FakeEngine::always(Behaviour::EchoInput);
    let coordinator = CancellationCoordinator::new();

    // stdin stays open: the feeder would wait forever without the stop.
    let (mut stdin_writer, stdin_reader) = tokio::io::duplex(64);
    let io = TestConsole::with_reader(Box::new(stdin_reader));
    let stdout = io.stdout.clone();

    let task = {
        let engine = engine.clone();
        let coordinator = Arc::clone(&coordinator);
        let mut io = io;
        tokio::spawn(async move {
            dispatch(
                &engine,
                ConfigurationBuilder::new()
                    .input_string()
                    .output_string()
                    .command("cat", &[]),
                &mut io.console,
                &coordinator,
            )
            .await
        })
    };

    stdin_writer.write_all(b"first\n").await.unwrap();
    with_timeout(async {
        while stdout.contents() != "first\n" {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await;

    assert!(coordinator.interrupt());
    let result = with_timeout(task).await.unwrap();
    assert!(matches!(result, Err(HostError::Canceled)), "{result:?}");

    let records = engine.records();
    assert_eq!(records[0].input, vec![PipelineItem::text("first")]);
    assert_eq!(records[0].status, InvocationStatus::Stopped);
    drop(stdin_writer);
}

#[tokio::test]
async fn interrupt_after_completion_is_a_noop() {
    let engine = FakeEngine::always(Behaviour::Emit(vec![], InvocationStatus::Completed));
    let coordinator = CancellationCoordinator::new();
    let mut io = TestConsole::with_stdin(b"one\ntwo\n");

    dispatch(&engine, ConfigurationBuilder::new().repl(), &mut io.console, &coordinator)
        .await
        .unwrap();

    assert!(!coordinator.has_active());
    assert!(!coordinator.interrupt());
    assert!(!coordinator.interrupt());
    assert!(engine.records().iter().all(|r| r.status == InvocationStatus::Completed));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn interrupt_from_another_thread() {
    init_tracing();
    let engine = FakeEngine::always(Behaviour::WaitForStop(InvocationStatus::Stopped));
    let started = engine.started();
    let coordinator = CancellationCoordinator::new();
    let mut io = TestConsole::with_stdin(b"- ignored");

    let task = {
        let engine = engine.clone();
        let coordinator = Arc::clone(&coordinator);
        tokio::spawn(async move {
            dispatch(
                &engine,
                ConfigurationBuilder::new().stdin_script(&[]),
                &mut io.console,
                &coordinator,
            )
            .await
        })
    };

    with_timeout(started.notified()).await;
    let interrupter = {
        let coordinator = Arc::clone(&coordinator);
        std::thread::spawn(move || (coordinator.interrupt(), coordinator.interrupt()))
    };
    let (first, second) = interrupter.join().unwrap();
    assert!(first);
    assert!(!second);

    let result = with_timeout(task).await.unwrap();
    assert!(matches!(result, Err(HostError::Canceled)), "{result:?}");
}
