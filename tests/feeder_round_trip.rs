use scripthost::decode::{LineDecoder, TextEncoding};
use scripthost::engine::StopSignal;
use scripthost::feeder::{FeedEnd, feed};
use scripthost::pipeline::{self, PipelineItem};
use scripthost_test_utils::io::{ChunkedReader, FailingReader};
use scripthost_test_utils::with_timeout;

#[tokio::test]
async fn n_lines_become_n_items_then_completion() {
    let n = 200;
    let input: String = (0..n).map(|i| format!("line {i}\r\n")).collect();
    let decoder =
        LineDecoder::with_capacity(ChunkedReader::new(input.into_bytes(), 5), TextEncoding::Utf8, 8);

    let (tx, mut rx) = pipeline::channel(4);
    let stop = StopSignal::new();

    let consumer = tokio::spawn(async move {
        let mut items = Vec::new();
        while let Some(item) = rx.recv().await {
            items.push(item);
        }
        // Completion is sticky.
        assert_eq!(rx.recv().await, None);
        items
    });

    let report = with_timeout(feed(decoder, tx, stop.subscribe())).await.unwrap();
    let items = consumer.await.unwrap();

    assert_eq!(report.lines, n);
    assert_eq!(report.end, FeedEnd::Exhausted);
    let expected: Vec<_> = (0..n).map(|i| PipelineItem::text(format!("line {i}"))).collect();
    assert_eq!(items, expected);
}

#[tokio::test]
async fn stop_before_start_reads_nothing() {
    let stop = StopSignal::new();
    stop.request_stop();

    // Any read would fail, so an Ok report proves nothing was read.
    let decoder = LineDecoder::new(FailingReader, TextEncoding::Utf8);
    let (tx, rx) = pipeline::channel(4);

    let report = feed(decoder, tx, stop.subscribe()).await.unwrap();
    assert_eq!(report.lines, 0);
    assert_eq!(report.end, FeedEnd::Stopped);
    assert!(rx.collect().await.is_empty());
}

#[tokio::test]
async fn stop_mid_feed_completes_channel() {
    let (mut writer, reader) = tokio::io::duplex(64);
    let decoder = LineDecoder::new(reader, TextEncoding::Utf8);
    let (tx, mut rx) = pipeline::channel(4);
    let stop = StopSignal::new();

    let feeding = tokio::spawn(feed(decoder, tx, stop.subscribe()));

    tokio::io::AsyncWriteExt::write_all(&mut writer, b"one\ntwo\n")
        .await
        .unwrap();
    assert_eq!(with_timeout(rx.recv()).await, Some(PipelineItem::text("one")));
    assert_eq!(with_timeout(rx.recv()).await, Some(PipelineItem::text("two")));

    stop.request_stop();
    let report = with_timeout(feeding).await.unwrap().unwrap();
    assert_eq!(report.end, FeedEnd::Stopped);
    assert_eq!(report.lines, 2);
    assert_eq!(rx.recv().await, None);
    drop(writer);
}

#[tokio::test]
async fn consumer_gone_ends_feeding() {
    let (_writer, reader) = tokio::io::duplex(64);
    let decoder = LineDecoder::new(reader, TextEncoding::Utf8);
    let (tx, rx) = pipeline::channel(4);
    drop(rx);

    let stop = StopSignal::new();
    let report = with_timeout(feed(decoder, tx, stop.subscribe())).await.unwrap();
    assert_eq!(report.end, FeedEnd::ConsumerGone);
}

#[tokio::test]
async fn read_error_still_completes_channel() {
    let decoder = LineDecoder::new(FailingReader, TextEncoding::Utf8);
    let (tx, rx) = pipeline::channel(4);
    let stop = StopSignal::new();

    let err = feed(decoder, tx, stop.subscribe()).await.unwrap_err();
    assert!(matches!(err, scripthost::errors::HostError::Io(_)), "{err}");
    assert!(rx.collect().await.is_empty());
}
