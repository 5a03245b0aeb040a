//! In-memory span capture for tests.
//!
//! [`SpanCapture::install`] sets a thread-local `tracing` subscriber that
//! exports finished spans to an in-memory exporter and counts span opens and
//! closes. Use it with a current-thread Tokio runtime so every task of the test
//! sees the same subscriber.

use super::{log_layer, LogFormat};
use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::trace::{InMemorySpanExporter, Sampler, SdkTracerProvider, SpanData};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::span::{Attributes, Id};
use tracing::subscriber::DefaultGuard;
use tracing::Subscriber;
use tracing_subscriber::layer::{Context, Layered, SubscriberExt};
use tracing_subscriber::registry::Registry;
use tracing_subscriber::{EnvFilter, Layer};

/// Captures exported spans and span lifecycle counts.
pub struct SpanCapture {
    exporter: InMemorySpanExporter,
    _provider: SdkTracerProvider,
    counts: Arc<SpanCounts>,
}

#[derive(Default)]
struct SpanCounts {
    opened: AtomicUsize,
    closed: AtomicUsize,
}

struct CountingLayer {
    counts: Arc<SpanCounts>,
}

impl<S: Subscriber> Layer<S> for CountingLayer {
    fn on_new_span(&self, _attrs: &Attributes<'_>, _id: &Id, _ctx: Context<'_, S>) {
        self.counts.opened.fetch_add(1, Ordering::SeqCst);
    }

    fn on_close(&self, _id: Id, _ctx: Context<'_, S>) {
        self.counts.closed.fetch_add(1, Ordering::SeqCst);
    }
}

impl SpanCapture {
    /// Installs the capturing subscriber for the current thread.
    ///
    /// The subscriber stays active until the returned guard is dropped.
    #[must_use]
    pub fn install() -> (Self, DefaultGuard) {
        Self::install_inner(None)
    }

    /// Installs the capturing subscriber together with the service log layer
    /// filtered by `directives`, as `init` composes them.
    #[must_use]
    pub fn install_with_log_filter(directives: &str) -> (Self, DefaultGuard) {
        Self::install_inner(Some(EnvFilter::new(directives)))
    }

    fn install_inner(log_filter: Option<EnvFilter>) -> (Self, DefaultGuard) {
        let exporter = InMemorySpanExporter::default();
        let provider = SdkTracerProvider::builder()
            .with_simple_exporter(exporter.clone())
            .with_sampler(Sampler::AlwaysOn)
            .build();
        let tracer = provider.tracer("span-capture");
        let counts = Arc::new(SpanCounts::default());

        let log = log_filter
            .map(|filter| log_layer::<Layered<CountingLayer, Registry>>(LogFormat::Pretty, filter));

        let subscriber = tracing_subscriber::registry()
            .with(CountingLayer {
                counts: Arc::clone(&counts),
            })
            .with(log)
            .with(tracing_opentelemetry::layer().with_tracer(tracer));
        let guard = tracing::subscriber::set_default(subscriber);

        (
            Self {
                exporter,
                _provider: provider,
                counts,
            },
            guard,
        )
    }

    /// Returns every span exported so far.
    #[must_use]
    pub fn finished_spans(&self) -> Vec<SpanData> {
        self.exporter.get_finished_spans().unwrap_or_default()
    }

    /// Returns the exported spans with the given name.
    #[must_use]
    pub fn spans_named(&self, name: &str) -> Vec<SpanData> {
        self.finished_spans()
            .into_iter()
            .filter(|span| span.name == name)
            .collect()
    }

    /// Returns the single exported span with the given name.
    ///
    /// # Panics
    ///
    /// Panics if there is not exactly one such span.
    #[must_use]
    pub fn span_named(&self, name: &str) -> SpanData {
        let mut spans = self.spans_named(name);
        assert_eq!(spans.len(), 1, "expected exactly one span named {name}");
        spans.remove(0)
    }

    /// Number of spans opened on this subscriber.
    #[must_use]
    pub fn opened(&self) -> usize {
        self.counts.opened.load(Ordering::SeqCst)
    }

    /// Number of spans closed on this subscriber.
    #[must_use]
    pub fn closed(&self) -> usize {
        self.counts.closed.load(Ordering::SeqCst)
    }
}
