//! W3C trace context propagation over HTTP headers.
//!
//! A [`TraceContext`] is an explicit value passed down every call that may open
//! a child span. Inbound headers are turned into a context with
//! [`Propagator::extract`], a child span is started from it with
//! [`TraceContext::start_child`], and the child's context is written into
//! outbound headers with [`Propagator::inject`].

use axum::http::{HeaderMap, HeaderName, HeaderValue};
use opentelemetry::propagation::{Extractor, Injector, TextMapPropagator};
use opentelemetry::trace::{SpanContext, TraceContextExt, TraceId};
use opentelemetry::Context;
use opentelemetry_sdk::propagation::TraceContextPropagator;
use tracing_opentelemetry::OpenTelemetrySpanExt;

/// Header carrying the W3C trace parent.
pub const TRACEPARENT_HEADER: &str = "traceparent";

/// The trace context of the current unit of work.
///
/// Cheap to clone. Never mutated in place: starting a child span returns a new
/// context.
#[derive(Debug, Clone, Default)]
pub struct TraceContext(Context);

impl TraceContext {
    /// Returns an empty context; spans started from it become trace roots.
    #[must_use]
    pub fn root() -> Self {
        Self(Context::new())
    }

    /// Makes `span` a child of this context and returns it together with the
    /// span's own context.
    ///
    /// The span closes when the last handle to it is dropped, so every exit
    /// path of the instrumented work closes it. If the span is not recorded by
    /// an OpenTelemetry layer, this context is returned unchanged so the trace
    /// still reaches downstream services.
    #[must_use]
    pub fn start_child(&self, span: tracing::Span) -> (tracing::Span, TraceContext) {
        if let Err(error) = span.set_parent(self.0.clone()) {
            tracing::debug!(%error, "Span could not join its parent trace");
        }
        let child = span.context();
        let context = if child.span().span_context().is_valid() {
            TraceContext(child)
        } else {
            self.clone()
        };
        (span, context)
    }

    /// Returns the span context carried by this trace context.
    #[must_use]
    pub fn span_context(&self) -> SpanContext {
        self.0.span().span_context().clone()
    }

    /// Returns the trace id, or [`TraceId::INVALID`] for an empty context.
    #[must_use]
    pub fn trace_id(&self) -> TraceId {
        self.span_context().trace_id()
    }

    /// Returns true if this context carries a valid span context.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.span_context().is_valid()
    }
}

impl From<Context> for TraceContext {
    fn from(context: Context) -> Self {
        Self(context)
    }
}

/// Reads and writes [`TraceContext`] values as W3C `traceparent` headers.
///
/// Constructed once per process and handed to every component that crosses a
/// network boundary.
#[derive(Clone)]
pub struct Propagator {
    inner: TraceContextPropagator,
}

impl Propagator {
    /// Creates a W3C trace context propagator.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: TraceContextPropagator::new(),
        }
    }

    /// Extracts the caller's trace context from inbound headers.
    ///
    /// Returns a root context when the headers carry no valid trace parent.
    #[must_use]
    pub fn extract(&self, headers: &HeaderMap) -> TraceContext {
        TraceContext(
            self.inner
                .extract_with_context(&Context::new(), &HeaderExtractor(headers)),
        )
    }

    /// Writes `context` into outbound headers.
    pub fn inject(&self, context: &TraceContext, headers: &mut HeaderMap) {
        self.inner
            .inject_context(&context.0, &mut HeaderInjector(headers));
    }

    /// Returns a fresh header map holding only the trace headers for `context`.
    #[must_use]
    pub fn headers_for(&self, context: &TraceContext) -> HeaderMap {
        let mut headers = HeaderMap::new();
        self.inject(context, &mut headers);
        headers
    }
}

impl Default for Propagator {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Propagator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Propagator").field("format", &"w3c").finish()
    }
}

/// Read-only carrier over an HTTP header map.
pub struct HeaderExtractor<'a>(pub &'a HeaderMap);

impl Extractor for HeaderExtractor<'_> {
    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|value| value.to_str().ok())
    }

    fn keys(&self) -> Vec<&str> {
        self.0.keys().map(HeaderName::as_str).collect()
    }
}

/// Write carrier over an HTTP header map.
///
/// Keys or values that are not valid header text are skipped.
pub struct HeaderInjector<'a>(pub &'a mut HeaderMap);

impl Injector for HeaderInjector<'_> {
    fn set(&mut self, key: &str, value: String) {
        let Ok(name) = HeaderName::from_bytes(key.as_bytes()) else {
            tracing::debug!(key, "Skipping invalid trace header name");
            return;
        };
        let Ok(value) = HeaderValue::from_str(&value) else {
            tracing::debug!(key, "Skipping invalid trace header value");
            return;
        };
        self.0.insert(name, value);
    }
}
