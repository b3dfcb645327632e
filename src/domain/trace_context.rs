//! Opaque W3C trace-context carrier.
//!
//! The pipeline does not interpret these values. They are captured from the
//! inbound redirect request, persisted on the outbox row, re-attached as
//! message headers by the relay worker, and extracted by the consumer so the
//! distributed trace can be continued across the asynchronous hop.

use axum::http::HeaderMap;

pub const TRACEPARENT: &str = "traceparent";
pub const TRACESTATE: &str = "tracestate";
pub const BAGGAGE: &str = "baggage";

/// The three W3C trace propagation headers, each optional.
///
/// Blank values are dropped at every boundary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraceContext {
    pub traceparent: Option<String>,
    pub tracestate: Option<String>,
    pub baggage: Option<String>,
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

impl TraceContext {
    /// Captures the propagation headers from an inbound HTTP request.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let get = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned)
        };
        Self::from_values(get(TRACEPARENT), get(TRACESTATE), get(BAGGAGE))
    }

    /// Builds a carrier from stored column values, dropping blanks.
    pub fn from_values(
        traceparent: Option<String>,
        tracestate: Option<String>,
        baggage: Option<String>,
    ) -> Self {
        Self {
            traceparent: non_blank(traceparent.as_deref()),
            tracestate: non_blank(tracestate.as_deref()),
            baggage: non_blank(baggage.as_deref()),
        }
    }

    /// Rebuilds a carrier from broker message headers (case-insensitive keys).
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = &'a (String, String)>) -> Self {
        let mut ctx = Self::default();
        for (key, value) in pairs {
            match key.to_ascii_lowercase().as_str() {
                TRACEPARENT => ctx.traceparent = non_blank(Some(value)),
                TRACESTATE => ctx.tracestate = non_blank(Some(value)),
                BAGGAGE => ctx.baggage = non_blank(Some(value)),
                _ => {}
            }
        }
        ctx
    }

    /// Emits the carrier as message header pairs, skipping absent keys.
    pub fn header_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::with_capacity(3);
        if let Some(v) = &self.traceparent {
            pairs.push((TRACEPARENT.to_string(), v.clone()));
        }
        if let Some(v) = &self.tracestate {
            pairs.push((TRACESTATE.to_string(), v.clone()));
        }
        if let Some(v) = &self.baggage {
            pairs.push((BAGGAGE.to_string(), v.clone()));
        }
        pairs
    }

    pub fn is_empty(&self) -> bool {
        self.traceparent.is_none() && self.tracestate.is_none() && self.baggage.is_none()
    }
}
