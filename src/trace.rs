//! JSONL trace logging for conversions.
//!
//! One JSON object per line, written through a shared buffered writer. The
//! logger doubles as a [`ConvertListener`], so a conversion can be traced by
//! passing it where a listener is expected. Logging failures are swallowed;
//! tracing never breaks a conversion.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::error::ConvertError;
use crate::listener::ConvertListener;
use crate::scene::{EffectHandle, Node, NodeKind};

struct TraceInner {
    out: BufWriter<File>,
    counters: HashMap<String, u64>,
}

/// Shared JSONL trace sink.
#[derive(Clone)]
pub struct TraceLogger {
    inner: Arc<Mutex<TraceInner>>,
}

impl TraceLogger {
    pub fn create(path: &Path) -> Result<TraceLogger, ConvertError> {
        let file = File::create(path)?;
        Ok(TraceLogger {
            inner: Arc::new(Mutex::new(TraceInner {
                out: BufWriter::new(file),
                counters: HashMap::new(),
            })),
        })
    }

    /// Write one event record. String field values are JSON-escaped.
    pub fn log(&self, event: &str, fields: &[(&str, String)]) {
        let Ok(mut inner) = self.inner.lock() else {
            return;
        };
        let mut line = format!("{{\"event\":\"{}\"", json_escape(event));
        for (key, value) in fields {
            line.push_str(&format!(
                ",\"{}\":\"{}\"",
                json_escape(key),
                json_escape(value)
            ));
        }
        line.push('}');
        let _ = writeln!(inner.out, "{line}");
    }

    pub fn count(&self, key: &str) {
        if let Ok(mut inner) = self.inner.lock() {
            *inner.counters.entry(key.to_string()).or_insert(0) += 1;
        }
    }

    /// Drain the counters into a single summary record.
    pub fn emit_summary(&self) {
        let Ok(mut inner) = self.inner.lock() else {
            return;
        };
        let mut entries: Vec<(String, u64)> = inner.counters.drain().collect();
        entries.sort();
        let mut line = String::from("{\"event\":\"summary\"");
        for (key, value) in entries {
            line.push_str(&format!(",\"{}\":{}", json_escape(&key), value));
        }
        line.push('}');
        let _ = writeln!(inner.out, "{line}");
        let _ = inner.out.flush();
    }

    pub fn flush(&self) {
        if let Ok(mut inner) = self.inner.lock() {
            let _ = inner.out.flush();
        }
    }
}

impl ConvertListener for TraceLogger {
    fn node_start(&mut self, node: &Node) {
        let kind = kind_name(node);
        self.count(kind);
        let mut fields = vec![("kind", kind.to_string())];
        if let Some(id) = &node.id {
            fields.push(("id", id.clone()));
        }
        self.log("node_start", &fields);
    }

    fn node_end(&mut self, node: &Node) {
        self.log("node_end", &[("kind", kind_name(node).to_string())]);
    }

    fn effect_start(&mut self, node: &Node, effect: &EffectHandle) {
        self.log(
            "effect_start",
            &[
                ("kind", kind_name(node).to_string()),
                ("effect", effect.0.clone()),
            ],
        );
    }

    fn effect_end(&mut self, node: &Node) {
        self.log("effect_end", &[("kind", kind_name(node).to_string())]);
    }
}

fn kind_name(node: &Node) -> &'static str {
    match node.kind {
        NodeKind::Container { .. } => "container",
        NodeKind::Line { .. } => "line",
        NodeKind::Text { .. } => "text",
        NodeKind::Polygon { .. } => "polygon",
        NodeKind::Polyline { .. } => "polyline",
        NodeKind::PathShape { .. } => "path",
        NodeKind::Circle { .. } => "circle",
        NodeKind::Ellipse { .. } => "ellipse",
        NodeKind::Arc { .. } => "arc",
        NodeKind::Rectangle { .. } => "rectangle",
        NodeKind::QuadCurve { .. } => "quad-curve",
        NodeKind::CubicCurve { .. } => "cubic-curve",
        NodeKind::Image { .. } => "image",
        NodeKind::Volumetric { .. } => "volumetric",
        NodeKind::Embedded { .. } => "embedded",
    }
}

fn json_escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out
}
