//! Pipeline driver: load, filter, and hand matches to the output strategy.

use std::io::Write;
use std::path::Path;

use tracing::{debug, info};

use crate::error::Result;
use crate::flow::FlowRecord;
use crate::io::{FlowDocument, FlowSource, JsonFileSource};
use crate::output::{FlowSink, OutputMode, Sink};
use crate::query::Predicate;

/// Per-flow enrichment applied before filtering (e.g. adding a computed
/// sub-record that later filters or selections can refer to).
pub trait FlowEnricher {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Add or replace fields on a flow.
    fn enrich(&self, flow: &mut FlowRecord);
}

/// Counters for one pipeline run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub files: usize,
    pub flows: u64,
    pub matched: u64,
}

/// One run over a list of input files.
///
/// Files are processed in order, and each file's flows in document order;
/// the output strategy is created fresh and consumed by `run`.
pub struct Pipeline<S: FlowSource = JsonFileSource> {
    source: S,
    predicate: Predicate,
    sink: Sink,
    enrichers: Vec<Box<dyn FlowEnricher>>,
}

impl Pipeline<JsonFileSource> {
    /// Create a pipeline reading JSON flow files.
    pub fn new(predicate: Predicate, mode: OutputMode) -> Self {
        Self::with_source(JsonFileSource::new(), predicate, mode)
    }
}

impl<S: FlowSource> Pipeline<S> {
    /// Create a pipeline with a custom document source.
    pub fn with_source(source: S, predicate: Predicate, mode: OutputMode) -> Self {
        Self {
            source,
            predicate,
            sink: Sink::new(mode),
            enrichers: Vec::new(),
        }
    }

    /// Register an enricher. Enrichers run in registration order.
    pub fn with_enricher(mut self, enricher: impl FlowEnricher + 'static) -> Self {
        self.enrichers.push(Box::new(enricher));
        self
    }

    /// Process every file and finish the output. The first load failure
    /// aborts the run.
    pub fn run<P: AsRef<Path>, W: Write>(mut self, paths: &[P], out: &mut W) -> Result<RunSummary> {
        let enrichers: Vec<&str> = self.enrichers.iter().map(|e| e.name()).collect();
        debug!(
            sink = self.sink.name(),
            filter = %self.predicate,
            ?enrichers,
            "starting pipeline"
        );

        let mut summary = RunSummary::default();
        self.sink.begin(out)?;

        for path in paths {
            let path = path.as_ref();
            let document = self.source.load(path)?;
            let (flows, matched) = self.process_document(document, out)?;

            info!(path = %path.display(), flows, matched, "processed flow file");
            summary.files += 1;
            summary.flows += flows;
            summary.matched += matched;
        }

        self.sink.end(out)?;
        out.flush()?;
        Ok(summary)
    }

    /// Feed one loaded document through the filter into the sink.
    /// Returns `(flows seen, flows matched)`.
    fn process_document<W: Write>(
        &mut self,
        document: FlowDocument,
        out: &mut W,
    ) -> Result<(u64, u64)> {
        if let Some(metadata) = &document.metadata {
            self.sink.metadata(metadata, out)?;
        }

        let mut flows = 0;
        let mut matched = 0;
        for entry in document.appflows {
            let mut flow = entry.flow;
            for enricher in &self.enrichers {
                enricher.enrich(&mut flow);
            }

            flows += 1;
            if self.predicate.matches(&flow) {
                matched += 1;
                self.sink.observe(&flow, out)?;
            }
        }
        Ok((flows, matched))
    }
}
