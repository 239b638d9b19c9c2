//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of Zi.
//! The Zi project belongs to the Dunimd Team.
//!
//! Licensed under the Apache License, Version 2.0 (the "License");
//! You may not use this file except in compliance with the License.
//! You may obtain a copy of the License at
//!
//!     http://www.apache.org/licenses/LICENSE-2.0
//!
//! Unless required by applicable law or agreed to in writing, software
//! distributed under the License is distributed on an "AS IS" BASIS,
//! WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//! See the License for the specific language governing permissions and
//! limitations under the License.

//! # Export Job
//!
//! Drives one export from source to sink:
//!
//! ```text
//! Created -> SchemaResolved -> Streaming(n) -> Finished(n)
//!                 \________________\____________> Failed
//! ```
//!
//! Everything that can fail structurally (configuration, sink selection,
//! source shape, schema) is decided before the sink is built, so those
//! failures never produce output bytes. Records are pulled one at a time,
//! transformed, and handed to the sink before the next pull.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::ZiExportConfig;
use crate::context::ZiExportContext;
use crate::errors::{Result, ZiError};
use crate::export::columns::{ZiColumn, ZiColumnRegistry};
use crate::export::delimited::{ZiDelimitedOptions, ZiDelimitedSink};
use crate::export::encoding::ZiEncodingConverter;
use crate::export::json::{ZiJsonSink, ZI_JSON_CONTENT_TYPE};
use crate::export::sink::{ZiExportHeaders, ZiPlacedCell, ZiRow, ZiSink, ZiSinkKind};
use crate::export::tabular::{default_engine, ZiSpreadsheetEngine, ZiTabularSink};
use crate::ingest::source::{normalize, ZiRecordSource};
use crate::schema::ZiSchemaResolver;
use crate::transform::{ZiFieldTransformer, ZI_NAME_FIELD};

pub const ZI_CSV_CONTENT_TYPE: &str = "text/csv; charset=UTF-8";
pub const ZI_EXCEL_CONTENT_TYPE: &str = "application/vnd.ms-excel";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ZiJobState {
    Created,
    SchemaResolved,
    /// Rows written so far.
    Streaming(usize),
    /// Rows reported by the sink.
    Finished(usize),
    Failed,
}

impl ZiJobState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ZiJobState::Finished(_) | ZiJobState::Failed)
    }
}

/// Sink selection and output settings, fixed before any bytes are written.
#[derive(Clone, Debug)]
pub struct ZiExportPlan {
    pub sink_kind: ZiSinkKind,
    pub headers: ZiExportHeaders,
    options: ZiDelimitedOptions,
    engine: Option<Arc<dyn ZiSpreadsheetEngine>>,
}

impl ZiExportPlan {
    /// Resolves the effective sink for a configuration and the engine
    /// available, applying the spreadsheet fallback rules.
    pub fn build(
        config: &ZiExportConfig,
        engine: Option<Arc<dyn ZiSpreadsheetEngine>>,
    ) -> Result<Self> {
        config.validate()?;

        let (sink_kind, engine) = match config.sink_kind {
            ZiSinkKind::TabularBinary => match engine {
                None if config.encoding.is_custom() => {
                    return Err(ZiError::missing_engine(format!(
                        "no spreadsheet engine available for encoding {}",
                        config.encoding.charset().unwrap_or_default()
                    )));
                }
                None => {
                    log::info!("no spreadsheet engine available, exporting delimited text instead");
                    (ZiSinkKind::Delimited, None)
                }
                Some(engine) if config.encoding.is_custom() && !engine.supports_encoding() => {
                    log::info!(
                        "{} output cannot carry {}, exporting delimited text instead",
                        engine.name(),
                        config.encoding.charset().unwrap_or_default()
                    );
                    (ZiSinkKind::Delimited, None)
                }
                Some(engine) => (ZiSinkKind::TabularBinary, Some(engine)),
            },
            other => (other, None),
        };

        let converter = match sink_kind {
            ZiSinkKind::Json => None,
            _ => ZiEncodingConverter::for_encoding(&config.encoding)?,
        };
        let options = ZiDelimitedOptions {
            delimiter: config.resolved_delimiter()?,
            line_ending: config.line_ending,
            converter,
        };

        let headers = Self::headers(config, sink_kind, &options, engine.as_deref());
        Ok(Self {
            sink_kind,
            headers,
            options,
            engine,
        })
    }

    fn headers(
        config: &ZiExportConfig,
        sink_kind: ZiSinkKind,
        options: &ZiDelimitedOptions,
        engine: Option<&dyn ZiSpreadsheetEngine>,
    ) -> ZiExportHeaders {
        let charset = options.converter.as_ref().map(|c| c.label().to_string());
        let (content_type, default_name) = match (sink_kind, engine) {
            (ZiSinkKind::Json, _) => (ZI_JSON_CONTENT_TYPE.to_string(), "export.json"),
            (ZiSinkKind::TabularBinary, Some(engine)) => {
                let content_type = match &charset {
                    Some(label) => format!("{}; charset={label}", engine.content_type()),
                    None => engine.content_type().to_string(),
                };
                (content_type, engine.default_file_name())
            }
            (_, _) => match &charset {
                Some(label) => (format!("{ZI_EXCEL_CONTENT_TYPE}; charset={label}"), "export.csv"),
                None => (ZI_CSV_CONTENT_TYPE.to_string(), "export.csv"),
            },
        };

        let file_name = config
            .file_name
            .clone()
            .unwrap_or_else(|| default_name.to_string());
        let headers = ZiExportHeaders::new(content_type, file_name);
        if sink_kind == ZiSinkKind::TabularBinary {
            headers.with_cache_control("max-age=0")
        } else {
            headers
        }
    }

    pub fn delimited_options(&self) -> &ZiDelimitedOptions {
        &self.options
    }

    pub fn engine(&self) -> Option<&Arc<dyn ZiSpreadsheetEngine>> {
        self.engine.as_ref()
    }

    fn sink<'w, W: Write + 'w>(&self, config: &ZiExportConfig, out: W) -> Result<Box<dyn ZiSink + 'w>> {
        let sink: Box<dyn ZiSink + 'w> = match self.sink_kind {
            ZiSinkKind::Json => Box::new(ZiJsonSink::new(out, config.pretty)),
            ZiSinkKind::Delimited => Box::new(ZiDelimitedSink::new(out, self.options.clone())),
            ZiSinkKind::TabularBinary => {
                let engine = self
                    .engine
                    .clone()
                    .ok_or_else(|| ZiError::internal("tabular plan without an engine"))?;
                Box::new(ZiTabularSink::new(out, engine, self.options.clone()))
            }
        };
        Ok(sink)
    }
}

/// Summary of a finished job.
#[derive(Clone, Debug, PartialEq)]
pub struct ZiExportOutcome {
    pub rows: usize,
    pub sink_kind: ZiSinkKind,
    pub headers: ZiExportHeaders,
    /// Columns in position order; empty for JSON output.
    pub columns: Vec<ZiColumn>,
}

pub struct ZiExportJob {
    config: ZiExportConfig,
    context: ZiExportContext,
    engine: Option<Arc<dyn ZiSpreadsheetEngine>>,
    resolver: ZiSchemaResolver,
    state: ZiJobState,
}

impl ZiExportJob {
    /// New job using the spreadsheet engine built into this crate, if any.
    pub fn new(config: ZiExportConfig) -> Self {
        Self {
            config,
            context: ZiExportContext::default(),
            engine: default_engine(),
            resolver: ZiSchemaResolver::new(),
            state: ZiJobState::Created,
        }
    }

    pub fn with_context(mut self, context: ZiExportContext) -> Self {
        self.context = context;
        self
    }

    pub fn with_engine(mut self, engine: Arc<dyn ZiSpreadsheetEngine>) -> Self {
        self.engine = Some(engine);
        self
    }

    pub fn without_engine(mut self) -> Self {
        self.engine = None;
        self
    }

    pub fn state(&self) -> ZiJobState {
        self.state
    }

    pub fn config(&self) -> &ZiExportConfig {
        &self.config
    }

    pub fn context(&self) -> &ZiExportContext {
        &self.context
    }

    pub fn plan(&self) -> Result<ZiExportPlan> {
        ZiExportPlan::build(&self.config, self.engine.clone())
    }

    /// Runs the job to completion, writing into `out`.
    ///
    /// A job runs once. On failure the state is `Failed`, the error is
    /// forwarded to the context's reporter, and anything already written
    /// to `out` must be discarded.
    pub fn run<W: Write>(&mut self, source: ZiRecordSource<'_>, out: W) -> Result<ZiExportOutcome> {
        if self.state != ZiJobState::Created {
            return Err(ZiError::validation(format!(
                "export job already ran (state {:?})",
                self.state
            )));
        }

        match self.execute(source, out) {
            Ok(outcome) => {
                self.state = ZiJobState::Finished(outcome.rows);
                log::info!(
                    "export finished: {} rows as {} ({})",
                    outcome.rows,
                    outcome.sink_kind.as_str(),
                    outcome.headers.file_name
                );
                Ok(outcome)
            }
            Err(err) => {
                self.state = ZiJobState::Failed;
                log::error!("export failed: {}", err);
                self.context.report(&err.to_string(), err.is_fatal());
                Err(err)
            }
        }
    }

    /// Runs the job into a file. With `atomic_write` the output goes to a
    /// hidden temp file first and is renamed into place only on success.
    pub fn run_to_path(&mut self, source: ZiRecordSource<'_>, path: &Path) -> Result<ZiExportOutcome> {
        if self.state != ZiJobState::Created {
            return Err(ZiError::validation(format!(
                "export job already ran (state {:?})",
                self.state
            )));
        }

        let target = if self.config.atomic_write {
            temp_path(path)
        } else {
            path.to_path_buf()
        };
        let file = File::create(&target)?;

        match self.run(source, BufWriter::new(file)) {
            Ok(outcome) => {
                if target != path {
                    fs::rename(&target, path)?;
                }
                Ok(outcome)
            }
            Err(err) => {
                if let Err(cleanup) = fs::remove_file(&target) {
                    log::warn!("could not remove partial output {}: {}", target.display(), cleanup);
                }
                Err(err)
            }
        }
    }

    fn execute<W: Write>(&mut self, source: ZiRecordSource<'_>, out: W) -> Result<ZiExportOutcome> {
        let plan = self.plan()?;

        let mut records = normalize(source)?;
        let kind = records.kind();
        let first = records.first_record()?.cloned();
        let schema = self.resolver.resolve(
            kind,
            self.config.fields.as_deref(),
            records.descriptors(),
            first.as_ref(),
        )?;
        self.state = ZiJobState::SchemaResolved;

        let mut sink = plan.sink(&self.config, out)?;
        let _lazy = if sink.is_random_access() {
            Some(self.context.suspend_lazy_loading())
        } else {
            None
        };

        let transformer = ZiFieldTransformer::for_source(kind);
        let tracks_columns = sink.tracks_columns();
        let mut registry = ZiColumnRegistry::new();
        let mut header_written = false;
        let mut rows = 0;

        loop {
            if self.context.is_cancelled() {
                log::info!("export cancelled after {} rows", rows);
                return Err(ZiError::Cancelled { rows });
            }
            let Some(record) = records.next() else {
                break;
            };
            let record = record?;

            let transformed = transformer.transform_record(&schema, &record);
            for anomaly in &transformed.anomalies {
                self.context.report(&anomaly.to_string(), false);
            }

            let mut cells = Vec::new();
            if tracks_columns {
                cells = transformed
                    .pairs
                    .into_iter()
                    .map(|(name, cell)| {
                        let discovered = header_written && !registry.contains(&name);
                        let position = registry.observe(&name);
                        ZiPlacedCell {
                            column: ZiColumn { name, position },
                            cell,
                            discovered,
                        }
                    })
                    .collect();
                if !header_written {
                    sink.write_header(registry.columns())?;
                    header_written = true;
                }
            }

            sink.write_row(&ZiRow {
                record: transformed.values,
                cells,
            })?;
            rows += 1;
            self.state = ZiJobState::Streaming(rows);
        }

        // No records but an explicit field list: header only.
        if tracks_columns && !header_written {
            if kind.is_model_backed() {
                registry.observe(ZI_NAME_FIELD);
            }
            for field in schema.fields() {
                registry.observe(&field.name);
            }
            sink.write_header(registry.columns())?;
        }

        let rows = sink.finish()?;
        Ok(ZiExportOutcome {
            rows,
            sink_kind: plan.sink_kind,
            headers: plan.headers,
            columns: registry.snapshot(),
        })
    }
}

/// Runs a one-off export with the default context and engine.
pub fn export<W: Write>(
    source: ZiRecordSource<'_>,
    config: ZiExportConfig,
    out: W,
) -> Result<ZiExportOutcome> {
    ZiExportJob::new(config).run(source, out)
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("export");
    let parent = path.parent().unwrap_or(Path::new("."));
    parent.join(format!(".{name}.tmp"))
}
