use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::mpsc;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::debug;
use crate::error::ExtractError;
use crate::extraction::MaskToPolygon;
use crate::mask::Mask;
use crate::models::{Boundary, Diagnostics};

/// Debug configuration for batch execution
#[derive(Clone, Debug)]
pub struct DebugConfig {
    /// Root directory for debug outputs
    pub output_dir: PathBuf,
}

/// Settings shared by every job in a batch
#[derive(Clone, Debug, Default)]
pub struct BatchContext {
    pub verbose: bool,
    pub debug: Option<DebugConfig>,
}

/// One named mask to convert
#[derive(Debug, Clone)]
pub struct MaskJob {
    pub name: String,
    pub mask: Mask,
}

impl MaskJob {
    pub fn new(name: impl Into<String>, mask: Mask) -> Self {
        Self {
            name: name.into(),
            mask,
        }
    }

    /// File name for this job's debug images (e.g. "lot_42.png")
    pub fn debug_filename(&self, extension: &str) -> String {
        let safe: String = self
            .name
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' || c == '.' { c } else { '_' })
            .collect();
        format!("{}.{}", safe, extension)
    }
}

/// Outcome of one job, as written to the JSON output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundaryRecord {
    pub source: String,
    pub points: Vec<(f64, f64)>,
    pub vertex_count: usize,
    pub area: f64,
    pub scaled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BoundaryRecord {
    pub fn from_boundary(source: &str, boundary: &Boundary) -> Self {
        Self {
            source: source.to_string(),
            points: boundary.points(),
            vertex_count: boundary.vertex_count(),
            area: boundary.area(),
            scaled: boundary.is_scaled(),
            error: None,
        }
    }

    pub fn failed(source: &str, err: &ExtractError) -> Self {
        Self {
            source: source.to_string(),
            points: Vec::new(),
            vertex_count: 0,
            area: 0.0,
            scaled: false,
            error: Some(err.to_string()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Runs one extractor over many masks.
///
/// Jobs are spread round-robin over scoped worker threads and results come
/// back over a channel; output order always matches input order. A failed
/// extraction becomes a record with `error` set, only debug I/O failures
/// abort the batch.
pub struct BatchRunner {
    extractor: MaskToPolygon,
    context: BatchContext,
    threads: usize,
    scale_points: bool,
}

impl BatchRunner {
    pub fn new(extractor: MaskToPolygon) -> Self {
        Self {
            extractor,
            context: BatchContext::default(),
            threads: 1,
            scale_points: true,
        }
    }

    /// Enable verbose output
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.context.verbose = verbose;
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads.max(1);
        self
    }

    pub fn with_scale_points(mut self, scale_points: bool) -> Self {
        self.scale_points = scale_points;
        self
    }

    /// Enable debug mode with output directory
    /// The directory must be empty or non-existent
    pub fn with_debug(mut self, output_dir: PathBuf) -> Result<Self> {
        if output_dir.exists() {
            let entries = std::fs::read_dir(&output_dir)?;
            if entries.count() > 0 {
                return Err(anyhow::anyhow!(
                    "Debug directory is not empty: {}",
                    output_dir.display()
                ));
            }
        } else {
            std::fs::create_dir_all(&output_dir)?;
        }

        self.context.debug = Some(DebugConfig { output_dir });
        self.extractor = self.extractor.with_diagnostics(true);

        Ok(self)
    }

    pub fn context(&self) -> &BatchContext {
        &self.context
    }

    pub fn run(&self, jobs: &[MaskJob]) -> Result<Vec<BoundaryRecord>> {
        if jobs.is_empty() {
            return Ok(Vec::new());
        }
        if self.context.debug.is_some() {
            let mut seen = HashSet::new();
            if let Some(job) = jobs.iter().find(|j| !seen.insert(j.debug_filename("png"))) {
                anyhow::bail!(
                    "Debug images for '{}' would overwrite another job's; job names must be unique",
                    job.name
                );
            }
        }

        let workers = self.threads.min(jobs.len());
        if self.context.verbose {
            eprintln!("Processing {} mask(s) on {} worker(s)", jobs.len(), workers);
        }

        let (sender, receiver) = mpsc::channel::<(usize, Result<BoundaryRecord>)>();
        std::thread::scope(|scope| {
            for worker in 0..workers {
                let sender = sender.clone();
                scope.spawn(move || {
                    for (index, job) in jobs.iter().enumerate().skip(worker).step_by(workers) {
                        if sender.send((index, self.process(job))).is_err() {
                            break;
                        }
                    }
                });
            }
        });
        drop(sender);

        let mut slots: Vec<Option<BoundaryRecord>> = vec![None; jobs.len()];
        for (index, outcome) in receiver {
            slots[index] = Some(outcome?);
        }

        slots
            .into_iter()
            .zip(jobs)
            .map(|(slot, job)| {
                slot.ok_or_else(|| anyhow::anyhow!("No result produced for {}", job.name))
            })
            .collect()
    }

    fn process(&self, job: &MaskJob) -> Result<BoundaryRecord> {
        if self.context.verbose {
            eprintln!(
                "Running {} ({}x{}, classes {:?})",
                job.name,
                job.mask.width(),
                job.mask.height(),
                job.mask.class_values()
            );
        }

        match self.extractor.extract(&job.mask, self.scale_points) {
            Ok(extraction) => {
                if let Some(diagnostics) = &extraction.diagnostics {
                    self.save_debug_output(job, diagnostics)?;
                }
                let record = BoundaryRecord::from_boundary(&job.name, &extraction.boundary);
                if self.context.verbose {
                    eprintln!(
                        "  {} → {} vertices, area {:.1}",
                        job.name, record.vertex_count, record.area
                    );
                }
                Ok(record)
            }
            Err(err) => {
                tracing::warn!(job = %job.name, error = %err, "extraction failed");
                if self.context.verbose {
                    eprintln!("  {} → failed: {}", job.name, err);
                }
                Ok(BoundaryRecord::failed(&job.name, &err))
            }
        }
    }

    /// Save per-stage images if debug mode is enabled
    fn save_debug_output(&self, job: &MaskJob, diagnostics: &Diagnostics) -> Result<()> {
        let Some(debug_config) = &self.context.debug else {
            return Ok(());
        };

        let filename = job.debug_filename("png");
        let stages = [
            ("01_processed", image::DynamicImage::ImageLuma8(debug::stretch_classes(&diagnostics.processed))),
            ("02_edges", image::DynamicImage::ImageLuma8(diagnostics.edges.clone())),
            ("03_overlay", image::DynamicImage::ImageRgb8(debug::render_overlay(&job.mask, diagnostics))),
        ];

        for (step_dir_name, img) in stages {
            let step_dir = debug_config.output_dir.join(step_dir_name);
            std::fs::create_dir_all(&step_dir)?;
            img.save(step_dir.join(&filename))
                .map_err(|e| anyhow::anyhow!("Failed to save debug image: {}", e))?;

            if self.context.verbose {
                eprintln!("  Debug: saved {}/{}", step_dir_name, filename);
            }
        }

        Ok(())
    }
}
