use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use pilesim_controllers::{Metrics, Stage};
use pilesim_core::{Scalar, Vec3};
use pilesim_viz::{FieldSource, PlotBuffer, PlotSample, SnapshotStream};
use tracing::info;

use crate::{IoError, IoResult};

/// One CSV line: step, stage, unbalanced force, friction angle, coordination number,
/// pile bottom y, pile force x/y/z.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetryRow {
    pub step: u64,
    pub stage: Stage,
    pub unbalanced_force: Scalar,
    pub friction_angle: Scalar,
    pub coordination_number: Scalar,
    pub pile_bottom_y: Scalar,
    pub force: Vec3,
}

impl TelemetryRow {
    pub fn new(step: u64, stage: Stage, m: &Metrics) -> Self {
        Self {
            step,
            stage,
            unbalanced_force: m.unbalanced_force,
            friction_angle: m.friction_angle,
            coordination_number: m.coordination_number,
            pile_bottom_y: m.pile_bottom_y,
            force: m.pile_force,
        }
    }

    pub fn csv_line(&self) -> String {
        format!(
            "{},{},{},{},{},{},{},{},{}\n",
            self.step, self.stage, self.unbalanced_force, self.friction_angle, self.coordination_number,
            self.pile_bottom_y, self.force.x, self.force.y, self.force.z,
        )
    }

    pub fn console_line(&self) -> String {
        format!(
            "Iter: {} Stage: {} UnF: {:>5.2} Pos_cy: {:>6.3} Fx_cy: {:>8.2} Fy_cy: {:>8.2} Fz_cy: {:>8.2}",
            self.step, self.stage, self.unbalanced_force, self.pile_bottom_y,
            self.force.x, self.force.y, self.force.z,
        )
    }
}

/// Append-only CSV sink, flushed after every row so a crash loses at most the current row.
pub struct CsvSink<W: Write> {
    w: W,
    rows: usize,
}

impl CsvSink<BufWriter<File>> {
    pub fn append(path: &Path) -> IoResult<Self> {
        let f = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::new(BufWriter::new(f)))
    }
}

impl<W: Write> CsvSink<W> {
    pub fn new(w: W) -> Self { Self { w, rows: 0 } }
    pub fn rows(&self) -> usize { self.rows }
    pub fn get_ref(&self) -> &W { &self.w }

    pub fn write_row(&mut self, row: &TelemetryRow) -> IoResult<()> {
        self.w.write_all(row.csv_line().as_bytes())?;
        self.w.flush()?;
        self.rows += 1;
        Ok(())
    }
}

pub struct TelemetryExporter<W: Write = BufWriter<File>> {
    csv: CsvSink<W>,
    plot: PlotBuffer,
    snapshots: Option<SnapshotStream>,
}

impl TelemetryExporter<BufWriter<File>> {
    /// CSV at `csv_path`; spatial snapshots under `snapshot_dir` when given.
    pub fn create(csv_path: &Path, snapshot_dir: Option<PathBuf>) -> IoResult<Self> {
        let snapshots = snapshot_dir.map(|d| SnapshotStream::create(d)).transpose()?;
        Ok(Self { csv: CsvSink::append(csv_path)?, plot: PlotBuffer::new(), snapshots })
    }
}

impl<W: Write> TelemetryExporter<W> {
    pub fn with_sink(csv: CsvSink<W>, snapshots: Option<SnapshotStream>) -> Self {
        Self { csv, plot: PlotBuffer::new(), snapshots }
    }

    pub fn rows(&self) -> usize { self.csv.rows() }
    pub fn plot(&self) -> &PlotBuffer { &self.plot }
    pub fn sink(&self) -> &CsvSink<W> { &self.csv }
    pub fn snapshots_written(&self) -> usize { self.snapshots.as_ref().map_or(0, |s| s.written()) }

    /// Record one export tick. Any write failure is returned as is; nothing is retried.
    pub fn export<F: FieldSource + ?Sized>(&mut self, step: u64, stage: Stage, metrics: &Metrics, field: &F) -> IoResult<()> {
        let row = TelemetryRow::new(step, stage, metrics);
        info!("{}", row.console_line());
        self.csv.write_row(&row)?;

        self.plot.push(PlotSample {
            iter: step,
            unbalanced_force: row.unbalanced_force,
            pile_y: (stage == Stage::Inserting).then_some(row.pile_bottom_y),
            force_y: row.force.y,
        });

        if stage != Stage::Settling {
            if let Some(s) = self.snapshots.as_mut() {
                s.write(step, field).map_err(IoError::from)?;
            }
        }
        Ok(())
    }
}
