//! Per-step spatial dumps: one JSON object per line, bodies first, then contacts.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use serde::Serialize;
use tracing::debug;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BodyRecord {
    pub id: u32,
    pub shape: &'static str,
    pub pos: [f64; 3],
    pub vel: [f64; 3],
    pub force: [f64; 3],
    /// Sphere radius; zero for boxes and facets.
    pub radius: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ContactRecord {
    pub a: u32,
    pub b: u32,
    pub normal: [f64; 3],
    pub normal_force: [f64; 3],
    pub shear_force: [f64; 3],
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Record {
    Body(BodyRecord),
    Contact(ContactRecord),
}

/// Anything that can enumerate its bodies and live contacts.
pub trait FieldSource {
    fn visit_bodies(&self, f: &mut dyn FnMut(BodyRecord));
    fn visit_contacts(&self, f: &mut dyn FnMut(ContactRecord));
}

pub struct SnapshotStream {
    dir: PathBuf,
    written: usize,
}

impl SnapshotStream {
    pub fn create(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir, written: 0 })
    }

    pub fn written(&self) -> usize { self.written }

    pub fn path_for(&self, step: u64) -> PathBuf { self.dir.join(format!("snap-{step:08}.jsonl")) }

    pub fn write<F: FieldSource + ?Sized>(&mut self, step: u64, src: &F) -> io::Result<PathBuf> {
        let path = self.path_for(step);
        let mut w = BufWriter::new(File::create(&path)?);
        let mut res: io::Result<()> = Ok(());
        let mut lines = 0usize;

        let mut emit = |r: Record| {
            if res.is_err() { return; }
            res = serde_json::to_writer(&mut w, &r).map_err(io::Error::from).and_then(|_| w.write_all(b"\n"));
            lines += 1;
        };
        src.visit_bodies(&mut |b| emit(Record::Body(b)));
        src.visit_contacts(&mut |c| emit(Record::Contact(c)));
        res?;
        w.flush()?;

        self.written += 1;
        debug!(step, lines, path = %path.display(), "snapshot written");
        Ok(path)
    }
}
