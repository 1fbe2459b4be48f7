use crate::Event;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::{create_dir_all, File};
use std::io::{BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
pub struct MetaFile {
    pub num_docs: u32,
    pub created_at: String,
    pub version: u32,
}

pub struct IndexPaths {
    pub root: PathBuf,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    fn events(&self) -> PathBuf { self.root.join("events.bin") }
    fn meta(&self) -> PathBuf { self.root.join("meta.json") }
}

pub fn save_events(paths: &IndexPaths, events: &[Event]) -> Result<()> {
    create_dir_all(&paths.root)?;
    let mut f = File::create(paths.events())?;
    let bytes = bincode::serialize(events)?;
    f.write_all(&bytes)?;
    Ok(())
}

pub fn load_events(paths: &IndexPaths) -> Result<Vec<Event>> {
    let mut f = File::open(paths.events())?;
    let mut buf = Vec::new();
    f.read_to_end(&mut buf)?;
    let events = bincode::deserialize(&buf)?;
    Ok(events)
}

pub fn save_meta(paths: &IndexPaths, meta: &MetaFile) -> Result<()> {
    create_dir_all(&paths.root)?;
    let mut f = File::create(paths.meta())?;
    let json = serde_json::to_string_pretty(meta)?;
    f.write_all(json.as_bytes())?;
    Ok(())
}

pub fn load_meta(paths: &IndexPaths) -> Result<MetaFile> {
    let mut f = File::open(paths.meta())?;
    let mut buf = String::new();
    f.read_to_string(&mut buf)?;
    let meta: MetaFile = serde_json::from_str(&buf)?;
    Ok(meta)
}

/// Write the corpus and its meta file. Indices are rebuilt from the corpus on load.
pub fn save_snapshot(paths: &IndexPaths, events: &[Event]) -> Result<MetaFile> {
    save_events(paths, events)?;
    let meta = MetaFile {
        num_docs: events.len() as u32,
        created_at: OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_default(),
        version: SNAPSHOT_VERSION,
    };
    save_meta(paths, &meta)?;
    Ok(meta)
}

/// Read a snapshot directory, checking it against its meta file.
pub fn load_snapshot(paths: &IndexPaths) -> Result<(Vec<Event>, MetaFile)> {
    let meta = load_meta(paths).with_context(|| format!("reading meta in {}", paths.root.display()))?;
    if meta.version != SNAPSHOT_VERSION {
        bail!("unsupported snapshot version {} (expected {SNAPSHOT_VERSION})", meta.version);
    }
    let events = load_events(paths).with_context(|| format!("reading events in {}", paths.root.display()))?;
    if events.len() != meta.num_docs as usize {
        bail!("snapshot holds {} events but meta.json says {}", events.len(), meta.num_docs);
    }
    Ok((events, meta))
}

/// Read seed events from a `.jsonl` file (one event per line) or a `.json`
/// file holding either an array of events or a single event.
pub fn read_event_file(path: &Path) -> Result<Vec<Event>> {
    let f = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let reader = BufReader::new(f);
    if path.extension().and_then(|s| s.to_str()) == Some("jsonl") {
        let mut events = Vec::new();
        for (lineno, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() { continue; }
            let ev: Event = serde_json::from_str(&line)
                .with_context(|| format!("{}:{}", path.display(), lineno + 1))?;
            events.push(ev);
        }
        return Ok(events);
    }
    let json: serde_json::Value = serde_json::from_reader(reader)?;
    match json {
        serde_json::Value::Array(arr) => arr
            .into_iter()
            .enumerate()
            .map(|(i, v)| serde_json::from_value(v).with_context(|| format!("{} record {i}", path.display())))
            .collect(),
        serde_json::Value::Object(_) => Ok(vec![serde_json::from_value(json)?]),
        _ => bail!("{} holds neither an event nor an array of events", path.display()),
    }
}
