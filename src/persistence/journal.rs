// ============================================================================
// Trade Journal
// Append-only JSON-lines record of accepted orders and executed trades
// ============================================================================

use crate::domain::{Order, Trade};
use crate::interfaces::{EventHandler, OrderEvent};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum JournalError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// One line of the journal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "record", rename_all = "snake_case")]
pub enum JournalRecord {
    Order(Order),
    Trade(Trade),
}

/// Durable audit trail.
///
/// Records are written in submission order and flushed per record, so a
/// reader sees every record whose append returned `Ok`. The file is opened
/// in append mode; reopening an existing journal continues it.
pub struct TradeJournal {
    path: PathBuf,
    writer: Mutex<BufWriter<File>>,
    records_written: AtomicU64,
}

impl TradeJournal {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, JournalError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            writer: Mutex::new(BufWriter::new(file)),
            records_written: AtomicU64::new(0),
        })
    }

    pub fn append(&self, record: &JournalRecord) -> Result<(), JournalError> {
        let line = serde_json::to_string(record)?;

        let mut writer = self.writer.lock();
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;

        self.records_written.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    pub fn record_order(&self, order: &Order) -> Result<(), JournalError> {
        self.append(&JournalRecord::Order(order.clone()))
    }

    pub fn record_trade(&self, trade: &Trade) -> Result<(), JournalError> {
        self.append(&JournalRecord::Trade(trade.clone()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Records appended through this handle (not counting earlier sessions)
    pub fn records_written(&self) -> u64 {
        self.records_written.load(Ordering::Relaxed)
    }

    /// Read back every record in file order. Blank lines are skipped.
    pub fn read_all(path: impl AsRef<Path>) -> Result<Vec<JournalRecord>, JournalError> {
        let reader = BufReader::new(File::open(path)?);
        let mut records = Vec::new();

        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            records.push(serde_json::from_str(&line)?);
        }

        Ok(records)
    }
}

impl EventHandler for TradeJournal {
    fn on_event(&self, event: &OrderEvent) {
        let result = match event {
            OrderEvent::OrderAccepted { order } => self.record_order(order),
            OrderEvent::TradeExecuted { trade } => self.record_trade(trade),
            _ => return,
        };

        // Matching has already happened; a failed write is reported, not undone
        if let Err(err) = result {
            tracing::warn!(path = %self.path.display(), error = %err, "journal write failed");
        }
    }
}
