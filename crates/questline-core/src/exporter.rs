//! Export purchase history to flat formats
//!
//! One row per purchase record: item name, variant, cost, purchase
//! timestamp. Consumed by external reporting paths; the exporter never
//! mutates the ledger.

use crate::error::{Error, Result};
use crate::shop::ShopLedger;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::io::Write;

/// Export format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// CSV, one row per record
    Csv,
    /// JSON array of rows
    Json,
    /// Human-readable text format
    Text,
}

/// Exporter for purchase history
pub struct Exporter<'a> {
    ledger: &'a ShopLedger,
}

impl<'a> Exporter<'a> {
    /// Create a new exporter
    pub fn new(ledger: &'a ShopLedger) -> Self {
        Self { ledger }
    }

    /// Export to a string in the specified format
    pub fn export(&self, format: ExportFormat) -> Result<String> {
        match format {
            ExportFormat::Csv => Ok(self.to_csv()),
            ExportFormat::Json => self.to_json(),
            ExportFormat::Text => Ok(self.to_text()),
        }
    }

    /// Export to a writer
    pub fn export_to<W: Write>(&self, writer: &mut W, format: ExportFormat) -> Result<()> {
        let content = self.export(format)?;
        writer
            .write_all(content.as_bytes())
            .map_err(|e| Error::Export(e.to_string()))?;
        Ok(())
    }

    /// Export to CSV format
    pub fn to_csv(&self) -> String {
        let mut output = String::new();
        output.push_str("item_name,variant,cost,purchased_at\n");

        for record in &self.ledger.records {
            let name = record.item_name.replace('"', "\"\"");
            let variant = record
                .variant
                .as_deref()
                .unwrap_or_default()
                .replace('"', "\"\"");
            output.push_str(&format!(
                "\"{}\",\"{}\",{},{}\n",
                name,
                variant,
                record.cost,
                timestamp(record.purchased_at)
            ));
        }

        output
    }

    /// Export to JSON format
    pub fn to_json(&self) -> Result<String> {
        let rows: Vec<ExportRow<'_>> = self
            .ledger
            .records
            .iter()
            .map(|record| ExportRow {
                item_name: &record.item_name,
                variant: record.variant.as_deref(),
                cost: record.cost,
                purchased_at: timestamp(record.purchased_at),
            })
            .collect();
        serde_json::to_string_pretty(&rows).map_err(|e| Error::Export(e.to_string()))
    }

    /// Export to human-readable text format
    pub fn to_text(&self) -> String {
        let mut output = String::new();
        output.push_str("=== Purchase History ===\n\n");
        output.push_str(&format!("Total purchases: {}\n\n", self.ledger.records.len()));

        for record in &self.ledger.records {
            let variant = record
                .variant
                .as_deref()
                .map(|v| format!(" ({})", v))
                .unwrap_or_default();
            output.push_str(&format!(
                "  {}{} - {} coins at {}\n",
                record.item_name,
                variant,
                record.cost,
                timestamp(record.purchased_at)
            ));
        }

        output
    }
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    item_name: &'a str,
    variant: Option<&'a str>,
    cost: u64,
    purchased_at: String,
}
