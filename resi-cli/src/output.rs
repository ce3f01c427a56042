//! Terminal rendering for catalogs and encoder status.

use chrono::Utc;
use resi_api::{Catalog, EncoderStatus};

use crate::cli::OutputFormat;
use crate::error::Result;

pub fn print_catalog(kind: &str, catalog: &Catalog, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(catalog)?),
        OutputFormat::Pretty => {
            if catalog.is_empty() {
                println!("No {kind} configured.");
                return Ok(());
            }
            let mut entries: Vec<_> = catalog.iter().collect();
            entries.sort_by(|a, b| a.1.cmp(b.1));
            println!("{kind}:");
            for (uuid, name) in entries {
                println!("  {uuid}  {name}");
            }
        }
    }
    Ok(())
}

pub fn print_status(
    encoder_id: &str,
    record: Option<&EncoderStatus>,
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Json => match record {
            Some(record) => println!("{}", serde_json::to_string_pretty(record)?),
            None => println!("null"),
        },
        OutputFormat::Pretty => match record {
            Some(record) => {
                println!("Encoder {encoder_id}");
                println!("  Running:   {}", yes_no(record.is_started()));
                match &record.video_input_source {
                    Some(source) => println!("  Has video: yes ({source})"),
                    None => println!("  Has video: no"),
                }
                println!("  Heartbeat: {}", heartbeat(record));
            }
            // Absence is a legitimate outcome (deleted or renamed encoder),
            // not a failure.
            None => println!("Encoder {encoder_id} is not in the account snapshot."),
        },
    }
    Ok(())
}

/// Compact one-line feedback state, stable across polls so `watch` can
/// print only on change.
pub fn feedback_line(encoder_id: &str, record: Option<&EncoderStatus>) -> String {
    match record {
        Some(record) => format!(
            "{encoder_id}: running={} video={}",
            record.is_started(),
            record.has_video()
        ),
        None => format!("{encoder_id}: not found, running=false video=false"),
    }
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

fn heartbeat(record: &EncoderStatus) -> String {
    match record.last_update {
        Some(last_update) => {
            let age = (Utc::now() - last_update).num_seconds().max(0);
            format!("{age}s ago")
        }
        None => "never".to_string(),
    }
}
