//! Run configuration handed to the processing loop.

use crate::args::Args;
use std::path::PathBuf;

/// Labels of the four fields read from every message body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldLabels {
    pub area: String,
    pub purchase_date: String,
    pub recipient: String,
    pub amount: String,
}

impl Default for FieldLabels {
    fn default() -> Self {
        Self {
            area: "Bereich".to_string(),
            purchase_date: "Kaufdatum".to_string(),
            recipient: "Empfänger".to_string(),
            amount: "Summe".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the maildir to read messages from.
    pub maildir: PathBuf,
    /// Root of the area folders.
    pub dest_root: PathBuf,
    pub labels: FieldLabels,
    /// Hide the progress bar.
    pub quiet: bool,
    pub debug: bool,
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Self {
            maildir: args.maildir,
            dest_root: args.dest,
            labels: FieldLabels {
                area: args.area_label,
                purchase_date: args.date_label,
                recipient: args.recipient_label,
                amount: args.amount_label,
            },
            quiet: args.quiet,
            debug: args.debug,
        }
    }
}
