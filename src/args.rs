use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[clap(name = "attachment-sorter")]
#[clap(author, version, about)]
pub struct Args {
    /// Path to the maildir.
    #[clap(env = "ATTACHMENT_SORTER_MAILDIR")]
    pub maildir: PathBuf,
    /// The directory we put area folders in.
    #[clap(short, long, env = "ATTACHMENT_SORTER_DEST")]
    pub dest: PathBuf,
    /// Suppress any progress output if set.
    #[clap(short, long)]
    pub quiet: bool,
    /// Log at debug level.
    #[clap(long)]
    pub debug: bool,
    /// Label of the field naming the area folder.
    #[clap(long, env = "ATTACHMENT_SORTER_AREA_LABEL", default_value = "Bereich")]
    pub area_label: String,
    /// Label of the purchase date field (DD.MM.YYYY).
    #[clap(long, env = "ATTACHMENT_SORTER_DATE_LABEL", default_value = "Kaufdatum")]
    pub date_label: String,
    /// Label of the recipient field.
    #[clap(long, env = "ATTACHMENT_SORTER_RECIPIENT_LABEL", default_value = "Empfänger")]
    pub recipient_label: String,
    /// Label of the amount field.
    #[clap(long, env = "ATTACHMENT_SORTER_AMOUNT_LABEL", default_value = "Summe")]
    pub amount_label: String,
}

impl Args {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
