use crate::date::normalize_date;
use crate::error::Error;
use crate::extract::CompleteFields;
use std::path::{Path, PathBuf};

/// Converts decimal commas to dots and drops every space, so `1 234,50 €`
/// becomes `1234.50€`. The euro sign is left for `file_name` to replace.
pub fn sanitize_amount(amount: &str) -> String {
    amount
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect()
}

/// Makes a string usable as a single path component, on Windows too.
fn sanitize_component(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

fn folder_name(area: &str) -> String {
    let name = sanitize_component(area);
    if name == "." || name == ".." {
        "_".to_string()
    } else {
        name
    }
}

/// Attachment names coming from a message may carry a path. Only the last
/// component is kept.
fn base_name(original: &str) -> &str {
    original
        .rsplit(|c: char| c == '/' || c == '\\')
        .find(|s| !s.is_empty() && *s != "." && *s != "..")
        .unwrap_or("attachment")
}

/// Where the attachments of one complete message go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    /// `<root>/<area>`
    pub dir: PathBuf,
    /// `<YYYYMMDD>_<recipient>_<amount>_`
    prefix: String,
}

impl Destination {
    /// Fails if the purchase date cannot be normalized, before anything is
    /// touched on disk.
    pub fn new(root: &Path, fields: &CompleteFields) -> Result<Self, Error> {
        let date = normalize_date(&fields.purchase_date)?;
        let prefix = format!(
            "{}_{}_{}_",
            date,
            sanitize_component(&fields.recipient),
            sanitize_component(&sanitize_amount(&fields.amount)),
        );
        Ok(Destination {
            dir: root.join(folder_name(&fields.area)),
            prefix,
        })
    }

    /// File name for an attachment, `<prefix><original>` with `€` spelled out
    /// as `EUR` anywhere in it.
    pub fn file_name(&self, original: &str) -> String {
        let name = format!("{}{}", self.prefix, sanitize_component(base_name(original)));
        name.replace('€', "EUR")
    }
}
