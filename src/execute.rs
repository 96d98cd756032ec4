use crate::collect::{Attachment, Mailbox, Message};
use crate::config::Config;
use crate::error::{Error, Result, EXIT_FILESYSTEM, EXIT_MAILBOX_FETCH};
use crate::extract::ExtractedFields;
use crate::naming::Destination;
use crate::utils;
use crate::verify::{self, Existing};
use log::{debug, info, warn};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::PathBuf;

/// Counters of one run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Summary {
    /// Messages listed in the mailbox.
    pub messages: usize,
    /// Complete messages whose attachments were handled.
    pub processed: usize,
    /// Messages with missing fields or a malformed date.
    pub skipped: usize,
    /// Messages that could not be read or parsed.
    pub failed: usize,
    pub written: usize,
    /// Attachments already present with identical content.
    pub unchanged: usize,
    /// Existing files replaced by different content.
    pub overwritten: usize,
    /// Attachments of this run sharing a destination with an earlier one.
    pub collisions: usize,
    pub write_failures: usize,
    /// Attachments of complete messages whose content could not be decoded.
    pub undecodable: usize,
}

impl Summary {
    pub fn exit_code(&self) -> i32 {
        if self.write_failures > 0 {
            EXIT_FILESYSTEM
        } else if self.undecodable > 0 {
            EXIT_MAILBOX_FETCH
        } else {
            0
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} messages: {} processed, {} skipped, {} failed; \
             attachments: {} written, {} unchanged, {} overwritten, \
             {} collisions, {} write failures, {} undecodable",
            self.messages,
            self.processed,
            self.skipped,
            self.failed,
            self.written,
            self.unchanged,
            self.overwritten,
            self.collisions,
            self.write_failures,
            self.undecodable,
        )
    }
}

/// Destinations written during this run, mapped to what was written there.
type WrittenPaths = HashMap<PathBuf, String>;

fn save_attachment(
    destination: &Destination,
    attachment: &Attachment,
    message: &Message,
    written: &mut WrittenPaths,
    summary: &mut Summary,
) -> Result<()> {
    let file_name = destination.file_name(&attachment.name);
    let path = destination.dir.join(&file_name);

    let origin = format!("{:?} of message {}", attachment.name, message.id);
    if let Some(previous) = written.insert(path.clone(), origin.clone()) {
        warn!(
            "{} and {} both resolve to {}, the later one wins",
            previous,
            origin,
            path.display()
        );
        summary.collisions += 1;
    }

    let write_error = |source| Error::WriteFile {
        path: path.clone(),
        source,
    };
    match verify::compare_existing(&path, &attachment.content).map_err(write_error)? {
        Existing::Same => {
            info!(
                "{} already saved as {} in {}",
                attachment.name,
                file_name,
                destination.dir.display()
            );
            summary.unchanged += 1;
            return Ok(());
        }
        Existing::Different => {
            warn!(
                "overwriting existing file {} with different content",
                path.display()
            );
            summary.overwritten += 1;
        }
        Existing::Absent => {}
    }

    fs::write(&path, &attachment.content).map_err(write_error)?;
    info!(
        "saved {} as {} in {}",
        attachment.name,
        file_name,
        destination.dir.display()
    );
    summary.written += 1;
    Ok(())
}

fn process_message(
    config: &Config,
    message: &Message,
    written: &mut WrittenPaths,
    summary: &mut Summary,
) {
    debug!(
        "message {} ({}) with {} attachments",
        message.id,
        message
            .date
            .map_or_else(|| "no date".to_string(), |dt| dt.to_rfc2822()),
        message.attachments.len()
    );

    let fields = ExtractedFields::from_body(&message.body_text, &config.labels);
    let destination = match fields
        .into_complete(&config.labels)
        .and_then(|fields| Destination::new(&config.dest_root, &fields))
    {
        Ok(destination) => destination,
        Err(err) => {
            warn!("skipping message {}: {}", message.id, err);
            summary.skipped += 1;
            return;
        }
    };
    summary.processed += 1;

    for part in &message.undecodable {
        let err = Error::DecodeAttachment {
            name: part.name.clone(),
            reason: part.reason.clone(),
        };
        warn!("message {}: {}", message.id, err);
        summary.undecodable += 1;
    }

    if let Err(source) = fs::create_dir_all(&destination.dir) {
        let err = Error::CreateDir {
            path: destination.dir.clone(),
            source,
        };
        warn!("message {}: {}", message.id, err);
        summary.write_failures += message.attachments.len();
        return;
    }

    for attachment in &message.attachments {
        if let Err(err) = save_attachment(&destination, attachment, message, written, summary) {
            warn!("message {}: {}", message.id, err);
            summary.write_failures += 1;
        }
    }
}

/// Walks the whole mailbox once, in its own order, one message at a time.
///
/// Only a failure to access the mailbox itself is returned. Problems with a single
/// message or attachment are logged and counted in the summary.
pub fn process_mailbox<M: Mailbox>(config: &Config, mailbox: &M) -> Result<Summary> {
    let handles = mailbox.list()?;
    let mut summary = Summary::default();
    let mut written = WrittenPaths::new();

    let progress = utils::create_progress_bar(config, handles.len());
    progress.tick();
    for handle in &handles {
        summary.messages += 1;
        // Log lines go to the same stream as the bar, keep it off screen
        // while they are written.
        match mailbox.fetch(handle) {
            Ok(message) => progress
                .suspend(|| process_message(config, &message, &mut written, &mut summary)),
            Err(err) if err.is_fatal() => return Err(err),
            Err(err) => {
                progress.suspend(|| warn!("{}", err));
                summary.failed += 1;
            }
        }
        progress.inc(1);
    }
    progress.finish_and_clear();

    Ok(summary)
}
