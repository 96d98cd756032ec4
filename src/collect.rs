use crate::error::{Error, Result};
use chrono::{DateTime, FixedOffset};
use mailparse::{DispositionType, MailHeaderMap, ParsedMail};
use std::borrow::Cow;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub name: String,
    pub content: Vec<u8>,
}

/// An attachment part whose transfer encoding could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Undecodable {
    pub name: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Identifies the message in diagnostics.
    pub id: String,
    pub date: Option<DateTime<FixedOffset>>,
    pub body_text: String,
    pub attachments: Vec<Attachment>,
    pub undecodable: Vec<Undecodable>,
}

/// Source of the messages to process.
///
/// Failing to `list` aborts the run. Failing to `fetch` only skips that one
/// message.
pub trait Mailbox {
    type Handle;

    fn list(&self) -> Result<Vec<Self::Handle>>;
    fn fetch(&self, handle: &Self::Handle) -> Result<Message>;
}

/// A mailbox in Maildir layout. Messages in `new` and `cur` are both read,
/// neither of them is modified.
#[derive(Debug)]
pub struct Maildir {
    path: PathBuf,
}

fn access_error(path: &Path, source: io::Error) -> Error {
    let path = path.to_path_buf();
    if source.kind() == io::ErrorKind::PermissionDenied {
        Error::MailboxAuth { path, source }
    } else {
        Error::MailboxFetch { path, source }
    }
}

impl Maildir {
    pub fn open(path: &Path) -> Result<Self> {
        for sub in ["new", "cur"] {
            let dir = path.join(sub);
            let meta = fs::metadata(&dir).map_err(|err| access_error(&dir, err))?;
            if !meta.is_dir() {
                return Err(Error::MailboxFetch {
                    path: dir,
                    source: io::Error::new(io::ErrorKind::InvalidInput, "not a directory"),
                });
            }
        }
        Ok(Maildir {
            path: path.to_path_buf(),
        })
    }

    fn list_dir(&self, sub: &str) -> Result<Vec<PathBuf>> {
        let dir = self.path.join(sub);
        let mut files = vec![];
        for entry in fs::read_dir(&dir).map_err(|err| access_error(&dir, err))? {
            let path = entry.map_err(|err| access_error(&dir, err))?.path();
            let hidden = path
                .file_name()
                .map_or(true, |name| name.as_encoded_bytes().first() == Some(&b'.'));
            if !hidden && path.is_file() {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }
}

impl Mailbox for Maildir {
    type Handle = PathBuf;

    fn list(&self) -> Result<Vec<PathBuf>> {
        let mut files = self.list_dir("new")?;
        files.extend(self.list_dir("cur")?);
        Ok(files)
    }

    fn fetch(&self, path: &PathBuf) -> Result<Message> {
        let id = path
            .strip_prefix(&self.path)
            .unwrap_or(path)
            .display()
            .to_string();
        let raw = match fs::read(path) {
            Ok(raw) => raw,
            Err(source) => return Err(Error::ReadMessage { id, source }),
        };
        parse_message(id, &raw)
    }
}

fn normalize_datetime(mut dt: &str) -> Cow<str> {
    // Trailing commentary timezone info is not recognized.
    if dt.ends_with(')') {
        if let Some(pos) = dt.rfind('(') {
            dt = &dt[..pos];
        }
    }
    dt = dt.trim();
    // -0000 timezone cannot be parsed. Let's just treat it as +0000.
    if dt.ends_with("-0000") {
        Cow::Owned(format!("{}+0000", &dt[..dt.len() - 5]))
    } else {
        Cow::Borrowed(dt)
    }
}

fn attachment_name(part: &ParsedMail) -> Option<String> {
    let disposition = part.get_content_disposition();
    let name = disposition
        .params
        .get("filename")
        .or_else(|| part.ctype.params.get("name"))
        .cloned();
    match (disposition.disposition, name) {
        (_, Some(name)) if !name.trim().is_empty() => Some(name),
        (DispositionType::Attachment, _) => Some(String::new()),
        _ => None,
    }
}

#[derive(Default)]
struct Parts {
    body: Option<String>,
    attachments: Vec<Attachment>,
    undecodable: Vec<Undecodable>,
}

fn collect_parts(part: &ParsedMail, parts: &mut Parts) {
    if !part.subparts.is_empty() {
        for sub in &part.subparts {
            collect_parts(sub, parts);
        }
        return;
    }
    if let Some(name) = attachment_name(part) {
        let name = if name.is_empty() {
            let position = parts.attachments.len() + parts.undecodable.len() + 1;
            format!("attachment-{}.bin", position)
        } else {
            name
        };
        match part.get_body_raw() {
            Ok(content) => parts.attachments.push(Attachment { name, content }),
            Err(err) => parts.undecodable.push(Undecodable {
                name,
                reason: err.to_string(),
            }),
        }
        return;
    }
    if parts.body.is_none() && part.ctype.mimetype.eq_ignore_ascii_case("text/plain") {
        if let Ok(text) = part.get_body() {
            parts.body = Some(text);
        }
    }
}

pub fn parse_message(id: String, raw: &[u8]) -> Result<Message> {
    let mail = match mailparse::parse_mail(raw) {
        Ok(mail) => mail,
        Err(source) => return Err(Error::ParseMessage { id, source }),
    };
    let date = mail
        .headers
        .get_first_value("Date")
        .and_then(|value| DateTime::parse_from_rfc2822(&normalize_datetime(&value)).ok());
    let mut parts = Parts::default();
    collect_parts(&mail, &mut parts);
    Ok(Message {
        id,
        date,
        body_text: parts.body.unwrap_or_default(),
        attachments: parts.attachments,
        undecodable: parts.undecodable,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const MULTIPART: &str = "From: shop@example.com\r\n\
        To: me@example.com\r\n\
        Date: Wed, 01 Feb 2023 10:00:00 +0100 (CET)\r\n\
        Subject: Beleg\r\n\
        MIME-Version: 1.0\r\n\
        Content-Type: multipart/mixed; boundary=\"XX\"\r\n\
        \r\n\
        --XX\r\n\
        Content-Type: text/plain; charset=utf-8\r\n\
        Content-Transfer-Encoding: 8bit\r\n\
        \r\n\
        Bereich: Buero\r\n\
        Empfänger: ACME\r\n\
        --XX\r\n\
        Content-Type: application/pdf; name=\"receipt.pdf\"\r\n\
        Content-Disposition: attachment; filename=\"receipt.pdf\"\r\n\
        Content-Transfer-Encoding: base64\r\n\
        \r\n\
        AAEC/w==\r\n\
        --XX\r\n\
        Content-Type: application/octet-stream\r\n\
        Content-Disposition: attachment\r\n\
        \r\n\
        raw\r\n\
        --XX--\r\n";

    #[test]
    fn test_normalize_datetime() {
        let testcases = [
            (
                "Wed, 01 Feb 2023 10:00:00 +0100",
                "Wed, 01 Feb 2023 10:00:00 +0100",
            ),
            (
                " Wed, 01 Feb 2023 10:00:00 +0100 (CET)",
                "Wed, 01 Feb 2023 10:00:00 +0100",
            ),
            (
                "Mon, 06 Mar 2023 08:15:00 -0000",
                "Mon, 06 Mar 2023 08:15:00 +0000",
            ),
        ];
        for (raw, expected) in testcases {
            assert_eq!(normalize_datetime(raw), expected);
        }
    }

    #[test]
    fn test_parse_multipart() {
        let message = parse_message("m1".to_string(), MULTIPART.as_bytes()).unwrap();
        let cet = FixedOffset::east_opt(3600).unwrap();
        assert_eq!(
            message.date,
            Some(cet.with_ymd_and_hms(2023, 2, 1, 10, 0, 0).unwrap())
        );
        assert!(message.body_text.contains("Bereich: Buero"));
        assert!(message.body_text.contains("Empfänger: ACME"));
        assert_eq!(message.attachments.len(), 2);
        assert_eq!(message.attachments[0].name, "receipt.pdf");
        assert_eq!(message.attachments[0].content, [0u8, 1, 2, 255]);
        assert_eq!(message.attachments[1].name, "attachment-2.bin");
    }

    #[test]
    fn test_undecodable_attachment_kept() {
        let raw = "Subject: x\r\n\
            Content-Type: multipart/mixed; boundary=\"XX\"\r\n\
            \r\n\
            --XX\r\n\
            Content-Type: text/plain\r\n\
            \r\n\
            Summe: 9,99\r\n\
            --XX\r\n\
            Content-Type: application/pdf\r\n\
            Content-Disposition: attachment; filename=\"receipt.pdf\"\r\n\
            Content-Transfer-Encoding: base64\r\n\
            \r\n\
            !!!not*base64***\r\n\
            --XX\r\n\
            Content-Type: application/octet-stream\r\n\
            Content-Disposition: attachment\r\n\
            \r\n\
            raw\r\n\
            --XX--\r\n";
        let message = parse_message("m3".to_string(), raw.as_bytes()).unwrap();
        assert_eq!(message.undecodable.len(), 1);
        assert_eq!(message.undecodable[0].name, "receipt.pdf");
        assert!(!message.undecodable[0].reason.is_empty());
        assert_eq!(message.attachments.len(), 1);
        assert_eq!(message.attachments[0].name, "attachment-2.bin");
    }

    #[test]
    fn test_parse_plain() {
        let raw = "Subject: x\r\n\r\nSumme: 9,99\r\n";
        let message = parse_message("m2".to_string(), raw.as_bytes()).unwrap();
        assert_eq!(message.date, None);
        assert!(message.body_text.contains("Summe: 9,99"));
        assert!(message.attachments.is_empty());
        assert!(message.undecodable.is_empty());
    }

    fn make_maildir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("new")).unwrap();
        fs::create_dir(dir.path().join("cur")).unwrap();
        dir
    }

    #[test]
    fn test_maildir_listing() {
        let dir = make_maildir();
        fs::write(dir.path().join("cur").join("1:2,S"), "Subject: a\r\n\r\na").unwrap();
        fs::write(dir.path().join("new").join("3"), "Subject: b\r\n\r\nb").unwrap();
        fs::write(dir.path().join("new").join("2"), "Subject: c\r\n\r\nc").unwrap();
        fs::write(dir.path().join("new").join(".hidden"), "").unwrap();

        let maildir = Maildir::open(dir.path()).unwrap();
        let list = maildir.list().unwrap();
        let names: Vec<_> = list
            .iter()
            .map(|path| path.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            names,
            [
                Path::new("new").join("2"),
                Path::new("new").join("3"),
                Path::new("cur").join("1:2,S"),
            ]
        );
        let message = maildir.fetch(&list[0]).unwrap();
        assert_eq!(message.id, Path::new("new").join("2").display().to_string());
        assert_eq!(message.body_text, "c");
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_file_name_listed() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = make_maildir();
        let name = OsStr::from_bytes(b"1675242000.\xff.host");
        fs::write(dir.path().join("new").join(name), "Subject: a\r\n\r\na").unwrap();
        fs::write(dir.path().join("new").join(".keep"), "").unwrap();

        let maildir = Maildir::open(dir.path()).unwrap();
        assert_eq!(maildir.list().unwrap(), [dir.path().join("new").join(name)]);
    }

    #[test]
    fn test_missing_maildir() {
        let dir = tempfile::tempdir().unwrap();
        match Maildir::open(&dir.path().join("nope")) {
            Err(err @ Error::MailboxFetch { .. }) => assert!(err.is_fatal()),
            other => panic!("unexpected {:?}", other),
        }
    }
}
