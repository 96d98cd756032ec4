use crate::config::FieldLabels;
use crate::error::Error;

/// Finds the value of `label` in free-form text.
///
/// A field is written as `<label>: <value>` and the value runs to the end of
/// the line. The label does not have to start the line, but it must not be
/// the tail of a longer word, so `XBereich: a` does not yield `Bereich`. The
/// first match in the text wins, even when its value is empty, which counts as
/// absent. Surrounding whitespace, including the `\r` of CRLF line endings, is
/// stripped.
pub fn extract_field<'a>(text: &'a str, label: &str) -> Option<&'a str> {
    if label.is_empty() {
        return None;
    }
    let needle = format!("{}: ", label);
    for line in text.lines() {
        for (pos, _) in line.match_indices(&needle) {
            let anchored = line[..pos]
                .chars()
                .next_back()
                .map_or(true, |c| !c.is_alphanumeric());
            if !anchored {
                continue;
            }
            let value = line[pos + needle.len()..].trim();
            return if value.is_empty() { None } else { Some(value) };
        }
    }
    None
}

/// The four fields looked up in a message body.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExtractedFields {
    pub area: Option<String>,
    pub purchase_date: Option<String>,
    pub recipient: Option<String>,
    pub amount: Option<String>,
}

/// Fields of a complete message, every one of them present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompleteFields {
    pub area: String,
    /// Raw `DD.MM.YYYY` form.
    pub purchase_date: String,
    pub recipient: String,
    /// Raw locale formatted amount, like `12,34 €`.
    pub amount: String,
}

impl ExtractedFields {
    pub fn from_body(body: &str, labels: &FieldLabels) -> Self {
        let lookup = |label: &str| extract_field(body, label).map(str::to_string);
        ExtractedFields {
            area: lookup(&labels.area),
            purchase_date: lookup(&labels.purchase_date),
            recipient: lookup(&labels.recipient),
            amount: lookup(&labels.amount),
        }
    }

    /// Fails with the labels of all absent fields, in the order area, date,
    /// recipient, amount.
    pub fn into_complete(self, labels: &FieldLabels) -> Result<CompleteFields, Error> {
        match self {
            ExtractedFields {
                area: Some(area),
                purchase_date: Some(purchase_date),
                recipient: Some(recipient),
                amount: Some(amount),
            } => Ok(CompleteFields {
                area,
                purchase_date,
                recipient,
                amount,
            }),
            fields => {
                let missing = [
                    (fields.area.is_none(), &labels.area),
                    (fields.purchase_date.is_none(), &labels.purchase_date),
                    (fields.recipient.is_none(), &labels.recipient),
                    (fields.amount.is_none(), &labels.amount),
                ]
                .into_iter()
                .filter(|(absent, _)| *absent)
                .map(|(_, label)| label.clone())
                .collect();
                Err(Error::MissingFields(missing))
            }
        }
    }
}
