mod parser;

use crate::error::Error;
use combine::Parser;

/// Turns a `DD.MM.YYYY` purchase date into `YYYYMMDD`.
///
/// The three dot separated components are reversed and concatenated. Day and
/// month ranges are not checked and nothing is zero padded, so `1.2.2023`
/// becomes `202321`.
///
/// Anything that does not split into exactly three non-empty digit runs is
/// rejected instead of producing a garbled name.
pub fn normalize_date(date: &str) -> Result<String, Error> {
    match parser::dotted_date().parse(date) {
        Ok(((day, month, year), "")) => Ok(format!("{}{}{}", year, month, day)),
        _ => Err(Error::MalformedDate(date.to_string())),
    }
}
