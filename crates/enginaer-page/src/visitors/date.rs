use chrono::{Locale, NaiveDateTime, TimeZone, Utc};

use crate::metadata::{parse_date, Value};
use crate::page::Page;
use crate::visitor::{ensure_target, PageVisitor, VisitError};

/// Parses the `date` value into a typed date.
///
/// When the page declares a `language`, also writes `publish-date`,
/// `publish-date-localformat` and `publish-date-title` formatted for that
/// language.
#[derive(Debug, Default, Clone, Copy)]
pub struct DateVisitor;

impl PageVisitor for DateVisitor {
    fn name(&self) -> &str {
        "date"
    }

    fn visit(&self, page: &mut Page) -> Result<(), VisitError> {
        ensure_target(self.name(), page)?;

        let date = match page.get("date") {
            Some(Value::Date(date)) => *date,
            Some(Value::Text(raw)) => parse_date(raw).ok_or_else(|| VisitError::InvalidDate {
                visitor: self.name().to_string(),
                page: page.name().to_string(),
                value: raw.clone(),
            })?,
            Some(other) => {
                return Err(VisitError::InvalidDate {
                    visitor: self.name().to_string(),
                    page: page.name().to_string(),
                    value: other.to_string(),
                })
            }
            None => return Ok(()),
        };

        page.set("date", date);

        let Some(language) = page.get("language").map(|l| l.to_string()) else {
            return Ok(());
        };

        let locale = locale_for(&language).ok_or_else(|| VisitError::UnknownLanguage {
            visitor: self.name().to_string(),
            page: page.name().to_string(),
            language: language.clone(),
        })?;

        for (key, value) in localized_variants(date, locale) {
            page.set(key, value);
        }

        Ok(())
    }
}

fn localized_variants(date: NaiveDateTime, locale: Locale) -> [(&'static str, String); 3] {
    let utc = Utc.from_utc_datetime(&date);
    [
        ("publish-date", date.format("%Y-%m-%d").to_string()),
        (
            "publish-date-localformat",
            utc.format_localized("%x", locale).to_string(),
        ),
        (
            "publish-date-title",
            utc.format_localized("%A, %-d %B %Y", locale).to_string(),
        ),
    ]
}

/// Map a language tag such as `en`, `tr` or `en-GB` to a locale.
fn locale_for(language: &str) -> Option<Locale> {
    let tag = language.trim().replace('-', "_");
    if tag.is_empty() {
        return None;
    }

    if tag.contains('_') {
        return Locale::try_from(tag.as_str()).ok();
    }

    let candidate = match tag.to_lowercase().as_str() {
        "en" => "en_US".to_string(),
        "ja" => "ja_JP".to_string(),
        "zh" => "zh_CN".to_string(),
        lang => format!("{}_{}", lang, lang.to_uppercase()),
    };

    Locale::try_from(candidate.as_str()).ok()
}
