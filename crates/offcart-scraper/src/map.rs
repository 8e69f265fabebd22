//! Mapping from raw extracted values to the output schema.
//!
//! This is the one place where type coercion happens: the extractor hands
//! over page text verbatim (units and all), and [`map_record`] turns it into
//! typed schema fields. The function is total — any [`RawFields`], including
//! one with every field absent, produces a structurally valid record. A value
//! that fails to coerce becomes `null`, never an error.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use offcart_core::{Nutriments, ProductRecord};

use crate::identifier::Identifier;
use crate::types::RawFields;

/// First decimal number in a text, allowing grouped digits ("2 252") and a
/// locale comma as the decimal separator ("57,5").
static FIRST_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[0-9][0-9 \u{00a0}\u{202f}]*(?:[.,][0-9]+)?").expect("static regex is valid")
});

/// A number immediately qualified as kilocalories.
static KCAL_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)([0-9]+(?:[.,][0-9]+)?)\s*kcal").expect("static regex is valid")
});

/// Date formats accepted for expiry dates, tried in order.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%d.%m.%Y"];

/// Builds the final [`ProductRecord`] for one identifier.
///
/// `index` is the record's 0-based position among the records written in this
/// run; `source_url` is the page the fields were extracted from. The page's
/// own barcode wins when it is well-formed, otherwise the identifier's.
#[must_use]
pub fn map_record(
    raw: RawFields,
    identifier: &Identifier,
    source_url: &str,
    index: u64,
) -> ProductRecord {
    let brands_tags = raw
        .brands_tags
        .map(|tags| {
            tags.into_iter()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
        })
        .filter(|tags| !tags.is_empty())
        .or_else(|| raw.marque.as_deref().map(split_tags))
        .unwrap_or_default();

    let code_barres = raw
        .code_barres
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty() && c.bytes().all(|b| b.is_ascii_digit()))
        .unwrap_or_else(|| identifier.code_barres.clone());

    ProductRecord {
        nom: raw.nom.unwrap_or_default(),
        nom_generique: raw.nom_generique.unwrap_or_default(),
        brands_tags,
        marque: raw.marque.unwrap_or_default(),
        prix: raw.prix.as_deref().and_then(coerce_price),
        image: raw.image.unwrap_or_default(),
        score_nutritionnel: raw.score_nutritionnel.and_then(valid_grade),
        nutriments: Nutriments {
            protides: raw.protides.as_deref().and_then(coerce_number),
            glucides: raw.glucides.as_deref().and_then(coerce_number),
            lipides: raw.lipides.as_deref().and_then(coerce_number),
            calories: raw.calories.as_deref().and_then(coerce_calories),
        },
        poids_unite: raw.poids_unite.unwrap_or_default(),
        pays_origine: raw.pays_origine.unwrap_or_default(),
        fabricant: raw.fabricant.unwrap_or_default(),
        pays_commercialisation: raw.pays_commercialisation.unwrap_or_default(),
        distributeur: raw.distributeur.unwrap_or_default(),
        code_barres,
        date_peremption: raw.date_peremption.as_deref().and_then(normalize_iso_date),
        source: source_url.to_string(),
        index,
    }
}

/// Parses the first number out of a raw page value, stripping units, digit
/// grouping spaces, and converting a decimal comma. `None` when no number is
/// present.
pub(crate) fn coerce_number(raw: &str) -> Option<f64> {
    let matched = FIRST_NUMBER.find(raw)?;
    let cleaned: String = matched
        .as_str()
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\u{00a0}' && *c != '\u{202f}')
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    cleaned.parse::<f64>().ok()
}

/// Energy values prefer the kilocalorie figure when the row carries both kJ
/// and kcal (e.g. `"2252 kj (539 kcal)"` → `539`).
pub(crate) fn coerce_calories(raw: &str) -> Option<f64> {
    if let Some(captures) = KCAL_NUMBER.captures(raw) {
        return captures[1].replace(',', ".").parse::<f64>().ok();
    }
    coerce_number(raw)
}

/// Price coercion is deliberately strict: only a bare decimal literal parses.
/// Currency symbols, locale commas, or any other decoration mean the value
/// was not a trustworthy structured price, and the field stays `null`.
pub(crate) fn coerce_price(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit() || b == b'.') {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

/// Splits a brand label on `,`/`;`, trimming entries, dropping empties,
/// preserving order. Duplicates are kept: the list mirrors the page.
pub(crate) fn split_tags(raw: &str) -> Vec<String> {
    raw.split([',', ';'])
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Accepts only a single letter grade A–E (any case), normalized to upper.
fn valid_grade(raw: String) -> Option<String> {
    let upper = raw.trim().to_ascii_uppercase();
    if upper.len() == 1 && upper.chars().all(|c| ('A'..='E').contains(&c)) {
        Some(upper)
    } else {
        None
    }
}

/// Normalizes an expiry date to ISO `YYYY-MM-DD`, trying a small set of
/// formats seen in the wild. Unparseable text yields `None`.
pub(crate) fn normalize_iso_date(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
        .map(|date| date.format("%Y-%m-%d").to_string())
}
