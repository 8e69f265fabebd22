//! The output schema for one collected product.
//!
//! Field names follow the Open Food Facts French vocabulary used by the
//! downstream dataset (`nom`, `marque`, `code_barres`, ...). Absence is
//! encoded two ways, on purpose:
//!
//! - textual fields default to the empty string;
//! - numeric fields, the letter grade, and the expiry date are `Option` and
//!   serialize as JSON `null` — an absent measurement is not the same thing
//!   as an empty label, and the two must survive a serialization round trip.

use serde::{Deserialize, Serialize};

/// One normalized product record, constructed once per successfully mapped
/// identifier and immutable afterwards.
///
/// Field order matches the output schema: JSONL objects and CSV columns keep
/// this order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    /// Product display name.
    pub nom: String,
    /// Generic descriptive name (e.g. "Pâte à tartiner aux noisettes").
    #[serde(rename = "nom_générique")]
    pub nom_generique: String,
    /// Individual brand entries, in page order, duplicates preserved.
    pub brands_tags: Vec<String>,
    /// Brand label as a single string.
    pub marque: String,
    /// Literal numeric price when one was published in structured data.
    /// Never guessed from page text.
    pub prix: Option<f64>,
    /// URL of the primary product image.
    pub image: String,
    /// Nutri-Score letter grade, `A`–`E`.
    pub score_nutritionnel: Option<String>,
    pub nutriments: Nutriments,
    /// Package quantity as displayed, with unit (e.g. "400 g").
    #[serde(rename = "poids_unité")]
    pub poids_unite: String,
    pub pays_origine: String,
    pub fabricant: String,
    pub pays_commercialisation: String,
    pub distributeur: String,
    /// Barcode digits; unique across a run and never empty.
    pub code_barres: String,
    /// Expiry date in ISO form, when one could be read.
    pub date_peremption: Option<String>,
    /// URL the record was extracted from.
    pub source: String,
    /// 0-based position among the records written in this run.
    pub index: u64,
}

/// Per-100g nutrient values. Each sub-field is `null` when the page's
/// nutrition section did not carry it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Nutriments {
    pub protides: Option<f64>,
    pub glucides: Option<f64>,
    pub lipides: Option<f64>,
    pub calories: Option<f64>,
}
