//! Transient pipeline types: the fetched page and the raw extracted fields.
//!
//! ## Observed shape of Open Food Facts product pages
//!
//! The product page is server-rendered HTML with a loosely stable structure:
//!
//! - A JSON-LD `<script type="application/ld+json">` block with
//!   `"@type": "Product"` on most (not all) pages, carrying `name`, `brand`,
//!   `image`, `gtin13` and sometimes `offers.price`.
//! - Labelled field containers with ids like `#field_brands_value`,
//!   `#field_quantity_value`, `#field_origins_value`, whose content is plain
//!   text or a list of `<a>` tags.
//! - A nutrition `<table>` identified by id (`nutrition_table`,
//!   `nutrition_data_table`) or a class containing `nutrition`, with one row
//!   per nutrient and values carrying their units (`"6.3 g"`, `"539 kcal"`).
//! - A Nutri-Score `<h4>` heading whose letter grade appears in the heading
//!   text, in a `grade_<x>_title` CSS class, or in a `data-grade` attribute,
//!   depending on page vintage.
//!
//! None of these is guaranteed; every field extraction therefore runs an
//! ordered strategy list and degrades to "absent" (see [`crate::extract`]).

/// A successfully retrieved page. Owned transiently by the pipeline;
/// discarded after extraction.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// URL the content was ultimately served from (after redirects and the
    /// French-mirror fallback).
    pub final_url: String,
    /// Raw HTML body.
    pub html: String,
}

/// Raw values pulled out of one page, before any type coercion.
///
/// Numeric-looking values (nutrients, weight) are kept as the page printed
/// them, units included — parsing them is the mapper's job, not the
/// extractor's. `None` means every strategy for the field came up empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawFields {
    pub nom: Option<String>,
    pub nom_generique: Option<String>,
    /// Brand anchor texts in document order, when the brand container held
    /// links.
    pub brands_tags: Option<Vec<String>>,
    /// Brand label as plain text.
    pub marque: Option<String>,
    /// Price as a bare numeric literal from structured data, never page text.
    pub prix: Option<String>,
    pub image: Option<String>,
    pub score_nutritionnel: Option<String>,
    /// Nutrient row values with units, e.g. `"6.3 g"`.
    pub protides: Option<String>,
    pub glucides: Option<String>,
    pub lipides: Option<String>,
    /// Energy row value; may carry both kJ and kcal, e.g. `"2252 kj (539 kcal)"`.
    pub calories: Option<String>,
    pub poids_unite: Option<String>,
    pub pays_origine: Option<String>,
    pub fabricant: Option<String>,
    pub pays_commercialisation: Option<String>,
    pub distributeur: Option<String>,
    /// Barcode as printed on the page (gtin13 span or JSON-LD).
    pub code_barres: Option<String>,
    /// Expiry date text. Product pages do not currently render one; the field
    /// flows through the mapper's date normalization when a future page
    /// variant supplies it.
    pub date_peremption: Option<String>,
}
