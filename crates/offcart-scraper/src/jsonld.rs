//! JSON-LD `Product` block extraction.
//!
//! Most product pages embed a `<script type="application/ld+json">` block with
//! `"@type": "Product"`. When present it is the most reliable source for the
//! name, brand, image, barcode, and (rarely) a price, so the extractor
//! consults it before any CSS selector.

use scraper::{Html, Selector};
use serde_json::Value;

/// Structured-data values for one product, all optional. `prix` is kept only
/// when the `offers.price` value is a bare numeric literal.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct JsonLdProduct {
    pub nom: Option<String>,
    pub marque: Option<String>,
    pub image: Option<String>,
    pub code_barres: Option<String>,
    pub prix: Option<String>,
}

/// Finds the first JSON-LD `Product` item in the document, if any.
///
/// Script bodies that are not valid JSON are skipped, matching how browsers
/// treat broken structured data. A top-level array is searched item by item.
pub(crate) fn product_block(doc: &Html) -> Option<JsonLdProduct> {
    find_product_item(doc).map(|item| JsonLdProduct {
        nom: string_field(&item, "name"),
        marque: brand_name(&item),
        image: image_url(&item),
        code_barres: barcode(&item),
        prix: offer_price(&item),
    })
}

/// `true` when the document declares a JSON-LD `Product` item at all.
pub(crate) fn has_product_block(doc: &Html) -> bool {
    find_product_item(doc).is_some()
}

fn find_product_item(doc: &Html) -> Option<Value> {
    let selector = Selector::parse("script[type='application/ld+json']").ok()?;
    for script in doc.select(&selector) {
        let body: String = script.text().collect();
        let Ok(data) = serde_json::from_str::<Value>(&body) else {
            continue;
        };
        let items: Vec<Value> = match data {
            Value::Array(items) => items,
            other => vec![other],
        };
        for item in items {
            let is_product = item
                .get("@type")
                .and_then(Value::as_str)
                .is_some_and(|t| t.eq_ignore_ascii_case("product"));
            if is_product {
                return Some(item);
            }
        }
    }
    None
}

fn string_field(item: &Value, key: &str) -> Option<String> {
    item.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// `brand` is either an object with a `name`, or a plain string.
fn brand_name(item: &Value) -> Option<String> {
    match item.get("brand") {
        Some(Value::Object(_)) => item
            .get("brand")
            .and_then(|b| b.get("name"))
            .and_then(Value::as_str)
            .map(str::to_string),
        Some(Value::String(s)) => Some(s.clone()),
        _ => None,
    }
}

/// `image` is either a plain URL string or an array of them.
fn image_url(item: &Value) -> Option<String> {
    match item.get("image") {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Array(items)) => items.first().and_then(Value::as_str).map(str::to_string),
        _ => None,
    }
}

/// Barcode preference order: `gtin13`, then `gtin`, then `sku`.
/// Numeric values are accepted and stringified, since some publishers emit
/// the GTIN as a JSON number.
fn barcode(item: &Value) -> Option<String> {
    ["gtin13", "gtin", "sku"].iter().find_map(|key| {
        match item.get(*key) {
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        }
    })
}

/// `offers.price`, kept only when it is a bare numeric literal (a JSON number
/// or a digits-and-one-dot string). Currency symbols or anything else mean
/// the price is untrustworthy and is dropped here rather than guessed later.
fn offer_price(item: &Value) -> Option<String> {
    let offers = item.get("offers")?;
    match offers.get("price") {
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::String(s)) if is_plain_decimal(s.trim()) => Some(s.trim().to_string()),
        _ => None,
    }
}

fn is_plain_decimal(s: &str) -> bool {
    !s.is_empty()
        && s.chars().filter(|c| *c == '.').count() <= 1
        && s.chars().all(|c| c.is_ascii_digit() || c == '.')
        && s.chars().any(|c| c.is_ascii_digit())
}
