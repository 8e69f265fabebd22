//! Ordered-fallback field extraction from product page HTML.
//!
//! Page structure is inconsistent across products and over time, so no single
//! selector is trusted. Each output field instead carries an ordered list of
//! [`Strategy`] values — structured data first, then the precise selector,
//! then looser fallbacks — and the first strategy yielding a non-empty value
//! wins. When several elements match one selector, the first in document
//! order is taken. If every strategy comes up empty the field is absent;
//! extraction itself can never fail.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::jsonld::{self, JsonLdProduct};
use crate::types::RawFields;

/// One way to pull a raw value out of the page.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Strategy {
    /// A property of the JSON-LD `Product` block.
    JsonLd(JsonLdField),
    /// Text content of the first CSS-selector match.
    Text(&'static str),
    /// An attribute of the first CSS-selector match.
    Attr(&'static str, &'static str),
    /// Anchor texts under the first CSS-selector match, joined with `", "`.
    AnchorJoin(&'static str),
    /// Value cell of the first nutrition-table row whose text matches one of
    /// the keywords.
    NutrientRow(&'static [&'static str]),
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum JsonLdField {
    Nom,
    Marque,
    Image,
    CodeBarres,
    Prix,
}

const NOM: &[Strategy] = &[
    Strategy::JsonLd(JsonLdField::Nom),
    Strategy::Text("h1[property='food:name'][itemprop='name']"),
    Strategy::Text("h1[itemprop='name']"),
    Strategy::Text("h1"),
];

const NOM_GENERIQUE: &[Strategy] = &[
    Strategy::Text("#field_generic_name_value [itemprop='description']"),
    Strategy::Text("#field_generic_name_value"),
];

const MARQUE: &[Strategy] = &[
    Strategy::JsonLd(JsonLdField::Marque),
    Strategy::Text("#field_brands_value"),
];

const CODE_BARRES: &[Strategy] = &[
    Strategy::JsonLd(JsonLdField::CodeBarres),
    Strategy::Text("span#barcode[itemprop='gtin13']"),
    Strategy::Text("span#barcode"),
];

const POIDS_UNITE: &[Strategy] = &[Strategy::Text("#field_quantity_value")];

const IMAGE: &[Strategy] = &[
    Strategy::JsonLd(JsonLdField::Image),
    Strategy::Attr("meta[name='x:image']", "content"),
    Strategy::Attr("meta[property='og:image']", "content"),
];

const PRIX: &[Strategy] = &[Strategy::JsonLd(JsonLdField::Prix)];

const PAYS_ORIGINE: &[Strategy] = &[
    Strategy::AnchorJoin("#field_origins_value"),
    Strategy::Text("#field_origins_value"),
];

const FABRICANT: &[Strategy] = &[
    Strategy::AnchorJoin("#field_manufacturing_places_value"),
    Strategy::Text("#field_manufacturing_places_value"),
];

const PAYS_COMMERCIALISATION: &[Strategy] = &[
    Strategy::AnchorJoin("#field_countries_value"),
    Strategy::Text("#field_countries_value"),
];

const DISTRIBUTEUR: &[Strategy] = &[
    Strategy::AnchorJoin("#field_stores_value"),
    Strategy::Text("#field_stores_value"),
];

const PROTIDES: &[Strategy] = &[Strategy::NutrientRow(&["protéines", "protein"])];
const GLUCIDES: &[Strategy] = &[Strategy::NutrientRow(&["glucides", "carbohydrate"])];
const LIPIDES: &[Strategy] = &[Strategy::NutrientRow(&["matières grasses", "fat"])];
const CALORIES: &[Strategy] = &[Strategy::NutrientRow(&["énergie", "energy", "kcal", "kj"])];

/// Candidate locations of the nutrition table, most specific first.
const NUTRITION_TABLES: &[&str] = &[
    "table#nutrition_table",
    "table#nutrition_data_table",
    "table[class*='nutrition']",
];

static NUTRI_SCORE_TEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)nutri-score\s*([a-e])\b").expect("static regex is valid"));

static NUTRI_SCORE_CLASS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"grade_([a-e])_title").expect("static regex is valid"));

static WEIGHT_IN_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d[\d\s.,]*\s?(?:kg|g|ml|l))\b").expect("static regex is valid")
});

/// A parsed page plus its structured-data block, ready for field extraction.
pub struct PageExtractor {
    doc: Html,
    json_ld: Option<JsonLdProduct>,
}

impl PageExtractor {
    #[must_use]
    pub fn new(html: &str) -> Self {
        let doc = Html::parse_document(html);
        let json_ld = jsonld::product_block(&doc);
        Self { doc, json_ld }
    }

    /// Runs every field's strategy list and returns whatever the page
    /// yielded. Total: missing sections produce absent fields, never errors.
    #[must_use]
    pub fn extract(&self) -> RawFields {
        let nom = self.first(NOM);
        // The quantity field is the primary source for the weight; product
        // names often repeat it ("Nutella 400 g"), which serves as fallback.
        let poids_unite = self
            .first(POIDS_UNITE)
            .or_else(|| nom.as_deref().and_then(weight_from_name));

        RawFields {
            nom_generique: self.first(NOM_GENERIQUE),
            brands_tags: self.anchor_texts("#field_brands_value"),
            marque: self.first(MARQUE),
            prix: self.first(PRIX),
            image: self.first(IMAGE),
            score_nutritionnel: self.nutri_score(),
            protides: self.first(PROTIDES),
            glucides: self.first(GLUCIDES),
            lipides: self.first(LIPIDES),
            calories: self.first(CALORIES),
            poids_unite,
            pays_origine: self.first(PAYS_ORIGINE),
            fabricant: self.first(FABRICANT),
            pays_commercialisation: self.first(PAYS_COMMERCIALISATION),
            distributeur: self.first(DISTRIBUTEUR),
            code_barres: self.first(CODE_BARRES),
            date_peremption: None,
            nom,
        }
    }

    /// First strategy that yields a non-empty value, in list order.
    fn first(&self, strategies: &[Strategy]) -> Option<String> {
        strategies
            .iter()
            .find_map(|s| self.apply(s).filter(|v| !v.is_empty()))
    }

    fn apply(&self, strategy: &Strategy) -> Option<String> {
        match strategy {
            Strategy::JsonLd(field) => {
                let product = self.json_ld.as_ref()?;
                match field {
                    JsonLdField::Nom => product.nom.clone(),
                    JsonLdField::Marque => product.marque.clone(),
                    JsonLdField::Image => product.image.clone(),
                    JsonLdField::CodeBarres => product.code_barres.clone(),
                    JsonLdField::Prix => product.prix.clone(),
                }
            }
            Strategy::Text(sel) => self.select_text(sel),
            Strategy::Attr(sel, attr) => self.select_attr(sel, attr),
            Strategy::AnchorJoin(sel) => self
                .anchor_texts(sel)
                .map(|texts| texts.join(", "))
                .filter(|joined| !joined.is_empty()),
            Strategy::NutrientRow(keywords) => self.nutrient_row(keywords),
        }
    }

    fn select_text(&self, selector: &str) -> Option<String> {
        let sel = Selector::parse(selector).ok()?;
        self.doc
            .select(&sel)
            .next()
            .map(element_text)
            .filter(|t| !t.is_empty())
    }

    fn select_attr(&self, selector: &str, attr: &str) -> Option<String> {
        let sel = Selector::parse(selector).ok()?;
        self.doc
            .select(&sel)
            .next()
            .and_then(|el| el.value().attr(attr))
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    /// Non-empty anchor texts under the first match of `selector`, in
    /// document order. `None` when the container is missing or linkless.
    fn anchor_texts(&self, selector: &str) -> Option<Vec<String>> {
        let container_sel = Selector::parse(selector).ok()?;
        let anchor_sel = Selector::parse("a").ok()?;
        let container = self.doc.select(&container_sel).next()?;
        let texts: Vec<String> = container
            .select(&anchor_sel)
            .map(element_text)
            .filter(|t| !t.is_empty())
            .collect();
        if texts.is_empty() {
            None
        } else {
            Some(texts)
        }
    }

    /// Scans the nutrition table for the first row mentioning any of
    /// `keywords` (case-insensitive) and returns that row's value cell — the
    /// first cell containing a digit — verbatim, units included.
    fn nutrient_row(&self, keywords: &[&str]) -> Option<String> {
        let table = NUTRITION_TABLES.iter().find_map(|candidate| {
            let sel = Selector::parse(candidate).ok()?;
            self.doc.select(&sel).next()
        })?;
        let row_sel = Selector::parse("tr").ok()?;
        let cell_sel = Selector::parse("th, td").ok()?;

        for row in table.select(&row_sel) {
            let cells: Vec<String> = row.select(&cell_sel).map(element_text).collect();
            let row_text = cells.join(" ").to_lowercase();
            if keywords.iter().any(|k| row_text.contains(k)) {
                if let Some(value) = cells
                    .iter()
                    .find(|cell| cell.chars().any(|c| c.is_ascii_digit()))
                {
                    return Some(value.clone());
                }
            }
        }
        None
    }

    /// Nutri-Score letter from the score heading, trying the heading text,
    /// then the grade CSS class, then data attributes.
    fn nutri_score(&self) -> Option<String> {
        let sel = Selector::parse("h4").ok()?;
        let heading = self
            .doc
            .select(&sel)
            .find(|h| element_text(*h).contains("Nutri-Score"))?;

        score_from_text(&element_text(heading))
            .or_else(|| score_from_classes(heading))
            .or_else(|| score_from_attrs(heading))
    }
}

/// Whole-element text with whitespace collapsed to single spaces.
fn element_text(el: ElementRef<'_>) -> String {
    let raw: String = el.text().collect();
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn score_from_text(text: &str) -> Option<String> {
    NUTRI_SCORE_TEXT
        .captures(text)
        .map(|c| c[1].to_ascii_uppercase())
}

fn score_from_classes(el: ElementRef<'_>) -> Option<String> {
    let classes = el.value().classes().collect::<Vec<_>>().join(" ");
    NUTRI_SCORE_CLASS
        .captures(&classes.to_lowercase())
        .map(|c| c[1].to_ascii_uppercase())
}

fn score_from_attrs(el: ElementRef<'_>) -> Option<String> {
    ["data-grade", "data-nutri-score", "data-score"]
        .iter()
        .find_map(|attr| {
            el.value()
                .attr(attr)
                .filter(|v| v.len() == 1 && v.to_ascii_uppercase().chars().all(|c| ('A'..='E').contains(&c)))
                .map(str::to_ascii_uppercase)
        })
}

/// Package weight lifted from a product name, e.g. `"Nutella 400 g"` →
/// `"400g"`. Spaces inside the match are dropped.
pub(crate) fn weight_from_name(name: &str) -> Option<String> {
    WEIGHT_IN_NAME
        .captures(name)
        .map(|c| c[1].replace(' ', ""))
}

/// Heuristic product-page check used to decide whether the French mirror
/// should be tried: an `og:type` of product/food, a canonical product URL, or
/// a JSON-LD `Product` block all count.
#[must_use]
pub fn looks_like_product_page(html: &str) -> bool {
    let doc = Html::parse_document(html);
    og_type_is_product(&doc) || canonical_points_at_product(&doc) || jsonld::has_product_block(&doc)
}

fn og_type_is_product(doc: &Html) -> bool {
    let Ok(sel) = Selector::parse("meta[property='og:type']") else {
        return false;
    };
    doc.select(&sel)
        .next()
        .and_then(|el| el.value().attr("content"))
        .is_some_and(|content| {
            let lowered = content.to_lowercase();
            lowered == "product" || lowered == "food"
        })
}

fn canonical_points_at_product(doc: &Html) -> bool {
    let Ok(sel) = Selector::parse("link[rel='canonical']") else {
        return false;
    };
    doc.select(&sel)
        .next()
        .and_then(|el| el.value().attr("href"))
        .is_some_and(|href| href.contains("/product/") || href.contains("/produit/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A representative product page: JSON-LD absent so the selector
    /// strategies are exercised.
    const PRODUCT_PAGE: &str = r#"<html><head>
        <meta property="og:type" content="food">
        <meta property="og:image" content="https://images.example/front.jpg">
        <link rel="canonical" href="https://world.openfoodfacts.org/product/3017620422003/nutella">
        </head><body>
        <h1 property="food:name" itemprop="name">Nutella</h1>
        <span id="barcode" itemprop="gtin13">3017620422003</span>
        <div id="field_generic_name_value"><span itemprop="description">Pâte à tartiner aux noisettes</span></div>
        <div id="field_quantity_value">400 g</div>
        <div id="field_brands_value"><a href="/marque/ferrero">Ferrero</a>, <a href="/marque/nutella">Nutella</a></div>
        <div id="field_origins_value"><a href="/origine/italie">Italie</a></div>
        <div id="field_manufacturing_places_value"><a href="/lieu/ve">Villers-Écalles</a></div>
        <div id="field_stores_value"><a href="/magasin/carrefour">Carrefour</a></div>
        <div id="field_countries_value"><a href="/pays/france">France</a>, <a href="/pays/belgique">Belgique</a></div>
        <h4 class="grade_e_title">Nutri-Score E</h4>
        <table id="nutrition_table">
          <tr><th>Énergie</th><td>2252 kj (539 kcal)</td></tr>
          <tr><th>Protéines</th><td>6.3 g</td></tr>
          <tr><th>Glucides</th><td>57,5 g</td></tr>
          <tr><th>Matières grasses</th><td>30.9 g</td></tr>
        </table>
        </body></html>"#;

    fn extract_fixture() -> RawFields {
        PageExtractor::new(PRODUCT_PAGE).extract()
    }

    #[test]
    fn name_comes_from_the_title_heading() {
        assert_eq!(extract_fixture().nom.as_deref(), Some("Nutella"));
    }

    #[test]
    fn barcode_comes_from_the_gtin_span() {
        assert_eq!(
            extract_fixture().code_barres.as_deref(),
            Some("3017620422003")
        );
    }

    #[test]
    fn generic_name_prefers_the_description_span() {
        assert_eq!(
            extract_fixture().nom_generique.as_deref(),
            Some("Pâte à tartiner aux noisettes")
        );
    }

    #[test]
    fn quantity_field_is_taken_verbatim() {
        assert_eq!(extract_fixture().poids_unite.as_deref(), Some("400 g"));
    }

    #[test]
    fn brand_anchors_are_collected_in_order() {
        assert_eq!(
            extract_fixture().brands_tags,
            Some(vec!["Ferrero".to_string(), "Nutella".to_string()])
        );
    }

    #[test]
    fn brand_text_falls_back_to_container_text() {
        let raw = extract_fixture();
        assert_eq!(raw.marque.as_deref(), Some("Ferrero, Nutella"));
    }

    #[test]
    fn geographic_fields_join_their_anchors() {
        let raw = extract_fixture();
        assert_eq!(raw.pays_origine.as_deref(), Some("Italie"));
        assert_eq!(raw.fabricant.as_deref(), Some("Villers-Écalles"));
        assert_eq!(raw.distributeur.as_deref(), Some("Carrefour"));
        assert_eq!(
            raw.pays_commercialisation.as_deref(),
            Some("France, Belgique")
        );
    }

    #[test]
    fn nutrient_rows_keep_their_units() {
        let raw = extract_fixture();
        assert_eq!(raw.protides.as_deref(), Some("6.3 g"));
        assert_eq!(raw.glucides.as_deref(), Some("57,5 g"));
        assert_eq!(raw.lipides.as_deref(), Some("30.9 g"));
        assert_eq!(raw.calories.as_deref(), Some("2252 kj (539 kcal)"));
    }

    #[test]
    fn nutri_score_letter_comes_from_heading_text() {
        assert_eq!(extract_fixture().score_nutritionnel.as_deref(), Some("E"));
    }

    #[test]
    fn nutri_score_falls_back_to_grade_class() {
        let html = r#"<html><body>
            <h4 class="grade_c_title">Nutri-Score :</h4>
            </body></html>"#;
        let raw = PageExtractor::new(html).extract();
        assert_eq!(raw.score_nutritionnel.as_deref(), Some("C"));
    }

    #[test]
    fn nutri_score_falls_back_to_data_attribute() {
        let html = r#"<html><body>
            <h4 data-grade="b">Nutri-Score :</h4>
            </body></html>"#;
        let raw = PageExtractor::new(html).extract();
        assert_eq!(raw.score_nutritionnel.as_deref(), Some("B"));
    }

    #[test]
    fn json_ld_name_outranks_the_heading() {
        let html = r#"<html><head>
            <script type="application/ld+json">{"@type": "Product", "name": "Nutella officielle"}</script>
            </head><body><h1>Some other heading</h1></body></html>"#;
        let raw = PageExtractor::new(html).extract();
        assert_eq!(raw.nom.as_deref(), Some("Nutella officielle"));
    }

    #[test]
    fn weight_falls_back_to_the_product_name() {
        let html = "<html><body><h1>Confiture de fraises 370 g</h1></body></html>";
        let raw = PageExtractor::new(html).extract();
        assert_eq!(raw.poids_unite.as_deref(), Some("370g"));
    }

    #[test]
    fn nutrition_table_found_by_class_substring() {
        let html = r#"<html><body>
            <table class="data nutrition-facts">
              <tr><th>Protein</th><td>12.5 g</td></tr>
            </table>
            </body></html>"#;
        let raw = PageExtractor::new(html).extract();
        assert_eq!(raw.protides.as_deref(), Some("12.5 g"));
    }

    #[test]
    fn empty_page_yields_every_field_absent() {
        let raw = PageExtractor::new("<html><body><p>nothing here</p></body></html>").extract();
        assert_eq!(raw, RawFields::default());
    }

    #[test]
    fn missing_nutrition_table_only_blanks_nutrients() {
        let html = r#"<html><body><h1 itemprop="name">Eau de source</h1></body></html>"#;
        let raw = PageExtractor::new(html).extract();
        assert_eq!(raw.nom.as_deref(), Some("Eau de source"));
        assert!(raw.protides.is_none());
        assert!(raw.calories.is_none());
    }

    #[test]
    fn product_page_detection_accepts_each_signal() {
        assert!(looks_like_product_page(PRODUCT_PAGE));
        assert!(looks_like_product_page(
            r#"<html><head><link rel="canonical" href="https://x.example/produit/1"></head><body></body></html>"#
        ));
        assert!(looks_like_product_page(
            r#"<html><head><script type="application/ld+json">{"@type": "Product"}</script></head><body></body></html>"#
        ));
        assert!(!looks_like_product_page(
            "<html><body><h1>Résultats de recherche</h1></body></html>"
        ));
    }
}
