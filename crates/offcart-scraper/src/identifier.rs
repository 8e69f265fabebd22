//! Input-line normalization: one line in, one canonical identifier out.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::ScrapeError;

/// Barcode embedded in a product-page path, `/product/<digits>` or the French
/// `/produit/<digits>`, 8–14 digits, terminated by a path/query boundary.
static PRODUCT_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/(?:product|produit)/(\d{8,14})(?:[/?#]|$)").expect("static regex is valid")
});

/// The canonical identity of one product to process: its barcode, plus the
/// exact page URL when the input line supplied one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier {
    /// Barcode digits, 8–14 of them.
    pub code_barres: String,
    /// The page URL given on the input line, kept verbatim as the primary
    /// fetch target. `None` when the line was a bare barcode.
    pub explicit_url: Option<String>,
}

impl Identifier {
    /// Primary fetch target: the explicit input URL when one was given,
    /// otherwise the international page synthesized from the barcode.
    #[must_use]
    pub fn world_url(&self, base: &str) -> String {
        self.explicit_url.clone().unwrap_or_else(|| {
            format!("{}/product/{}", base.trim_end_matches('/'), self.code_barres)
        })
    }

    /// French-mirror page for this barcode, used when the primary target does
    /// not resolve to a product page.
    #[must_use]
    pub fn french_url(&self, base: &str) -> String {
        format!("{}/produit/{}", base.trim_end_matches('/'), self.code_barres)
    }
}

/// Normalizes one input line into an [`Identifier`].
///
/// Accepted forms, after trimming surrounding whitespace:
/// - a bare barcode: 8–14 ASCII digits;
/// - an absolute `http(s)` URL whose path contains `/product/<barcode>` or
///   `/produit/<barcode>`.
///
/// # Errors
///
/// Returns [`ScrapeError::InvalidInput`] for anything else. The caller is
/// expected to log, count, and continue — a bad line never aborts a run.
pub fn normalize(line: &str) -> Result<Identifier, ScrapeError> {
    let trimmed = line.trim();

    if (8..=14).contains(&trimmed.len()) && trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Ok(Identifier {
            code_barres: trimmed.to_string(),
            explicit_url: None,
        });
    }

    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        if let Some(captures) = PRODUCT_PATH.captures(trimmed) {
            return Ok(Identifier {
                code_barres: captures[1].to_string(),
                explicit_url: Some(trimmed.to_string()),
            });
        }
        return Err(ScrapeError::InvalidInput {
            line: trimmed.to_string(),
            reason: "URL does not contain a /product/<barcode> path".to_string(),
        });
    }

    Err(ScrapeError::InvalidInput {
        line: trimmed.to_string(),
        reason: "neither an 8-14 digit barcode nor an absolute product URL".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_barcode_is_accepted() {
        let id = normalize("3017620422003").expect("valid barcode");
        assert_eq!(id.code_barres, "3017620422003");
        assert!(id.explicit_url.is_none());
    }

    #[test]
    fn barcode_is_whitespace_trimmed() {
        let id = normalize("  3017620422003\n").expect("valid barcode");
        assert_eq!(id.code_barres, "3017620422003");
    }

    #[test]
    fn shortest_and_longest_barcode_lengths_are_accepted() {
        assert_eq!(normalize("12345678").unwrap().code_barres, "12345678");
        assert_eq!(
            normalize("12345678901234").unwrap().code_barres,
            "12345678901234"
        );
    }

    #[test]
    fn too_short_or_too_long_digit_strings_are_rejected() {
        assert!(matches!(
            normalize("1234567"),
            Err(ScrapeError::InvalidInput { .. })
        ));
        assert!(matches!(
            normalize("123456789012345"),
            Err(ScrapeError::InvalidInput { .. })
        ));
    }

    #[test]
    fn world_product_url_yields_its_barcode() {
        let id = normalize("https://world.openfoodfacts.org/product/3017620422003")
            .expect("valid product URL");
        assert_eq!(id.code_barres, "3017620422003");
        assert_eq!(
            id.explicit_url.as_deref(),
            Some("https://world.openfoodfacts.org/product/3017620422003")
        );
    }

    #[test]
    fn french_produit_url_yields_its_barcode() {
        let id = normalize("https://fr.openfoodfacts.org/produit/3017620422003/nutella")
            .expect("valid product URL");
        assert_eq!(id.code_barres, "3017620422003");
    }

    #[test]
    fn url_with_query_string_yields_its_barcode() {
        let id = normalize("https://world.openfoodfacts.org/product/3017620422003?lc=fr")
            .expect("valid product URL");
        assert_eq!(id.code_barres, "3017620422003");
    }

    #[test]
    fn url_without_product_path_is_rejected() {
        assert!(matches!(
            normalize("https://world.openfoodfacts.org/category/spreads"),
            Err(ScrapeError::InvalidInput { .. })
        ));
    }

    #[test]
    fn arbitrary_text_is_rejected() {
        assert!(matches!(
            normalize("not-a-barcode-or-url"),
            Err(ScrapeError::InvalidInput { .. })
        ));
    }

    #[test]
    fn world_url_is_synthesized_from_bare_barcode() {
        let id = normalize("3017620422003").unwrap();
        assert_eq!(
            id.world_url("https://world.openfoodfacts.org"),
            "https://world.openfoodfacts.org/product/3017620422003"
        );
    }

    #[test]
    fn explicit_url_wins_over_synthesis() {
        let id = normalize("https://example.org/produit/12345678").unwrap();
        assert_eq!(
            id.world_url("https://world.openfoodfacts.org"),
            "https://example.org/produit/12345678"
        );
    }

    #[test]
    fn french_url_strips_trailing_base_slash() {
        let id = normalize("12345678").unwrap();
        assert_eq!(
            id.french_url("https://fr.openfoodfacts.org/"),
            "https://fr.openfoodfacts.org/produit/12345678"
        );
    }
}
