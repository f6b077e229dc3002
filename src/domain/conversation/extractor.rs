//! Parameter extraction from command messages.
//!
//! Fields are written as a marker word followed by a value, e.g.
//! `tambah produk nama Kopi Susu harga 5.000 stok 20 deskripsi sachet`.
//! A value runs until the next marker, except the description, which takes
//! the rest of the message. Missing markers yield defaults; deciding whether
//! the result is usable is left to whoever executes it.

use once_cell::sync::Lazy;
use regex::Regex;

use super::pending::ProductDraft;

static FIELD_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(nama|name|harga|price|stok|stock|deskripsi|description)\b\s+")
        .expect("valid field marker pattern")
});

static RESTOCK_AMOUNT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:stok|stock)\s+(\d[\d.,]*)").expect("valid restock amount pattern")
});

static LEADING_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d[\d.,]*").expect("valid number pattern"));

/// Words stripped from a restock command to leave the product reference.
const RESTOCK_NOISE_WORDS: &[&str] = &[
    "restock", "restok", "produk", "product", "update", "increase", "tambah", "stock", "stok",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Name,
    Price,
    Stock,
    Description,
}

impl Field {
    fn from_marker(marker: &str) -> Self {
        match marker.to_lowercase().as_str() {
            "nama" | "name" => Field::Name,
            "harga" | "price" => Field::Price,
            "stok" | "stock" => Field::Stock,
            _ => Field::Description,
        }
    }
}

/// Parses the leading number of a value, ignoring `.`/`,` group separators.
///
/// Numbers too large for `i64` saturate to `i64::MAX` so callers can tell
/// "too large" apart from "absent".
fn parse_number(value: &str) -> Option<i64> {
    let digits: String = LEADING_NUMBER
        .find(value.trim())?
        .as_str()
        .chars()
        .filter(char::is_ascii_digit)
        .collect();
    Some(digits.parse().unwrap_or(i64::MAX))
}

/// Extracts product fields from an "add product" message.
///
/// Only the first occurrence of each marker counts. Price and stock default
/// to zero, the description to an empty string, and the name to `None`.
pub fn extract_product_fields(text: &str) -> ProductDraft {
    let mut draft = ProductDraft {
        name: None,
        price: 0,
        initial_stock: 0,
        description: String::new(),
    };

    let markers: Vec<_> = FIELD_MARKER.captures_iter(text).collect();
    let mut seen: Vec<Field> = Vec::new();

    for (i, caps) in markers.iter().enumerate() {
        let (Some(whole), Some(marker)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let field = Field::from_marker(marker.as_str());

        let end = if field == Field::Description {
            text.len()
        } else {
            markers
                .get(i + 1)
                .and_then(|next| next.get(0))
                .map_or(text.len(), |next| next.start())
        };
        let value = text[whole.end()..end].trim();

        if !seen.contains(&field) {
            seen.push(field);
            match field {
                Field::Name => draft.name = Some(value.to_string()).filter(|v| !v.is_empty()),
                Field::Price => draft.price = parse_number(value).unwrap_or(0),
                Field::Stock => draft.initial_stock = parse_number(value).unwrap_or(0),
                Field::Description => draft.description = value.to_string(),
            }
        }

        if field == Field::Description {
            break;
        }
    }

    draft
}

/// Extracts the quantity from a restock message (`stok 50`).
///
/// Returns `None` when the marker is absent or the amount is zero.
pub fn extract_restock_amount(text: &str) -> Option<i64> {
    let caps = RESTOCK_AMOUNT.captures(text)?;
    parse_number(caps.get(1)?.as_str()).filter(|amount| *amount > 0)
}

/// Extracts the product reference from a restock message.
///
/// Lower-cases the text, drops digits and the command/marker words, and
/// collapses whitespace. May return an empty string.
pub fn extract_product_name_from_restock(text: &str) -> String {
    let without_digits: String = text
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_ascii_digit())
        .collect();

    without_digits
        .split_whitespace()
        .filter(|word| !RESTOCK_NOISE_WORDS.contains(word))
        .filter(|word| word.chars().any(char::is_alphanumeric))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    mod product_fields {
        use super::*;

        #[test]
        fn extracts_all_fields() {
            let draft = extract_product_fields(
                "tambah produk nama Kopi Susu harga 5000 stok 20 deskripsi kopi sachet",
            );

            assert_eq!(draft.name.as_deref(), Some("Kopi Susu"));
            assert_eq!(draft.price, 5000);
            assert_eq!(draft.initial_stock, 20);
            assert_eq!(draft.description, "kopi sachet");
        }

        #[test]
        fn english_markers_in_any_order() {
            let draft = extract_product_fields("add product price 12000 name Green Tea stock 4");

            assert_eq!(draft.name.as_deref(), Some("Green Tea"));
            assert_eq!(draft.price, 12000);
            assert_eq!(draft.initial_stock, 4);
        }

        #[test]
        fn missing_markers_use_defaults() {
            let draft = extract_product_fields("tambah produk");

            assert_eq!(draft.name, None);
            assert_eq!(draft.price, 0);
            assert_eq!(draft.initial_stock, 0);
            assert_eq!(draft.description, "");
        }

        #[test]
        fn group_separators_are_ignored() {
            let draft = extract_product_fields("tambah produk nama Gula harga 12.500 stok 1,000");
            assert_eq!(draft.price, 12500);
            assert_eq!(draft.initial_stock, 1000);
        }

        #[test]
        fn non_numeric_price_defaults_to_zero() {
            let draft = extract_product_fields("tambah produk nama Gula harga murah");
            assert_eq!(draft.price, 0);
            assert_eq!(draft.name.as_deref(), Some("Gula"));
        }

        #[test]
        fn overlong_price_saturates() {
            let draft = extract_product_fields("tambah produk nama Gula harga 99999999999999999999");
            assert_eq!(draft.price, i64::MAX);
        }

        #[test]
        fn description_takes_the_rest_of_the_message() {
            let draft =
                extract_product_fields("tambah produk nama Teh deskripsi teh dengan harga 5 ribu");

            assert_eq!(draft.description, "teh dengan harga 5 ribu");
            assert_eq!(draft.price, 0);
        }

        #[test]
        fn first_marker_occurrence_wins() {
            let draft = extract_product_fields("tambah produk harga 100 nama Roti harga 200");
            assert_eq!(draft.price, 100);
        }

        #[test]
        fn markers_inside_words_are_ignored() {
            let draft = extract_product_fields("tambah produk nama Restok Kit harga 10");
            assert_eq!(draft.name.as_deref(), Some("Restok Kit"));
        }
    }

    mod restock_amount {
        use super::*;

        #[test]
        fn reads_amount_after_marker() {
            assert_eq!(extract_restock_amount("restock produk indomie goreng stok 50"), Some(50));
            assert_eq!(extract_restock_amount("update STOCK gula 1.000"), None);
            assert_eq!(extract_restock_amount("update stock 1.000 gula"), Some(1000));
        }

        #[test]
        fn zero_is_missing() {
            assert_eq!(extract_restock_amount("restock indomie stok 0"), None);
        }

        #[test]
        fn overlong_amount_saturates() {
            assert_eq!(
                extract_restock_amount("restock gula stok 99999999999999999999999"),
                Some(i64::MAX)
            );
        }

        #[test]
        fn no_marker_is_missing() {
            assert_eq!(extract_restock_amount("restock produk indomie 50"), None);
        }
    }

    mod restock_name {
        use super::*;

        #[test]
        fn strips_keywords_and_digits() {
            assert_eq!(
                extract_product_name_from_restock("restock produk Indomie Goreng stok 50"),
                "indomie goreng"
            );
        }

        #[test]
        fn strips_english_variant() {
            assert_eq!(
                extract_product_name_from_restock("update stock   Teh Botol 12"),
                "teh botol"
            );
        }

        #[test]
        fn leftover_punctuation_is_dropped() {
            assert_eq!(extract_product_name_from_restock("restok gula stok 1.000"), "gula");
        }

        #[test]
        fn may_be_empty() {
            assert_eq!(extract_product_name_from_restock("restock produk stok 5"), "");
        }
    }
}
