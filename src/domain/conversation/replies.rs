//! User-facing reply texts.
//!
//! The back office runs in Indonesian, so every reply the assistant builds
//! itself lives here. Prompts that ask for a decision end with the same
//! YES/NO instruction.

use crate::domain::catalog::ProductCandidate;

use super::pending::ProductDraft;

const YES_NO_FOOTER: &str = "Balas *YA* untuk melanjutkan atau *TIDAK* untuk membatalkan.";

pub const AMOUNT_MISSING: &str =
    "Jumlah stok tidak ditemukan. Contoh: `restock produk indomie goreng stok 50`";
pub const CONFIRM_REMINDER: &str = "Silakan jawab dengan *YA* atau *TIDAK* untuk melanjutkan.";
pub const CHOICE_REMINDER: &str =
    "Silakan pilih produk dengan membalas angka (misal: 1), atau ketik *batal* untuk membatalkan.";
pub const SELECTION_CANCELED: &str = "Pemilihan produk dibatalkan.";
pub const SELECTED_PRODUCT_GONE: &str =
    "Produk yang dipilih sudah tidak tersedia di database. Silakan ulangi perintah restock.";
pub const ACTION_CANCELED: &str = "Aksi dibatalkan.";
pub const NOTHING_TO_CONFIRM: &str = "Tidak ada aksi yang perlu dikonfirmasi.";
pub const PRODUCT_ADDED: &str = "Produk berhasil ditambahkan!";
pub const ADD_FAILED: &str = "Gagal menambahkan produk. Silakan coba lagi.";
pub const ADD_NAME_MISSING: &str = "Nama produk tidak ditemukan. Contoh: `tambah produk nama Indomie Goreng harga 3500 stok 10`";
pub const RESTOCK_PRODUCT_GONE: &str = "Produk tidak ditemukan. Silakan ulangi perintah restock.";
pub const RESTOCK_INVALID: &str = "Data restock tidak valid. Silakan ulangi.";
pub const RESTOCK_FAILED: &str = "Gagal melakukan restock. Silakan coba lagi.";
pub const GENERIC_FAILURE: &str = "Terjadi kesalahan saat memproses pesan. Silakan coba lagi.";
pub const AI_UNAVAILABLE: &str =
    "Maaf, layanan AI sedang tidak bisa dihubungi. Silakan coba lagi nanti.";

/// Echoes extracted product fields and asks for confirmation.
pub fn add_product_prompt(draft: &ProductDraft) -> String {
    format!(
        "Konfirmasi penambahan produk:\n\
         - Nama: {}\n\
         - Harga: {}\n\
         - Stok: {}\n\
         - Deskripsi: {}\n\n{}",
        draft.name.as_deref().unwrap_or(""),
        draft.price,
        draft.initial_stock,
        draft.description,
        YES_NO_FOOTER
    )
}

/// Asks to confirm a restock of a single matched product.
pub fn restock_prompt(product_name: &str, quantity: i64) -> String {
    format!(
        "Konfirmasi restock stok:\n- Produk: {}\n- Jumlah: {}\n\n{}",
        product_name, quantity, YES_NO_FOOTER
    )
}

/// Asks to confirm a restock after the user picked a candidate.
pub fn selection_confirmed(product_name: &str, quantity: i64) -> String {
    format!(
        "Anda memilih produk: {name}.\n\n\
         Konfirmasi restock berikut:\n\
         - Produk : {name}\n\
         - Jumlah : {qty}\n\n{footer}",
        name = product_name,
        qty = quantity,
        footer = YES_NO_FOOTER
    )
}

/// Numbered candidate list, one `[n] name — Harga: p — Stok: s` per line.
pub fn format_candidates(candidates: &[ProductCandidate]) -> String {
    candidates
        .iter()
        .enumerate()
        .map(|(i, c)| {
            format!(
                "[{}] {} — Harga: {} — Stok: {}",
                i + 1,
                c.product.name,
                c.product.price,
                c.product.current_stock
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Lists candidates and asks for a numeric pick.
pub fn choose_product_prompt(query: &str, candidates: &[ProductCandidate]) -> String {
    format!(
        "Ditemukan beberapa produk yang mirip dengan '{}':\n\n{}\n\n\
         Balas dengan angka (misal: *1*) untuk memilih produk, atau ketik *batal* untuk membatalkan.",
        query,
        format_candidates(candidates)
    )
}

pub fn product_not_found(query: &str) -> String {
    format!("Produk '{}' tidak ditemukan.", query)
}

pub fn amount_too_large(max: i64) -> String {
    format!(
        "Jumlah stok terlalu besar. Maksimal {} per perintah restock.",
        max
    )
}

pub fn product_values_too_large(max_price: i64, max_stock: i64) -> String {
    format!(
        "Harga atau stok terlalu besar. Harga maksimal {}, stok maksimal {}.",
        max_price, max_stock
    )
}

pub fn invalid_selection(candidate_count: usize) -> String {
    format!(
        "Nomor yang dipilih tidak valid. Silakan pilih angka antara 1 sampai {}, atau ketik *batal*.",
        candidate_count
    )
}

pub fn restock_succeeded(product_name: &str, quantity: i64) -> String {
    format!(
        "Stok untuk produk '{}' berhasil ditambah sebesar {}.",
        product_name, quantity
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::{Product, Sku};
    use crate::domain::foundation::ProductId;

    fn candidate(id: i64, name: &str, price: i64, stock: i64) -> ProductCandidate {
        ProductCandidate {
            product: Product {
                id: ProductId::new(id),
                name: name.into(),
                sku: Sku::generate(),
                price,
                description: String::new(),
                current_stock: stock,
            },
            score: 1,
        }
    }

    #[test]
    fn add_prompt_echoes_fields() {
        let prompt = add_product_prompt(&ProductDraft {
            name: Some("Kopi".into()),
            price: 5000,
            initial_stock: 12,
            description: "sachet".into(),
        });

        assert!(prompt.starts_with("Konfirmasi penambahan produk:\n- Nama: Kopi\n- Harga: 5000\n"));
        assert!(prompt.contains("- Stok: 12\n- Deskripsi: sachet\n\n"));
        assert!(prompt.ends_with(YES_NO_FOOTER));
    }

    #[test]
    fn candidates_are_numbered_from_one() {
        let list = format_candidates(&[
            candidate(1, "Indomie Goreng", 3500, 40),
            candidate(2, "Indomie Soto", 3300, 0),
        ]);

        assert_eq!(
            list,
            "[1] Indomie Goreng — Harga: 3500 — Stok: 40\n[2] Indomie Soto — Harga: 3300 — Stok: 0"
        );
    }

    #[test]
    fn restock_prompt_mentions_quantity() {
        let prompt = restock_prompt("Indomie Goreng", 50);
        assert!(prompt.contains("- Produk: Indomie Goreng\n- Jumlah: 50"));
    }

    #[test]
    fn invalid_selection_names_the_range() {
        assert!(invalid_selection(3).contains("antara 1 sampai 3"));
    }
}
