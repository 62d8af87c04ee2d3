use regex::Regex;
use std::sync::LazyLock;

static RE_UNSAFE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9._-]+").expect("Invalid regex"));
static RE_NON_ALNUM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9]+").expect("Invalid regex"));

const DEFAULT_PREFIX: &str = "IM";
const DEFAULT_NAME: &str = "Package";
const SKU_WIDTH: usize = 8;

/// Replace runs of characters outside `[A-Za-z0-9._-]` with `_` and trim
/// surrounding underscores.
pub fn sanitize_token(input: &str) -> String {
    RE_UNSAFE_RUN
        .replace_all(input, "_")
        .trim_matches('_')
        .to_string()
}

/// Alphanumerics only, upper-cased. Empty input yields the default prefix.
pub fn clean_prefix(prefix: &str) -> String {
    let cleaned = RE_NON_ALNUM.replace_all(prefix, "").to_uppercase();
    if cleaned.is_empty() {
        DEFAULT_PREFIX.to_string()
    } else {
        cleaned
    }
}

/// Numeric SKUs are zero-padded to 8 digits; anything else is padded as a
/// string, keeping a leading sign in front of the zeros.
pub fn format_sku(sku: &str) -> String {
    match sku.trim().parse::<i128>() {
        Ok(n) => format!("{n:0width$}", width = SKU_WIDTH),
        Err(_) => zfill(sku, SKU_WIDTH),
    }
}

fn zfill(value: &str, width: usize) -> String {
    let len = value.chars().count();
    if len >= width {
        return value.to_string();
    }
    let padding = "0".repeat(width - len);
    match value.chars().next() {
        Some(sign @ ('+' | '-')) => format!("{sign}{padding}{}", &value[1..]),
        _ => format!("{padding}{value}"),
    }
}

/// `{PREFIX}{SKU:08}-{PART:02}_{NAME}.zip`
pub fn zip_file_name(prefix: &str, sku: &str, part: u8, product_name: &str) -> String {
    let mut name = sanitize_token(product_name);
    if name.is_empty() {
        name = DEFAULT_NAME.to_string();
    }
    format!(
        "{}{}-{:02}_{}.zip",
        clean_prefix(prefix),
        format_sku(sku),
        part,
        name
    )
}

/// `{store}_{sku}_{name}.jpg`. Store and name are sanitized; the SKU is
/// kept as typed except for path separators, which would leave the support
/// directory.
pub fn cover_image_name(store: &str, sku: &str, product_name: &str) -> String {
    format!(
        "{}_{}_{}.jpg",
        sanitize_token(store),
        sku.trim().replace(['/', '\\'], "_"),
        sanitize_token(product_name)
    )
}
