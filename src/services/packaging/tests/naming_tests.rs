use super::naming::*;

#[test]
fn test_zip_file_name_follows_pattern() {
    assert_eq!(
        zip_file_name("im*", "47", 3, "dForce Hair"),
        "IM00000047-03_dForce_Hair.zip"
    );
    assert_eq!(
        zip_file_name("ro", "1234", 12, "Sci-Fi Armor v2.0"),
        "RO00001234-12_Sci-Fi_Armor_v2.0.zip"
    );
}

#[test]
fn test_prefix_keeps_digits_after_stripping_symbols() {
    assert_eq!(
        zip_file_name("im*1", "47", 3, "dForce Hair!"),
        "IM100000047-03_dForce_Hair.zip"
    );
}

#[test]
fn test_zip_file_name_is_deterministic() {
    let first = zip_file_name("IM", "abc", 1, "Same Name");
    let second = zip_file_name("IM", "abc", 1, "Same Name");
    assert_eq!(first, second);
}

#[test]
fn test_empty_prefix_and_name_fall_back_to_defaults() {
    assert_eq!(zip_file_name("", "1", 1, ""), "IM00000001-01_Package.zip");
    assert_eq!(zip_file_name("*-*", "1", 1, " !!! "), "IM00000001-01_Package.zip");
}

#[test]
fn test_format_sku_numeric() {
    assert_eq!(format_sku("47"), "00000047");
    assert_eq!(format_sku(" 47 "), "00000047");
    assert_eq!(format_sku("000000000047"), "00000047");
    assert_eq!(format_sku("-47"), "-0000047");
    assert_eq!(format_sku("123456789"), "123456789");
}

#[test]
fn test_format_sku_non_numeric_is_zero_padded_string() {
    assert_eq!(format_sku("ab12"), "0000ab12");
    assert_eq!(format_sku("-ab"), "-00000ab");
    assert_eq!(format_sku(""), "00000000");
    assert_eq!(format_sku("LONGSKU-123"), "LONGSKU-123");
}

#[test]
fn test_sanitize_token_collapses_runs_and_trims() {
    assert_eq!(sanitize_token("Hello, World!"), "Hello_World");
    assert_eq!(sanitize_token("__a  b__"), "a_b");
    assert_eq!(sanitize_token("keep.these-chars_ok"), "keep.these-chars_ok");
    assert_eq!(sanitize_token("Ünïcode Näme"), "n_code_N_me");
}

#[test]
fn test_clean_prefix() {
    assert_eq!(clean_prefix("f3d"), "F3D");
    assert_eq!(clean_prefix("R-O"), "RO");
    assert_eq!(clean_prefix(""), "IM");
}

#[test]
fn test_cover_image_name() {
    assert_eq!(
        cover_image_name("DAZ 3D", "47", "My Product"),
        "DAZ_3D_47_My_Product.jpg"
    );
    assert_eq!(
        cover_image_name("Shop", "../x", "P"),
        "Shop_.._x_P.jpg"
    );
    assert_eq!(
        cover_image_name("Shop", "A 12", "P"),
        "Shop_A 12_P.jpg"
    );
    assert_eq!(
        cover_image_name("Shop", "a\\b", "P"),
        "Shop_a_b_P.jpg"
    );
}
