use super::*;

#[test]
fn parses_hex_rgb_and_rgba() {
    assert_eq!(parse_hex("#ff0000").unwrap(), [255, 0, 0, 255]);
    assert_eq!(parse_hex("#0000FF80").unwrap(), [0, 0, 255, 128]);
    assert_eq!(parse_hex("#fff").unwrap(), [255, 255, 255, 255]);
}

#[test]
fn rejects_named_and_malformed_colors() {
    assert!(parse_hex("red").is_err());
    assert!(parse_hex("#12345").is_err());
    assert!(parse_hex("#gg0000").is_err());
}

#[test]
fn resolve_falls_back_when_missing_or_invalid() {
    assert_eq!(resolve_color(None, BLACK), BLACK);
    assert_eq!(resolve_color(Some("blue"), WHITE), WHITE);
    assert_eq!(resolve_color(Some("#102030"), WHITE), [16, 32, 48, 255]);
}
