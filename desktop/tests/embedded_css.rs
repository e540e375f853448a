#![cfg(test)]
//! The desktop build embeds the shared theme from `ui/assets/theme/main.css`;
//! a truncated or moved file would only show up as unstyled pages at runtime.

const EMBEDDED_CSS: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../ui/assets/theme/main.css"
));

#[test]
fn embedded_css_file_exists_and_is_not_empty() {
    assert!(!EMBEDDED_CSS.trim().is_empty());
}

#[test]
fn embedded_css_styles_the_export_surfaces() {
    let required = [
        ":root",
        "body {",
        ".button--primary",
        ".standings {",
        ".modal {",
        ".chart__tooltip",
        ".chart-backdrop",
        ".error-card",
        ".export-status--error",
    ];
    for token in required {
        assert!(
            EMBEDDED_CSS.contains(token),
            "Expected token `{token}` missing from embedded CSS"
        );
    }
}
