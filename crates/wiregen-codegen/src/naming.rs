//! Identifier conversions used by the backends.
//!
//! Schema identifiers keep whatever case the schema author chose. Generated
//! members, accessors, wire-key constants and package directories are all
//! derived here so every backend spells them the same way.

/// Java member name for a schema field: `unit_price` becomes `unitPrice`.
///
/// Underscores are dropped; leading ones do not capitalize.
///
/// ```
/// use wiregen_codegen::naming::to_camel_case;
///
/// assert_eq!(to_camel_case("unit_price"), "unitPrice");
/// assert_eq!(to_camel_case("ordinal"), "ordinal");
/// ```
pub fn to_camel_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut upper = false;

    for c in s.chars() {
        match c {
            '_' => upper = !out.is_empty(),
            c if upper => {
                out.extend(c.to_uppercase());
                upper = false;
            }
            c => out.push(c),
        }
    }

    out
}

/// Type-style name: `line_item` and `line-item` both become `LineItem`.
///
/// ```
/// use wiregen_codegen::naming::to_pascal_case;
///
/// assert_eq!(to_pascal_case("line_item"), "LineItem");
/// assert_eq!(to_pascal_case("line-item"), "LineItem");
/// ```
pub fn to_pascal_case(s: &str) -> String {
    s.split(['-', '_']).map(capitalize).collect()
}

/// Uppercase the first character, used for accessor prefixes (`getX`).
pub fn capitalize(s: &str) -> String {
    let mut rest = s.chars();
    rest.next()
        .map(|head| head.to_uppercase().chain(rest).collect())
        .unwrap_or_default()
}

/// Convert an identifier to UPPER_SNAKE_CASE for constants.
///
/// # Examples
///
/// ```
/// use wiregen_codegen::naming::to_constant_case;
///
/// assert_eq!(to_constant_case("displayName"), "DISPLAY_NAME");
/// assert_eq!(to_constant_case("max_size"), "MAX_SIZE");
/// ```
pub fn to_constant_case(s: &str) -> String {
    let mut out = String::new();
    let mut previous_lower = false;

    for c in s.chars() {
        if c == '_' || c == '-' {
            out.push('_');
            previous_lower = false;
        } else if c.is_uppercase() {
            if previous_lower {
                out.push('_');
            }
            out.push(c);
            previous_lower = false;
        } else {
            out.extend(c.to_uppercase());
            previous_lower = c.is_lowercase() || c.is_ascii_digit();
        }
    }

    out
}

/// Convert a dotted namespace to a relative directory path.
///
/// ```
/// use wiregen_codegen::naming::to_package_path;
///
/// assert_eq!(to_package_path("org.example.shapes"), "org/example/shapes");
/// assert_eq!(to_package_path(""), "");
/// ```
pub fn to_package_path(namespace: &str) -> String {
    namespace.replace('.', "/")
}

const JAVA_KEYWORDS: &[&str] = &[
    "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class",
    "const", "continue", "default", "do", "double", "else", "enum", "extends", "final",
    "finally", "float", "for", "goto", "if", "implements", "import", "instanceof", "int",
    "interface", "long", "native", "new", "package", "private", "protected", "public",
    "return", "short", "static", "strictfp", "super", "switch", "synchronized", "this",
    "throw", "throws", "transient", "try", "void", "volatile", "while", "true", "false",
    "null",
];

/// Make an identifier safe to use as a Java local or parameter name.
pub fn java_identifier(name: &str) -> String {
    let camel = to_camel_case(name);
    if JAVA_KEYWORDS.contains(&camel.as_str()) {
        format!("{camel}_")
    } else {
        camel
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use super::*;

    #[test]
    fn to_camel_case___joins_underscored_words() {
        assert_eq!(to_camel_case("unit_price"), "unitPrice");
        assert_eq!(to_camel_case("a_b_c"), "aBC");
    }

    #[test]
    fn to_camel_case___ignores_stray_underscores() {
        assert_eq!(to_camel_case("line__total"), "lineTotal");
        assert_eq!(to_camel_case("_hidden"), "hidden");
        assert_eq!(to_camel_case("count_"), "count");
        assert_eq!(to_camel_case(""), "");
    }

    #[test]
    fn to_pascal_case___accepts_both_separators() {
        assert_eq!(to_pascal_case("order_line"), "OrderLine");
        assert_eq!(to_pascal_case("wire-key"), "WireKey");
        assert_eq!(to_pascal_case(""), "");
    }

    #[test]
    fn capitalize___only_touches_first_character() {
        assert_eq!(capitalize("unitPrice"), "UnitPrice");
        assert_eq!(capitalize("URL"), "URL");
        assert_eq!(capitalize("x"), "X");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn to_constant_case___splits_on_case_changes() {
        assert_eq!(to_constant_case("x"), "X");
        assert_eq!(to_constant_case("centrePoint"), "CENTRE_POINT");
        assert_eq!(to_constant_case("value2Max"), "VALUE2_MAX");
        assert_eq!(to_constant_case("ALREADY"), "ALREADY");
    }

    #[test]
    fn to_package_path___maps_dots_to_separators() {
        assert_eq!(to_package_path("org.example.orders"), "org/example/orders");
    }

    #[test]
    fn java_identifier___escapes_keywords() {
        assert_eq!(java_identifier("class"), "class_");
        assert_eq!(java_identifier("default"), "default_");
        assert_eq!(java_identifier("unit_price"), "unitPrice");
    }
}
