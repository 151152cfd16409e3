//! Case conversion helpers used by the default naming conventions.

/// Convert a `snake_case`, `kebab-case` or spaced string to `CamelCase`
///
/// Existing capitals inside a word are kept, so `petStore` becomes `PetStore`.
///
/// # Example
///
/// ```rust
/// use brrtrouter_codegen::generator::to_camel_case;
/// assert_eq!(to_camel_case("user_profile"), "UserProfile");
/// assert_eq!(to_camel_case("pet-store api"), "PetStoreApi");
/// ```
pub fn to_camel_case(s: &str) -> String {
    s.split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

/// `camelCase` variant: first character lowered
pub fn to_lower_camel_case(s: &str) -> String {
    let camel = to_camel_case(s);
    let mut chars = camel.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Convert a string to `snake_case`
pub fn to_snake_case(s: &str) -> String {
    let mut result = String::new();

    for ch in s.chars() {
        if ch.is_uppercase() {
            if !result.is_empty() && !result.ends_with('_') {
                result.push('_');
            }
            result.extend(ch.to_lowercase());
        } else if ch.is_lowercase() || ch.is_ascii_digit() || ch == '_' {
            result.push(ch);
        } else if ch == '-' || ch.is_whitespace() {
            if !result.is_empty() && !result.ends_with('_') {
                result.push('_');
            }
        }
    }

    result
}

/// Replace characters that cannot appear in an identifier and avoid a leading digit
pub fn sanitize_identifier(name: &str) -> String {
    let mut s: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if s.is_empty() {
        s = "_".to_string();
    }
    if s.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        s.insert(0, '_');
    }
    s
}
