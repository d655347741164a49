/// Lower-case `name` and collapse every run of whitespace into one hyphen.
///
/// Used for city stats document keys and gap identifiers, so the output must
/// stay stable for a given input. Non-ASCII letters are kept as-is.
#[must_use]
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut in_whitespace = false;

    for c in name.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                slug.push('-');
            }
            in_whitespace = true;
        } else {
            slug.extend(c.to_lowercase());
            in_whitespace = false;
        }
    }

    slug
}
