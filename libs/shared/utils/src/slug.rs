/// URL slug derived from a display name: lowercase ASCII alphanumerics with
/// single dashes, matching how doctor profile URLs are generated on create
/// and regenerated on rename.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_was_dash = true;

    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
            last_was_dash = false;
        } else if !last_was_dash {
            slug.push('-');
            last_was_dash = true;
        }
    }

    while slug.ends_with('-') {
        slug.pop();
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_dashes() {
        assert_eq!(slugify("Dr. Ayesha Rahman"), "dr-ayesha-rahman");
    }

    #[test]
    fn collapses_separator_runs() {
        assert_eq!(slugify("  John --- Doe  "), "john-doe");
    }

    #[test]
    fn strips_non_ascii() {
        assert_eq!(slugify("Café & Co"), "caf-co");
    }

    #[test]
    fn empty_input_gives_empty_slug() {
        assert_eq!(slugify("!!!"), "");
    }
}
