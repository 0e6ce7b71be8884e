//! Bracket-depth aware list splitting.
//!
//! Generic and tuple types carry their own commas (`Map<K, V>`,
//! `(Address, u64)`), so a parameter, field or variant list can only be
//! split where no `<`/`(` is open.

const OPEN_BRACKETS: [char; 2] = ['<', '('];
const CLOSE_BRACKETS: [char; 2] = ['>', ')'];

/// Split on commas that sit at bracket depth zero.
///
/// Items are trimmed and empty items are dropped, so trailing commas never
/// produce a spurious entry.
pub fn split_top_level(text: &str) -> Vec<String> {
    split_at_depth_zero(text, |c| c == ',')
}

/// Split on commas or newlines that sit at bracket depth zero.
///
/// Struct and enum bodies are accepted with newline-only separated
/// declarations, so a line break ends an item just like a comma does.
pub fn split_declarations(text: &str) -> Vec<String> {
    split_at_depth_zero(text, |c| c == ',' || c == '\n')
}

fn split_at_depth_zero<F>(text: &str, is_separator: F) -> Vec<String>
where
    F: Fn(char) -> bool,
{
    let mut items = Vec::new();
    let mut current = String::new();
    let mut depth: i32 = 0;

    for c in text.chars() {
        if OPEN_BRACKETS.contains(&c) {
            depth += 1;
        } else if CLOSE_BRACKETS.contains(&c) {
            depth -= 1;
        }

        if depth == 0 && is_separator(c) {
            push_item(&mut items, &current);
            current.clear();
        } else {
            current.push(c);
        }
    }
    push_item(&mut items, &current);

    items
}

fn push_item(items: &mut Vec<String>, raw: &str) {
    let trimmed = raw.trim();
    if !trimmed.is_empty() {
        items.push(trimmed.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generic_commas_are_kept() {
        let items = split_top_level("a: Map<K, V>, b: u32");
        assert_eq!(items, vec!["a: Map<K, V>", "b: u32"]);
    }

    #[test]
    fn test_tuple_commas_are_kept() {
        let items = split_top_level("Transfer(Address, Address, u64), Approval((Address, bool))");
        assert_eq!(
            items,
            vec!["Transfer(Address, Address, u64)", "Approval((Address, bool))"]
        );
    }

    #[test]
    fn test_trailing_comma_and_blanks() {
        assert_eq!(split_top_level("x: u32,"), vec!["x: u32"]);
        assert_eq!(split_top_level(" , ,"), Vec::<String>::new());
        assert!(split_top_level("").is_empty());
        assert!(split_top_level("   ").is_empty());
    }

    #[test]
    fn test_nested_generics() {
        let items = split_top_level("m: Map<String, Vec<(u32, u64)>>, v: Vec<u32>");
        assert_eq!(items.len(), 2);
        assert_eq!(items[0], "m: Map<String, Vec<(u32, u64)>>");
    }

    #[test]
    fn test_newline_separated_declarations() {
        let body = "\npub field1: String\npub field2: u32\n";
        assert_eq!(
            split_declarations(body),
            vec!["pub field1: String", "pub field2: u32"]
        );
    }

    #[test]
    fn test_newline_inside_brackets_is_not_a_separator() {
        let body = "pub map: Map<\nString,\nu32>,\npub n: u32";
        let items = split_declarations(body);
        assert_eq!(items.len(), 2);
        assert!(items[0].starts_with("pub map: Map<"));
        assert_eq!(items[1], "pub n: u32");
    }

    #[test]
    fn test_top_level_ignores_newlines() {
        assert_eq!(split_top_level("a: u32\nb: u32"), vec!["a: u32\nb: u32"]);
    }
}
