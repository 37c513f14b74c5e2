/// Splits a tag field into distinct, sorted tag names
pub fn parse_tags(input: &str) -> Vec<String> {
    let comma_mode = has_unquoted_comma(input);
    let is_delimiter = |c: char| if comma_mode { c == ',' } else { c.is_whitespace() };

    let mut names = Vec::new();
    let mut current = String::new();
    let mut in_quote = false;

    for c in input.chars() {
        if c == '"' {
            in_quote = !in_quote;
        } else if !in_quote && is_delimiter(c) {
            names.push(std::mem::take(&mut current));
        } else {
            current.push(c);
        }
    }
    names.push(current);

    let mut names: Vec<String> = names
        .into_iter()
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect();
    names.sort();
    names.dedup();
    names
}

/// Renders tag names back into a form value that [`parse_tags`] reads
/// to the same set
pub fn edit_string<S: AsRef<str>>(names: &[S]) -> String {
    let mut quoted: Vec<String> = names
        .iter()
        .map(|name| {
            let name = name.as_ref();
            if name.contains(',') || name.chars().any(char::is_whitespace) {
                format!("\"{}\"", name)
            } else {
                name.to_string()
            }
        })
        .collect();
    quoted.sort();
    quoted.join(", ")
}

fn has_unquoted_comma(input: &str) -> bool {
    let mut in_quote = false;
    for c in input.chars() {
        match c {
            '"' => in_quote = !in_quote,
            ',' if !in_quote => return true,
            _ => {}
        }
    }
    false
}
