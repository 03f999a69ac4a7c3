use onig::Captures;

pub mod regex;

// see https://stackoverflow.com/questions/38406793/why-is-capitalizing-the-first-letter-of-a-string-so-convoluted-in-rust
pub fn apply_to_first<F>(string: &str, func: F) -> String
where
    F: Fn(char) -> String,
{
    let mut c = string.chars();
    match c.next() {
        None => String::new(),
        Some(first) => func(first) + c.as_str(),
    }
}

pub fn is_title_case(string: &str) -> bool {
    let mut char_case = string.chars().map(|x| x.is_uppercase());

    char_case.next().unwrap_or(false) && !char_case.any(|x| x)
}

pub fn is_uppercase(string: &str) -> bool {
    !string.chars().any(|x| x.is_lowercase())
}

/// At least one uppercase char and no lowercase ones.
pub fn is_all_uppercase(string: &str) -> bool {
    string.chars().any(|x| x.is_uppercase()) && is_uppercase(string)
}

pub fn starts_with_uppercase(string: &str) -> bool {
    string.chars().next().map_or(false, |x| x.is_uppercase())
}

/// Replaces `<sigil>1`, `<sigil>2`, ... with the given groups. `groups[0]` is group 1.
pub fn sigil_replace<S: AsRef<str>>(mut replacement: String, sigil: char, groups: &[S]) -> String {
    // highest index first so that `$1` does not eat the prefix of `$10`
    for (i, group) in groups.iter().enumerate().rev() {
        replacement = replacement.replace(&format!("{}{}", sigil, i + 1), group.as_ref());
    }
    replacement
}

pub fn capture_groups(caps: &Captures) -> Vec<String> {
    (1..caps.len())
        .map(|i| caps.at(i).unwrap_or("").to_string())
        .collect()
}

// see https://github.com/rust-onig/rust-onig/issues/59#issuecomment-340160520
pub fn dollar_replace(replacement: String, caps: &Captures) -> String {
    sigil_replace(replacement, '$', &capture_groups(caps))
}
