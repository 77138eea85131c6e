//! Shell-style variable expansion.
//!
//! Recognized references are `$NAME` (ASCII letters, digits and `_`),
//! `${NAME}` (anything up to the closing brace) and the single-character
//! special names `*#$@!?-0123456789`, written `$?` or `${?}`.
//! Malformed braces (`${}` or an unterminated `${`) are dropped from the
//! output; a `$` that does not start a reference is kept as is.

/// Replaces every variable reference in `input` with `mapping(name)`.
pub fn expand<F>(input: &str, mapping: F) -> String
where
    F: Fn(&str) -> String,
{
    let bytes = input.as_bytes();
    let mut out = String::with_capacity(input.len());
    let mut start = 0;
    let mut pos = 0;

    while pos < bytes.len() {
        if bytes[pos] == b'$' && pos + 1 < bytes.len() {
            out.push_str(&input[start..pos]);
            let (name, width) = shell_name(&input[pos + 1..]);
            match name {
                Some(name) => out.push_str(&mapping(name)),
                // malformed, swallowed
                None if width > 0 => {}
                None => out.push('$'),
            }
            pos += width;
            start = pos + 1;
        }
        pos += 1;
    }

    out.push_str(&input[start..]);
    out
}

/// Reads the variable name at the start of `s` (just after a `$`).
///
/// Returns the name, if any, and how many bytes of `s` it occupies.
fn shell_name(s: &str) -> (Option<&str>, usize) {
    let bytes = s.as_bytes();
    if bytes[0] == b'{' {
        if bytes.len() > 2 && is_special_var(bytes[1]) && bytes[2] == b'}' {
            return (Some(&s[1..2]), 3);
        }
        return match bytes.iter().skip(1).position(|&b| b == b'}') {
            Some(0) => (None, 2),
            Some(offset) => (Some(&s[1..offset + 1]), offset + 2),
            None => (None, 1),
        };
    }

    if is_special_var(bytes[0]) {
        return (Some(&s[0..1]), 1);
    }

    let len = bytes.iter().take_while(|b| is_name_char(**b)).count();
    if len == 0 { (None, 0) } else { (Some(&s[..len]), len) }
}

fn is_special_var(b: u8) -> bool {
    matches!(b, b'*' | b'#' | b'$' | b'@' | b'!' | b'?' | b'-') || b.is_ascii_digit()
}

fn is_name_char(b: u8) -> bool {
    b == b'_' || b.is_ascii_alphanumeric()
}

#[cfg(test)]
mod tests {
    use super::expand;

    fn lookup(name: &str) -> String {
        match name {
            "HOME" => "/home/me".to_string(),
            "USER" => "me".to_string(),
            "?" => "0".to_string(),
            "1" => "first".to_string(),
            _ => String::new(),
        }
    }

    #[test]
    fn plain_and_braced_names() {
        assert_eq!(expand("$HOME/bin", lookup), "/home/me/bin");
        assert_eq!(expand("${USER}_x", lookup), "me_x");
        assert_eq!(expand("$USER_x", lookup), "");
        assert_eq!(expand("a $USER b ${HOME}", lookup), "a me b /home/me");
    }

    #[test]
    fn special_names() {
        assert_eq!(expand("status=$?", lookup), "status=0");
        assert_eq!(expand("${?}", lookup), "0");
        assert_eq!(expand("$1st", lookup), "firstst");
    }

    #[test]
    fn unknown_names_use_mapping() {
        assert_eq!(expand("[$NOPE]", lookup), "[]");
        assert_eq!(expand("[$NOPE]", |n: &str| format!("<{n}>")), "[<NOPE>]");
    }

    #[test]
    fn lone_dollars_are_kept() {
        assert_eq!(expand("cost: 5$", lookup), "cost: 5$");
        assert_eq!(expand("a $ b", lookup), "a $ b");
        assert_eq!(expand("$", lookup), "$");
        assert_eq!(expand("no refs", lookup), "no refs");
    }

    #[test]
    fn malformed_braces_are_dropped() {
        assert_eq!(expand("x${}y", lookup), "xy");
        assert_eq!(expand("x${USER", lookup), "xUSER");
    }

    #[test]
    fn non_ascii_text_survives() {
        assert_eq!(expand("héllo $USER ✓", lookup), "héllo me ✓");
        assert_eq!(expand("$é", lookup), "$é");
    }
}
