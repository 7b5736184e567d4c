/// Replace `${ENV_VAR}` placeholders in raw config text.
///
/// Unresolvable variables are left as-is.
pub fn substitute_env(input: &str) -> String {
    substitute_env_with(input, |name| std::env::var(name).ok())
}

/// [`substitute_env`] with an injectable lookup, so tests do not have to
/// touch the process environment.
fn substitute_env_with(input: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) if end > 0 => {
                let name = &after[..end];
                match lookup(name) {
                    Some(value) => out.push_str(&value),
                    None => out.push_str(&rest[start..start + 2 + end + 1]),
                }
                rest = &after[end + 1..];
            },
            // `${}` or an unterminated placeholder: keep the text literally.
            _ => {
                out.push_str("${");
                rest = after;
            },
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(name: &str) -> Option<String> {
        match name {
            "SOFA_BASE" => Some("/api".to_string()),
            "SOFA_PORT" => Some("8080".to_string()),
            _ => None,
        }
    }

    #[test]
    fn substitutes_known_vars() {
        assert_eq!(
            substitute_env_with("base_path = \"${SOFA_BASE}\"\nport = ${SOFA_PORT}", lookup),
            "base_path = \"/api\"\nport = 8080"
        );
    }

    #[test]
    fn leaves_unknown_var() {
        assert_eq!(
            substitute_env_with("x = ${SOFA_MISSING_XYZ}", lookup),
            "x = ${SOFA_MISSING_XYZ}"
        );
    }

    #[test]
    fn keeps_malformed_placeholders() {
        assert_eq!(substitute_env_with("${} and ${SOFA_BASE", lookup), "${} and ${SOFA_BASE");
    }

    #[test]
    fn no_placeholders() {
        assert_eq!(substitute_env("plain text"), "plain text");
    }
}
