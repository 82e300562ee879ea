//! IRI string helpers for context resolution
//!
//! Nothing here validates full RFC 3987 syntax. Term resolution only needs
//! to tell three shapes apart — compact IRIs (`prefix:suffix`), absolute
//! IRIs (anything with a scheme), and relative references — and to join the
//! last kind onto a base.

/// Split a compact IRI into its prefix and suffix
///
/// Rejects shapes that cannot be compact IRIs: a suffix opening with `//`
/// or a `/` inside the prefix both mean the string is an absolute IRI. A
/// leading colon selects the empty term and comes back as the prefix `":"`.
pub fn parse_prefix(s: &str) -> Option<(String, String)> {
    let (prefix, suffix) = s.split_once(':')?;
    if suffix.starts_with("//") || prefix.contains('/') {
        return None;
    }
    if prefix.is_empty() {
        if suffix.is_empty() {
            return None;
        }
        return Some((":".to_string(), suffix.to_string()));
    }
    Some((prefix.to_string(), suffix.to_string()))
}

/// Whether a string could be an IRI at all (absolute or compact)
pub fn any_iri(s: &str) -> bool {
    s.contains(':')
}

/// Whether a string opens with an RFC 3986 scheme
///
/// Scheme-based rather than list-based, so `urn:`, `did:`, `mailto:` and
/// friends all count. A compact IRI passes this test too; `parse_prefix`
/// is what separates the two shapes.
pub fn is_absolute(iri: &str) -> bool {
    match iri.split_once(':') {
        Some((scheme, _)) if !scheme.is_empty() => {
            let mut chars = scheme.chars();
            chars.next().is_some_and(|c| c.is_ascii_alphabetic())
                && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        _ => false,
    }
}

/// Close a namespace IRI with `/` unless it already ends in `/` or `#`
pub fn add_trailing_slash(iri: &str) -> String {
    match iri.chars().last() {
        Some('/') | Some('#') => iri.to_string(),
        _ => format!("{}/", iri),
    }
}

/// Resolve a reference against a base IRI
///
/// Fragments replace any trailing `/` on the base; other relative
/// references append with a `/` separator unless the base already ends in
/// `/` or `#`. Absolute references win outright.
pub fn join(base: &str, relative: &str) -> String {
    if relative.is_empty() {
        return base.to_string();
    }
    if is_absolute(relative) {
        return relative.to_string();
    }
    if relative.starts_with('#') {
        return format!("{}{}", base.trim_end_matches('/'), relative);
    }
    match base.chars().last() {
        Some('/') | Some('#') => format!("{}{}", base, relative),
        _ => format!("{}/{}", base, relative),
    }
}
