//! Application identity parsing.
//!
//! App-storage directories under `Mobile Documents` encode the owning
//! application's bundle identifier in their name, tilde-separated, sometimes
//! prefixed with a generated install id or a literal `iCloud` marker:
//!
//! ```text
//! iCloud~com~apple~notes
//! 4R6749AYRE~com~pixelmatorteam~pixelmator
//! dk~simonbs~Scriptable
//! ```
//!
//! Everything in this module is pure string transformation, no I/O.

use crate::types::AppIdentity;

/// Leading bundle-id segments that identify a publisher namespace.
const VENDOR_TOKENS: &[&str] = &[
    "com", "net", "org", "io", "co", "de", "dk", "md", "se", "ch", "at", "uk", "app",
];

/// Whether a directory basename follows the app-storage naming convention.
pub fn is_app_storage_name(name: &str) -> bool {
    !name.starts_with('.') && name.split('~').filter(|s| !s.is_empty()).count() >= 2
}

/// Decode an app-storage directory basename into vendor/bundle/name fields.
///
/// Returns `None` when the name does not look like an app-storage directory
/// (fewer than two tilde-separated segments).
pub fn parse(basename: &str) -> Option<AppIdentity> {
    let segments: Vec<&str> = basename.split('~').filter(|s| !s.is_empty()).collect();
    if segments.len() < 2 {
        return None;
    }

    let mut parts = segments.as_slice();

    // Generated install ids (e.g. `4R6749AYRE`) are noise, not identity.
    if is_install_id(parts[0]) {
        parts = &parts[1..];
    }

    // A literal `iCloud` segment is the sync marker prefix.
    if parts.first() == Some(&"iCloud") {
        parts = &parts[1..];
    }

    if parts.is_empty() {
        return None;
    }

    let mut bundle: Vec<String> = parts.iter().map(|s| (*s).to_string()).collect();

    // Reverse-domain ids lead with the vendor token; when a name has it
    // elsewhere, rotate it to the front.
    if !VENDOR_TOKENS.contains(&bundle[0].as_str()) {
        if let Some(pos) = bundle
            .iter()
            .position(|p| VENDOR_TOKENS.contains(&p.as_str()))
        {
            bundle.rotate_left(pos);
        }
    }

    let bundle_id = bundle.join(".");
    let vendor = if bundle[0] == "com" && bundle.len() > 1 {
        // Bare `com` says nothing about the publisher; keep the next segment.
        format!("{}.{}", bundle[0], bundle[1])
    } else {
        bundle[0].clone()
    };
    let app_name = humanize(bundle.last().map(String::as_str).unwrap_or_default());

    Some(AppIdentity {
        app_id: basename.to_string(),
        app_name,
        bundle_id,
        vendor,
    })
}

/// Generated install ids are long, all-caps alphanumeric, and carry digits.
fn is_install_id(segment: &str) -> bool {
    segment.len() >= 6
        && segment
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        && segment.chars().any(|c| c.is_ascii_digit())
}

/// Turn the trailing bundle segment into a display name.
fn humanize(name: &str) -> String {
    if name.contains('.') {
        return name
            .split('.')
            .filter(|s| !s.is_empty())
            .map(humanize)
            .collect::<Vec<_>>()
            .join(" ");
    }

    // Names already shipped as multi-word PascalCase (`MindNode`) read fine
    // as-is; splitting them would mangle the brand.
    if is_pascal_multiword(name) {
        return name.to_string();
    }

    split_camel(name)
        .iter()
        .map(|w| title_case(w))
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_pascal_multiword(name: &str) -> bool {
    let humps = name
        .chars()
        .filter(|c| c.is_ascii_uppercase())
        .count();
    humps >= 2
        && name.chars().next().is_some_and(|c| c.is_ascii_uppercase())
        && name.chars().all(|c| c.is_ascii_alphanumeric())
}

fn split_camel(name: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    for c in name.chars() {
        if c.is_ascii_uppercase() && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        current.push(c);
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_prefixed_bundle() {
        let id = parse("iCloud~com~apple~notes").unwrap();
        assert_eq!(id.bundle_id, "com.apple.notes");
        assert_eq!(id.app_name, "Notes");
        assert_eq!(id.vendor, "com.apple");
        assert_eq!(id.app_id, "iCloud~com~apple~notes");
    }

    #[test]
    fn test_install_id_is_stripped() {
        let id = parse("4R6749AYRE~com~pixelmatorteam~pixelmator").unwrap();
        assert_eq!(id.bundle_id, "com.pixelmatorteam.pixelmator");
        assert_eq!(id.app_name, "Pixelmator");
        assert_eq!(id.app_id, "4R6749AYRE~com~pixelmatorteam~pixelmator");
    }

    #[test]
    fn test_non_com_vendor() {
        let id = parse("dk~simonbs~Scriptable").unwrap();
        assert_eq!(id.bundle_id, "dk.simonbs.Scriptable");
        assert_eq!(id.app_name, "Scriptable");
        assert_eq!(id.vendor, "dk");
    }

    #[test]
    fn test_dotted_trailing_segment() {
        let id = parse("XYZ123ABCD~com~company~app~SubApp.Module").unwrap();
        assert_eq!(id.app_name, "SubApp Module");
    }

    #[test]
    fn test_pascal_case_name_passes_through() {
        let id = parse("iCloud~com~ideasoncanvas~MindNode").unwrap();
        assert_eq!(id.app_name, "MindNode");
    }

    #[test]
    fn test_camel_case_is_split_and_titled() {
        let id = parse("com~example~myCoolApp").unwrap();
        assert_eq!(id.app_name, "My Cool App");
    }

    #[test]
    fn test_vendor_token_rotated_to_front() {
        let id = parse("apple~com~notes").unwrap();
        assert_eq!(id.bundle_id, "com.notes.apple");
    }

    #[test]
    fn test_single_segment_is_not_app_storage() {
        assert!(parse("Documents").is_none());
        assert!(parse("com~apple~notes").is_some());
    }

    #[test]
    fn test_app_storage_name_recognition() {
        assert!(is_app_storage_name("com~apple~Numbers"));
        assert!(is_app_storage_name("iCloud~md~obsidian"));
        assert!(!is_app_storage_name("Documents"));
        assert!(!is_app_storage_name(".Trash"));
        assert!(!is_app_storage_name("archive~"));
    }

    #[test]
    fn test_install_id_shape() {
        assert!(is_install_id("4R6749AYRE"));
        assert!(is_install_id("XYZ123ABCD"));
        // No digits: could be a shouty brand, keep it.
        assert!(!is_install_id("ICLOUD"));
        assert!(!is_install_id("com"));
        assert!(!is_install_id("A1B2"));
    }
}
