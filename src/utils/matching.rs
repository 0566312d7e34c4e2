/// Splits free-form model output on commas into trimmed, non-empty names.
///
/// This is best-effort: the completion is natural language, so anything the
/// model writes between commas becomes a candidate.
#[must_use]
pub fn parse_service_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Turns a service name into the form used in baseline file names:
/// spaces become hyphens, periods are dropped, everything lower-cased.
#[must_use]
pub fn normalize_candidate(name: &str) -> String {
    name.trim()
        .replace(' ', "-")
        .replace('.', "")
        .to_lowercase()
}

/// First file name, in listing order, containing `normalized` case-insensitively.
#[must_use]
pub fn find_matching_file<'a, I>(normalized: &str, file_names: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    if normalized.is_empty() {
        return None;
    }
    let needle = normalized.to_lowercase();
    file_names
        .into_iter()
        .find(|name| name.to_lowercase().contains(&needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_service_list_trims_and_keeps_order() {
        assert_eq!(parse_service_list("A, B , C"), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_parse_service_list_drops_empty_segments() {
        assert_eq!(
            parse_service_list("\n\nVirtual Machines,, Storage ,\n"),
            vec!["Virtual Machines", "Storage"]
        );
        assert!(parse_service_list("  ").is_empty());
    }

    #[test]
    fn test_normalize_candidate() {
        assert_eq!(normalize_candidate("Azure Storage"), "azure-storage");
        assert_eq!(normalize_candidate(" Azure App Service.NET "), "azure-app-servicenet");
        assert_eq!(normalize_candidate("Node.js"), "nodejs");
    }

    #[test]
    fn test_find_matching_file_substring() {
        let names = ["readme.md", "azure-storage-security-baseline.md"];
        let normalized = normalize_candidate("Azure Storage");
        assert_eq!(
            find_matching_file(&normalized, names),
            Some("azure-storage-security-baseline.md")
        );
    }

    #[test]
    fn test_find_matching_file_is_case_insensitive_and_first_wins() {
        let names = [
            "Azure-Key-Vault-Security-Baseline.xlsx",
            "azure-key-vault-managed-hsm-security-baseline.xlsx",
        ];
        assert_eq!(
            find_matching_file("azure-key-vault", names),
            Some("Azure-Key-Vault-Security-Baseline.xlsx")
        );
    }

    #[test]
    fn test_find_matching_file_miss_and_empty_candidate() {
        let names = ["azure-storage-security-baseline.md"];
        assert_eq!(find_matching_file("cosmos-db", names), None);
        assert_eq!(find_matching_file("", names), None);
    }
}
