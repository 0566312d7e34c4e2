use threatmodel::utils::{find_matching_file, normalize_candidate, parse_service_list};

#[test]
fn test_service_list_from_completion_text() {
    assert_eq!(parse_service_list("A, B , C"), vec!["A", "B", "C"]);
}

#[test]
fn test_free_form_output_passes_through_as_candidates() {
    // Not a list at all; every comma-separated fragment still becomes a name
    let parsed = parse_service_list("The diagram uses Azure Storage, and also a VM.");
    assert_eq!(parsed, vec!["The diagram uses Azure Storage", "and also a VM."]);
}

#[test]
fn test_storage_candidate_matches_baseline_file() {
    let normalized = normalize_candidate("Azure Storage");
    assert_eq!(normalized, "azure-storage");

    let listing = [
        "azure-sql-security-baseline.md",
        "azure-storage-security-baseline.md",
    ];
    assert_eq!(
        find_matching_file(&normalized, listing),
        Some("azure-storage-security-baseline.md")
    );
}

#[test]
fn test_no_match_in_empty_listing() {
    let listing: [&str; 0] = [];
    assert_eq!(find_matching_file("azure-storage", listing), None);
}
