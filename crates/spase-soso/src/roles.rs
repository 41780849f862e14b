//! Role classification for SPASE contacts
//!
//! SPASE roles map onto two output populations: author-eligible roles feed
//! the creator list, everything else is bucketed into DataCite contributor
//! types by a fixed priority table.

/// Author ordering, highest priority first. Contact-derived author lists are
/// re-ordered by this sequence.
pub const AUTHOR_PRIORITY: [&str; 7] = [
    "Author",
    "PrincipalInvestigator",
    "MissionPrincipalInvestigator",
    "CoPI",
    "DeputyPI",
    "FormerPI",
    "CoInvestigator",
];

/// DataCite contributor buckets, priority descending, with the raw SPASE
/// roles that fall into each.
pub const CONTRIBUTOR_BUCKETS: [(&str, &[&str]); 6] = [
    (
        "ContactPerson",
        &[
            "GeneralContact",
            "HostContact",
            "MetadataContact",
            "TechnicalContact",
        ],
    ),
    ("DataCurator", &["ArchiveSpecialist"]),
    ("ProjectLeader", &["TeamLeader"]),
    (
        "ProjectManager",
        &[
            "InstrumentLead",
            "MissionManager",
            "ProgramManager",
            "ProjectManager",
        ],
    ),
    ("DataCollector", &["DataProducer"]),
    (
        "ProjectMember",
        &[
            "Contributor",
            "Developer",
            "InstrumentScientist",
            "ProgramScientist",
            "ProjectEngineer",
            "ProjectScientist",
            "Scientist",
            "TeamMember",
        ],
    ),
];

/// Whether a raw role string qualifies its contact as an author.
///
/// Substring matching, not exact membership: a role like `"NonPI"` also
/// qualifies. Known over-match, kept for compatibility with the record
/// corpus.
pub fn is_author_role(role: &str) -> bool {
    role.contains("PrincipalInvestigator")
        || role.contains("PI")
        || role.contains("CoInvestigator")
        || role.contains("Author")
}

/// Is this raw role in the ContactPerson or DataCurator bucket?
pub fn is_curation_role(role: &str) -> bool {
    CONTRIBUTOR_BUCKETS
        .iter()
        .take(2)
        .any(|(_, raws)| raws.contains(&role))
}

/// Pretty-print a CamelCase role token: a space before each interior
/// uppercase letter, except that roles containing `"Co"` directly followed
/// by an uppercase letter are joined with hyphens instead.
pub fn prettify_role(role: &str) -> String {
    let mut parts: Vec<String> = Vec::new();
    for ch in role.chars() {
        if ch.is_uppercase() || parts.is_empty() {
            parts.push(ch.to_string());
        } else if let Some(last) = parts.last_mut() {
            last.push(ch);
        }
    }
    let separator = if co_prefixed(role) { "-" } else { " " };
    parts.join(separator)
}

fn co_prefixed(role: &str) -> bool {
    role.match_indices("Co").any(|(index, _)| {
        role[index + 2..]
            .chars()
            .next()
            .is_some_and(|c| c.is_uppercase())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("CoInvestigator", "Co-Investigator")]
    #[test_case("TeamMember", "Team Member")]
    #[test_case("PrincipalInvestigator", "Principal Investigator")]
    #[test_case("ArchiveSpecialist", "Archive Specialist")]
    #[test_case("Scientist", "Scientist")]
    fn test_prettify_role(raw: &str, pretty: &str) {
        assert_eq!(prettify_role(raw), pretty);
    }

    #[test]
    fn test_author_roles() {
        assert!(is_author_role("PrincipalInvestigator"));
        assert!(is_author_role("CoInvestigator"));
        assert!(is_author_role("MissionPrincipalInvestigator"));
        assert!(is_author_role("Author"));
        assert!(!is_author_role("TechnicalContact"));
        // substring matching over-matches: kept as documented behavior
        assert!(is_author_role("NonPI"));
    }

    #[test]
    fn test_curation_roles() {
        assert!(is_curation_role("GeneralContact"));
        assert!(is_curation_role("ArchiveSpecialist"));
        assert!(!is_curation_role("TeamLeader"));
    }
}
