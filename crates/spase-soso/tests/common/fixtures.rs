//! Test fixture loading utilities

use std::path::PathBuf;

use spase_soso::StaticResolver;

/// Get the path to a fixture file
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("test_fixtures")
        .join(name)
}

/// Load a fixture file as a string
pub fn load_fixture(name: &str) -> String {
    std::fs::read_to_string(fixture_path(name))
        .unwrap_or_else(|_| panic!("Failed to load fixture: {}", name))
}

/// Load a SPASE record fixture
pub fn load_record_fixture(name: &str) -> String {
    load_fixture(&format!("records/{}", name))
}

/// A resolver holding every record the ace_mag fixture links to.
#[allow(dead_code)]
pub fn demo_resolver() -> StaticResolver {
    let mut resolver = StaticResolver::new();
    let records = [
        ("spase://SMWG/Person/Jane.Q.Doe", "person_jane.xml"),
        ("spase://SMWG/Person/Ann.Lee", "person_ann.xml"),
        ("spase://SMWG/Instrument/ACE/MAG", "instrument_mag.xml"),
        ("spase://SMWG/Observatory/ACE", "observatory_ace.xml"),
        (
            "spase://SMWG/Observatory/SolarWindMonitors",
            "observatory_group.xml",
        ),
        (
            "spase://NASA/NumericalData/ACE/MAG/L2/PT1H",
            "hourly_dataset.xml",
        ),
        (
            "spase://NASA/NumericalData/ACE/MAG/L2/P1D",
            "daily_dataset.xml",
        ),
    ];
    for (identifier, file) in records {
        resolver
            .insert(identifier, &load_record_fixture(file))
            .unwrap_or_else(|_| panic!("Failed to parse fixture: {}", file));
    }
    resolver
}
