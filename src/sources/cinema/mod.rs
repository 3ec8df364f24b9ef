pub mod apollokino;
pub mod astor;

/// True if a showtime's language/version tag marks an original version
/// (OV/OmU) showing. Cinemas dub most releases; the digest only carries
/// original-language showings.
pub fn is_original_version(version: &str) -> bool {
    let v = version.trim().to_lowercase();
    v == "ov"
        || v == "ov/omu"
        || v.contains("omu")
        || v.contains("omeu")
        || v.contains("original")
        || v.contains("engl. ov")
}

#[cfg(test)]
mod tests {
    use super::is_original_version;

    #[test]
    fn recognizes_ov_variants() {
        assert!(is_original_version("OV"));
        assert!(is_original_version("OmU"));
        assert!(is_original_version("OmeU"));
        assert!(is_original_version("Original Version"));
    }

    #[test]
    fn rejects_dubbed_versions() {
        assert!(!is_original_version("dt."));
        assert!(!is_original_version("Deutsch"));
        assert!(!is_original_version(""));
    }
}
