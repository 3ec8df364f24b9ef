//! Genre normalization for concert events.
//!
//! Provides a canonical genre taxonomy and a synonym lookup so genre tags
//! display consistently no matter which source they came from.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Canonical genres for the Hannover concert scene.
pub const CANONICAL_GENRES: [&str; 9] = [
    "Rock",
    "Punk / Hardcore",
    "Metal",
    "Pop",
    "Hip-Hop",
    "Electronic",
    "Jazz / Blues",
    "Klassik",
    "Folk / World",
];

static GENRE_SYNONYMS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        // Rock variants
        ("rock", "Rock"),
        ("indie", "Rock"),
        ("alternative", "Rock"),
        ("alt-rock", "Rock"),
        ("grunge", "Rock"),
        ("post-rock", "Rock"),
        ("prog rock", "Rock"),
        ("deutschrock", "Rock"),
        ("krautrock", "Rock"),
        ("britpop", "Rock"),
        // Punk variants
        ("punk", "Punk / Hardcore"),
        ("punk rock", "Punk / Hardcore"),
        ("hardcore", "Punk / Hardcore"),
        ("hardcore punk", "Punk / Hardcore"),
        ("post-punk", "Punk / Hardcore"),
        ("postpunk", "Punk / Hardcore"),
        ("oi", "Punk / Hardcore"),
        ("crust", "Punk / Hardcore"),
        // Metal variants
        ("metal", "Metal"),
        ("heavy metal", "Metal"),
        ("death metal", "Metal"),
        ("black metal", "Metal"),
        ("thrash", "Metal"),
        ("neue deutsche härte", "Metal"),
        // Pop variants
        ("pop", "Pop"),
        ("synth-pop", "Pop"),
        ("dance-pop", "Pop"),
        ("neue deutsche welle", "Pop"),
        ("ndw", "Pop"),
        // Hip-Hop variants
        ("hip hop", "Hip-Hop"),
        ("hip-hop", "Hip-Hop"),
        ("hiphop", "Hip-Hop"),
        ("rap", "Hip-Hop"),
        ("trap", "Hip-Hop"),
        // Electronic variants
        ("electronic", "Electronic"),
        ("techno", "Electronic"),
        ("house", "Electronic"),
        ("trance", "Electronic"),
        ("drum and bass", "Electronic"),
        ("dnb", "Electronic"),
        ("dubstep", "Electronic"),
        ("ambient", "Electronic"),
        ("edm", "Electronic"),
        ("elektronisch", "Electronic"),
        ("elektronische musik", "Electronic"),
        // Jazz / Blues variants
        ("jazz", "Jazz / Blues"),
        ("blues", "Jazz / Blues"),
        ("soul", "Jazz / Blues"),
        ("r&b", "Jazz / Blues"),
        ("rnb", "Jazz / Blues"),
        ("funk", "Jazz / Blues"),
        ("disco", "Jazz / Blues"),
        // Klassik variants
        ("klassik", "Klassik"),
        ("classical", "Klassik"),
        ("klassische musik", "Klassik"),
        ("baroque", "Klassik"),
        ("orchestra", "Klassik"),
        ("orchester", "Klassik"),
        // Folk / World variants
        ("folk", "Folk / World"),
        ("singer-songwriter", "Folk / World"),
        ("liedermacher", "Folk / World"),
        ("acoustic", "Folk / World"),
        ("country", "Folk / World"),
        ("world", "Folk / World"),
        ("reggae", "Folk / World"),
        ("ska", "Folk / World"),
        ("dub", "Folk / World"),
        ("schlager", "Folk / World"),
        ("volksmusik", "Folk / World"),
        ("volkstümlich", "Folk / World"),
    ])
});

/// Normalize a raw genre string to a canonical genre, if known.
pub fn normalize_genre(raw: &str) -> Option<&'static str> {
    if raw.is_empty() {
        return None;
    }
    GENRE_SYNONYMS.get(raw.trim().to_lowercase().as_str()).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_synonyms_case_insensitively() {
        assert_eq!(normalize_genre("punk rock"), Some("Punk / Hardcore"));
        assert_eq!(normalize_genre("Elektronisch"), Some("Electronic"));
        assert_eq!(normalize_genre("  JAZZ  "), Some("Jazz / Blues"));
    }

    #[test]
    fn unknown_genre_is_none() {
        assert_eq!(normalize_genre("Unknown Genre"), None);
        assert_eq!(normalize_genre(""), None);
    }

    #[test]
    fn every_synonym_targets_a_canonical_genre() {
        for target in GENRE_SYNONYMS.values() {
            assert!(CANONICAL_GENRES.contains(target), "unmapped genre: {target}");
        }
    }
}
