//! Startup-time source registry.
//!
//! Sources are registered explicitly at a single composition point
//! (`default_registry`) instead of being auto-discovered, so there are no
//! hidden load-order dependencies. The registry is immutable for the
//! duration of a run; iteration order is insertion order.

use crate::config::Config;
use crate::error::Result;
use crate::sources::cinema::apollokino::ApollokinoSource;
use crate::sources::cinema::astor::AstorSource;
use crate::sources::concerts::broncos::BroncosSource;
use crate::sources::concerts::erhardt::ErhardtCafeSource;
use crate::sources::concerts::faust::FaustSource;
use crate::sources::concerts::glocksee::GlockseeSource;
use crate::sources::concerts::kulturpalast::KulturpalastLindenSource;
use crate::sources::concerts::punkrock::PunkrockKonzerteSource;
use crate::sources::concerts::weltspiele::WeltspieleSource;
use crate::sources::EventSource;

#[derive(Default)]
pub struct SourceRegistry {
    entries: Vec<(&'static str, Box<dyn EventSource>)>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Register a source under its own identifier.
    ///
    /// Panics on a duplicate identifier: double registration is a
    /// programming error and must fail fast at startup, not be masked.
    pub fn register(&mut self, source: Box<dyn EventSource>) {
        let id = source.source_id();
        if self.entries.iter().any(|(existing, _)| *existing == id) {
            panic!("duplicate source id registered: {id}");
        }
        self.entries.push((id, source));
    }

    /// All registered sources, in registration order.
    pub fn all(&self) -> impl Iterator<Item = &dyn EventSource> {
        self.entries.iter().map(|(_, source)| source.as_ref())
    }

    pub fn get(&self, id: &str) -> Option<&dyn EventSource> {
        self.entries
            .iter()
            .find(|(existing, _)| *existing == id)
            .map(|(_, source)| source.as_ref())
    }

    pub fn ids(&self) -> Vec<&'static str> {
        self.entries.iter().map(|(id, _)| *id).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Composition point: every venue integration is registered here.
pub fn default_registry(config: &Config) -> Result<SourceRegistry> {
    let mut registry = SourceRegistry::new();
    registry.register(Box::new(AstorSource::new(config)?));
    registry.register(Box::new(ApollokinoSource::new(config)?));
    registry.register(Box::new(BroncosSource::new(config)?));
    registry.register(Box::new(ErhardtCafeSource::new(config)?));
    registry.register(Box::new(FaustSource::new(config)?));
    registry.register(Box::new(GlockseeSource::new(config)?));
    registry.register(Box::new(KulturpalastLindenSource::new(config)?));
    registry.register(Box::new(PunkrockKonzerteSource::new(config)?));
    registry.register(Box::new(WeltspieleSource::new(config)?));
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::SourceType;

    #[test]
    fn default_registry_holds_all_nine_sources() {
        let registry = default_registry(&Config::default()).unwrap();
        assert_eq!(registry.len(), 9);
        assert_eq!(registry.ids().first(), Some(&"astor"));
    }

    #[test]
    fn lookup_by_id() {
        let registry = default_registry(&Config::default()).unwrap();
        assert!(registry.get("glocksee").is_some());
        assert!(registry.get("nope").is_none());
    }

    #[test]
    fn sources_carry_their_type() {
        let registry = default_registry(&Config::default()).unwrap();
        assert_eq!(registry.get("astor").unwrap().source_type(), SourceType::Cinema);
        assert_eq!(registry.get("broncos").unwrap().source_type(), SourceType::Concert);
        assert_eq!(SourceType::Cinema.as_str(), "cinema");
    }

    #[test]
    #[should_panic(expected = "duplicate source id")]
    fn duplicate_registration_panics() {
        let config = Config::default();
        let mut registry = SourceRegistry::new();
        registry.register(Box::new(BroncosSource::new(&config).unwrap()));
        registry.register(Box::new(BroncosSource::new(&config).unwrap()));
    }
}
