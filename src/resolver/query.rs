use std::fmt;

/// Module discriminator carried by every lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Module {
    Commercial,
    Other(String),
}

impl Module {
    /// Only the exact tag `"commercial"` selects the commercial path.
    pub fn parse(tag: &str) -> Self {
        match tag {
            "commercial" => Self::Commercial,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Commercial => "commercial",
            Self::Other(tag) => tag,
        }
    }
}

/// Identifier tuple for one client resolution; also the cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LookupQuery {
    client_id: Option<String>,
    matter_number: Option<String>,
    module: Module,
}

fn normalize_identifier(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

impl LookupQuery {
    /// Build a query. Empty or whitespace-only identifiers count as absent.
    pub fn new(client_id: Option<&str>, matter_number: Option<&str>, module: &str) -> Self {
        Self {
            client_id: normalize_identifier(client_id),
            matter_number: normalize_identifier(matter_number),
            module: Module::parse(module),
        }
    }

    pub fn client_id(&self) -> Option<&str> {
        self.client_id.as_deref()
    }

    pub fn matter_number(&self) -> Option<&str> {
        self.matter_number.as_deref()
    }

    pub fn module(&self) -> &Module {
        &self.module
    }

    /// At least one identifier is required for a lookup to run.
    pub fn has_identifier(&self) -> bool {
        self.client_id.is_some() || self.matter_number.is_some()
    }
}

impl fmt::Display for LookupQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "client_id={} matter_number={} module={}",
            self.client_id.as_deref().unwrap_or("-"),
            self.matter_number.as_deref().unwrap_or("-"),
            self.module.as_str()
        )
    }
}
