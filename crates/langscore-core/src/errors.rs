use std::fmt;
use std::panic::Location;

use thiserror::Error;

#[derive(Debug, Error)]
#[error("{0}")]
pub struct ConfigError(pub String);

/// A subject was asked for something it cannot do.
///
/// Carries the source location where the refusal was raised so stored
/// diagnostics point at the responsible provider.
#[derive(Debug, Clone, Error)]
pub enum CapabilityError {
    #[error("subject '{subject}' does not implement {capability}")]
    NotImplemented {
        subject: String,
        capability: String,
        location: &'static Location<'static>,
    },
}

impl CapabilityError {
    #[track_caller]
    pub fn not_implemented(subject: impl Into<String>, capability: impl fmt::Display) -> Self {
        CapabilityError::NotImplemented {
            subject: subject.into(),
            capability: capability.to_string(),
            location: Location::caller(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            CapabilityError::NotImplemented { .. } => "NotImplementedError",
        }
    }

    pub fn location(&self) -> &'static Location<'static> {
        match self {
            CapabilityError::NotImplemented { location, .. } => location,
        }
    }
}

#[derive(Debug, Error)]
pub enum SubjectError {
    #[error(transparent)]
    Capability(#[from] CapabilityError),
    #[error("no task or recording started on subject '{0}'")]
    NotStarted(String),
    #[error("subject '{subject}' failed: {message}")]
    Failed { subject: String, message: String },
}

#[derive(Debug, Error)]
pub enum FormulaError {
    #[error("unexpected character '{ch}' at offset {offset} in formula '{formula}'")]
    UnexpectedChar {
        formula: String,
        ch: char,
        offset: usize,
    },
    #[error("unexpected end of formula '{0}'")]
    UnexpectedEnd(String),
    #[error("trailing input in formula '{0}'")]
    Trailing(String),
    #[error("no total for region {region_number} of condition '{condition}'")]
    MissingRegion {
        condition: String,
        region_number: u32,
    },
    #[error("type error: {0}")]
    Type(String),
}

#[derive(Debug, Error)]
pub enum BenchmarkError {
    #[error(transparent)]
    Capability(#[from] CapabilityError),
    #[error(transparent)]
    Subject(SubjectError),
    #[error(transparent)]
    Formula(#[from] FormulaError),
    #[error("composite benchmark needs at least one sub-benchmark")]
    EmptyComposite,
    #[error("suite '{0}' has no items")]
    EmptySuite(String),
    #[error("subject returned no {what} output")]
    MissingOutput { what: &'static str },
    #[error("data error: {0}")]
    Data(String),
}

impl From<SubjectError> for BenchmarkError {
    fn from(e: SubjectError) -> Self {
        // keep capability failures distinguishable from other subject errors
        match e {
            SubjectError::Capability(c) => BenchmarkError::Capability(c),
            other => BenchmarkError::Subject(other),
        }
    }
}

impl BenchmarkError {
    pub fn type_name(&self) -> &'static str {
        match self {
            BenchmarkError::Capability(c) => c.type_name(),
            BenchmarkError::Subject(_) => "SubjectError",
            BenchmarkError::Formula(_) => "FormulaError",
            BenchmarkError::EmptyComposite => "EmptyCompositeError",
            BenchmarkError::EmptySuite(_) => "EmptySuiteError",
            BenchmarkError::MissingOutput { .. } => "MissingOutputError",
            BenchmarkError::Data(_) => "DataError",
        }
    }
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("'{0}' is not registered")]
    NotFound(String),
    #[error("failed to load '{id}': {source}")]
    Load {
        id: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Failure record stored in the `comment` column of a score row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub type_name: String,
    pub message: String,
    pub location: Option<String>,
}

impl Diagnostic {
    pub fn from_capability(e: &CapabilityError) -> Self {
        let loc = e.location();
        Self {
            type_name: e.type_name().to_string(),
            message: e.to_string(),
            location: Some(format!("{}:{}:{}", loc.file(), loc.line(), loc.column())),
        }
    }

    pub fn from_benchmark(e: &BenchmarkError) -> Self {
        match e {
            BenchmarkError::Capability(c) => Self::from_capability(c),
            other => Self {
                type_name: other.type_name().to_string(),
                message: other.to_string(),
                location: None,
            },
        }
    }

    pub fn from_registry(e: &RegistryError) -> Self {
        Self {
            type_name: "RegistryError".to_string(),
            message: e.to_string(),
            location: None,
        }
    }

    pub fn unknown_model(id: &str, source: &RegistryError) -> Self {
        Self {
            type_name: "UnknownModelError".to_string(),
            message: format!("model '{}' could not be resolved: {}", id, source),
            location: None,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.type_name, self.message)?;
        if let Some(loc) = &self.location {
            write!(f, "\n  at {}", loc)?;
        }
        Ok(())
    }
}
