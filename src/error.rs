//! Structured errors for engine contract violations and resource failures.
//!
//! Malformed markup never produces an [`EngineError`]; it is recovered where it
//! is found. Errors are reserved for callers misusing the engine API and for the
//! resource collaborator, whose failures the resolver logs and swallows.

use core::fmt;

/// Processing phase where an error originated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorPhase {
    /// Markup tokenization.
    Tokenize,
    /// Style stack manipulation.
    Style,
    /// Image fetch, decode, and caching.
    Resource,
}

impl fmt::Display for ErrorPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Tokenize => "tokenize",
            Self::Style => "style",
            Self::Resource => "resource",
        };
        f.write_str(name)
    }
}

/// Structured engine error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineError {
    /// Processing phase where this error originated.
    pub phase: ErrorPhase,
    /// Stable machine-readable code.
    pub code: &'static str,
    /// Human-readable message.
    pub message: Box<str>,
    /// Optional additional context.
    pub context: Option<Box<EngineErrorContext>>,
}

/// Extended optional context for engine errors.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EngineErrorContext {
    /// Style property key involved in the failure.
    pub property: Option<Box<str>>,
    /// Image reference (path or URL) involved in the failure.
    pub reference: Option<Box<str>>,
    /// Tokenizer read offset in bytes.
    pub token_offset: Option<usize>,
}

impl EngineError {
    pub fn new(phase: ErrorPhase, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            phase,
            code,
            message: message.into().into_boxed_str(),
            context: None,
        }
    }

    fn context_mut(&mut self) -> &mut EngineErrorContext {
        self.context
            .get_or_insert_with(|| Box::new(EngineErrorContext::default()))
    }

    pub fn with_property(mut self, property: impl Into<String>) -> Self {
        self.context_mut().property = Some(property.into().into_boxed_str());
        self
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.context_mut().reference = Some(reference.into().into_boxed_str());
        self
    }

    pub fn with_token_offset(mut self, token_offset: usize) -> Self {
        self.context_mut().token_offset = Some(token_offset);
        self
    }

    /// Property key attached to this error, if any.
    pub fn property(&self) -> Option<&str> {
        self.context.as_ref().and_then(|ctx| ctx.property.as_deref())
    }

    /// Image reference attached to this error, if any.
    pub fn reference(&self) -> Option<&str> {
        self.context.as_ref().and_then(|ctx| ctx.reference.as_deref())
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.phase, self.code, self.message)?;
        if let Some(ctx) = &self.context {
            if let Some(property) = ctx.property.as_deref() {
                write!(f, " [property={}]", property)?;
            }
            if let Some(reference) = ctx.reference.as_deref() {
                write!(f, " [reference={}]", reference)?;
            }
            if let Some(token_offset) = ctx.token_offset {
                write!(f, " [token_offset={}]", token_offset)?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for EngineError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_phase_code_and_context() {
        let err = EngineError::new(ErrorPhase::Style, "STYLE_UNKNOWN_PROPERTY", "no such key")
            .with_property("colour");
        assert_eq!(
            err.to_string(),
            "style:STYLE_UNKNOWN_PROPERTY: no such key [property=colour]"
        );
        assert_eq!(err.property(), Some("colour"));
        assert_eq!(err.reference(), None);
    }

    #[test]
    fn display_without_context_is_compact() {
        let err = EngineError::new(ErrorPhase::Resource, "RESOURCE_CACHE_EMPTY", "empty");
        assert_eq!(err.to_string(), "resource:RESOURCE_CACHE_EMPTY: empty");
    }
}
