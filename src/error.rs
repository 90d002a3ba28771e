use crate::commands::CommandError;
use crate::config::ConfigurationError;
use crate::policy::AuthorizationError;
use crate::resilience::ResilienceError;
use thiserror::Error;

/// Top-level error for application wiring and startup
#[derive(Debug, Error)]
pub enum LexdeskError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Resilience error: {0}")]
    Resilience(#[from] ResilienceError),

    #[error("Command error: {0}")]
    Command(#[from] CommandError),

    #[error("Authorization error: {0}")]
    Authorization(#[from] AuthorizationError),
}

pub type Result<T> = std::result::Result<T, LexdeskError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::PrincipalId;

    fn denied() -> AuthorizationError {
        AuthorizationError {
            principal_id: PrincipalId::new(),
            role: "paralegal".to_string(),
            action: "delete".to_string(),
            resource: "client".to_string(),
            reason: "no rule grants delete".to_string(),
        }
    }

    fn validate(name: &str) -> std::result::Result<(), CommandError> {
        if name.is_empty() {
            return Err(CommandError::Validation("empty name".to_string()));
        }
        Ok(())
    }

    fn dispatch(name: &str) -> Result<()> {
        validate(name)?;
        Ok(())
    }

    fn check(decision: std::result::Result<(), AuthorizationError>) -> Result<()> {
        decision?;
        Ok(())
    }

    #[test]
    fn test_module_errors_convert_with_question_mark() {
        assert!(dispatch("Ada").is_ok());
        let error = dispatch("").unwrap_err();
        assert!(matches!(error, LexdeskError::Command(CommandError::Validation(_))));
        assert!(error.to_string().contains("empty name"));

        let error = check(Err(denied())).unwrap_err();
        match error {
            LexdeskError::Authorization(inner) => assert_eq!(inner.role, "paralegal"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_resilience_and_configuration_errors_convert() {
        let error: LexdeskError = ResilienceError::BreakerNotFound {
            name: "court_filing_api".to_string(),
        }
        .into();
        assert!(error.to_string().contains("court_filing_api"));

        let error: LexdeskError =
            ConfigurationError::missing_required_field("environment", "application configuration")
                .into();
        assert!(matches!(error, LexdeskError::Configuration(_)));
    }
}
