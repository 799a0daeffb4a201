use thiserror::Error;

/// Malformed input to an odds or edge calculation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidOddsError {
    #[error("american odds of 0 are not a valid price")]
    Zero,
    #[error("american odds {0} pay out nothing on a win")]
    ZeroPayout(i32),
    #[error("probability {0} is outside [0, 1]")]
    Probability(f64),
}

/// An external provider could not deliver data
#[derive(Debug, Error)]
pub enum ProviderUnavailable {
    #[error("{provider} is not configured")]
    Unconfigured { provider: &'static str },
    #[error("{provider} request failed: {source}")]
    Network {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{provider} returned error: {status}")]
    Status {
        provider: &'static str,
        status: reqwest::StatusCode,
    },
    #[error("failed to parse {provider} response: {source}")]
    Decode {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },
}

impl ProviderUnavailable {
    pub fn provider(&self) -> &'static str {
        match self {
            ProviderUnavailable::Unconfigured { provider }
            | ProviderUnavailable::Network { provider, .. }
            | ProviderUnavailable::Status { provider, .. }
            | ProviderUnavailable::Decode { provider, .. } => *provider,
        }
    }

    pub fn is_unconfigured(&self) -> bool {
        matches!(self, ProviderUnavailable::Unconfigured { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            InvalidOddsError::Zero.to_string(),
            "american odds of 0 are not a valid price"
        );
        let err = ProviderUnavailable::Status {
            provider: "The Odds API",
            status: reqwest::StatusCode::UNAUTHORIZED,
        };
        assert!(err.to_string().contains("401"));
        assert_eq!(err.provider(), "The Odds API");
        assert!(!err.is_unconfigured());
    }
}
