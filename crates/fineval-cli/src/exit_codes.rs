//! Process exit codes. Scripts depend on these values.

use fineval_core::errors::{ConfigError, EvalError};

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_METRIC_FAILURES: i32 = 1; // evaluation finished with isolated metric failures
pub const EXIT_CONFIG_ERROR: i32 = 2; // bad config, arguments or input tables
pub const EXIT_INFRA_ERROR: i32 = 3; // provider, network or filesystem failure

pub fn for_error(err: &anyhow::Error) -> i32 {
    if let Some(e) = err.downcast_ref::<EvalError>() {
        return if e.is_infra() {
            EXIT_INFRA_ERROR
        } else {
            EXIT_CONFIG_ERROR
        };
    }
    if err.downcast_ref::<ConfigError>().is_some() {
        return EXIT_CONFIG_ERROR;
    }
    EXIT_INFRA_ERROR
}

#[cfg(test)]
mod tests {
    use super::*;
    use fineval_core::errors::ProviderFailure;
    use fineval_core::MetricKind;

    #[test]
    fn maps_error_kinds() {
        let precondition = anyhow::Error::new(EvalError::mismatched_lengths(1, 2, 3));
        assert_eq!(for_error(&precondition), EXIT_CONFIG_ERROR);

        let provider = anyhow::Error::new(EvalError::ExternalService {
            metric: MetricKind::Cosine,
            cause: ProviderFailure::Timeout,
            message: "timed out".into(),
        });
        assert_eq!(for_error(&provider), EXIT_INFRA_ERROR);

        let config = anyhow::Error::new(ConfigError("bad".into()));
        assert_eq!(for_error(&config), EXIT_CONFIG_ERROR);
    }
}
