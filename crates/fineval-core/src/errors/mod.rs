use crate::model::MetricKind;
use thiserror::Error;

/// Coarse cause of a provider failure, inferred from the provider's message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderFailure {
    RateLimit,
    Timeout,
    Server,
    Network,
    Auth,
    MalformedResponse,
    Other,
}

impl ProviderFailure {
    pub fn classify_message(message: &str) -> Self {
        let msg = message.to_lowercase();
        if msg.contains("rate limit") || msg.contains("429") {
            ProviderFailure::RateLimit
        } else if msg.contains("timeout") || msg.contains("timed out") {
            ProviderFailure::Timeout
        } else if msg.contains("401")
            || msg.contains("403")
            || msg.contains("api key")
            || msg.contains("unauthorized")
        {
            ProviderFailure::Auth
        } else if msg.contains("500")
            || msg.contains("502")
            || msg.contains("503")
            || msg.contains("504")
            || msg.contains("provider error")
        {
            ProviderFailure::Server
        } else if msg.contains("network") || msg.contains("connection") || msg.contains("dns") {
            ProviderFailure::Network
        } else if msg.contains("missing")
            || msg.contains("malformed")
            || msg.contains("invalid json")
            || msg.contains("could not parse")
        {
            ProviderFailure::MalformedResponse
        } else {
            ProviderFailure::Other
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderFailure::RateLimit => "rate_limit",
            ProviderFailure::Timeout => "timeout",
            ProviderFailure::Server => "server",
            ProviderFailure::Network => "network",
            ProviderFailure::Auth => "auth",
            ProviderFailure::MalformedResponse => "malformed_response",
            ProviderFailure::Other => "other",
        }
    }
}

#[derive(Debug, Error)]
#[error("config error: {0}")]
pub struct ConfigError(pub String);

#[derive(Debug, Error)]
pub enum EvalError {
    #[error("precondition failed: {0}")]
    Precondition(String),

    #[error("{metric} scorer failed ({}): {message}", .cause.as_str())]
    ExternalService {
        metric: MetricKind,
        cause: ProviderFailure,
        message: String,
    },

    /// A benchmark item's backing document. The batch path turns this into a sentinel answer.
    #[error("document not found: {0}")]
    MissingResource(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid argument: {0}")]
    InvalidArgs(String),

    #[error("answering {id} failed: {message}")]
    AnswerFailed { id: String, message: String },

    #[error("table error: {0}")]
    Table(String),

    #[error("csv error")]
    Csv(#[from] csv::Error),

    #[error("io error")]
    Io(#[from] std::io::Error),
}

impl EvalError {
    pub fn external(metric: MetricKind, err: &anyhow::Error) -> Self {
        let message = format!("{:#}", err);
        EvalError::ExternalService {
            metric,
            cause: ProviderFailure::classify_message(&message),
            message,
        }
    }

    pub fn mismatched_lengths(questions: usize, answers: usize, ground_truths: usize) -> Self {
        EvalError::Precondition(format!(
            "questions, answers and ground_truths must be the same length \
             (got {}, {}, {})",
            questions, answers, ground_truths
        ))
    }

    /// True for failures of the outside world (providers, filesystem) rather than of the caller.
    pub fn is_infra(&self) -> bool {
        match self {
            EvalError::ExternalService { .. } | EvalError::AnswerFailed { .. } | EvalError::Io(_) => {
                true
            }
            // Malformed records are bad input; only failed reads and writes are infra.
            EvalError::Csv(e) => e.is_io_error(),
            _ => false,
        }
    }
}

pub type Result<T, E = EvalError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_message_maps_provider_errors() {
        assert_eq!(
            ProviderFailure::classify_message("OpenAI chat API error (status 429): slow down"),
            ProviderFailure::RateLimit
        );
        assert_eq!(
            ProviderFailure::classify_message("request timeout while calling provider"),
            ProviderFailure::Timeout
        );
        assert_eq!(
            ProviderFailure::classify_message("provider error: 503"),
            ProviderFailure::Server
        );
        assert_eq!(
            ProviderFailure::classify_message("Incorrect API key provided"),
            ProviderFailure::Auth
        );
        assert_eq!(
            ProviderFailure::classify_message("network dns resolution failed"),
            ProviderFailure::Network
        );
        assert_eq!(
            ProviderFailure::classify_message("OpenAI API response missing content"),
            ProviderFailure::MalformedResponse
        );
        assert_eq!(
            ProviderFailure::classify_message("something odd"),
            ProviderFailure::Other
        );
    }

    #[test]
    fn external_error_keeps_metric_and_message() {
        let err = EvalError::external(MetricKind::Cosine, &anyhow::anyhow!("connection reset"));
        match &err {
            EvalError::ExternalService {
                metric,
                cause,
                message,
            } => {
                assert_eq!(*metric, MetricKind::Cosine);
                assert_eq!(*cause, ProviderFailure::Network);
                assert_eq!(message, "connection reset");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.is_infra());
        assert_eq!(
            err.to_string(),
            "cosine scorer failed (network): connection reset"
        );
    }

    #[test]
    fn mismatched_lengths_reports_all_counts() {
        let err = EvalError::mismatched_lengths(3, 2, 3);
        assert!(err.to_string().contains("(got 3, 2, 3)"));
        assert!(!err.is_infra());
    }

    #[test]
    fn malformed_csv_is_not_infra() {
        let ragged = "question,answer,ground_truth\nq,a\n";
        let mut rdr = csv::Reader::from_reader(ragged.as_bytes());
        let err = rdr
            .records()
            .find_map(Result::err)
            .map(EvalError::from)
            .unwrap();
        assert!(!err.is_infra());
        assert_eq!(err.to_string(), "csv error");

        let io = EvalError::from(csv::Error::from(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "gone",
        )));
        assert!(io.is_infra());
    }
}
