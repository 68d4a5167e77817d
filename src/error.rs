use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Question not found: {id}")]
    QuestionNotFound { id: i64 },

    #[error("Question data unavailable: {0}")]
    DataUnavailable(String),

    #[error("Code execution timed out")]
    ExecutionTimeout,

    #[error("{0}")]
    ExecutionFailure(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Missing API key: set OPENAI_API_KEY or llm.api_key to use AI feedback")]
    MissingApiKey,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Address parse error: {0}")]
    AddrParse(#[from] std::net::AddrParseError),

    #[error("{0}")]
    OpenAi(#[from] async_openai::error::OpenAIError),
}

impl Error {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn llm(msg: impl Into<String>) -> Self {
        Self::Llm(msg.into())
    }

    pub fn upstream(msg: impl Into<String>) -> Self {
        Self::Upstream(msg.into())
    }

    pub fn data_unavailable(msg: impl Into<String>) -> Self {
        Self::DataUnavailable(msg.into())
    }

    pub fn execution_failure(msg: impl Into<String>) -> Self {
        Self::ExecutionFailure(msg.into())
    }

    /// Short stable label used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::QuestionNotFound { .. } => "not_found",
            Self::DataUnavailable(_) => "data_unavailable",
            Self::ExecutionTimeout => "execution_timeout",
            Self::ExecutionFailure(_) => "execution_failure",
            Self::Llm(_) | Self::Upstream(_) | Self::OpenAi(_) | Self::Network(_) => "upstream",
            Self::MissingApiKey => "unauthorized",
            Self::Serialization(_) => "serialization",
            Self::Yaml(_) => "yaml",
            Self::Io(_) => "io",
            Self::AddrParse(_) => "addr_parse",
        }
    }
}
