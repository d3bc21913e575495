use thiserror::Error;

#[derive(Error, Debug)]
pub enum TopicbotError {
    #[error("Bot error: {0}")]
    Bot(String),

    #[error("Handler error: {0}")]
    Handler(#[from] HandlerError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum HandlerError {
    #[error("Manifest is not valid UTF-8")]
    ManifestEncoding,
}

pub type Result<T> = std::result::Result<T, TopicbotError>;
