#[derive(Debug, thiserror::Error)]
pub enum FitsError {
    #[error("Invalid FITS format: {0}")]
    InvalidFormat(String),

    #[error("Keyword {keyword} not found")]
    KeywordNotFound { keyword: String },

    #[error("Header parsing error: {0}")]
    HeaderParse(String),

    #[error("Invalid keyword value: {keyword} = {value}")]
    InvalidKeywordValue { keyword: String, value: String },

    #[error("Column {name} not found")]
    ColumnNotFound { name: String },

    #[error("Column {name} has unsupported format '{format}'")]
    UnsupportedColumn { name: String, format: String },

    #[error("HDU not found: {0}")]
    HduNotFound(usize),

    #[error("No binary table extension in file")]
    NoBinaryTable,

    #[error("EOF reached unexpectedly")]
    UnexpectedEof,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FitsError>;
