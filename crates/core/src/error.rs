use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("empty command line")]
    EmptyCommand,

    #[error("unparseable command line: {0}")]
    CommandParse(#[from] shell_words::ParseError),
}
