use ccl_parser::ParserError;

/// The only error surface the engine exposes to callers.
///
/// Parsing happens once, up front, before any statement runs; a malformed
/// program (including a lexer failure such as an unterminated string) is
/// not tied to any particular row or statement yet, so it is reported here
/// rather than as a logged warning. Everything that happens once execution
/// is under way — unknown columns, bad indices, coercion failures, unknown
/// functions — degrades to a warning and a skipped statement instead (see
/// `Table::warnings()` / `Column::warnings()`).
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum EngineError {
    /// The program text could not be tokenized or parsed.
    #[error("could not parse CCL program: {0}")]
    Parse(#[from] ParserError),
}
