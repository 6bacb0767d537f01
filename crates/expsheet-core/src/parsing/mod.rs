pub mod block;
pub mod table;

use crate::error::ExpsheetError;
use crate::model::RecordSet;
use block::find_table_block;
use table::parse_table;

/// Parse a model response into a `RecordSet`.
///
/// Locates the first Markdown table in the response and parses it; prose
/// before and after the table is ignored.
pub fn parse_response(response: &str) -> Result<RecordSet, ExpsheetError> {
    let block = find_table_block(response)?;
    parse_table(block.text)
}
