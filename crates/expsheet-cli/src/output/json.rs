use expsheet_core::error::ExpsheetError;
use expsheet_core::model::RecordSet;

pub fn print(records: &RecordSet) -> Result<(), ExpsheetError> {
    let json = serde_json::to_string_pretty(records)?;
    println!("{json}");
    Ok(())
}
