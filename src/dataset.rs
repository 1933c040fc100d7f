use std::path::Path;

use anyhow::{bail, Context};
use harvest_advisor::PriceRecord;

/// Reads `commodity,year,month,price` rows and rejects rows the engine
/// cannot use.
pub fn load_records(csv_path: &Path) -> anyhow::Result<Vec<PriceRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(csv_path)
        .with_context(|| format!("failed to open {}", csv_path.display()))?;
    let mut records = Vec::new();

    for (index, result) in reader.deserialize::<PriceRecord>().enumerate() {
        // Header is line 1.
        let line = index + 2;
        let record = result.with_context(|| format!("malformed row at line {line}"))?;
        validate(&record).with_context(|| format!("invalid row at line {line}"))?;
        records.push(record);
    }

    Ok(records)
}

fn validate(record: &PriceRecord) -> anyhow::Result<()> {
    if record.commodity.trim().is_empty() {
        bail!("commodity is blank");
    }
    if !(1..=12).contains(&record.month) {
        bail!("month {} is outside 1..=12", record.month);
    }
    if !(record.price.is_finite() && record.price > 0.0) {
        bail!("price {} is not a positive number", record.price);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn csv_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_well_formed_rows() {
        let file = csv_file(
            "commodity,year,month,price\n\
             Tomato,2023,1,1000\n\
             Onion, 2023, 2, 1450.5\n",
        );
        let records = load_records(file.path()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1], PriceRecord::new("Onion", 2023, 2, 1450.5));
    }

    #[test]
    fn rejects_out_of_range_month() {
        let file = csv_file("commodity,year,month,price\nTomato,2023,13,1000\n");
        let error = load_records(file.path()).unwrap_err();
        assert!(format!("{error:#}").contains("line 2"));
    }

    #[test]
    fn rejects_non_positive_price() {
        let file = csv_file("commodity,year,month,price\nTomato,2023,3,0\n");
        assert!(load_records(file.path()).is_err());
    }

    #[test]
    fn rejects_missing_column() {
        let file = csv_file("commodity,year,price\nTomato,2023,1000\n");
        assert!(load_records(file.path()).is_err());
    }
}
