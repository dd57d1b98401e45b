//! Parsers turning CSV readers into typed tables.

use std::io::Read;

use credit_core::{
    AggregateStats, Aspect, AspectAssessment, AspectStatus, CompanyInfo, CreditError, FirmRecord, YearRow,
    YearTable,
};

use crate::LoadResult;

/// Cell spellings treated as a missing value.
pub const MISSING_TOKENS: [&str; 5] = ["", "NaN", "nan", "NA", "null"];

/// Columns the credit score table must carry.
pub const REQUIRED_CREDIT_COLUMNS: [&str; 33] = [
    "firm_id",
    "liquidity_score", "liquidity_reason", "liquidity_status",
    "solvency_score", "solvency_reason", "solvency_status",
    "profitability_score", "profitability_reason", "profitability_status",
    "activity_score", "activity_reason", "activity_status",
    "coverage_score", "coverage_reason", "coverage_status",
    "cashflow_score", "cashflow_reason", "cashflow_status",
    "structure_score", "structure_reason", "structure_status",
    "final_score", "kategori", "rekomendasi", "reasoning",
    "liquidity_analysis", "solvency_analysis", "profitability_analysis",
    "activity_analysis", "coverage_analysis", "cashflow_analysis",
    "structure_analysis",
];

/// Optional credit column; absent or blank reads as no recommendation.
pub const GENAI_COLUMN: &str = "genai_recommendation";

const KEY_COLUMNS: [&str; 2] = ["firm_id", "year"];

pub fn is_missing(cell: &str) -> bool {
    MISSING_TOKENS.contains(&cell.trim())
}

/// `Ok(None)` for a missing cell, `Err(())` when the cell is not a number.
fn parse_number(cell: &str) -> Result<Option<f64>, ()> {
    if is_missing(cell) {
        return Ok(None);
    }
    cell.trim().parse::<f64>().map(Some).map_err(|_| ())
}

/// Header plus trimmed rows, read with the same reader settings for every table.
struct RawTable {
    name: String,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl RawTable {
    fn read<R: Read>(name: &str, reader: R) -> LoadResult<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            rows.push(record.iter().map(|c| c.trim().to_string()).collect());
        }

        Ok(Self {
            name: name.to_string(),
            headers,
            rows,
        })
    }

    fn index(&self, column: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == column)
    }

    fn require(&self, columns: &[&str]) -> LoadResult<()> {
        let missing: Vec<String> = columns
            .iter()
            .filter(|c| self.index(c).is_none())
            .map(|c| c.to_string())
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(CreditError::MissingColumns {
                table: self.name.clone(),
                columns: missing,
            }
            .into())
        }
    }

    fn first_row(&self) -> LoadResult<&[String]> {
        self.rows
            .first()
            .map(|r| r.as_slice())
            .ok_or_else(|| CreditError::InvalidData(format!("{} has no rows", self.name)).into())
    }

    /// Cell of `row` under `column`; short rows read as missing.
    fn cell<'a>(&self, row: &'a [String], column: &str) -> &'a str {
        self.index(column)
            .and_then(|i| row.get(i))
            .map(|s| s.as_str())
            .unwrap_or("")
    }

    fn text(&self, row: &[String], column: &str) -> String {
        let cell = self.cell(row, column);
        if is_missing(cell) {
            String::new()
        } else {
            cell.to_string()
        }
    }

    fn number(&self, row: &[String], column: &str) -> LoadResult<f64> {
        match parse_number(self.cell(row, column)) {
            Ok(Some(v)) => Ok(v),
            Ok(None) => Err(CreditError::InvalidData(format!("{} has no value for {}", self.name, column)).into()),
            Err(()) => Err(CreditError::InvalidData(format!(
                "{}.{} is not a number: '{}'",
                self.name,
                column,
                self.cell(row, column)
            ))
            .into()),
        }
    }

    /// Whether every present cell of the column parses as a number.
    fn is_numeric(&self, index: usize) -> bool {
        self.rows
            .iter()
            .filter_map(|r| r.get(index))
            .all(|c| parse_number(c).is_ok())
    }
}

fn parse_year(table: &str, cell: &str) -> LoadResult<i32> {
    let value: f64 = cell
        .trim()
        .parse()
        .map_err(|_| CreditError::InvalidData(format!("{} has an invalid year: '{}'", table, cell)))?;
    if value.fract() != 0.0 || value < i32::MIN as f64 || value > i32::MAX as f64 {
        return Err(CreditError::InvalidData(format!("{} has an invalid year: '{}'", table, cell)).into());
    }
    Ok(value as i32)
}

/// Credit score table: the first row becomes the firm record.
pub fn parse_credit_score<R: Read>(reader: R) -> LoadResult<FirmRecord> {
    let raw = RawTable::read("credit_score", reader)?;
    raw.require(&REQUIRED_CREDIT_COLUMNS)?;
    let row = raw.first_row()?;

    let mut aspects = Vec::with_capacity(Aspect::ALL.len());
    for aspect in Aspect::ALL {
        let key = aspect.key();
        aspects.push(AspectAssessment {
            aspect,
            score: raw.number(row, &format!("{}_score", key))?,
            status: AspectStatus::parse(&raw.text(row, &format!("{}_status", key))),
            reason: raw.text(row, &format!("{}_reason", key)),
            analysis: raw.text(row, &format!("{}_analysis", key)),
        });
    }

    let genai = raw.text(row, GENAI_COLUMN);
    let record = FirmRecord::new(
        raw.text(row, "firm_id"),
        aspects,
        raw.number(row, "final_score")?,
        raw.text(row, "kategori"),
        raw.text(row, "rekomendasi"),
        raw.text(row, "reasoning"),
        Some(genai),
    )?;
    Ok(record)
}

/// Year-keyed table (ratios or a statement). Columns holding any
/// non-numeric cell are dropped.
pub fn parse_year_table<R: Read>(name: &str, reader: R) -> LoadResult<YearTable> {
    let raw = RawTable::read(name, reader)?;
    raw.require(&["year"])?;

    let columns: Vec<(usize, String)> = raw
        .headers
        .iter()
        .enumerate()
        .filter(|(_, h)| !KEY_COLUMNS.contains(&h.as_str()))
        .filter(|(i, h)| {
            let numeric = raw.is_numeric(*i);
            if !numeric {
                tracing::debug!("{}: skipping non-numeric column {}", name, h);
            }
            numeric
        })
        .map(|(i, h)| (i, h.clone()))
        .collect();

    let mut rows = Vec::with_capacity(raw.rows.len());
    for record in &raw.rows {
        let mut row = YearRow::new(parse_year(name, raw.cell(record, "year"))?);
        let firm_id = raw.text(record, "firm_id");
        if !firm_id.is_empty() {
            row.firm_id = Some(firm_id);
        }
        for (index, column) in &columns {
            let value = record
                .get(*index)
                .and_then(|c| parse_number(c).ok())
                .flatten();
            row = row.with(column, value);
        }
        rows.push(row);
    }

    let names = columns.into_iter().map(|(_, h)| h).collect();
    Ok(YearTable::new(name, names, rows)?)
}

/// Aggregate table: first row, numeric columns only.
pub fn parse_aggregates<R: Read>(reader: R) -> LoadResult<AggregateStats> {
    let raw = RawTable::read("agg", reader)?;
    let row = raw.first_row()?;

    let firm_id = Some(raw.text(row, "firm_id")).filter(|s| !s.is_empty());
    let cells = raw
        .headers
        .iter()
        .filter(|h| h.as_str() != "firm_id")
        .filter_map(|h| match parse_number(raw.cell(row, h)) {
            Ok(value) => Some((h.clone(), value)),
            Err(()) => {
                tracing::debug!("agg: skipping non-numeric column {}", h);
                None
            }
        })
        .collect();

    Ok(AggregateStats::new(firm_id, cells))
}

/// Company information: first row, every column kept as text.
pub fn parse_company_info<R: Read>(reader: R) -> LoadResult<CompanyInfo> {
    let raw = RawTable::read("company_info", reader)?;
    let row = raw.first_row()?;

    let firm_id = Some(raw.text(row, "firm_id")).filter(|s| !s.is_empty());
    let fields = raw
        .headers
        .iter()
        .map(|h| (h.clone(), raw.text(row, h)))
        .collect();

    Ok(CompanyInfo { firm_id, fields })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LoadError;

    fn credit_csv(liquidity_score: &str, genai: Option<&str>) -> String {
        let mut columns: Vec<&str> = REQUIRED_CREDIT_COLUMNS.to_vec();
        if genai.is_some() {
            columns.push(GENAI_COLUMN);
        }
        let header = columns.join(",");
        let values: Vec<String> = columns
            .iter()
            .map(|c| match *c {
                "firm_id" => "F-001".to_string(),
                "liquidity_score" => liquidity_score.to_string(),
                "final_score" => "72.5".to_string(),
                "kategori" => "Layak".to_string(),
                "rekomendasi" => "Approve".to_string(),
                GENAI_COLUMN => genai.unwrap_or_default().to_string(),
                c if c.ends_with("_score") => "70".to_string(),
                c if c.ends_with("_status") => "Good".to_string(),
                c => format!("\"{} text\"", c),
            })
            .collect();
        format!("{}\n{}\n", header, values.join(","))
    }

    #[test]
    fn test_credit_score_row() {
        let record = parse_credit_score(credit_csv("80", Some("Extend the facility")).as_bytes()).unwrap();
        assert_eq!(record.firm_id, "F-001");
        assert_eq!(record.aspect(Aspect::Liquidity).score, 80.0);
        assert_eq!(record.aspect(Aspect::Solvency).status, AspectStatus::Good);
        assert_eq!(record.aspect(Aspect::Coverage).reason, "coverage_reason text");
        assert_eq!(record.category, "Layak");
        assert_eq!(record.genai_recommendation.as_deref(), Some("Extend the facility"));
    }

    #[test]
    fn test_blank_genai_is_absent() {
        let record = parse_credit_score(credit_csv("80", Some("nan")).as_bytes()).unwrap();
        assert!(record.genai_recommendation.is_none());
    }

    #[test]
    fn test_genai_column_is_optional() {
        let record = parse_credit_score(credit_csv("80", None).as_bytes()).unwrap();
        assert_eq!(record.firm_id, "F-001");
        assert_eq!(record.final_score, 72.5);
        assert!(record.genai_recommendation.is_none());
    }

    #[test]
    fn test_missing_credit_columns_are_named() {
        let err = parse_credit_score("firm_id,final_score\nF-001,70\n".as_bytes()).unwrap_err();
        match err {
            LoadError::Data(CreditError::MissingColumns { table, columns }) => {
                assert_eq!(table, "credit_score");
                assert_eq!(columns.len(), 31);
                assert!(columns.contains(&"reasoning".to_string()));
                assert!(!columns.contains(&GENAI_COLUMN.to_string()));
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_out_of_range_score_rejected() {
        let err = parse_credit_score(credit_csv("120", None).as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::Data(CreditError::InvalidData(_))));
        let err = parse_credit_score(credit_csv("high", None).as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::Data(CreditError::InvalidData(_))));
    }

    #[test]
    fn test_year_table_drops_text_columns() {
        let csv = "firm_id,year,current_ratio,roa,note\n\
                   F-001,2022,2.3,NaN,ok\n\
                   F-001,2021,1.8,0.08,\n";
        let table = parse_year_table("ratios", csv.as_bytes()).unwrap();
        assert_eq!(table.columns(), &["current_ratio".to_string(), "roa".to_string()]);
        assert_eq!(table.years(), vec![2021, 2022]);
        assert_eq!(table.value("roa", 2022).unwrap(), None);
        assert_eq!(table.value("roa", 2021).unwrap(), Some(0.08));
        assert_eq!(table.firm_id(), Some("F-001"));
    }

    #[test]
    fn test_year_table_accepts_float_years_and_rejects_duplicates() {
        let table = parse_year_table("balance_sheet", "year,cash\n2021.0,10\n".as_bytes()).unwrap();
        assert_eq!(table.latest_year(), Some(2021));

        let err = parse_year_table("balance_sheet", "year,cash\n2021,10\n2021,12\n".as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::Data(CreditError::DuplicateYear { year: 2021, .. })));

        let err = parse_year_table("balance_sheet", "cash\n10\n".as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::Data(CreditError::MissingColumns { .. })));
    }

    #[test]
    fn test_aggregates() {
        let csv = "firm_id,roa_mean,roa_std,roa_trend,source\nF-001,0.12,null,0.01,model-v2\n";
        let agg = parse_aggregates(csv.as_bytes()).unwrap();
        assert_eq!(agg.firm_id.as_deref(), Some("F-001"));
        assert_eq!(agg.metrics(), vec!["roa".to_string()]);
        assert_eq!(agg.columns().len(), 3);
    }

    #[test]
    fn test_company_info() {
        let info = parse_company_info("firm_id,company_name,sector\nF-001,Acme Ltd,NA\n".as_bytes()).unwrap();
        assert_eq!(info.firm_id.as_deref(), Some("F-001"));
        assert_eq!(info.get("company_name"), Some("Acme Ltd"));
        assert_eq!(info.get("sector"), Some(""));
        assert!(parse_company_info("firm_id\n".as_bytes()).is_err());
    }
}
