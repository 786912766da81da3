use crate::error::{AppError, AppResult};

/// Byte-order mark so spreadsheet tools pick up UTF-8.
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Render rows as semicolon-delimited CSV, UTF-8 with BOM, header first.
pub fn render(header: &[&str], rows: &[Vec<String>]) -> AppResult<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b';')
        .from_writer(Vec::new());

    writer
        .write_record(header)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("CSV write failed: {}", e)))?;
    for row in rows {
        writer
            .write_record(row)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("CSV write failed: {}", e)))?;
    }

    let data = writer
        .into_inner()
        .map_err(|e| AppError::Internal(anyhow::anyhow!("CSV flush failed: {}", e)))?;

    let mut out = Vec::with_capacity(UTF8_BOM.len() + data.len());
    out.extend_from_slice(UTF8_BOM);
    out.extend_from_slice(&data);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_starts_with_bom() {
        let bytes = render(&["a", "b"], &[]).unwrap();
        assert!(bytes.starts_with(b"\xEF\xBB\xBF"));
    }

    #[test]
    fn test_semicolon_delimited_rows() {
        let rows = vec![vec!["2025-01-01".to_string(), "Feliz".to_string()]];
        let bytes = render(&["Data", "Humor"], &rows).unwrap();
        let text = String::from_utf8(bytes[3..].to_vec()).unwrap();
        assert_eq!(text, "Data;Humor\n2025-01-01;Feliz\n");
    }

    #[test]
    fn test_fields_with_delimiter_are_quoted() {
        let rows = vec![vec!["a;b".to_string(), "line\nbreak".to_string()]];
        let bytes = render(&["x", "y"], &rows).unwrap();
        let text = String::from_utf8(bytes[3..].to_vec()).unwrap();
        assert!(text.contains("\"a;b\""));
        assert!(text.contains("\"line\nbreak\""));
    }
}
