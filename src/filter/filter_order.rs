use serde_json::Value;

use super::error::FilterError;
use super::types::{FieldPath, FilterOrderInfo, SortDirection, SqlParam};

pub struct FilterOrder;

impl FilterOrder {
    /// Accepts `{ "totalSell": -1 }`, `{ "totalSell": "desc" }`, `"totalSell desc"`
    /// or an array of such strings. Object keys are visited in sorted order, so
    /// use the array form when more than one sort key matters.
    pub fn validate_and_parse(order: &Value) -> Result<Vec<FilterOrderInfo>, FilterError> {
        match order {
            Value::Null => Ok(vec![]),
            Value::String(s) => Self::parse_order_string(s),
            Value::Array(arr) => {
                let mut out = Vec::new();
                for v in arr {
                    match v {
                        Value::String(s) => out.extend(Self::parse_order_string(s)?),
                        other => {
                            return Err(FilterError::InvalidOperatorData(format!(
                                "sort entries must be strings, got {}",
                                other
                            )))
                        }
                    }
                }
                Ok(out)
            }
            Value::Object(obj) => {
                let mut out = Vec::new();
                for (k, v) in obj {
                    out.push(FilterOrderInfo {
                        field: FieldPath::parse(k)?,
                        sort: Self::parse_direction(v)?,
                    });
                }
                Ok(out)
            }
            other => Err(FilterError::InvalidOperatorData(format!("unsupported sort spec: {}", other))),
        }
    }

    fn parse_direction(v: &Value) -> Result<SortDirection, FilterError> {
        if let Some(n) = v.as_i64() {
            return match n {
                1 => Ok(SortDirection::Asc),
                -1 => Ok(SortDirection::Desc),
                _ => Err(FilterError::InvalidOperatorData(format!("sort direction must be 1 or -1, got {}", n))),
            };
        }
        match v.as_str().map(str::to_ascii_lowercase).as_deref() {
            Some("asc") | Some("ascending") => Ok(SortDirection::Asc),
            Some("desc") | Some("descending") => Ok(SortDirection::Desc),
            _ => Err(FilterError::InvalidOperatorData(format!("invalid sort direction: {}", v))),
        }
    }

    fn parse_order_string(s: &str) -> Result<Vec<FilterOrderInfo>, FilterError> {
        // split on commas, then each token into field and direction
        let mut out = Vec::new();
        for part in s.split(',') {
            let trimmed = part.trim();
            if trimmed.is_empty() {
                continue;
            }
            let mut it = trimmed.split_whitespace();
            if let Some(field) = it.next() {
                let dir = it.next().unwrap_or("asc");
                let sort = if dir.eq_ignore_ascii_case("desc") { SortDirection::Desc } else { SortDirection::Asc };
                out.push(FilterOrderInfo { field: FieldPath::parse(field)?, sort });
            }
        }
        Ok(out)
    }

    /// Always ends with insertion order so paging is stable.
    pub fn generate(infos: &[FilterOrderInfo], params: &mut Vec<SqlParam>) -> String {
        let mut parts: Vec<String> = Vec::with_capacity(infos.len() + 2);
        for info in infos {
            let expr = match &info.field {
                FieldPath::Id => "\"id\"".to_string(),
                FieldPath::Data(path) => {
                    params.push(SqlParam::Path(path.clone()));
                    format!("\"data\" #> ${}", params.len())
                }
            };
            parts.push(format!("{} {}", expr, info.sort.to_sql()));
        }
        parts.push("\"created_at\" ASC".to_string());
        parts.push("\"id\" ASC".to_string());
        format!("ORDER BY {}", parts.join(", "))
    }
}
