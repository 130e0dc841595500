use serde_json::{Map, Value};
use uuid::Uuid;

use super::error::FilterError;
use super::types::{FieldPath, FilterOp, FilterWhereInfo, SqlParam};

/// Compiles a query document into a SQL predicate over the `id`/`data`
/// columns. Bind values are appended to the shared parameter list so the
/// predicate can be combined with ORDER BY / LIMIT parameters.
pub struct FilterWhere<'p> {
    params: &'p mut Vec<SqlParam>,
}

impl<'p> FilterWhere<'p> {
    pub fn new(params: &'p mut Vec<SqlParam>) -> Self {
        Self { params }
    }

    pub fn generate(where_data: &Value, params: &'p mut Vec<SqlParam>) -> Result<String, FilterError> {
        Self::new(params).build(where_data)
    }

    pub fn validate(where_data: &Value) -> Result<(), FilterError> {
        match where_data {
            Value::Null | Value::Object(_) => Ok(()),
            _ => Err(FilterError::InvalidWhereClause("WHERE must be an object".to_string())),
        }
    }

    fn build(&mut self, where_data: &Value) -> Result<String, FilterError> {
        let obj = match where_data {
            Value::Null => return Ok("TRUE".to_string()),
            Value::Object(obj) => obj,
            _ => return Err(FilterError::InvalidWhereClause("Unsupported WHERE format".to_string())),
        };

        let mut sql_conditions = vec![];
        for (key, value) in obj {
            if key.starts_with('$') {
                sql_conditions.push(self.build_logical_operator(key, value)?);
            } else {
                for condition in Self::parse_field_condition(key, value)? {
                    sql_conditions.push(self.build_sql_condition(&condition)?);
                }
            }
        }

        if sql_conditions.is_empty() {
            Ok("TRUE".to_string())
        } else {
            Ok(sql_conditions.join(" AND "))
        }
    }

    fn build_logical_operator(&mut self, op: &str, value: &Value) -> Result<String, FilterError> {
        let joiner = match op {
            "$and" => " AND ",
            "$or" => " OR ",
            _ => return Err(FilterError::UnsupportedOperator(op.to_string())),
        };
        let arr = value
            .as_array()
            .filter(|a| !a.is_empty())
            .ok_or_else(|| FilterError::InvalidOperatorData(format!("{} requires a non-empty array", op)))?;

        let mut sql_parts = Vec::with_capacity(arr.len());
        for v in arr {
            sql_parts.push(format!("({})", self.build(v)?));
        }
        Ok(format!("({})", sql_parts.join(joiner)))
    }

    fn parse_field_condition(field: &str, value: &Value) -> Result<Vec<FilterWhereInfo>, FilterError> {
        let path = FieldPath::parse(field)?;

        let ops = match value {
            Value::Object(obj) if obj.keys().any(|k| k.starts_with('$')) => obj,
            // Implicit equality: { field: value }
            _ => {
                return Ok(vec![FilterWhereInfo {
                    field: path,
                    operator: FilterOp::Eq,
                    data: value.clone(),
                    case_insensitive: false,
                }])
            }
        };

        let case_insensitive = Self::parse_regex_options(ops)?;
        let mut conditions = vec![];
        for (op_key, op_val) in ops {
            if op_key == "$options" {
                continue;
            }
            conditions.push(FilterWhereInfo {
                field: path.clone(),
                operator: FilterOp::parse(op_key)?,
                data: op_val.clone(),
                case_insensitive,
            });
        }
        Ok(conditions)
    }

    fn parse_regex_options(ops: &Map<String, Value>) -> Result<bool, FilterError> {
        let Some(options) = ops.get("$options") else {
            return Ok(false);
        };
        if !ops.contains_key("$regex") {
            return Err(FilterError::InvalidOperatorData("$options requires $regex".to_string()));
        }
        let flags = options
            .as_str()
            .ok_or_else(|| FilterError::InvalidOperatorData("$options must be a string".to_string()))?;

        let mut case_insensitive = false;
        for flag in flags.chars() {
            match flag {
                'i' => case_insensitive = true,
                other => {
                    return Err(FilterError::InvalidOperatorData(format!(
                        "unsupported $options flag '{}'",
                        other
                    )))
                }
            }
        }
        Ok(case_insensitive)
    }

    fn build_sql_condition(&mut self, condition: &FilterWhereInfo) -> Result<String, FilterError> {
        match &condition.field {
            FieldPath::Id => self.build_id_condition(condition),
            FieldPath::Data(path) => {
                let path = self.param(SqlParam::Path(path.clone()));
                self.build_data_condition(condition, &path)
            }
        }
    }

    fn build_id_condition(&mut self, condition: &FilterWhereInfo) -> Result<String, FilterError> {
        let sql_op = match condition.operator {
            FilterOp::Eq => "=",
            FilterOp::Ne => "<>",
            other => return Err(FilterError::UnsupportedOperator(format!("{:?} on _id", other))),
        };
        if condition.data.is_null() {
            // ids are never null
            return Ok(if condition.operator == FilterOp::Eq { "FALSE" } else { "TRUE" }.to_string());
        }
        let raw = condition
            .data
            .as_str()
            .ok_or_else(|| FilterError::InvalidId(condition.data.to_string()))?;
        let id = Uuid::parse_str(raw).map_err(|_| FilterError::InvalidId(raw.to_string()))?;
        Ok(format!("\"id\" {} {}", sql_op, self.param(SqlParam::Uuid(id))))
    }

    fn build_data_condition(&mut self, condition: &FilterWhereInfo, path: &str) -> Result<String, FilterError> {
        let column = format!("\"data\" #> {}", path);
        let data = &condition.data;

        Ok(match condition.operator {
            FilterOp::Eq if data.is_null() => {
                format!("({col} IS NULL OR {col} = 'null'::jsonb)", col = column)
            }
            FilterOp::Eq => format!("{} = {}", column, self.param(SqlParam::Json(data.clone()))),
            FilterOp::Ne if data.is_null() => {
                format!("({col} IS NOT NULL AND {col} <> 'null'::jsonb)", col = column)
            }
            FilterOp::Ne => format!("{} IS DISTINCT FROM {}", column, self.param(SqlParam::Json(data.clone()))),
            FilterOp::Gt | FilterOp::Gte | FilterOp::Lt | FilterOp::Lte => {
                let sql_op = match condition.operator {
                    FilterOp::Gt => ">",
                    FilterOp::Gte => ">=",
                    FilterOp::Lt => "<",
                    _ => "<=",
                };
                let value = self.param(SqlParam::Json(data.clone()));
                // Comparisons only match values of the same JSON type
                format!(
                    "(jsonb_typeof({col}) = jsonb_typeof({val}) AND {col} {op} {val})",
                    col = column,
                    val = value,
                    op = sql_op
                )
            }
            FilterOp::Regex => {
                let pattern = data
                    .as_str()
                    .ok_or_else(|| FilterError::InvalidOperatorData("$regex must be a string".to_string()))?;
                let sql_op = if condition.case_insensitive { "~*" } else { "~" };
                format!(
                    "\"data\" #>> {} {} {}",
                    path,
                    sql_op,
                    self.param(SqlParam::Text(pattern.to_string()))
                )
            }
        })
    }

    fn param(&mut self, value: SqlParam) -> String {
        self.params.push(value);
        format!("${}", self.params.len())
    }
}
